//! Keeps the static schemas and the serialized result types in lockstep.

use std::collections::BTreeSet;

use reelpack_core::schema::{
    KNOWN_FOR_SCHEMA, MOVIE_SCHEMA, ObjectSchema, PERSON_REFERENCE_SCHEMA, PERSON_SCHEMA,
    PropertyType, SEASON_SCHEMA, SERIES_SCHEMA, WATCH_PROVIDER_SCHEMA,
};
use reelpack_core::types::{KnownForTitle, Movie, Person, PersonReference, Season, Series, WatchProvider};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

/// A value for every declared property, nested objects included.
fn sample(schema: &ObjectSchema) -> Value {
    let mut object = Map::new();
    for property in schema.properties {
        object.insert(property.name.to_string(), sample_of(&property.value_type));
    }
    Value::Object(object)
}

fn sample_of(ty: &PropertyType) -> Value {
    match ty {
        PropertyType::String => json!("2010-09-17"),
        PropertyType::Number => json!(7),
        PropertyType::Array(items) => json!([sample_of(items)]),
        PropertyType::Object(schema) => sample(schema),
    }
}

fn keys(value: &Value) -> BTreeSet<String> {
    value.as_object().unwrap().keys().cloned().collect()
}

/// Deserialize a fully populated sample into `T` and serialize it back. A
/// property the type lacks is dropped on the way in; a field the schema
/// lacks cannot be produced. Either way the key sets differ.
fn assert_in_sync<T: Serialize + DeserializeOwned>(schema: &ObjectSchema) {
    let input = sample(schema);
    let typed: T = serde_json::from_value(input.clone()).unwrap();
    let output = serde_json::to_value(&typed).unwrap();

    assert_eq!(keys(&input), keys(&output), "{} drifted", schema.identity);
    assert_eq!(schema.validate(&output), Ok(()));
}

#[test]
fn movie_schema_matches_type() {
    assert_in_sync::<Movie>(&MOVIE_SCHEMA);
}

#[test]
fn series_schema_matches_type() {
    assert_in_sync::<Series>(&SERIES_SCHEMA);
}

#[test]
fn person_schema_matches_type() {
    assert_in_sync::<Person>(&PERSON_SCHEMA);
}

#[test]
fn nested_schemas_match_types() {
    assert_in_sync::<PersonReference>(&PERSON_REFERENCE_SCHEMA);
    assert_in_sync::<WatchProvider>(&WATCH_PROVIDER_SCHEMA);
    assert_in_sync::<Season>(&SEASON_SCHEMA);
    assert_in_sync::<KnownForTitle>(&KNOWN_FOR_SCHEMA);
}

#[test]
fn default_movie_passes_but_empty_object_does_not() {
    let movie = serde_json::to_value(Movie::default()).unwrap();
    // Defaults serialize empty strings, which still count as present.
    assert_eq!(MOVIE_SCHEMA.validate(&movie), Ok(()));
    assert!(MOVIE_SCHEMA.validate(&json!({})).is_err());
}
