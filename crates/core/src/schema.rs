//! Static declarations of the result shapes handed to the host.
//!
//! Every schema here must list exactly the fields the matching type in
//! [`crate::types`] serializes. The host runs [`ObjectSchema::validate`] on
//! each result before returning it.

use serde::Serialize;
use serde::ser::SerializeMap;
use serde_json::Value;
use thiserror::Error;

use crate::types::EntityKind;

/// Display hint for a property, layered on top of its primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueHint {
    Url,
    ImageReference,
    Date,
    Duration,
    Currency,
}

#[derive(Debug, Clone, Copy)]
pub enum PropertyType {
    String,
    Number,
    Array(&'static PropertyType),
    Object(&'static ObjectSchema),
}

impl PropertyType {
    fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

impl Serialize for PropertyType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.name())?;
        match self {
            Self::Array(items) => map.serialize_entry("items", items)?,
            Self::Object(schema) => map.serialize_entry("schema", schema)?,
            Self::String | Self::Number => {}
        }
        map.end()
    }
}

#[derive(Debug, Serialize)]
pub struct Property {
    pub name: &'static str,
    #[serde(flatten)]
    pub value_type: PropertyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<ValueHint>,
}

/// Attribution the upstream providers require wherever their data is shown.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Attribution {
    Text {
        text: &'static str,
    },
    Link {
        anchor_text: &'static str,
        anchor_url: &'static str,
    },
    Image {
        image_url: &'static str,
        anchor_url: &'static str,
    },
}

#[derive(Debug, Serialize)]
pub struct ObjectSchema {
    pub identity: &'static str,
    /// Human-readable title field.
    pub primary: &'static str,
    /// Unique identifier field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'static str>,
    pub featured: &'static [&'static str],
    pub properties: &'static [Property],
    pub attribution: &'static [Attribution],
}

#[derive(Debug, Error, PartialEq)]
pub enum SchemaViolation {
    #[error("{path}: expected an object")]
    NotAnObject { path: String },
    #[error("{path}: field is not declared by {schema}")]
    UndeclaredField { schema: &'static str, path: String },
    #[error("{path}: required field is missing")]
    MissingRequired { path: String },
    #[error("{path}: expected {expected}")]
    TypeMismatch { path: String, expected: &'static str },
}

impl ObjectSchema {
    pub fn property(&self, name: &str) -> Option<&'static Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn property_names(&self) -> impl Iterator<Item = &'static str> {
        self.properties.iter().map(|p| p.name)
    }

    /// Check a serialized result against this schema. Null values count as
    /// absent; the primary field (and at top level the id field) must be
    /// present.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        self.validate_at(value, self.identity, true)
    }

    fn validate_at(&self, value: &Value, path: &str, top_level: bool) -> Result<(), SchemaViolation> {
        let Some(object) = value.as_object() else {
            return Err(SchemaViolation::NotAnObject {
                path: path.to_string(),
            });
        };

        let mut required = vec![self.primary];
        if top_level {
            required.extend(self.id);
        }
        for name in required {
            if object.get(name).is_none_or(Value::is_null) {
                return Err(SchemaViolation::MissingRequired {
                    path: format!("{path}.{name}"),
                });
            }
        }

        for (key, field) in object {
            let field_path = format!("{path}.{key}");
            let Some(property) = self.property(key) else {
                return Err(SchemaViolation::UndeclaredField {
                    schema: self.identity,
                    path: field_path,
                });
            };
            if !field.is_null() {
                check_type(&property.value_type, field, &field_path)?;
            }
        }
        Ok(())
    }
}

fn check_type(ty: &PropertyType, value: &Value, path: &str) -> Result<(), SchemaViolation> {
    let mismatch = || SchemaViolation::TypeMismatch {
        path: path.to_string(),
        expected: ty.name(),
    };
    match ty {
        PropertyType::String => value.is_string().then_some(()).ok_or_else(mismatch),
        PropertyType::Number => value.is_number().then_some(()).ok_or_else(mismatch),
        PropertyType::Array(items) => {
            let entries = value.as_array().ok_or_else(mismatch)?;
            for (i, entry) in entries.iter().enumerate() {
                check_type(items, entry, &format!("{path}[{i}]"))?;
            }
            Ok(())
        }
        PropertyType::Object(schema) => schema.validate_at(value, path, false),
    }
}

/// Schema for the top-level result of a lookup.
pub fn schema_for(kind: EntityKind) -> &'static ObjectSchema {
    match kind {
        EntityKind::Movie => &MOVIE_SCHEMA,
        EntityKind::Series => &SERIES_SCHEMA,
        EntityKind::Person => &PERSON_SCHEMA,
    }
}

const fn prop(name: &'static str, value_type: PropertyType) -> Property {
    Property {
        name,
        value_type,
        hint: None,
    }
}

const fn hinted(name: &'static str, value_type: PropertyType, hint: ValueHint) -> Property {
    Property {
        name,
        value_type,
        hint: Some(hint),
    }
}

static STRING: PropertyType = PropertyType::String;
static PERSON_REFERENCE: PropertyType = PropertyType::Object(&PERSON_REFERENCE_SCHEMA);
static WATCH_PROVIDER: PropertyType = PropertyType::Object(&WATCH_PROVIDER_SCHEMA);
static SEASON: PropertyType = PropertyType::Object(&SEASON_SCHEMA);
static KNOWN_FOR: PropertyType = PropertyType::Object(&KNOWN_FOR_SCHEMA);

static PERSON_ATTRIBUTION: [Attribution; 4] = [
    Attribution::Text {
        text: "People data from",
    },
    Attribution::Link {
        anchor_text: "IMDb-API",
        anchor_url: "https://imdb-api.com",
    },
    Attribution::Text {
        text: "This product uses the TMDB API but is not endorsed or certified by TMDB.",
    },
    Attribution::Image {
        image_url: "https://www.themoviedb.org/assets/2/v4/logos/v2/blue_short-8e7b30f73a4020692ccca9c88bafe5dcb6f8a62a4c6bc55cd9ba82bb2cd95f6c.svg",
        anchor_url: "https://www.themoviedb.org",
    },
];

static TITLE_ATTRIBUTION: [Attribution; 6] = [
    Attribution::Text {
        text: "Title and people data from",
    },
    Attribution::Link {
        anchor_text: "IMDb-API",
        anchor_url: "https://imdb-api.com",
    },
    Attribution::Text {
        text: "This product uses the TMDB API but is not endorsed or certified by TMDB.",
    },
    Attribution::Image {
        image_url: "https://www.themoviedb.org/assets/2/v4/logos/v2/blue_short-8e7b30f73a4020692ccca9c88bafe5dcb6f8a62a4c6bc55cd9ba82bb2cd95f6c.svg",
        anchor_url: "https://www.themoviedb.org",
    },
    Attribution::Text {
        text: "Streaming availability from",
    },
    Attribution::Link {
        anchor_text: "JustWatch",
        anchor_url: "https://www.justwatch.com",
    },
];

pub static PERSON_REFERENCE_SCHEMA: ObjectSchema = ObjectSchema {
    identity: "PersonReference",
    primary: "Name",
    id: Some("ImdbId"),
    featured: &[],
    properties: &[
        prop("Name", PropertyType::String),
        prop("ImdbId", PropertyType::String),
        hinted("Link", PropertyType::String, ValueHint::Url),
        hinted("Photo", PropertyType::String, ValueHint::ImageReference),
    ],
    attribution: &[],
};

pub static WATCH_PROVIDER_SCHEMA: ObjectSchema = ObjectSchema {
    identity: "WatchProvider",
    primary: "Name",
    id: None,
    featured: &[],
    properties: &[
        prop("Name", PropertyType::String),
        prop("Country", PropertyType::String),
        hinted("Logo", PropertyType::String, ValueHint::ImageReference),
    ],
    attribution: &[],
};

pub static SEASON_SCHEMA: ObjectSchema = ObjectSchema {
    identity: "Season",
    primary: "Name",
    id: None,
    featured: &[],
    properties: &[
        prop("Number", PropertyType::Number),
        prop("Name", PropertyType::String),
        prop("EpisodeCount", PropertyType::Number),
        hinted("AirDate", PropertyType::String, ValueHint::Date),
        hinted("Poster", PropertyType::String, ValueHint::ImageReference),
        prop("Overview", PropertyType::String),
    ],
    attribution: &[],
};

pub static KNOWN_FOR_SCHEMA: ObjectSchema = ObjectSchema {
    identity: "KnownForTitle",
    primary: "Title",
    id: Some("ImdbId"),
    featured: &[],
    properties: &[
        prop("ImdbId", PropertyType::String),
        prop("Title", PropertyType::String),
        prop("Year", PropertyType::Number),
        prop("Role", PropertyType::String),
        hinted("Link", PropertyType::String, ValueHint::Url),
        hinted("Poster", PropertyType::String, ValueHint::ImageReference),
    ],
    attribution: &[],
};

pub static MOVIE_SCHEMA: ObjectSchema = ObjectSchema {
    identity: "Movie",
    primary: "Title",
    id: Some("ImdbId"),
    featured: &["Year", "VerticalPoster", "Director", "ImdbRating"],
    properties: &[
        prop("ImdbId", PropertyType::String),
        prop("Title", PropertyType::String),
        prop("Description", PropertyType::String),
        prop("Year", PropertyType::Number),
        hinted("ReleaseDate", PropertyType::String, ValueHint::Date),
        hinted("Runtime", PropertyType::String, ValueHint::Duration),
        prop("ContentRating", PropertyType::String),
        prop("Director", PropertyType::Array(&PERSON_REFERENCE)),
        prop("Writer", PropertyType::Array(&PERSON_REFERENCE)),
        prop("Starring", PropertyType::Array(&PERSON_REFERENCE)),
        prop("Genres", PropertyType::Array(&STRING)),
        prop("Countries", PropertyType::Array(&STRING)),
        prop("Languages", PropertyType::Array(&STRING)),
        prop("Companies", PropertyType::Array(&STRING)),
        prop("ImdbRating", PropertyType::Number),
        prop("Metacritic", PropertyType::Number),
        prop("RottenTomatoes", PropertyType::Number),
        prop("TmdbRating", PropertyType::Number),
        hinted("ImdbLink", PropertyType::String, ValueHint::Url),
        hinted("VerticalPoster", PropertyType::String, ValueHint::ImageReference),
        hinted("HorizontalPoster", PropertyType::String, ValueHint::ImageReference),
        hinted("Trailer", PropertyType::String, ValueHint::Url),
        prop("Awards", PropertyType::String),
        hinted("Budget", PropertyType::String, ValueHint::Currency),
        hinted("OpeningWeekend", PropertyType::String, ValueHint::Currency),
        hinted("GrossUsa", PropertyType::String, ValueHint::Currency),
        hinted("WorldwideGross", PropertyType::String, ValueHint::Currency),
        prop("TmdbId", PropertyType::Number),
        hinted("WatchLinks", PropertyType::String, ValueHint::Url),
        prop("Stream", PropertyType::Array(&WATCH_PROVIDER)),
        prop("Buy", PropertyType::Array(&WATCH_PROVIDER)),
        prop("Rent", PropertyType::Array(&WATCH_PROVIDER)),
    ],
    attribution: &TITLE_ATTRIBUTION,
};

pub static SERIES_SCHEMA: ObjectSchema = ObjectSchema {
    identity: "Series",
    primary: "Title",
    id: Some("ImdbId"),
    featured: &["Year", "VerticalPoster", "Networks", "NumberOfSeasons"],
    properties: &[
        prop("ImdbId", PropertyType::String),
        prop("Title", PropertyType::String),
        prop("Description", PropertyType::String),
        prop("Year", PropertyType::Number),
        prop("YearEnd", PropertyType::Number),
        hinted("Runtime", PropertyType::String, ValueHint::Duration),
        prop("ContentRating", PropertyType::String),
        prop("Creators", PropertyType::Array(&PERSON_REFERENCE)),
        prop("Starring", PropertyType::Array(&PERSON_REFERENCE)),
        prop("Genres", PropertyType::Array(&STRING)),
        prop("Countries", PropertyType::Array(&STRING)),
        prop("Languages", PropertyType::Array(&STRING)),
        prop("Companies", PropertyType::Array(&STRING)),
        prop("ImdbRating", PropertyType::Number),
        prop("TmdbRating", PropertyType::Number),
        hinted("ImdbLink", PropertyType::String, ValueHint::Url),
        hinted("VerticalPoster", PropertyType::String, ValueHint::ImageReference),
        hinted("HorizontalPoster", PropertyType::String, ValueHint::ImageReference),
        hinted("Trailer", PropertyType::String, ValueHint::Url),
        prop("Awards", PropertyType::String),
        prop("TmdbId", PropertyType::Number),
        prop("Networks", PropertyType::Array(&STRING)),
        prop("Status", PropertyType::String),
        hinted("FirstAirDate", PropertyType::String, ValueHint::Date),
        hinted("LastAirDate", PropertyType::String, ValueHint::Date),
        prop("NumberOfSeasons", PropertyType::Number),
        prop("NumberOfEpisodes", PropertyType::Number),
        prop("Seasons", PropertyType::Array(&SEASON)),
        hinted("WatchLinks", PropertyType::String, ValueHint::Url),
        prop("Stream", PropertyType::Array(&WATCH_PROVIDER)),
        prop("Buy", PropertyType::Array(&WATCH_PROVIDER)),
        prop("Rent", PropertyType::Array(&WATCH_PROVIDER)),
    ],
    attribution: &TITLE_ATTRIBUTION,
};

pub static PERSON_SCHEMA: ObjectSchema = ObjectSchema {
    identity: "Person",
    primary: "Name",
    id: Some("ImdbId"),
    featured: &["Photo", "Role", "KnownFor"],
    properties: &[
        prop("ImdbId", PropertyType::String),
        prop("Name", PropertyType::String),
        prop("Description", PropertyType::String),
        prop("Role", PropertyType::String),
        prop("Summary", PropertyType::String),
        hinted("BirthDate", PropertyType::String, ValueHint::Date),
        hinted("DeathDate", PropertyType::String, ValueHint::Date),
        prop("Height", PropertyType::String),
        prop("Awards", PropertyType::String),
        hinted("Photo", PropertyType::String, ValueHint::ImageReference),
        hinted("ImdbLink", PropertyType::String, ValueHint::Url),
        prop("KnownFor", PropertyType::Array(&KNOWN_FOR)),
        prop("KnownForDepartment", PropertyType::String),
        prop("TmdbId", PropertyType::Number),
    ],
    attribution: &PERSON_ATTRIBUTION,
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn declarations_are_self_consistent() {
        let all: [&ObjectSchema; 7] = [
            &MOVIE_SCHEMA,
            &SERIES_SCHEMA,
            &PERSON_SCHEMA,
            &PERSON_REFERENCE_SCHEMA,
            &WATCH_PROVIDER_SCHEMA,
            &SEASON_SCHEMA,
            &KNOWN_FOR_SCHEMA,
        ];
        for schema in all {
            let names: HashSet<_> = schema.property_names().collect();
            assert_eq!(names.len(), schema.properties.len(), "{} has duplicates", schema.identity);
            assert!(names.contains(schema.primary), "{} primary", schema.identity);
            if let Some(id) = schema.id {
                assert!(names.contains(id), "{} id", schema.identity);
            }
            for featured in schema.featured {
                assert!(names.contains(featured), "{} featured {featured}", schema.identity);
            }
        }
    }

    #[test]
    fn validate_accepts_minimal_movie() {
        let value = json!({
            "ImdbId": "tt1255953",
            "Title": "Incendies",
            "ImdbLink": "https://imdb.com/title/tt1255953",
            "Year": 2010,
            "Director": [{ "Name": "Denis Villeneuve", "ImdbId": "nm0898288" }],
            "Stream": [],
        });
        assert_eq!(MOVIE_SCHEMA.validate(&value), Ok(()));
    }

    #[test]
    fn validate_rejects_missing_id() {
        let value = json!({ "Title": "Incendies" });
        assert_eq!(
            MOVIE_SCHEMA.validate(&value),
            Err(SchemaViolation::MissingRequired {
                path: "Movie.ImdbId".into()
            })
        );
    }

    #[test]
    fn validate_rejects_undeclared_field() {
        let value = json!({ "ImdbId": "tt1", "Title": "X", "Poster": "p.jpg" });
        assert!(matches!(
            MOVIE_SCHEMA.validate(&value),
            Err(SchemaViolation::UndeclaredField { .. })
        ));
    }

    #[test]
    fn validate_checks_nested_types() {
        let value = json!({
            "ImdbId": "tt1",
            "Title": "X",
            "Stream": [{ "Name": "Netflix", "Country": 12 }],
        });
        assert_eq!(
            MOVIE_SCHEMA.validate(&value),
            Err(SchemaViolation::TypeMismatch {
                path: "Movie.Stream[0].Country".into(),
                expected: "string",
            })
        );
    }

    #[test]
    fn null_counts_as_absent() {
        let value = json!({ "ImdbId": "nm1", "Name": "Someone", "Photo": null });
        assert_eq!(PERSON_SCHEMA.validate(&value), Ok(()));
    }

    #[test]
    fn serializes_with_type_tags() {
        let json = serde_json::to_value(&MOVIE_SCHEMA).unwrap();
        assert_eq!(json["primary"], "Title");
        assert_eq!(json["id"], "ImdbId");
        let runtime = json["properties"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["name"] == "Runtime")
            .unwrap();
        assert_eq!(runtime["type"], "string");
        assert_eq!(runtime["hint"], "duration");
        let director = json["properties"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["name"] == "Director")
            .unwrap();
        assert_eq!(director["items"]["type"], "object");
        assert_eq!(director["items"]["schema"]["identity"], "PersonReference");
    }
}
