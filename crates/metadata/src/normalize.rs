//! Raw upstream records in, result shapes out.
//!
//! Everything here is pure. Records that may be absent are passed as
//! `Option<&Value>` and read through [`FieldExt`], so a missing parent
//! object yields a missing field rather than an error.

use chrono::NaiveDate;
use reelpack_core::types::{
    KnownForTitle, Movie, Person, PersonReference, Season, Series, WatchProvider,
};
use serde_json::Value;

use crate::{MetadataError, ProviderConfig};

static NULL: Value = Value::Null;

/// Safe navigation over loosely typed upstream records.
///
/// Missing keys, nulls and empty strings all read as absent; numbers may
/// arrive either as JSON numbers or as numeric strings.
pub trait FieldExt {
    fn field(&self, key: &str) -> &Value;

    fn text(&self, key: &str) -> Option<&str> {
        self.field(key)
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn owned_text(&self, key: &str) -> Option<String> {
        self.text(key).map(str::to_string)
    }

    fn integer(&self, key: &str) -> Option<i64> {
        match self.field(key) {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn decimal(&self, key: &str) -> Option<f64> {
        match self.field(key) {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn list(&self, key: &str) -> &[Value] {
        self.field(key).as_array().map(Vec::as_slice).unwrap_or_default()
    }
}

impl FieldExt for Value {
    fn field(&self, key: &str) -> &Value {
        // Indexing a non-object or a missing key yields Null.
        &self[key]
    }
}

impl FieldExt for Option<&Value> {
    fn field(&self, key: &str) -> &Value {
        match self {
            Some(value) => &value[key],
            None => &NULL,
        }
    }
}

/// Split an upstream `", "`-joined list. Absent input gives an empty list.
pub fn split_names(joined: Option<&str>) -> Vec<String> {
    match joined {
        Some(s) if !s.is_empty() => s.split(", ").map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Keep only the digits of a currency string: `"$1,234,567"` becomes
/// `"1234567"`. Absent input, or input without digits, stays absent.
pub fn strip_non_digits(value: Option<&str>) -> Option<String> {
    let digits: String = value?.chars().filter(char::is_ascii_digit).collect();
    (!digits.is_empty()).then_some(digits)
}

/// Runtime in the form the host's duration hint parses.
pub fn runtime(minutes: Option<i64>) -> Option<String> {
    minutes.map(|m| format!("{m} minutes"))
}

/// Calendar dates only; partial or malformed dates are dropped.
pub fn iso_date(value: Option<&str>) -> Option<String> {
    let date = NaiveDate::parse_from_str(value?, "%Y-%m-%d").ok()?;
    Some(date.format("%Y-%m-%d").to_string())
}

fn year(value: Option<i64>) -> Option<i32> {
    value.and_then(|y| i32::try_from(y).ok()).filter(|y| *y > 0)
}

// IMDb-API fills missing portraits with a placeholder image.
fn usable_image(url: Option<&str>) -> Option<String> {
    url.filter(|u| !u.contains("nopicture")).map(str::to_string)
}

/// Build person references from an IMDb `{id, name}` list, backfilling
/// photos from a second `{id, image}` list. When the structured list is
/// missing, fall back to the comma-joined names without ids.
pub fn person_references(
    list: &[Value],
    with_images: &[Value],
    joined_names: Option<&str>,
    config: &ProviderConfig,
) -> Vec<PersonReference> {
    if list.is_empty() {
        return split_names(joined_names)
            .into_iter()
            .map(|name| PersonReference {
                name,
                ..Default::default()
            })
            .collect();
    }

    list.iter()
        .filter_map(|entry| {
            let name = entry.owned_text("name")?;
            let imdb_id = entry.owned_text("id");
            let photo = imdb_id.as_deref().and_then(|id| {
                with_images
                    .iter()
                    .find(|candidate| candidate.text("id") == Some(id))
                    .and_then(|candidate| usable_image(candidate.text("image")))
            });
            Some(PersonReference {
                name,
                link: imdb_id.as_deref().map(|id| config.imdb_name_link(id)),
                imdb_id,
                photo,
            })
        })
        .collect()
}

/// Watch-provider offers for a single country, split by offer type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchAvailability {
    pub link: Option<String>,
    pub stream: Vec<WatchProvider>,
    pub buy: Vec<WatchProvider>,
    pub rent: Vec<WatchProvider>,
}

/// Read one country's entry out of a `watch/providers` body. A country
/// missing from the response gives empty buckets.
pub fn watch_availability(
    body: Option<&Value>,
    country: &str,
    config: &ProviderConfig,
) -> WatchAvailability {
    let region = body.field("results").field(country);
    let bucket = |key: &str| -> Vec<WatchProvider> {
        region
            .list(key)
            .iter()
            .filter_map(|p| {
                Some(WatchProvider {
                    name: p.owned_text("provider_name")?,
                    country: country.to_string(),
                    logo: p.text("logo_path").map(|path| config.tmdb_image(path)),
                })
            })
            .collect()
    };

    WatchAvailability {
        link: region.owned_text("link"),
        stream: bucket("flatrate"),
        buy: bucket("buy"),
        rent: bucket("rent"),
    }
}

pub fn seasons(tv_details: Option<&Value>, config: &ProviderConfig) -> Vec<Season> {
    tv_details
        .list("seasons")
        .iter()
        .filter_map(|s| {
            let number = i32::try_from(s.integer("season_number")?).ok()?;
            Some(Season {
                number,
                name: s
                    .owned_text("name")
                    .unwrap_or_else(|| format!("Season {number}")),
                episode_count: s.integer("episode_count").and_then(|n| i32::try_from(n).ok()),
                air_date: iso_date(s.text("air_date")),
                poster: s.text("poster_path").map(|p| config.tmdb_image(p)),
                overview: s.owned_text("overview"),
            })
        })
        .collect()
}

pub fn known_for(name_detail: &Value, config: &ProviderConfig) -> Vec<KnownForTitle> {
    name_detail
        .list("knownFor")
        .iter()
        .filter_map(|t| {
            let imdb_id = t.owned_text("id")?;
            let title = t.owned_text("title").or_else(|| t.owned_text("fullTitle"))?;
            Some(KnownForTitle {
                link: Some(config.imdb_title_link(&imdb_id)),
                year: year(t.integer("year")),
                role: t.owned_text("role"),
                poster: usable_image(t.text("image")),
                imdb_id,
                title,
            })
        })
        .collect()
}

/// Fragments gathered for a movie or series.
#[derive(Debug, Clone, Copy)]
pub struct TitleSources<'a> {
    pub imdb_id: &'a str,
    /// First search hit, absent when the query was already an id.
    pub search_hit: Option<&'a Value>,
    pub imdb: &'a Value,
    /// Cross-referenced TMDB record, absent when TMDB had no match.
    pub tmdb: Option<&'a Value>,
    /// Full TMDB series record (series only).
    pub tv_details: Option<&'a Value>,
}

/// Fragments gathered for a person.
#[derive(Debug, Clone, Copy)]
pub struct PersonSources<'a> {
    pub imdb_id: &'a str,
    pub search_hit: Option<&'a Value>,
    pub imdb: &'a Value,
    pub tmdb: Option<&'a Value>,
}

// The id is known before any detail arrives; the title is not. The search
// hit may supply it only when the detail record carries no error.
fn required_title(
    detail: &Value,
    search_hit: Option<&Value>,
    detail_key: &str,
    imdb_id: &str,
) -> Result<String, MetadataError> {
    if let Some(title) = detail.owned_text(detail_key) {
        return Ok(title);
    }
    if let Some(msg) = detail.text("errorMessage") {
        return Err(MetadataError::Provider(format!(
            "IMDb-API returned no record for {imdb_id}: {msg}"
        )));
    }
    search_hit.owned_text("title").ok_or_else(|| {
        MetadataError::Provider(format!("IMDb-API returned an empty record for {imdb_id}"))
    })
}

pub fn normalize_movie(
    src: TitleSources<'_>,
    watch: WatchAvailability,
    config: &ProviderConfig,
) -> Result<Movie, MetadataError> {
    let imdb = src.imdb;
    let ratings = imdb.field("ratings");
    let box_office = imdb.field("boxOffice");

    Ok(Movie {
        imdb_id: src.imdb_id.to_string(),
        title: required_title(imdb, src.search_hit, "title", src.imdb_id)?,
        description: imdb
            .owned_text("plot")
            .or_else(|| src.search_hit.owned_text("description")),
        year: year(imdb.integer("year")),
        release_date: iso_date(imdb.text("releaseDate")),
        runtime: runtime(imdb.integer("runtimeMins")),
        content_rating: imdb.owned_text("contentRating"),
        director: person_references(
            imdb.list("directorList"),
            imdb.list("actorList"),
            imdb.text("directors"),
            config,
        ),
        writer: person_references(
            imdb.list("writerList"),
            imdb.list("actorList"),
            imdb.text("writers"),
            config,
        ),
        starring: person_references(
            imdb.list("starList"),
            imdb.list("actorList"),
            imdb.text("stars"),
            config,
        ),
        genres: split_names(imdb.text("genres")),
        countries: split_names(imdb.text("countries")),
        languages: split_names(imdb.text("languages")),
        companies: split_names(imdb.text("companies")),
        imdb_rating: imdb.decimal("imDbRating"),
        metacritic: imdb
            .decimal("metacriticRating")
            .or_else(|| ratings.decimal("metacritic")),
        rotten_tomatoes: ratings.decimal("rottenTomatoes"),
        tmdb_rating: src
            .tmdb
            .decimal("vote_average")
            .or_else(|| ratings.decimal("theMovieDb")),
        imdb_link: config.imdb_title_link(src.imdb_id),
        vertical_poster: usable_image(imdb.text("image"))
            .or_else(|| usable_image(src.search_hit.text("image"))),
        horizontal_poster: src
            .tmdb
            .text("backdrop_path")
            .map(|p| config.tmdb_image(p)),
        trailer: imdb.field("trailer").owned_text("link"),
        awards: imdb.owned_text("awards"),
        budget: strip_non_digits(box_office.text("budget")),
        opening_weekend: strip_non_digits(box_office.text("openingWeekendUSA")),
        gross_usa: strip_non_digits(box_office.text("grossUSA")),
        worldwide_gross: strip_non_digits(box_office.text("cumulativeWorldwideGross")),
        tmdb_id: src.tmdb.integer("id"),
        watch_links: watch.link,
        stream: watch.stream,
        buy: watch.buy,
        rent: watch.rent,
    })
}

pub fn normalize_series(
    src: TitleSources<'_>,
    watch: WatchAvailability,
    config: &ProviderConfig,
) -> Result<Series, MetadataError> {
    let imdb = src.imdb;
    let series_info = imdb.field("tvSeriesInfo");
    let tv = src.tv_details;

    Ok(Series {
        imdb_id: src.imdb_id.to_string(),
        title: required_title(imdb, src.search_hit, "title", src.imdb_id)?,
        description: imdb
            .owned_text("plot")
            .or_else(|| src.search_hit.owned_text("description")),
        year: year(imdb.integer("year")),
        year_end: year(series_info.integer("yearEnd")),
        runtime: runtime(
            imdb.integer("runtimeMins")
                .or_else(|| tv.list("episode_run_time").first().and_then(Value::as_i64)),
        ),
        content_rating: imdb.owned_text("contentRating"),
        creators: person_references(
            series_info.list("creatorList"),
            imdb.list("actorList"),
            series_info.text("creators"),
            config,
        ),
        starring: person_references(
            imdb.list("starList"),
            imdb.list("actorList"),
            imdb.text("stars"),
            config,
        ),
        genres: split_names(imdb.text("genres")),
        countries: split_names(imdb.text("countries")),
        languages: split_names(imdb.text("languages")),
        companies: split_names(imdb.text("companies")),
        imdb_rating: imdb.decimal("imDbRating"),
        tmdb_rating: src
            .tmdb
            .decimal("vote_average")
            .or_else(|| imdb.field("ratings").decimal("theMovieDb")),
        imdb_link: config.imdb_title_link(src.imdb_id),
        vertical_poster: usable_image(imdb.text("image"))
            .or_else(|| usable_image(src.search_hit.text("image"))),
        horizontal_poster: src
            .tmdb
            .text("backdrop_path")
            .map(|p| config.tmdb_image(p)),
        trailer: imdb.field("trailer").owned_text("link"),
        awards: imdb.owned_text("awards"),
        tmdb_id: src.tmdb.integer("id"),
        networks: tv
            .list("networks")
            .iter()
            .filter_map(|n| n.owned_text("name"))
            .collect(),
        status: tv.owned_text("status"),
        first_air_date: iso_date(
            tv.text("first_air_date")
                .or_else(|| src.tmdb.text("first_air_date")),
        ),
        last_air_date: iso_date(tv.text("last_air_date")),
        number_of_seasons: tv
            .integer("number_of_seasons")
            .and_then(|n| i32::try_from(n).ok()),
        number_of_episodes: tv
            .integer("number_of_episodes")
            .and_then(|n| i32::try_from(n).ok()),
        seasons: seasons(tv, config),
        watch_links: watch.link,
        stream: watch.stream,
        buy: watch.buy,
        rent: watch.rent,
    })
}

pub fn normalize_person(
    src: PersonSources<'_>,
    config: &ProviderConfig,
) -> Result<Person, MetadataError> {
    let imdb = src.imdb;

    Ok(Person {
        imdb_id: src.imdb_id.to_string(),
        name: required_title(imdb, src.search_hit, "name", src.imdb_id)?,
        description: src.search_hit.owned_text("description"),
        role: imdb.owned_text("role"),
        summary: imdb.owned_text("summary"),
        birth_date: iso_date(imdb.text("birthDate")),
        death_date: iso_date(imdb.text("deathDate")),
        height: imdb.owned_text("height"),
        awards: imdb.owned_text("awards"),
        photo: usable_image(imdb.text("image"))
            .or_else(|| src.tmdb.text("profile_path").map(|p| config.tmdb_image(p))),
        imdb_link: config.imdb_name_link(src.imdb_id),
        known_for: known_for(imdb, config),
        known_for_department: src.tmdb.owned_text("known_for_department"),
        tmdb_id: src.tmdb.integer("id"),
    })
}
