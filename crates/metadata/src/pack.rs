//! Pack registration: what the host needs to know before the first call.

use reelpack_core::schema::{ObjectSchema, schema_for};
use reelpack_core::types::EntityKind;
use serde::Serialize;

use crate::fetch::{IMDB_API_KEY_PARAM, TMDB_API_KEY_PARAM};

#[derive(Debug, Serialize)]
pub struct PackManifest {
    /// The only hosts the pack may reach.
    pub network_domains: &'static [&'static str],
    pub auth_params: &'static [AuthParam],
    pub formulas: &'static [Formula],
    pub column_formats: &'static [ColumnFormat],
}

#[derive(Debug, Serialize)]
pub struct AuthParam {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Formula {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: EntityKind,
    pub parameters: &'static [FormulaParameter],
}

impl Formula {
    pub fn schema(&self) -> &'static ObjectSchema {
        schema_for(self.kind)
    }
}

#[derive(Debug, Serialize)]
pub struct FormulaParameter {
    pub name: &'static str,
    pub description: &'static str,
    pub optional: bool,
    /// Autocomplete source for this parameter, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<&'static str>,
}

/// Applies a formula to whatever text is typed into a column cell.
#[derive(Debug, Serialize)]
pub struct ColumnFormat {
    pub name: &'static str,
    pub instructions: &'static str,
    pub formula_name: &'static str,
}

const COUNTRY_PARAMETER: FormulaParameter = FormulaParameter {
    name: "country",
    description: "2-letter code for your country, to show which of your streaming providers have this title (e.g. 'US', 'CA', 'GB')",
    optional: true,
    autocomplete: Some("countries"),
};

pub static MANIFEST: PackManifest = PackManifest {
    network_domains: &["imdb-api.com", "themoviedb.org"],
    auth_params: &[
        AuthParam {
            name: IMDB_API_KEY_PARAM,
            description: "API Key from imdb-api.com",
        },
        AuthParam {
            name: TMDB_API_KEY_PARAM,
            description: "API Key from themoviedb.org",
        },
    ],
    formulas: &[
        Formula {
            name: "Movie",
            description: "Search for a movie title to retrieve all its details",
            kind: EntityKind::Movie,
            parameters: &[
                FormulaParameter {
                    name: "query",
                    description: "Search IMDb (try movie title, or movie title and year), or paste an IMDb id",
                    optional: false,
                    autocomplete: None,
                },
                COUNTRY_PARAMETER,
            ],
        },
        Formula {
            name: "Series",
            description: "Search for a TV series to retrieve its details, seasons and networks",
            kind: EntityKind::Series,
            parameters: &[
                FormulaParameter {
                    name: "query",
                    description: "Search IMDb for a series title, or paste an IMDb id",
                    optional: false,
                    autocomplete: None,
                },
                COUNTRY_PARAMETER,
            ],
        },
        Formula {
            name: "Person",
            description: "Search for an actor, director or writer to retrieve their details",
            kind: EntityKind::Person,
            parameters: &[FormulaParameter {
                name: "query",
                description: "Search IMDb for a person's name, or paste an IMDb id (nm...)",
                optional: false,
                autocomplete: None,
            }],
        },
    ],
    column_formats: &[
        ColumnFormat {
            name: "Movie",
            instructions: "Shows movie details from IMDb",
            formula_name: "Movie",
        },
        ColumnFormat {
            name: "Series",
            instructions: "Shows TV series details from IMDb",
            formula_name: "Series",
        },
        ColumnFormat {
            name: "Person",
            instructions: "Shows details about a person from IMDb",
            formula_name: "Person",
        },
    ],
};

impl PackManifest {
    pub fn formula(&self, kind: EntityKind) -> Option<&'static Formula> {
        self.formulas.iter().find(|f| f.kind == kind)
    }
}
