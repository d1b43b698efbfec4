//! Country autocomplete for the `country` formula parameter.

use reelpack_core::types::AutocompleteOption;
use serde_json::Value;

use crate::MetadataError;
use crate::fetch::ExecutionContext;
use crate::normalize::FieldExt;
use crate::tmdb::TmdbApi;

/// Countries TMDB has watch-provider data for, filtered by `search`.
pub async fn country_options(
    tmdb: &TmdbApi,
    ctx: &ExecutionContext,
    search: &str,
) -> Result<Vec<AutocompleteOption>, MetadataError> {
    let body = tmdb.watch_provider_regions(ctx).await?;
    Ok(match_regions(body.list("results"), search))
}

/// Case-insensitive match on English name, native name or code. Exact code
/// matches rank first, then name prefixes, then substrings.
pub fn match_regions(regions: &[Value], search: &str) -> Vec<AutocompleteOption> {
    let needle = search.trim().to_lowercase();

    let mut ranked: Vec<(u8, String, String)> = regions
        .iter()
        .filter_map(|region| {
            let code = region.text("iso_3166_1")?;
            let name = region.text("english_name").unwrap_or(code);
            let native = region.text("native_name").unwrap_or_default();
            let rank = rank(&needle, code, name, native)?;
            Some((rank, name.to_string(), code.to_string()))
        })
        .collect();
    ranked.sort();

    ranked
        .into_iter()
        .map(|(_, display, value)| AutocompleteOption { display, value })
        .collect()
}

fn rank(needle: &str, code: &str, name: &str, native: &str) -> Option<u8> {
    if needle.is_empty() {
        return Some(3);
    }
    let name = name.to_lowercase();
    let native = native.to_lowercase();
    if code.eq_ignore_ascii_case(needle) {
        Some(0)
    } else if name.starts_with(needle) || native.starts_with(needle) {
        Some(1)
    } else if name.contains(needle) || native.contains(needle) {
        Some(2)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn regions() -> Vec<Value> {
        json!([
            { "iso_3166_1": "US", "english_name": "United States of America", "native_name": "United States" },
            { "iso_3166_1": "CA", "english_name": "Canada", "native_name": "Canada" },
            { "iso_3166_1": "DE", "english_name": "Germany", "native_name": "Deutschland" },
            { "iso_3166_1": "GB", "english_name": "United Kingdom", "native_name": "United Kingdom" },
        ])
        .as_array()
        .unwrap()
        .clone()
    }

    #[test]
    fn empty_search_lists_everything_alphabetically() {
        let options = match_regions(&regions(), "");
        let names: Vec<_> = options.iter().map(|o| o.display.as_str()).collect();
        assert_eq!(
            names,
            vec!["Canada", "Germany", "United Kingdom", "United States of America"]
        );
    }

    #[test]
    fn exact_code_ranks_above_name_matches() {
        // "America" also contains "ca", but only as a substring.
        let options = match_regions(&regions(), "ca");
        let codes: Vec<_> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(codes, vec!["CA", "US"]);

        let options = match_regions(&regions(), "us");
        assert_eq!(options[0].value, "US");
    }

    #[test]
    fn matches_native_names_and_substrings() {
        let options = match_regions(&regions(), "deutsch");
        assert_eq!(
            options,
            vec![AutocompleteOption {
                display: "Germany".into(),
                value: "DE".into()
            }]
        );

        let options = match_regions(&regions(), "king");
        assert_eq!(options[0].value, "GB");
    }
}
