//! Option map (C1): a recursive, insertion-order-irrelevant mapping of
//! lowercase-hyphenated keys to string (or nested-map) values, merged from
//! the environment, CLI `-o` clauses, and the small set of top-level flags.

use std::collections::HashMap;
use std::env;

/// A single option value: either a scalar string, or a nested sub-map for
/// collection-valued options such as `media-col`.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Scalar(String),
    Map(HashMap<String, OptionValue>),
}

impl OptionValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            OptionValue::Scalar(s) => Some(s),
            OptionValue::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, OptionValue>> {
        match self {
            OptionValue::Map(m) => Some(m),
            OptionValue::Scalar(_) => None,
        }
    }
}

pub type OptionMap = HashMap<String, OptionValue>;

/// Translates an `IPP_*` environment snapshot into option-map entries:
/// strip the prefix, lowercase, and turn `_` into `-`.
///
/// A pure function over the supplied iterator, never re-reading the
/// environment mid-run (the caller takes the snapshot once at startup).
pub fn translate_ipp_env<I, K, V>(vars: I) -> OptionMap
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut map = OptionMap::new();
    for (key, value) in vars {
        let key = key.as_ref();
        if let Some(rest) = key.strip_prefix("IPP_") {
            let translated = rest.to_lowercase().replace('_', "-");
            map.insert(translated, OptionValue::Scalar(value.as_ref().to_string()));
        }
    }
    map
}

/// Parses one `-o "k=v k2=v2 ..."` clause into scalar entries, merging them
/// into `map`. Tokens are split on whitespace; a token with no `=` stops
/// parsing of the *remaining* tokens in this clause (per the "silently
/// dropped at the pair boundary" rule), but earlier tokens already parsed
/// are kept.
pub fn merge_cli_clause(map: &mut OptionMap, clause: &str) {
    for token in clause.split_whitespace() {
        match token.split_once('=') {
            Some((k, v)) => {
                map.insert(k.to_lowercase(), parse_option_value(k, v));
            }
            None => break,
        }
    }
}

/// Any value that itself contains `=` is collection-shaped and sub-parses
/// into a `Map`, not just the top-level `media-col` key: a value one level
/// down (e.g. `media-col`'s `media-size`) can in turn be collection-shaped,
/// so this recurses. Siblings at the first nesting depth are `;`-separated
/// (`media-col=media-size-name=na_letter`), siblings one level deeper are
/// `,`-separated (`media-col=media-size=x-dimension=100,y-dimension=200`) —
/// a distinct delimiter per depth so a nested list of pairs can't be
/// mistaken for more pairs at its parent's level.
const NESTING_DELIMITERS: [char; 2] = [';', ','];

fn parse_option_value(_key: &str, value: &str) -> OptionValue {
    parse_nested_value(value, 0)
}

fn parse_nested_value(value: &str, depth: usize) -> OptionValue {
    if !value.contains('=') {
        return OptionValue::Scalar(value.to_string());
    }
    let delimiter = NESTING_DELIMITERS[depth.min(NESTING_DELIMITERS.len() - 1)];
    let mut sub = HashMap::new();
    for pair in value.split(delimiter) {
        if let Some((k, v)) = pair.split_once('=') {
            sub.insert(k.to_lowercase(), parse_nested_value(v, depth + 1));
        }
    }
    OptionValue::Map(sub)
}

/// Builds the full option map for this process invocation: environment
/// `IPP_*` vars first (lowest precedence), then each `-o` clause in order
/// (highest precedence), matching §4.1's merge order.
pub fn build_option_map(o_clauses: &[String]) -> OptionMap {
    let mut map = translate_ipp_env(env::vars());
    for clause in o_clauses {
        merge_cli_clause(&mut map, clause);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_ipp_prefixed_env_vars() {
        let map = translate_ipp_env([("IPP_FOO_BAR", "baz"), ("OTHER_VAR", "ignored")]);
        assert_eq!(
            map.get("foo-bar").and_then(OptionValue::as_scalar),
            Some("baz")
        );
        assert!(!map.contains_key("other-var"));
    }

    #[test]
    fn cli_clause_merges_kv_pairs() {
        let mut map = OptionMap::new();
        merge_cli_clause(&mut map, "media=na_letter_8.5x11in sides=two-sided-long-edge");
        assert_eq!(
            map.get("media").and_then(OptionValue::as_scalar),
            Some("na_letter_8.5x11in")
        );
        assert_eq!(
            map.get("sides").and_then(OptionValue::as_scalar),
            Some("two-sided-long-edge")
        );
    }

    #[test]
    fn cli_clause_stops_at_malformed_pair() {
        let mut map = OptionMap::new();
        merge_cli_clause(&mut map, "media=na_letter_8.5x11in garbage sides=one-sided");
        assert!(map.contains_key("media"));
        assert!(!map.contains_key("sides"));
    }

    #[test]
    fn later_clause_overrides_earlier() {
        let mut map = OptionMap::new();
        merge_cli_clause(&mut map, "copies=1");
        merge_cli_clause(&mut map, "copies=3");
        assert_eq!(map.get("copies").and_then(OptionValue::as_scalar), Some("3"));
    }

    #[test]
    fn media_col_sub_parses_into_a_map() {
        let mut map = OptionMap::new();
        merge_cli_clause(&mut map, "media-col=media-size-name=na_letter_8.5x11in");
        let sub = map.get("media-col").and_then(OptionValue::as_map).unwrap();
        assert_eq!(
            sub.get("media-size-name").and_then(OptionValue::as_scalar),
            Some("na_letter_8.5x11in")
        );
    }

    #[test]
    fn media_col_media_size_nests_two_levels_deep() {
        let mut map = OptionMap::new();
        merge_cli_clause(
            &mut map,
            "media-col=media-size=x-dimension=100,y-dimension=200",
        );
        let col = map.get("media-col").and_then(OptionValue::as_map).unwrap();
        let size = col.get("media-size").and_then(OptionValue::as_map).unwrap();
        assert_eq!(size.get("x-dimension").and_then(OptionValue::as_scalar), Some("100"));
        assert_eq!(size.get("y-dimension").and_then(OptionValue::as_scalar), Some("200"));
    }
}
