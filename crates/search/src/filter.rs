use crate::{deep_search_string_location, deep_search_string_property, SearchSummary};
use json::{AsNode, Pointer};

/// Searchable is implemented by list rows which may be filtered by search words.
///
/// Rows are searched through a "search view": a deep copy of the row,
/// serialized as JSON, having every field of `EXCLUDED_FIELDS` replaced with
/// null. The row itself is never modified. Exclusions let a row keep a
/// reference to the raw entity it was built from, without that entity's
/// fields being matched.
pub trait Searchable: serde::Serialize {
    /// JSON pointers of fields which are nulled out of the search view.
    /// Each must be rooted, and may not reference the row itself.
    const EXCLUDED_FIELDS: &'static [&'static str] = &[];

    /// Build the search view of this row.
    fn search_view(&self) -> Result<serde_json::Value, ViewError> {
        let mut view = serde_json::to_value(self)?;

        for field in Self::EXCLUDED_FIELDS {
            json::ptr::null_out(&Pointer::parse_exclusion(field)?, &mut view);
        }
        Ok(view)
    }
}

/// ViewError is an error in building the search view of a row.
#[derive(thiserror::Error, Debug)]
pub enum ViewError {
    #[error("failed to serialize row: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid excluded field: {0}")]
    Exclusion(#[from] json::ptr::Error),
}

impl Searchable for serde_json::Value {}

/// Matcher tests documents against a set of search words.
/// A document matches if every word is contained, ignoring case, by at least
/// one of its string leaves.
#[derive(Debug, Clone)]
pub struct Matcher {
    words: Vec<String>,
}

impl Matcher {
    pub fn new<W: AsRef<str>>(words: &[W]) -> Self {
        Self {
            words: words.iter().map(|w| w.as_ref().to_lowercase()).collect(),
        }
    }

    /// Lower-cased search words of this Matcher.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns true if `doc` matches every search word.
    /// A Matcher having no words matches everything.
    pub fn matches<N: AsNode>(&self, doc: &N) -> bool {
        self.words
            .iter()
            .all(|word| deep_search_string_property(doc, |value| contains_lower(value, word)).is_some())
    }

    /// For each search word, the location and value of the first string of `doc`
    /// which matched it, or None if the word went unmatched.
    pub fn explain<'n, N: AsNode>(&self, doc: &'n N) -> Vec<(&str, Option<(Pointer, &'n str)>)> {
        self.words
            .iter()
            .map(|word| {
                (
                    word.as_str(),
                    deep_search_string_location(doc, |value| contains_lower(value, word)),
                )
            })
            .collect()
    }
}

/// Check if `haystack` contains `needle_lower`, ignoring the case of `haystack`.
/// `needle_lower` must already be lower-cased.
/// Case folding is exactly `str::to_lowercase`: there's no unicode normalization.
#[inline]
pub fn contains_lower(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Filtered is the outcome of filtering a list of rows.
#[derive(Debug)]
pub struct Filtered<'r, T> {
    rows: Vec<&'r T>,
    total: usize,
    passthrough: bool,
}

impl<'r, T> Filtered<'r, T> {
    fn passthrough(rows: &'r [T]) -> Self {
        Self {
            rows: rows.iter().collect(),
            total: rows.len(),
            passthrough: true,
        }
    }

    /// Rows which passed the filter, in their original order.
    pub fn rows(&self) -> &[&'r T] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'r T> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True if no search words were given, and every row was passed through
    /// without being searched. This distinguishes "no filter was requested"
    /// from "a filter was requested, and every row matched".
    pub fn is_passthrough(&self) -> bool {
        self.passthrough
    }

    pub fn summary(&self) -> SearchSummary {
        SearchSummary {
            shown: self.rows.len(),
            total: self.total,
        }
    }
}

impl<'r, T: Clone> Filtered<'r, T> {
    pub fn cloned(&self) -> Vec<T> {
        self.rows.iter().map(|row| (*row).clone()).collect()
    }
}

fn filter_by<'r, T, W, F>(rows: &'r [T], words: &[W], mut is_match: F) -> Filtered<'r, T>
where
    W: AsRef<str>,
    F: FnMut(usize, &T, &Matcher) -> bool,
{
    if rows.is_empty() {
        return Filtered {
            rows: Vec::new(),
            total: 0,
            passthrough: false,
        };
    }
    if words.is_empty() {
        return Filtered::passthrough(rows);
    }
    let matcher = Matcher::new(words);

    let matched: Vec<&T> = rows
        .iter()
        .enumerate()
        .filter(|(index, row)| is_match(*index, row, &matcher))
        .map(|(_, row)| row)
        .collect();

    tracing::debug!(
        words = ?matcher.words(),
        total = rows.len(),
        shown = matched.len(),
        "filtered rows by search words"
    );

    Filtered {
        rows: matched,
        total: rows.len(),
        passthrough: false,
    }
}

/// Filter `rows` to those matching every one of `words`.
///
/// * Empty `rows` produce an empty result.
/// * Empty `words` pass every row through, unsearched.
/// * Otherwise a row is kept if, for every word, some string of its search
///   view contains the word, ignoring case.
///
/// Row order is preserved, and rows are only borrowed.
pub fn filter_entities<'r, T, W>(rows: &'r [T], words: &[W]) -> Filtered<'r, T>
where
    T: Searchable,
    W: AsRef<str>,
{
    filter_by(rows, words, |index, row, matcher| match row.search_view() {
        Ok(view) => matcher.matches(&view),
        Err(error) => {
            tracing::warn!(index, %error, "failed to build search view of row (treating it as unmatched)");
            false
        }
    })
}

/// Variant of `filter_entities` for callers holding optional inputs.
/// Missing `rows` behave as empty rows, and missing `words` as empty words.
pub fn filter_optional_entities<'r, T, W>(
    rows: Option<&'r [T]>,
    words: Option<&[W]>,
) -> Filtered<'r, T>
where
    T: Searchable,
    W: AsRef<str>,
{
    filter_entities(rows.unwrap_or_default(), words.unwrap_or_default())
}

/// Filter documents by search words, searching each document as-is.
/// This has the same semantics as `filter_entities`, but no search view is built.
pub fn filter_documents<'r, N, W>(docs: &'r [N], words: &[W]) -> Filtered<'r, N>
where
    N: AsNode,
    W: AsRef<str>,
{
    filter_by(docs, words, |_index, doc, matcher| matcher.matches(doc))
}

/// Filter JSON documents by search words, searching a copy of each document
/// from which the `excluded` locations have been nulled out.
pub fn filter_documents_excluding<'r, W>(
    docs: &'r [serde_json::Value],
    excluded: &[Pointer],
    words: &[W],
) -> Filtered<'r, serde_json::Value>
where
    W: AsRef<str>,
{
    if excluded.is_empty() {
        return filter_documents(docs, words);
    }

    filter_by(docs, words, |_index, doc, matcher| {
        let mut view = doc.clone();
        for ptr in excluded {
            json::ptr::null_out(ptr, &mut view);
        }
        matcher.matches(&view)
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn people() -> Vec<Value> {
        vec![
            json!({"name": "Alpha", "owner": "Bob"}),
            json!({"name": "Beta", "owner": "Alice"}),
            json!({"name": "Gamma", "owner": "Bob"}),
        ]
    }

    fn names<'a>(rows: impl Iterator<Item = &'a Value>) -> Vec<&'a str> {
        rows.map(|r| r["name"].as_str().unwrap_or_default()).collect()
    }

    #[test]
    fn test_empty_rows_produce_empty_result() {
        let rows: Vec<Value> = Vec::new();
        let out = filter_entities(&rows, &["bob"]);
        assert!(out.is_empty());
        assert!(!out.is_passthrough());
        assert_eq!(out.summary(), SearchSummary { shown: 0, total: 0 });
    }

    #[test]
    fn test_empty_words_pass_rows_through() {
        let rows = people();
        let no_words: [&str; 0] = [];

        let out = filter_entities(&rows, &no_words);
        assert!(out.is_passthrough());
        assert_eq!(names(out.iter()), vec!["Alpha", "Beta", "Gamma"]);
        // Passed-through rows are the very same rows.
        assert!(std::ptr::eq(out.rows()[1], &rows[1]));

        let out = filter_optional_entities::<Value, &str>(Some(rows.as_slice()), None);
        assert!(out.is_passthrough());
        assert_eq!(out.len(), 3);

        let out = filter_optional_entities::<Value, &str>(None, Some(&["bob"][..]));
        assert!(out.is_empty());
    }

    #[test]
    fn test_words_are_case_insensitive_and_all_required() {
        let rows = people();

        let out = filter_entities(&rows, &["bob"]);
        assert_eq!(names(out.iter()), vec!["Alpha", "Gamma"]);
        assert_eq!(out.summary().to_string(), "2 of 3 results");

        let out = filter_entities(&rows, &["BOB", "alpha"]);
        assert_eq!(names(out.iter()), vec!["Alpha"]);

        // Each word may match a different field.
        let out = filter_entities(&rows, &["et", "lic"]);
        assert_eq!(names(out.iter()), vec!["Beta"]);

        let out = filter_entities(&rows, &["bob", "beta"]);
        assert!(out.is_empty());
        assert!(!out.is_passthrough());
    }

    #[test]
    fn test_nested_and_array_fields_are_searched() {
        let rows = vec![
            json!({"id": 1, "tags": ["x", "findme", "y"]}),
            json!({"id": 2, "meta": {"nested": {"deep": "zzz-target-zzz"}}}),
            json!({"id": 3, "meta": {"count": 12}}),
        ];

        let ids = |out: Filtered<Value>| -> Vec<u64> {
            out.iter().map(|r| r["id"].as_u64().unwrap_or_default()).collect()
        };
        assert_eq!(ids(filter_entities(&rows, &["findme"])), vec![1]);
        assert_eq!(ids(filter_entities(&rows, &["TARGET"])), vec![2]);
        // Numbers are never matched.
        assert_eq!(ids(filter_entities(&rows, &["12"])), Vec::<u64>::new());
    }

    #[derive(serde::Serialize, Clone, Debug, PartialEq)]
    struct Row {
        name: String,
        raw: Option<Value>,
    }

    impl Searchable for Row {
        const EXCLUDED_FIELDS: &'static [&'static str] = &["/raw"];
    }

    #[test]
    fn test_excluded_fields_are_not_searched_or_modified() {
        let rows = vec![
            Row {
                name: "cpu".to_string(),
                raw: Some(json!({"description": "hidden-word"})),
            },
            Row {
                name: "hidden-word".to_string(),
                raw: None,
            },
        ];
        let before = rows.clone();

        let out = filter_entities(&rows, &["hidden"]);
        assert_eq!(out.cloned(), vec![rows[1].clone()]);
        assert_eq!(rows, before);

        let view = rows[0].search_view().unwrap();
        assert_eq!(view, json!({"name": "cpu", "raw": null}));
    }

    #[derive(serde::Serialize)]
    struct UnrootedExclusion {
        name: &'static str,
        raw: &'static str,
    }

    impl Searchable for UnrootedExclusion {
        const EXCLUDED_FIELDS: &'static [&'static str] = &["raw"];
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_invalid_exclusions_leave_rows_unmatched() {
        let rows = vec![UnrootedExclusion {
            name: "cpu",
            raw: "secret",
        }];

        let err = rows[0].search_view().unwrap_err();
        assert!(matches!(err, ViewError::Exclusion(json::ptr::Error::NotRooted(_))));

        assert!(filter_entities(&rows, &["cpu"]).is_empty());
        assert!(logs_contain("invalid excluded field"));
    }

    struct Unserializable;

    impl serde::Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _s: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot serialize"))
        }
    }
    impl Searchable for Unserializable {}

    #[test]
    #[tracing_test::traced_test]
    fn test_unserializable_rows_are_unmatched() {
        let rows = vec![Unserializable, Unserializable];

        let out = filter_entities(&rows, &["anything"]);
        assert!(out.is_empty());
        assert_eq!(out.summary(), SearchSummary { shown: 0, total: 2 });
        assert!(logs_contain("failed to build search view"));

        // Without search words, rows are never serialized.
        let no_words: [&str; 0] = [];
        assert_eq!(filter_entities(&rows, &no_words).len(), 2);
    }

    #[test]
    fn test_filter_documents_excluding() {
        let docs = vec![
            json!({"name": "a", "dto": {"name": "secret"}}),
            json!({"name": "secret"}),
        ];
        let excluded = vec![Pointer::from("/dto")];

        let out = filter_documents_excluding(&docs, &excluded, &["secret"]);
        assert_eq!(out.len(), 1);
        assert!(std::ptr::eq(out.rows()[0], &docs[1]));

        let out = filter_documents(&docs, &["secret"]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_matcher_explain() {
        let doc = json!({"name": "Disk Usage", "owner": {"principal": "ops@example.com"}});
        let matcher = Matcher::new(&["USAGE", "example", "absent"]);

        let explained: Vec<(String, Option<String>)> = matcher
            .explain(&doc)
            .into_iter()
            .map(|(word, found)| (word.to_string(), found.map(|(ptr, _)| ptr.to_string())))
            .collect();

        insta::assert_json_snapshot!(explained, @r###"
        [
          [
            "usage",
            "/name"
          ],
          [
            "example",
            "/owner/principal"
          ],
          [
            "absent",
            null
          ]
        ]
        "###);
        assert!(!matcher.matches(&doc));
        assert!(Matcher::new::<&str>(&[]).matches(&doc));
    }

    #[test]
    fn test_lowercase_folding_is_naive() {
        // Folding is `str::to_lowercase`, without normalization: a decomposed
        // "È" (E + combining grave) does not match a precomposed "è".
        let rows = vec![json!({"name": "CAFE\u{0300}"}), json!({"name": "ÉCLAIR"})];

        assert_eq!(filter_entities(&rows, &["\u{00e8}"]).len(), 0);
        assert_eq!(filter_entities(&rows, &["e\u{0300}"]).len(), 1);
        assert_eq!(filter_entities(&rows, &["éclair"]).len(), 1);
    }

    #[quickcheck_macros::quickcheck]
    fn prop_filter_is_an_ordered_subsequence(rows: Vec<(String, String)>, words: Vec<String>) -> bool {
        let rows: Vec<Value> = rows
            .into_iter()
            .map(|(name, owner)| json!({"name": name, "owner": owner}))
            .collect();
        let before = rows.clone();

        let out = filter_entities(&rows, &words);

        // Rows are unmodified, and the output is a subsequence of the input.
        let mut remaining = rows.iter();
        let is_subsequence = out
            .iter()
            .all(|kept| remaining.any(|row| std::ptr::eq(row, kept)));

        let passthrough_ok = !words.is_empty() || rows.is_empty() || out.len() == rows.len();

        rows == before && is_subsequence && passthrough_ok
    }
}
