//! Text search over list rows.
//!
//! `deep_search_string_property` finds the first string leaf of a document
//! accepted by a predicate, and `filter_entities` uses it to filter a list of
//! rows down to those containing every one of a set of search words.

mod deep;
mod filter;
mod words;

pub use deep::{deep_search_string_location, deep_search_string_property};
pub use filter::{
    contains_lower, filter_documents, filter_documents_excluding, filter_entities,
    filter_optional_entities, Filtered, Matcher, Searchable, ViewError,
};
pub use words::{search_words, SearchSummary};
