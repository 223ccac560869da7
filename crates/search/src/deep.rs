use json::{AsNode, Leaf, Pointer};
use std::ops::ControlFlow;

/// Search the string leaves of `doc` for the first one accepted by `match_fn`.
///
/// `doc` must be an array or object having at least one child: null, scalars
/// (including a bare string), and empty composites return None without
/// `match_fn` ever being called. Otherwise every leaf is visited depth-first,
/// array items in index order and object fields in enumeration order.
/// `match_fn` is called only with non-empty strings, and the walk stops at the
/// first string it accepts, which is returned.
///
/// ```
/// use serde_json::json;
///
/// let row = json!({"id": 1, "tags": ["x", "findme", "y"]});
/// let found = search::deep_search_string_property(&row, |v| v.contains("find"));
/// assert_eq!(found, Some("findme"));
/// ```
pub fn deep_search_string_property<'n, N, F>(doc: &'n N, mut match_fn: F) -> Option<&'n str>
where
    N: AsNode,
    F: FnMut(&str) -> bool,
{
    if !json::is_populated_composite(doc) {
        return None;
    }

    json::walk_leaves(doc, |_location, leaf| match leaf {
        Leaf::String(value) if !value.is_empty() && match_fn(value) => ControlFlow::Break(value),
        _ => ControlFlow::Continue(()),
    })
}

/// Like `deep_search_string_property`, but also returns the pointer of the
/// matched string within `doc`.
pub fn deep_search_string_location<'n, N, F>(
    doc: &'n N,
    mut match_fn: F,
) -> Option<(Pointer, &'n str)>
where
    N: AsNode,
    F: FnMut(&str) -> bool,
{
    if !json::is_populated_composite(doc) {
        return None;
    }

    json::walk_leaves(doc, |location, leaf| match leaf {
        Leaf::String(value) if !value.is_empty() && match_fn(value) => {
            ControlFlow::Break((Pointer::from_location(location), value))
        }
        _ => ControlFlow::Continue(()),
    })
}
