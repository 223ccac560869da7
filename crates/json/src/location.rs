use std::fmt::{self, Write};

/// `Location` of a value within a JSON document.
/// Locations are built on the stack while walking a document, each one
/// referencing its parent, so no allocation is required to track the path
/// of the node currently being visited.
///
/// Examples:
/// ```
/// use json::Location;
///
/// let l0 = Location::Root;
/// let l1 = l0.push_prop("foo");
/// let l2 = l1.push_item(42);
///
/// assert_eq!("/foo/42", l2.pointer_str().to_string());
///
/// let l3 = l2.push_prop("ba~ ba/ 45");
/// assert_eq!("/foo/42/ba~0 ba~1 45", l3.pointer_str().to_string());
/// ```
#[derive(Copy, Clone)]
pub enum Location<'a> {
    Root,
    Property(LocatedProperty<'a>),
    Item(LocatedItem<'a>),
}

impl<'a> Location<'a> {
    /// Returns a new Location that extends this one with the given property.
    pub fn push_prop(&'a self, name: &'a str) -> Location<'a> {
        Location::Property(LocatedProperty { parent: self, name })
    }

    /// Returns a new Location that extends this one with the given index.
    pub fn push_item(&'a self, index: usize) -> Location<'a> {
        Location::Item(LocatedItem {
            parent: self,
            index,
        })
    }

    /// Number of path segments between the document root and this location.
    pub fn depth(&self) -> usize {
        self.fold(0, |loc, depth| match loc {
            Location::Root => depth,
            _ => depth + 1,
        })
    }

    /// Returns a struct that implements `std::fmt::Display` to provide a string representation of
    /// the location as a JSON pointer that does no escaping besides '~' and '/'.
    pub fn pointer_str(&'a self) -> PointerStr<'a> {
        PointerStr(*self)
    }

    /// Just like folding any other linked list. This one starts at the root and works
    /// from there, so the location that's passed is the one that will be visited last.
    pub fn fold<T, F>(&self, initial: T, mut fun: F) -> T
    where
        F: FnMut(Location<'a>, T) -> T,
    {
        self.fold_inner(initial, &mut fun)
    }

    fn fold_inner<T, F>(&self, initial: T, fun: &mut F) -> T
    where
        F: FnMut(Location<'a>, T) -> T,
    {
        let mut acc = initial;
        match self {
            Location::Root => {}
            Location::Property(prop) => {
                acc = prop.parent.fold_inner(acc, fun);
            }
            Location::Item(item) => {
                acc = item.parent.fold_inner(acc, fun);
            }
        }
        fun(*self, acc)
    }
}

impl<'a> fmt::Debug for Location<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pointer_str())
    }
}

/// `LocatedProperty` is a property located within a JSON document.
#[derive(Copy, Clone)]
pub struct LocatedProperty<'a> {
    pub parent: &'a Location<'a>,
    pub name: &'a str,
}

/// `LocatedItem` is an array item located within a JSON document.
#[derive(Copy, Clone)]
pub struct LocatedItem<'a> {
    pub parent: &'a Location<'a>,
    pub index: usize,
}

/// Helper struct to format a location as a JSON Pointer. This pointer will have
/// '~' and '/' escaped, but no other characters will be escaped.
pub struct PointerStr<'a>(Location<'a>);

impl<'a> fmt::Display for PointerStr<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.0.fold(Ok(()), move |loc, result: std::fmt::Result| {
            result.and_then(|_| match loc {
                Location::Root => Ok(()),
                Location::Property(LocatedProperty { name, .. }) => {
                    f.write_char('/')?;
                    for c in name.chars() {
                        match c {
                            '~' => f.write_str("~0")?,
                            '/' => f.write_str("~1")?,
                            _ => f.write_char(c)?,
                        }
                    }
                    Ok(())
                }
                Location::Item(LocatedItem { index, .. }) => write!(f, "/{}", index),
            })
        })
    }
}
