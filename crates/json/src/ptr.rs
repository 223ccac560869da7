use crate::{AsNode, Field, Fields, Location, Node};
use std::str::FromStr;

/// Token is a parsed token of a JSON pointer.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Token {
    /// Integer index of a JSON array.
    /// If applied to a JSON object, the index may also serve as a property name.
    Index(usize),
    /// JSON object property name without escaping. Never an integer.
    Property(String),
}

impl Token {
    pub fn from_str(s: &str) -> Self {
        if s.starts_with('+') || (s.starts_with('0') && s.len() > 1) {
            Token::Property(s.to_string())
        } else if let Ok(ind) = usize::from_str(s) {
            Token::Index(ind)
        } else {
            Token::Property(s.to_string())
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Index(ind) => write!(f, "{ind}"),
            Token::Property(prop) => write!(f, "{prop}"),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("JSON pointer {0:?} must be empty or begin with '/'")]
    NotRooted(String),
    #[error("JSON pointer {0:?} references the document root, which cannot be excluded")]
    ExcludesRoot(String),
}

/// Pointer is a parsed JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Pointer(pub Vec<Token>);

impl Pointer {
    /// Builds an empty Pointer which references the document root.
    pub fn empty() -> Pointer {
        Pointer(Vec::new())
    }

    /// Builds a Pointer from the given string, which is an encoded JSON pointer.
    ///
    /// ```
    /// use json::ptr::{Pointer, Token};
    ///
    /// let pointer = Pointer::from_str("/foo/ba~1ar/3");
    /// let expected_tokens = vec![
    ///     Token::Property("foo".to_string()),
    ///     Token::Property("ba/ar".to_string()),
    ///     Token::Index(3),
    /// ];
    /// assert_eq!(expected_tokens, pointer.0);
    /// ```
    pub fn from_str(s: &str) -> Pointer {
        if s.is_empty() {
            return Pointer(Vec::new());
        }
        let mut ptr = Self::empty();

        for token in s
            .split('/')
            .skip(if s.starts_with('/') { 1 } else { 0 })
            .map(|t| t.replace("~1", "/").replace("~0", "~"))
        {
            ptr.push(Token::from_str(&token));
        }
        ptr
    }

    /// Parses a pointer, requiring that it be in canonical rooted form.
    pub fn parse(s: &str) -> Result<Pointer, Error> {
        if !s.is_empty() && !s.starts_with('/') {
            return Err(Error::NotRooted(s.to_string()));
        }
        Ok(Self::from_str(s))
    }

    /// Parses a pointer naming a sub-document to exclude from a document view.
    /// The pointer must be rooted and may not reference the root itself.
    pub fn parse_exclusion(s: &str) -> Result<Pointer, Error> {
        let ptr = Self::parse(s)?;
        if ptr.is_empty() {
            return Err(Error::ExcludesRoot(s.to_string()));
        }
        Ok(ptr)
    }

    /// Builds a `Pointer` from a `Location`. Since both `Location` and `Pointer`
    /// internally represent property names without any escaping, this function will
    /// always use the raw property names without performing any conversions.
    ///
    /// ```
    /// use json::Location;
    /// use json::ptr::Token;
    ///
    /// let root = Location::Root;
    /// let foo = root.push_prop("foo");
    /// let index = foo.push_item(3);
    ///
    /// let pointer = json::Pointer::from_location(&index);
    /// let expected_tokens = vec![
    ///     Token::Property("foo".to_string()),
    ///     Token::Index(3)
    /// ];
    /// let actual_tokens = pointer.iter().cloned().collect::<Vec<_>>();
    /// assert_eq!(expected_tokens, actual_tokens);
    /// ```
    pub fn from_location(location: &Location) -> Pointer {
        location.fold(Pointer::empty(), |location, mut ptr| {
            match location {
                Location::Root => {}
                Location::Property(prop) => {
                    ptr.push(Token::Property(prop.name.to_string()));
                }
                Location::Item(item) => {
                    ptr.push(Token::Index(item.index));
                }
            }
            ptr
        })
    }

    // Push a new Token onto the Pointer.
    pub fn push(&mut self, token: Token) -> &mut Pointer {
        self.0.push(token);
        self
    }

    /// Iterate over pointer tokens.
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Query an existing value at the pointer location within the document.
    /// Returns None if the pointed location (or a parent thereof) does not exist.
    pub fn query<'n, N: AsNode>(&self, mut node: &'n N) -> Option<&'n N> {
        for token in self.iter() {
            let next: Option<&N> = match node.as_node() {
                Node::Object(fields) => match token {
                    Token::Index(ind) => fields.get(&ind.to_string()),
                    Token::Property(property) => fields.get(property),
                }
                .map(|field| field.value()),
                Node::Array(arr) => match token {
                    Token::Index(ind) => arr.get(*ind),
                    Token::Property(_) => None,
                },
                _ => None,
            };

            if let Some(next) = next {
                node = next;
            } else {
                return None;
            }
        }
        Some(node)
    }

    /// Query a mutable existing value at the pointer location within the document.
    /// Unlike `create_value`-style upserts, missing locations are never created.
    pub fn query_mut<'v>(&self, value: &'v mut serde_json::Value) -> Option<&'v mut serde_json::Value> {
        use serde_json::Value;

        let mut v = value;

        for token in self.iter() {
            v = match v {
                Value::Object(map) => match token {
                    Token::Index(ind) => map.get_mut(&ind.to_string())?,
                    Token::Property(prop) => map.get_mut(prop)?,
                },
                Value::Array(arr) => match token {
                    Token::Index(ind) => arr.get_mut(*ind)?,
                    Token::Property(_) => return None,
                },
                Value::Null | Value::Number(_) | Value::Bool(_) | Value::String(_) => {
                    return None; // Cannot take child of scalar.
                }
            };
        }
        Some(v)
    }
}

/// Replace the value at `ptr` within `doc` with null, if it exists.
/// Returns true if a value was nulled out. The root itself can't be nulled.
pub fn null_out(ptr: &Pointer, doc: &mut serde_json::Value) -> bool {
    if ptr.is_empty() {
        return false;
    }
    match ptr.query_mut(doc) {
        Some(v) => {
            *v = serde_json::Value::Null;
            true
        }
        None => false,
    }
}

impl<S: AsRef<str>> From<S> for Pointer {
    fn from(s: S) -> Self {
        Pointer::from_str(s.as_ref())
    }
}

impl FromIterator<Token> for Pointer {
    fn from_iter<T: IntoIterator<Item = Token>>(iter: T) -> Self {
        let mut ptr = Self::empty();
        for token in iter {
            ptr.push(token);
        }
        ptr
    }
}

impl serde::Serialize for Pointer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format!("{self}"))
    }
}

impl<'de> serde::Deserialize<'de> for Pointer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_str(&s))
    }
}

impl std::fmt::Display for Pointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn replace_escapes(s: &str) -> String {
            s.replace('~', "~0").replace('/', "~1")
        }

        for item in self.iter() {
            write!(f, "/")?;
            match item {
                Token::Property(p) => write!(f, "{}", replace_escapes(p))?,
                Token::Index(ind) => write!(f, "{}", ind)?,
            };
        }

        Ok(())
    }
}
