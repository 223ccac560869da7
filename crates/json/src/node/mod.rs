mod value; // Implement AsNode for serde_json::Value.

/// Node is the fundamental representation of a JSON document node.
/// It's implemented by serde_json::Value, and may be implemented by any
/// other document representation that exposes this shape.
#[derive(Debug)]
pub enum Node<'a, N: AsNode> {
    Array(&'a [N]),
    Bool(bool),
    Float(f64),
    NegInt(i64),
    Null,
    Object(&'a N::Fields),
    PosInt(u64),
    String(&'a str),
}

impl<'a, N: AsNode> Node<'a, N> {
    /// Returns true if this node is an array or an object.
    pub fn is_composite(&self) -> bool {
        matches!(self, Node::Array(_) | Node::Object(_))
    }

    /// Number of items of an array, or fields of an object. Scalars have none.
    pub fn child_count(&self) -> usize {
        match self {
            Node::Array(arr) => arr.len(),
            Node::Object(fields) => fields.len(),
            _ => 0,
        }
    }
}

/// AsNode is the trait by which a specific document representation is accessed through a generic Node.
pub trait AsNode: Sized {
    type Fields: Fields<Self> + ?Sized;

    /// Convert an AsNode into a Node.
    fn as_node<'a>(&'a self) -> Node<'a, Self>;
}

/// Fields is the trait by which fields of an object representation are accessed.
pub trait Fields<N: AsNode> {
    type Field<'a>: Field<'a, N>
    where
        Self: 'a;

    // Iterator over fields, in the natural enumeration order of the representation.
    type Iter<'a>: ExactSizeIterator<Item = Self::Field<'a>>
    where
        Self: 'a;

    // Get a field by property name.
    fn get<'a>(&'a self, property: &str) -> Option<Self::Field<'a>>;
    // Number of fields.
    fn len(&self) -> usize;
    // Iterator over fields.
    fn iter<'a>(&'a self) -> Self::Iter<'a>;
}

/// Field is the trait by which the property and value of a field representation are accessed.
pub trait Field<'a, N: AsNode> {
    fn property(&self) -> &'a str;
    fn value(&self) -> &'a N;
}

/// Returns true if `doc` is an array or object having at least one child.
/// Scalars, null, and empty composites are all "empty" for search purposes.
pub fn is_populated_composite<N: AsNode>(doc: &N) -> bool {
    let node = doc.as_node();
    node.is_composite() && node.child_count() != 0
}
