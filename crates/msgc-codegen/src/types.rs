//! Classification lattice and field shapes.

use std::fmt;

/// Position of a type in the capability lattice.
///
/// The derived order is the lattice order: `Struct < Foreign < PlainObject <
/// NamedObject < OwnedObject`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Data-only, no object identity.
    Struct,
    /// Opaque external type outside the runtime object model.
    Foreign,
    /// Subclass of the runtime root object.
    PlainObject,
    /// Carries a name.
    NamedObject,
    /// Carries a name and an owner.
    OwnedObject,
}

impl Category {
    /// Part of the runtime object model.
    pub fn is_object(self) -> bool {
        self >= Category::PlainObject
    }

    /// Has a name (and therefore `getName`/`setName`).
    pub fn is_named(self) -> bool {
        self >= Category::NamedObject
    }

    /// Only owned objects may contain owned fields.
    pub fn can_own(self) -> bool {
        self == Category::OwnedObject
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Struct => "struct",
            Category::Foreign => "foreign",
            Category::PlainObject => "plain-object",
            Category::NamedObject => "named-object",
            Category::OwnedObject => "owned-object",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage shape of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrayShape {
    Scalar,
    /// In-place array; the size is the literal as written.
    Fixed(String),
    /// Heap array with a sibling size member.
    Dynamic,
}

impl ArrayShape {
    /// Shape from the `is-vector`/`vector-size` attribute pair.
    pub fn from_attrs(is_array: bool, size: &str) -> Self {
        match (is_array, size.trim()) {
            (false, _) => ArrayShape::Scalar,
            (true, "") => ArrayShape::Dynamic,
            (true, n) => ArrayShape::Fixed(n.to_string()),
        }
    }

    pub fn is_array(&self) -> bool {
        !matches!(self, ArrayShape::Scalar)
    }

    pub fn fixed_size(&self) -> Option<&str> {
        match self {
            ArrayShape::Fixed(n) => Some(n),
            _ => None,
        }
    }
}

/// Whether a field holds a primitive or a resolved type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Basic,
    Compound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_order() {
        assert!(Category::Struct < Category::Foreign);
        assert!(Category::Foreign < Category::PlainObject);
        assert!(Category::NamedObject < Category::OwnedObject);
        assert!(!Category::Foreign.is_object());
        assert!(Category::PlainObject.is_object());
        assert!(!Category::PlainObject.is_named());
        assert!(Category::OwnedObject.is_named());
        assert!(Category::OwnedObject.can_own());
        assert!(!Category::NamedObject.can_own());
    }

    #[test]
    fn test_array_shape_from_attrs() {
        assert_eq!(ArrayShape::from_attrs(false, "3"), ArrayShape::Scalar);
        assert_eq!(ArrayShape::from_attrs(true, ""), ArrayShape::Dynamic);
        assert_eq!(
            ArrayShape::from_attrs(true, "MAX_HOPS"),
            ArrayShape::Fixed("MAX_HOPS".to_string())
        );
        assert_eq!(ArrayShape::from_attrs(true, "4").fixed_size(), Some("4"));
        assert!(!ArrayShape::Scalar.is_array());
    }
}
