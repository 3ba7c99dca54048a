//! # Type Descriptors
//!
//! A [`TypeDescriptor`] describes the shape of a [`crate::value::Value`]. It is the map the
//! transformer follows while walking a value: every node of the value must have a
//! matching node in the descriptor.
//!
//! Descriptors are plain owned trees. They can be written by hand with the helper
//! constructors or derived from a protobuf schema with [`crate::reflect::describe_message`].
use std::fmt;

/// The scalar kinds a [`TypeDescriptor::Primitive`] can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float,
    Double,
    String,
    Bytes,
    Timestamp,
}

impl PrimitiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Int32 => "int32",
            PrimitiveKind::Int64 => "int64",
            PrimitiveKind::Uint32 => "uint32",
            PrimitiveKind::Uint64 => "uint64",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::String => "string",
            PrimitiveKind::Bytes => "bytes",
            PrimitiveKind::Timestamp => "timestamp",
        }
    }
}

/// Describes the shape of a value.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    /// A value that may be absent.
    Optional(Box<TypeDescriptor>),
    /// An ordered sequence of values sharing the same shape.
    Array(Box<TypeDescriptor>),
    Struct(StructDescriptor),
    Enum(EnumDescriptor),
}

/// A record with named fields, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

/// A single struct field. The field name doubles as the accessor used to read
/// and write the field on a [`crate::value::StructValue`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub descriptor: TypeDescriptor,
}

/// A tagged union: a value is exactly one of the variants.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    pub name: String,
    pub variants: Vec<VariantDescriptor>,
}

/// An enum variant. Constant variants have no payload.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantDescriptor {
    pub name: String,
    pub payload: Option<TypeDescriptor>,
}

impl TypeDescriptor {
    pub fn string() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::String)
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Optional(Box::new(inner))
    }

    pub fn array(element: TypeDescriptor) -> Self {
        TypeDescriptor::Array(Box::new(element))
    }

    /// Builds a struct descriptor from `(field name, descriptor)` pairs.
    pub fn structure<N, F>(name: N, fields: F) -> Self
    where
        N: Into<String>,
        F: IntoIterator<Item = (&'static str, TypeDescriptor)>,
    {
        TypeDescriptor::Struct(StructDescriptor {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(name, descriptor)| FieldDescriptor {
                    name: name.to_string(),
                    descriptor,
                })
                .collect(),
        })
    }

    /// Builds an enum descriptor from `(variant name, payload)` pairs.
    pub fn enumeration<N, V>(name: N, variants: V) -> Self
    where
        N: Into<String>,
        V: IntoIterator<Item = (&'static str, Option<TypeDescriptor>)>,
    {
        TypeDescriptor::Enum(EnumDescriptor {
            name: name.into(),
            variants: variants
                .into_iter()
                .map(|(name, payload)| VariantDescriptor {
                    name: name.to_string(),
                    payload,
                })
                .collect(),
        })
    }

    /// Short, human readable name of the described shape
    /// (e.g. `string`, `optional`, `struct users.User`).
    pub fn shape_name(&self) -> String {
        match self {
            TypeDescriptor::Primitive(kind) => kind.name().to_string(),
            TypeDescriptor::Optional(_) => "optional".to_string(),
            TypeDescriptor::Array(_) => "array".to_string(),
            TypeDescriptor::Struct(s) => format!("struct {}", s.name),
            TypeDescriptor::Enum(e) => format!("enum {}", e.name),
        }
    }
}

impl EnumDescriptor {
    pub fn variant(&self, name: &str) -> Option<&VariantDescriptor> {
        self.variants.iter().find(|v| v.name == name)
    }
}

/// Renders the descriptor as an indented tree.
impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_descriptor(f, self, 0)
    }
}

fn write_descriptor(
    f: &mut fmt::Formatter<'_>,
    desc: &TypeDescriptor,
    indent: usize,
) -> fmt::Result {
    match desc {
        TypeDescriptor::Primitive(kind) => write!(f, "{}", kind.name()),
        TypeDescriptor::Optional(inner) => {
            write!(f, "optional ")?;
            write_descriptor(f, inner, indent)
        }
        TypeDescriptor::Array(element) => {
            write!(f, "array of ")?;
            write_descriptor(f, element, indent)
        }
        TypeDescriptor::Struct(s) => {
            writeln!(f, "struct {} {{", s.name)?;
            for field in &s.fields {
                write!(f, "{:width$}{}: ", "", field.name, width = indent + 2)?;
                write_descriptor(f, &field.descriptor, indent + 2)?;
                writeln!(f)?;
            }
            write!(f, "{:width$}}}", "", width = indent)
        }
        TypeDescriptor::Enum(e) => {
            writeln!(f, "enum {} {{", e.name)?;
            for variant in &e.variants {
                write!(f, "{:width$}{}", "", variant.name, width = indent + 2)?;
                if let Some(payload) = &variant.payload {
                    write!(f, "(")?;
                    write_descriptor(f, payload, indent + 2)?;
                    write!(f, ")")?;
                }
                writeln!(f)?;
            }
            write!(f, "{:width$}}}", "", width = indent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_renders_nested_tree() {
        let desc = TypeDescriptor::structure(
            "Pet",
            [
                ("name", TypeDescriptor::string()),
                (
                    "kind",
                    TypeDescriptor::enumeration(
                        "Kind",
                        [("MONKEY", None), ("OTHER", Some(TypeDescriptor::string()))],
                    ),
                ),
            ],
        );

        let expected = "struct Pet {\n  name: string\n  kind: enum Kind {\n    MONKEY\n    OTHER(string)\n  }\n}";
        assert_eq!(desc.to_string(), expected);
    }

    #[test]
    fn test_variant_lookup_by_name() {
        let TypeDescriptor::Enum(e) = TypeDescriptor::enumeration(
            "Contact",
            [("email", Some(TypeDescriptor::string())), ("unlisted", None)],
        ) else {
            panic!("Expected an enum descriptor");
        };

        assert_eq!(
            e.variant("email").and_then(|v| v.payload.as_ref()),
            Some(&TypeDescriptor::string())
        );
        assert!(e.variant("unlisted").is_some_and(|v| v.payload.is_none()));
        assert!(e.variant("ghost").is_none());
    }
}
