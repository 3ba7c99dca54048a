//! # Reflective Transformer
//!
//! Walks a [`Value`] together with the [`TypeDescriptor`] describing it and rebuilds the
//! value with every string leaf rewritten.
//!
//! ## How it works
//!
//! The walk dispatches on the descriptor, never on the value: the descriptor says what
//! the value must be, and any disagreement stops the walk with
//! [`TransformError::DescriptorMismatch`].
//!
//! * **Primitive**: strings go through the leaf function, every other scalar is returned as is.
//! * **Optional**: absent stays absent, a present value is walked with the inner descriptor.
//! * **Array**: each element is walked with the element descriptor, order and count are preserved.
//! * **Struct**: each described field is read by name, walked and written to a copy of the struct.
//!   Fields the descriptor does not mention are copied untouched.
//! * **Enum**: constant variants are returned as is, wrapping variants get their payload walked.
//!
//! Results are returned as [`Cow`]: subtrees in which no leaf changed are borrowed from the
//! input, so the caller only pays for the parts that were actually rewritten.
use crate::descriptor::{EnumDescriptor, PrimitiveKind, StructDescriptor, TypeDescriptor};
use crate::value::{EnumValue, StructValue, Value};
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("Descriptor mismatch at '{path}': expected {expected}, found {found}")]
    DescriptorMismatch {
        path: String,
        expected: String,
        found: String,
    },
}

/// Upper-cases every string reachable from `value`.
///
/// # Returns
///
/// * `Ok(Cow::Borrowed)` - Nothing changed, the input is handed back.
/// * `Ok(Cow::Owned)` - A new value where at least one string was rewritten.
/// * `Err(TransformError)` - `descriptor` does not describe `value`.
pub fn transform<'a>(
    value: &'a Value,
    descriptor: &TypeDescriptor,
) -> Result<Cow<'a, Value>, TransformError> {
    map_strings(value, descriptor, str::to_uppercase)
}

/// Rewrites every string reachable from `value` with `leaf`.
///
/// Same traversal as [`transform`], with a caller supplied leaf function.
pub fn map_strings<'a, F>(
    value: &'a Value,
    descriptor: &TypeDescriptor,
    leaf: F,
) -> Result<Cow<'a, Value>, TransformError>
where
    F: Fn(&str) -> String,
{
    Walker {
        leaf: &leaf,
        path: Vec::new(),
    }
    .walk(value, descriptor)
}

enum Segment {
    Field(String),
    Index(usize),
    Variant(String),
}

struct Walker<'f, F> {
    leaf: &'f F,
    path: Vec<Segment>,
}

impl<F> Walker<'_, F>
where
    F: Fn(&str) -> String,
{
    fn walk<'a>(
        &mut self,
        value: &'a Value,
        descriptor: &TypeDescriptor,
    ) -> Result<Cow<'a, Value>, TransformError> {
        match descriptor {
            TypeDescriptor::Primitive(kind) => self.primitive(value, *kind),
            TypeDescriptor::Optional(inner) => match value {
                Value::Optional(None) => Ok(Cow::Borrowed(value)),
                Value::Optional(Some(present)) => match self.walk(present, inner)? {
                    Cow::Borrowed(_) => Ok(Cow::Borrowed(value)),
                    Cow::Owned(changed) => Ok(Cow::Owned(Value::some(changed))),
                },
                other => Err(self.mismatch(descriptor.shape_name(), other.kind_name())),
            },
            TypeDescriptor::Array(element) => match value {
                Value::Array(items) => self.array(value, items, element),
                other => Err(self.mismatch(descriptor.shape_name(), other.kind_name())),
            },
            TypeDescriptor::Struct(desc) => match value {
                Value::Struct(fields) => self.structure(value, fields, desc),
                other => Err(self.mismatch(descriptor.shape_name(), other.kind_name())),
            },
            TypeDescriptor::Enum(desc) => match value {
                Value::Enum(variant) => self.enumeration(value, variant, desc),
                other => Err(self.mismatch(descriptor.shape_name(), other.kind_name())),
            },
        }
    }

    fn primitive<'a>(
        &mut self,
        value: &'a Value,
        kind: PrimitiveKind,
    ) -> Result<Cow<'a, Value>, TransformError> {
        match (kind, value) {
            (PrimitiveKind::String, Value::String(s)) => {
                let rewritten = (self.leaf)(s);
                if rewritten == *s {
                    Ok(Cow::Borrowed(value))
                } else {
                    Ok(Cow::Owned(Value::String(rewritten)))
                }
            }
            (PrimitiveKind::Bool, Value::Bool(_))
            | (PrimitiveKind::Int32, Value::I32(_))
            | (PrimitiveKind::Int64, Value::I64(_))
            | (PrimitiveKind::Uint32, Value::U32(_))
            | (PrimitiveKind::Uint64, Value::U64(_))
            | (PrimitiveKind::Float, Value::F32(_))
            | (PrimitiveKind::Double, Value::F64(_))
            | (PrimitiveKind::Bytes, Value::Bytes(_))
            | (PrimitiveKind::Timestamp, Value::Timestamp(_)) => Ok(Cow::Borrowed(value)),
            (kind, other) => Err(self.mismatch(kind.name(), other.kind_name())),
        }
    }

    fn array<'a>(
        &mut self,
        value: &'a Value,
        items: &'a [Value],
        element: &TypeDescriptor,
    ) -> Result<Cow<'a, Value>, TransformError> {
        // Only allocated once the first element changes.
        let mut out: Option<Vec<Value>> = None;

        for (index, item) in items.iter().enumerate() {
            self.path.push(Segment::Index(index));
            let result = self.walk(item, element);
            self.path.pop();

            match result? {
                Cow::Borrowed(item) => {
                    if let Some(out) = out.as_mut() {
                        out.push(item.clone());
                    }
                }
                Cow::Owned(item) => out
                    .get_or_insert_with(|| {
                        let mut copy = Vec::with_capacity(items.len());
                        copy.extend_from_slice(&items[..index]);
                        copy
                    })
                    .push(item),
            }
        }

        Ok(match out {
            Some(items) => Cow::Owned(Value::Array(items)),
            None => Cow::Borrowed(value),
        })
    }

    fn structure<'a>(
        &mut self,
        value: &'a Value,
        fields: &'a StructValue,
        desc: &StructDescriptor,
    ) -> Result<Cow<'a, Value>, TransformError> {
        let mut out: Option<StructValue> = None;

        for field in &desc.fields {
            self.path.push(Segment::Field(field.name.clone()));

            let Some(current) = fields.get(&field.name) else {
                let err = self.mismatch(field.descriptor.shape_name(), "missing field");
                self.path.pop();
                return Err(err);
            };

            let result = self.walk(current, &field.descriptor);
            self.path.pop();

            if let Cow::Owned(changed) = result? {
                out.get_or_insert_with(|| fields.clone())
                    .set(field.name.clone(), changed);
            }
        }

        Ok(match out {
            Some(fields) => Cow::Owned(Value::Struct(fields)),
            None => Cow::Borrowed(value),
        })
    }

    fn enumeration<'a>(
        &mut self,
        value: &'a Value,
        variant: &'a EnumValue,
        desc: &EnumDescriptor,
    ) -> Result<Cow<'a, Value>, TransformError> {
        let Some(variant_desc) = desc.variant(&variant.variant) else {
            return Err(self.mismatch(
                format!("a variant of enum {}", desc.name),
                format!("variant '{}'", variant.variant),
            ));
        };

        match (&variant_desc.payload, &variant.payload) {
            (None, None) => Ok(Cow::Borrowed(value)),
            (Some(payload_desc), Some(payload)) => {
                self.path.push(Segment::Variant(variant.variant.clone()));
                let result = self.walk(payload, payload_desc);
                self.path.pop();

                match result? {
                    Cow::Borrowed(_) => Ok(Cow::Borrowed(value)),
                    Cow::Owned(changed) => Ok(Cow::Owned(Value::Enum(EnumValue::wrapping(
                        variant.variant.clone(),
                        changed,
                    )))),
                }
            }
            (None, Some(_)) => Err(self.mismatch(
                format!("constant variant '{}'", variant.variant),
                "a payload",
            )),
            (Some(_), None) => Err(self.mismatch(
                format!("a payload for variant '{}'", variant.variant),
                "a constant",
            )),
        }
    }

    fn mismatch(&self, expected: impl Into<String>, found: impl Into<String>) -> TransformError {
        TransformError::DescriptorMismatch {
            path: render_path(&self.path),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

fn render_path(path: &[Segment]) -> String {
    let mut out = String::from("$");
    for segment in path {
        match segment {
            Segment::Field(name) => {
                out.push('.');
                out.push_str(name);
            }
            Segment::Index(index) => out.push_str(&format!("[{index}]")),
            Segment::Variant(name) => {
                out.push_str("::");
                out.push_str(name);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::bytes::Bytes;
    use prost_types::Timestamp;

    fn pet_descriptor() -> TypeDescriptor {
        TypeDescriptor::structure(
            "Pet",
            [
                ("name", TypeDescriptor::string()),
                ("picture", TypeDescriptor::string()),
            ],
        )
    }

    fn contact_descriptor() -> TypeDescriptor {
        TypeDescriptor::enumeration(
            "Contact",
            [
                ("email", Some(TypeDescriptor::string())),
                ("unlisted", None),
            ],
        )
    }

    fn user_descriptor() -> TypeDescriptor {
        TypeDescriptor::structure(
            "User",
            [
                ("name", TypeDescriptor::string()),
                ("quote", TypeDescriptor::optional(TypeDescriptor::string())),
                (
                    "height_in_meters",
                    TypeDescriptor::Primitive(PrimitiveKind::Double),
                ),
                ("pets", TypeDescriptor::array(pet_descriptor())),
                ("contact", contact_descriptor()),
            ],
        )
    }

    fn pet(name: &str, picture: &str) -> Value {
        StructValue::new()
            .with("name", Value::string(name))
            .with("picture", Value::string(picture))
            .into()
    }

    fn tarzan() -> Value {
        StructValue::new()
            .with("name", Value::string("Tarzan"))
            .with("quote", Value::some(Value::string("aAaA")))
            .with("height_in_meters", Value::F64(1.91))
            .with("pets", Value::Array(vec![pet("Cheeta", "🐒")]))
            .with("contact", EnumValue::constant("unlisted").into())
            .into()
    }

    #[test]
    fn test_tarzan_is_upper_cased() {
        let input = tarzan();
        let output = transform(&input, &user_descriptor()).unwrap().into_owned();

        let expected: Value = StructValue::new()
            .with("name", Value::string("TARZAN"))
            .with("quote", Value::some(Value::string("AAAA")))
            .with("height_in_meters", Value::F64(1.91))
            .with("pets", Value::Array(vec![pet("CHEETA", "🐒")]))
            .with("contact", EnumValue::constant("unlisted").into())
            .into();

        assert_eq!(output, expected);

        let height = output.as_struct().unwrap().get("height_in_meters");
        let Some(Value::F64(height)) = height else {
            panic!("height_in_meters should stay a double");
        };
        assert_eq!(height.to_bits(), 1.91f64.to_bits());
    }

    #[test]
    fn test_values_without_strings_are_returned_as_is() {
        let descriptor = TypeDescriptor::structure(
            "Stats",
            [
                ("active", TypeDescriptor::Primitive(PrimitiveKind::Bool)),
                ("age", TypeDescriptor::Primitive(PrimitiveKind::Uint32)),
                ("score", TypeDescriptor::Primitive(PrimitiveKind::Float)),
                ("avatar", TypeDescriptor::Primitive(PrimitiveKind::Bytes)),
                (
                    "seen_at",
                    TypeDescriptor::optional(TypeDescriptor::Primitive(PrimitiveKind::Timestamp)),
                ),
                (
                    "deltas",
                    TypeDescriptor::array(TypeDescriptor::Primitive(PrimitiveKind::Int64)),
                ),
            ],
        );

        let value: Value = StructValue::new()
            .with("active", Value::Bool(true))
            .with("age", Value::U32(42))
            .with("score", Value::F32(f32::NAN))
            .with("avatar", Value::Bytes(Bytes::from_static(b"tarzan")))
            .with(
                "seen_at",
                Value::some(Value::Timestamp(Timestamp {
                    seconds: 1_700_000_000,
                    nanos: 7,
                })),
            )
            .with("deltas", Value::Array(vec![Value::I64(-1), Value::I64(1)]))
            .into();

        let output = transform(&value, &descriptor).unwrap();

        // NaN is not equal to itself, so compare by identity.
        assert!(matches!(output, Cow::Borrowed(v) if std::ptr::eq(v, &value)));
    }

    #[test]
    fn test_transform_is_idempotent() {
        let descriptor = user_descriptor();
        let once = transform(&tarzan(), &descriptor).unwrap().into_owned();
        let twice = transform(&once, &descriptor).unwrap();

        assert!(matches!(twice, Cow::Borrowed(_)));
        assert_eq!(*twice, once);
    }

    #[test]
    fn test_array_order_and_count_are_preserved() {
        let descriptor = TypeDescriptor::array(pet_descriptor());
        let pets = Value::Array(vec![
            pet("ALREADY", "🐘"),
            pet("cheeta", "🐒"),
            pet("BUBBLES", "🦜"),
            pet("flipper", "🐬"),
        ]);

        let output = transform(&pets, &descriptor).unwrap().into_owned();

        assert_eq!(
            output,
            Value::Array(vec![
                pet("ALREADY", "🐘"),
                pet("CHEETA", "🐒"),
                pet("BUBBLES", "🦜"),
                pet("FLIPPER", "🐬"),
            ])
        );
    }

    #[test]
    fn test_enum_variants() {
        let descriptor = contact_descriptor();

        let constant: Value = EnumValue::constant("unlisted").into();
        assert!(matches!(
            transform(&constant, &descriptor).unwrap(),
            Cow::Borrowed(_)
        ));

        let wrapper: Value = EnumValue::wrapping("email", Value::string("me@jungle.org")).into();
        let output = transform(&wrapper, &descriptor).unwrap().into_owned();
        assert_eq!(
            output,
            Value::from(EnumValue::wrapping("email", Value::string("ME@JUNGLE.ORG")))
        );
    }

    #[test]
    fn test_absent_optional_stays_absent() {
        let descriptor = TypeDescriptor::optional(TypeDescriptor::string());
        let none = Value::none();
        let output = transform(&none, &descriptor).unwrap();

        assert_eq!(*output, Value::none());
    }

    #[test]
    fn test_undescribed_fields_are_untouched() {
        let descriptor = TypeDescriptor::structure("Pet", [("name", TypeDescriptor::string())]);
        let output = transform(&pet("cheeta", "monkey"), &descriptor)
            .unwrap()
            .into_owned();

        assert_eq!(output, pet("CHEETA", "monkey"));
    }

    #[test]
    fn test_custom_leaf_function() {
        let output = map_strings(&pet("Cheeta", "🐒"), &pet_descriptor(), |s| {
            s.chars().rev().collect()
        })
        .unwrap()
        .into_owned();

        assert_eq!(output, pet("ateehC", "🐒"));
    }

    #[test]
    fn test_mismatch_reports_path() {
        let broken: Value = StructValue::new()
            .with("name", Value::string("Tarzan"))
            .with("quote", Value::none())
            .with("height_in_meters", Value::F64(1.91))
            .with(
                "pets",
                Value::Array(vec![
                    pet("Cheeta", "🐒"),
                    StructValue::new()
                        .with("name", Value::I32(7))
                        .with("picture", Value::string("?"))
                        .into(),
                ]),
            )
            .with("contact", EnumValue::constant("unlisted").into())
            .into();

        let err = transform(&broken, &user_descriptor()).unwrap_err();

        assert_eq!(
            err,
            TransformError::DescriptorMismatch {
                path: "$.pets[1].name".to_string(),
                expected: "string".to_string(),
                found: "int32".to_string(),
            }
        );
    }

    #[test]
    fn test_mismatch_on_missing_field_and_unknown_variant() {
        let missing: Value = StructValue::new()
            .with("name", Value::string("Cheeta"))
            .into();
        let err = transform(&missing, &pet_descriptor()).unwrap_err();
        assert!(matches!(
            err,
            TransformError::DescriptorMismatch { ref path, .. } if path == "$.picture"
        ));

        let unknown: Value = EnumValue::constant("carrier_pigeon").into();
        assert!(transform(&unknown, &contact_descriptor()).is_err());

        let constant_with_payload: Value =
            EnumValue::wrapping("unlisted", Value::string("x")).into();
        assert!(transform(&constant_with_payload, &contact_descriptor()).is_err());
    }

    #[test]
    fn test_mismatch_inside_variant_payload_reports_path() {
        let mut user = tarzan();
        if let Value::Struct(fields) = &mut user {
            fields.set("contact", EnumValue::wrapping("email", Value::Bool(true)).into());
        }

        let err = transform(&user, &user_descriptor()).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Descriptor mismatch at '$.contact::email': expected string, found bool"
        );
    }

    #[test]
    fn test_non_optional_value_for_optional_descriptor_fails() {
        let descriptor = TypeDescriptor::optional(TypeDescriptor::string());
        let err = transform(&Value::string("bare"), &descriptor).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Descriptor mismatch at '$': expected optional, found string"
        );
    }
}
