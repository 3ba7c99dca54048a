//! # Protobuf Reflection Bridge
//!
//! Connects the transformer to `prost-reflect`. Generated messages carry their schema at
//! runtime as a [`MessageDescriptor`]; this module turns that schema into a
//! [`TypeDescriptor`] and moves values between [`DynamicMessage`] and [`Value`].
//!
//! ## Schema mapping
//!
//! | Protobuf                         | TypeDescriptor                               |
//! |----------------------------------|----------------------------------------------|
//! | `string`                         | `Primitive(String)`                          |
//! | other scalars                    | matching `Primitive`                         |
//! | `google.protobuf.Timestamp`      | `Primitive(Timestamp)`                       |
//! | singular message field           | `Optional(Struct)`                           |
//! | `optional` scalar                | `Optional(..)`                               |
//! | `repeated T`                     | `Array(T)`                                   |
//! | `map<K, V>`                      | `Array(Struct { key, value })`               |
//! | `enum`                           | `Enum` with constant variants                |
//! | `oneof`                          | `Optional(Enum)`, one wrapping variant per member |
//!
//! A `oneof` becomes a single struct field named after the oneof, placed where its first
//! member is declared. Map entries are sorted by key so lowering is deterministic.
//!
//! ## Schema and value descriptors
//!
//! [`describe_message`] describes a whole schema. A message type that contains itself is
//! described once; inner references to it are cut to a struct without fields.
//!
//! [`describe_value`] describes one message value instead. Message-typed fields are only
//! expanded where the value holds a message, so a self-referencing type is described
//! exactly as deep as the value goes. This is the descriptor the transformer runs with.
//! An enum number missing from the schema gets a constant variant named after the number.
use crate::descriptor::{
    EnumDescriptor, FieldDescriptor, PrimitiveKind, StructDescriptor, TypeDescriptor,
    VariantDescriptor,
};
use crate::transform::{TransformError, transform};
use crate::value::{EnumValue, StructValue, Value};
use prost_reflect::{
    DynamicMessage, EnumDescriptor as ProtoEnum, FieldDescriptor as ProtoField, Kind, MapKey,
    MessageDescriptor, OneofDescriptor, ReflectMessage, Value as ProtoValue,
};
use std::collections::HashMap;

const TIMESTAMP: &str = "google.protobuf.Timestamp";

#[derive(Debug, thiserror::Error)]
pub enum ReflectError {
    #[error("Field '{field}' expected {expected}, found {found}")]
    Shape {
        field: String,
        expected: String,
        found: String,
    },
    #[error("Map field '{field}' has the key '{key}' more than once")]
    DuplicateMapKey { field: String, key: String },
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("Failed to transcode message: '{0}'")]
    Transcode(#[from] prost::DecodeError),
}

/// Upper-cases every string inside a dynamic message.
///
/// The descriptor is derived from the message itself with [`describe_value`].
pub fn transform_message(message: &DynamicMessage) -> Result<DynamicMessage, ReflectError> {
    let type_descriptor = describe_value(message)?;
    let value = lower(message)?;
    let transformed = transform(&value, &type_descriptor)?;
    raise(&transformed, &message.descriptor())
}

/// Upper-cases every string inside a generated message.
///
/// `descriptor` must be the runtime descriptor of `T`; the message is transcoded through
/// a [`DynamicMessage`] on the way in and on the way out.
pub fn transform_typed<T>(message: &T, descriptor: &MessageDescriptor) -> Result<T, ReflectError>
where
    T: prost::Message + Default,
{
    let mut dynamic = DynamicMessage::new(descriptor.clone());
    dynamic.transcode_from(message)?;
    Ok(transform_message(&dynamic)?.transcode_to::<T>()?)
}

/// Derives the [`TypeDescriptor`] of a protobuf message type.
///
/// References back to a message that is already being described become a struct
/// without fields.
pub fn describe_message(message: &MessageDescriptor) -> Result<TypeDescriptor, ReflectError> {
    let mut describer = Describer { stack: Vec::new() };
    describer.message(message).map(TypeDescriptor::Struct)
}

/// Derives the [`TypeDescriptor`] of one message value.
///
/// Only the messages present in `message` are expanded. Absent ones are described as a
/// struct without fields, which leaves them untouched. List elements and map values are
/// described one by one and joined, so every element is covered.
pub fn describe_value(message: &DynamicMessage) -> Result<TypeDescriptor, ReflectError> {
    describe_instance(message).map(TypeDescriptor::Struct)
}

/// Converts a dynamic message into a [`Value::Struct`].
pub fn lower(message: &DynamicMessage) -> Result<Value, ReflectError> {
    lower_message(message).map(Value::Struct)
}

/// Builds a dynamic message of type `descriptor` from a [`Value::Struct`].
///
/// Fields missing from the value keep their protobuf default.
pub fn raise(
    value: &Value,
    descriptor: &MessageDescriptor,
) -> Result<DynamicMessage, ReflectError> {
    match value {
        Value::Struct(fields) => raise_message(fields, descriptor),
        other => Err(shape(descriptor.full_name(), "a struct", other.kind_name())),
    }
}

/// A struct field as seen by the core model: a plain field or a whole oneof.
enum Slot {
    Field(ProtoField),
    Oneof(OneofDescriptor),
}

fn slots(message: &MessageDescriptor) -> Vec<Slot> {
    let mut slots = Vec::new();
    let mut seen_oneofs: Vec<String> = Vec::new();

    for field in message.fields() {
        match field.containing_oneof() {
            // Synthetic oneofs back proto3 `optional` fields, those stay plain fields.
            Some(oneof) if !oneof.is_synthetic() => {
                if !seen_oneofs.iter().any(|name| name == oneof.full_name()) {
                    seen_oneofs.push(oneof.full_name().to_string());
                    slots.push(Slot::Oneof(oneof));
                }
            }
            _ => slots.push(Slot::Field(field)),
        }
    }

    slots
}

fn map_entry_fields(field: &ProtoField) -> Option<(ProtoField, ProtoField)> {
    match field.kind() {
        Kind::Message(entry) if entry.is_map_entry() => Some((
            entry.map_entry_key_field(),
            entry.map_entry_value_field(),
        )),
        _ => None,
    }
}

fn shape(field: &str, expected: impl Into<String>, found: impl Into<String>) -> ReflectError {
    ReflectError::Shape {
        field: field.to_string(),
        expected: expected.into(),
        found: found.into(),
    }
}

fn struct_without_fields(message: &MessageDescriptor) -> StructDescriptor {
    StructDescriptor {
        name: message.full_name().to_string(),
        fields: Vec::new(),
    }
}

fn enum_descriptor(proto: &ProtoEnum) -> EnumDescriptor {
    EnumDescriptor {
        name: proto.full_name().to_string(),
        variants: proto
            .values()
            .map(|v| VariantDescriptor {
                name: v.name().to_string(),
                payload: None,
            })
            .collect(),
    }
}

/// Describes `kind` without expanding messages.
fn shallow(kind: &Kind) -> TypeDescriptor {
    let primitive = match kind {
        Kind::Double => PrimitiveKind::Double,
        Kind::Float => PrimitiveKind::Float,
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => PrimitiveKind::Int32,
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => PrimitiveKind::Int64,
        Kind::Uint32 | Kind::Fixed32 => PrimitiveKind::Uint32,
        Kind::Uint64 | Kind::Fixed64 => PrimitiveKind::Uint64,
        Kind::Bool => PrimitiveKind::Bool,
        Kind::String => PrimitiveKind::String,
        Kind::Bytes => PrimitiveKind::Bytes,
        Kind::Message(m) if m.full_name() == TIMESTAMP => PrimitiveKind::Timestamp,
        Kind::Message(m) => return TypeDescriptor::Struct(struct_without_fields(m)),
        Kind::Enum(e) => return TypeDescriptor::Enum(enum_descriptor(e)),
    };

    TypeDescriptor::Primitive(primitive)
}

struct Describer {
    /// Messages currently being described, outermost first.
    stack: Vec<String>,
}

impl Describer {
    fn message(&mut self, message: &MessageDescriptor) -> Result<StructDescriptor, ReflectError> {
        let name = message.full_name().to_string();
        if self.stack.contains(&name) {
            return Ok(struct_without_fields(message));
        }
        self.stack.push(name.clone());

        let mut fields = Vec::new();
        for slot in slots(message) {
            let field = match slot {
                Slot::Field(field) => FieldDescriptor {
                    name: field.name().to_string(),
                    descriptor: self.field(&field)?,
                },
                Slot::Oneof(oneof) => FieldDescriptor {
                    name: oneof.name().to_string(),
                    descriptor: self.oneof(&oneof)?,
                },
            };
            fields.push(field);
        }

        self.stack.pop();
        Ok(StructDescriptor { name, fields })
    }

    fn field(&mut self, field: &ProtoField) -> Result<TypeDescriptor, ReflectError> {
        if field.is_map() {
            let (key, value) = map_entry_fields(field)
                .ok_or_else(|| shape(field.full_name(), "a map entry", "a plain message"))?;
            let entry = StructDescriptor {
                name: format!("{}.entry", field.full_name()),
                fields: vec![
                    FieldDescriptor {
                        name: key.name().to_string(),
                        descriptor: shallow(&key.kind()),
                    },
                    FieldDescriptor {
                        name: value.name().to_string(),
                        descriptor: self.kind(&value.kind())?,
                    },
                ],
            };
            return Ok(TypeDescriptor::array(TypeDescriptor::Struct(entry)));
        }

        let element = self.kind(&field.kind())?;

        if field.is_list() {
            Ok(TypeDescriptor::array(element))
        } else if field.supports_presence() {
            Ok(TypeDescriptor::optional(element))
        } else {
            Ok(element)
        }
    }

    fn oneof(&mut self, oneof: &OneofDescriptor) -> Result<TypeDescriptor, ReflectError> {
        let mut variants = Vec::new();
        for member in oneof.fields() {
            variants.push(VariantDescriptor {
                name: member.name().to_string(),
                payload: Some(self.kind(&member.kind())?),
            });
        }

        Ok(TypeDescriptor::optional(TypeDescriptor::Enum(
            EnumDescriptor {
                name: oneof.full_name().to_string(),
                variants,
            },
        )))
    }

    fn kind(&mut self, kind: &Kind) -> Result<TypeDescriptor, ReflectError> {
        match kind {
            Kind::Message(m) if m.full_name() != TIMESTAMP => {
                self.message(m).map(TypeDescriptor::Struct)
            }
            other => Ok(shallow(other)),
        }
    }
}

fn describe_instance(message: &DynamicMessage) -> Result<StructDescriptor, ReflectError> {
    let descriptor = message.descriptor();
    let mut fields = Vec::new();

    for slot in slots(&descriptor) {
        let field = match slot {
            Slot::Field(field) => FieldDescriptor {
                name: field.name().to_string(),
                descriptor: describe_instance_field(message, &field)?,
            },
            Slot::Oneof(oneof) => {
                let mut variants = Vec::new();
                for member in oneof.fields() {
                    let payload = if message.has_field(&member) {
                        describe_present(&member.kind(), &message.get_field(&member))?
                    } else {
                        shallow(&member.kind())
                    };
                    variants.push(VariantDescriptor {
                        name: member.name().to_string(),
                        payload: Some(payload),
                    });
                }

                FieldDescriptor {
                    name: oneof.name().to_string(),
                    descriptor: TypeDescriptor::optional(TypeDescriptor::Enum(EnumDescriptor {
                        name: oneof.full_name().to_string(),
                        variants,
                    })),
                }
            }
        };
        fields.push(field);
    }

    Ok(StructDescriptor {
        name: descriptor.full_name().to_string(),
        fields,
    })
}

fn describe_instance_field(
    message: &DynamicMessage,
    field: &ProtoField,
) -> Result<TypeDescriptor, ReflectError> {
    let value = message.get_field(field);

    if field.is_map() {
        let (key_field, value_field) = map_entry_fields(field)
            .ok_or_else(|| shape(field.full_name(), "a map entry", "a plain message"))?;
        let map = value
            .as_map()
            .ok_or_else(|| shape(field.full_name(), "a map", "another value"))?;

        let entry = StructDescriptor {
            name: format!("{}.entry", field.full_name()),
            fields: vec![
                FieldDescriptor {
                    name: key_field.name().to_string(),
                    descriptor: shallow(&key_field.kind()),
                },
                FieldDescriptor {
                    name: value_field.name().to_string(),
                    descriptor: describe_items(&value_field.kind(), map.values())?,
                },
            ],
        };
        return Ok(TypeDescriptor::array(TypeDescriptor::Struct(entry)));
    }

    let kind = field.kind();

    if field.is_list() {
        let list = value
            .as_list()
            .ok_or_else(|| shape(field.full_name(), "a list", "another value"))?;
        return Ok(TypeDescriptor::array(describe_items(&kind, list.iter())?));
    }

    if field.supports_presence() {
        let inner = if message.has_field(field) {
            describe_present(&kind, &value)?
        } else {
            shallow(&kind)
        };
        return Ok(TypeDescriptor::optional(inner));
    }

    describe_present(&kind, &value)
}

/// Describes every item and joins the results into one element descriptor.
fn describe_items<'a>(
    kind: &Kind,
    items: impl Iterator<Item = &'a ProtoValue>,
) -> Result<TypeDescriptor, ReflectError> {
    let mut joined: Option<TypeDescriptor> = None;
    for item in items {
        let described = describe_present(kind, item)?;
        joined = Some(match joined {
            Some(previous) => join(previous, described),
            None => described,
        });
    }

    Ok(joined.unwrap_or_else(|| shallow(kind)))
}

fn describe_present(kind: &Kind, value: &ProtoValue) -> Result<TypeDescriptor, ReflectError> {
    match (kind, value) {
        (Kind::Message(m), ProtoValue::Message(msg)) if m.full_name() != TIMESTAMP => {
            describe_instance(msg).map(TypeDescriptor::Struct)
        }
        (Kind::Enum(e), ProtoValue::EnumNumber(number)) => {
            let mut described = enum_descriptor(e);
            if e.get_value(*number).is_none() {
                described.variants.push(VariantDescriptor {
                    name: number.to_string(),
                    payload: None,
                });
            }
            Ok(TypeDescriptor::Enum(described))
        }
        (kind, _) => Ok(shallow(kind)),
    }
}

/// Joins two descriptors of the same protobuf type.
///
/// A struct without fields gives way to an expanded one, enum variants are merged by name.
fn join(left: TypeDescriptor, right: TypeDescriptor) -> TypeDescriptor {
    match (left, right) {
        (TypeDescriptor::Optional(l), TypeDescriptor::Optional(r)) => {
            TypeDescriptor::optional(join(*l, *r))
        }
        (TypeDescriptor::Array(l), TypeDescriptor::Array(r)) => {
            TypeDescriptor::array(join(*l, *r))
        }
        (TypeDescriptor::Struct(l), TypeDescriptor::Struct(r)) => {
            TypeDescriptor::Struct(join_structs(l, r))
        }
        (TypeDescriptor::Enum(l), TypeDescriptor::Enum(r)) => {
            TypeDescriptor::Enum(join_enums(l, r))
        }
        (left, _) => left,
    }
}

fn join_structs(left: StructDescriptor, right: StructDescriptor) -> StructDescriptor {
    if left.fields.is_empty() {
        return right;
    }
    if right.fields.is_empty() {
        return left;
    }

    // Both sides list the slots of the same message in declaration order.
    let fields = left
        .fields
        .into_iter()
        .zip(right.fields)
        .map(|(l, r)| FieldDescriptor {
            name: l.name,
            descriptor: join(l.descriptor, r.descriptor),
        })
        .collect();

    StructDescriptor {
        name: left.name,
        fields,
    }
}

fn join_enums(mut left: EnumDescriptor, right: EnumDescriptor) -> EnumDescriptor {
    for variant in right.variants {
        match left.variants.iter_mut().find(|v| v.name == variant.name) {
            Some(existing) => {
                existing.payload = match (existing.payload.take(), variant.payload) {
                    (Some(l), Some(r)) => Some(join(l, r)),
                    (l, r) => l.or(r),
                };
            }
            None => left.variants.push(variant),
        }
    }

    left
}

fn lower_message(message: &DynamicMessage) -> Result<StructValue, ReflectError> {
    let descriptor = message.descriptor();
    let mut out = StructValue::new();

    for slot in slots(&descriptor) {
        match slot {
            Slot::Field(field) => out.set(field.name(), lower_field(message, &field)?),
            Slot::Oneof(oneof) => {
                let value = match oneof.fields().find(|member| message.has_field(member)) {
                    Some(member) => {
                        let payload = lower_single(&member, &message.get_field(&member))?;
                        Value::some(EnumValue::wrapping(member.name(), payload).into())
                    }
                    None => Value::none(),
                };
                out.set(oneof.name(), value);
            }
        }
    }

    Ok(out)
}

fn lower_field(message: &DynamicMessage, field: &ProtoField) -> Result<Value, ReflectError> {
    let value = message.get_field(field);

    if field.is_map() {
        let (key_field, value_field) = map_entry_fields(field)
            .ok_or_else(|| shape(field.full_name(), "a map entry", "a plain message"))?;
        let map = value
            .as_map()
            .ok_or_else(|| shape(field.full_name(), "a map", "another value"))?;

        let mut entries: Vec<_> = map.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut items = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let entry = StructValue::new()
                .with(key_field.name(), lower_map_key(key))
                .with(value_field.name(), lower_single(&value_field, value)?);
            items.push(Value::Struct(entry));
        }
        return Ok(Value::Array(items));
    }

    if field.is_list() {
        let list = value
            .as_list()
            .ok_or_else(|| shape(field.full_name(), "a list", "another value"))?;
        let items = list
            .iter()
            .map(|item| lower_single(field, item))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Value::Array(items));
    }

    if field.supports_presence() {
        if !message.has_field(field) {
            return Ok(Value::none());
        }
        return Ok(Value::some(lower_single(field, &value)?));
    }

    lower_single(field, &value)
}

fn lower_single(field: &ProtoField, value: &ProtoValue) -> Result<Value, ReflectError> {
    let lowered = match (field.kind(), value) {
        (Kind::Message(m), ProtoValue::Message(msg)) if m.full_name() == TIMESTAMP => {
            Value::Timestamp(msg.transcode_to::<prost_types::Timestamp>()?)
        }
        (Kind::Message(_), ProtoValue::Message(msg)) => Value::Struct(lower_message(msg)?),
        (Kind::Enum(e), ProtoValue::EnumNumber(number)) => {
            let variant = match e.get_value(*number) {
                Some(known) => known.name().to_string(),
                None => number.to_string(),
            };
            Value::Enum(EnumValue::constant(variant))
        }
        (_, ProtoValue::Bool(v)) => Value::Bool(*v),
        (_, ProtoValue::I32(v)) => Value::I32(*v),
        (_, ProtoValue::I64(v)) => Value::I64(*v),
        (_, ProtoValue::U32(v)) => Value::U32(*v),
        (_, ProtoValue::U64(v)) => Value::U64(*v),
        (_, ProtoValue::F32(v)) => Value::F32(*v),
        (_, ProtoValue::F64(v)) => Value::F64(*v),
        (_, ProtoValue::String(v)) => Value::String(v.clone()),
        (_, ProtoValue::Bytes(v)) => Value::Bytes(v.clone()),
        (kind, _) => {
            return Err(shape(
                field.full_name(),
                format!("{kind:?}"),
                "an incompatible value",
            ));
        }
    };

    Ok(lowered)
}

fn lower_map_key(key: &MapKey) -> Value {
    match key {
        MapKey::Bool(v) => Value::Bool(*v),
        MapKey::I32(v) => Value::I32(*v),
        MapKey::I64(v) => Value::I64(*v),
        MapKey::U32(v) => Value::U32(*v),
        MapKey::U64(v) => Value::U64(*v),
        MapKey::String(v) => Value::String(v.clone()),
    }
}

fn raise_message(
    fields: &StructValue,
    descriptor: &MessageDescriptor,
) -> Result<DynamicMessage, ReflectError> {
    let mut message = DynamicMessage::new(descriptor.clone());

    for slot in slots(descriptor) {
        match slot {
            Slot::Field(field) => {
                if let Some(value) = fields.get(field.name()) {
                    raise_field(&mut message, &field, value)?;
                }
            }
            Slot::Oneof(oneof) => {
                if let Some(value) = fields.get(oneof.name()) {
                    raise_oneof(&mut message, &oneof, value)?;
                }
            }
        }
    }

    Ok(message)
}

fn raise_oneof(
    message: &mut DynamicMessage,
    oneof: &OneofDescriptor,
    value: &Value,
) -> Result<(), ReflectError> {
    let active = match value {
        Value::Optional(None) => return Ok(()),
        Value::Optional(Some(active)) => active,
        other => return Err(shape(oneof.full_name(), "an optional", other.kind_name())),
    };

    let Value::Enum(EnumValue {
        variant,
        payload: Some(payload),
    }) = &**active
    else {
        return Err(shape(
            oneof.full_name(),
            "a wrapping variant",
            active.kind_name(),
        ));
    };

    let member = oneof
        .fields()
        .find(|member| member.name() == variant)
        .ok_or_else(|| shape(oneof.full_name(), "a member name", format!("'{variant}'")))?;

    let raised = raise_single(&member, payload)?;
    message.set_field(&member, raised);
    Ok(())
}

fn raise_field(
    message: &mut DynamicMessage,
    field: &ProtoField,
    value: &Value,
) -> Result<(), ReflectError> {
    if field.is_map() {
        let (key_field, value_field) = map_entry_fields(field)
            .ok_or_else(|| shape(field.full_name(), "a map entry", "a plain message"))?;
        let Value::Array(entries) = value else {
            return Err(shape(field.full_name(), "an array", value.kind_name()));
        };

        let mut map = HashMap::with_capacity(entries.len());
        for entry in entries {
            let Value::Struct(entry) = entry else {
                return Err(shape(field.full_name(), "a map entry", entry.kind_name()));
            };
            let key = entry
                .get(key_field.name())
                .ok_or_else(|| shape(key_field.full_name(), "a key", "missing field"))?;
            let key = raise_map_key(&key_field, key)?;
            let item = entry
                .get(value_field.name())
                .ok_or_else(|| shape(value_field.full_name(), "a value", "missing field"))?;

            if map.contains_key(&key) {
                return Err(ReflectError::DuplicateMapKey {
                    field: field.full_name().to_string(),
                    key: map_key_label(&key),
                });
            }
            map.insert(key, raise_single(&value_field, item)?);
        }

        message.set_field(field, ProtoValue::Map(map));
        return Ok(());
    }

    if field.is_list() {
        let Value::Array(items) = value else {
            return Err(shape(field.full_name(), "an array", value.kind_name()));
        };
        let items = items
            .iter()
            .map(|item| raise_single(field, item))
            .collect::<Result<Vec<_>, _>>()?;
        message.set_field(field, ProtoValue::List(items));
        return Ok(());
    }

    if field.supports_presence() {
        return match value {
            Value::Optional(None) => Ok(()),
            Value::Optional(Some(present)) => {
                let raised = raise_single(field, present)?;
                message.set_field(field, raised);
                Ok(())
            }
            other => Err(shape(field.full_name(), "an optional", other.kind_name())),
        };
    }

    let raised = raise_single(field, value)?;
    message.set_field(field, raised);
    Ok(())
}

fn raise_single(field: &ProtoField, value: &Value) -> Result<ProtoValue, ReflectError> {
    let raised = match (field.kind(), value) {
        (Kind::Message(m), Value::Timestamp(ts)) if m.full_name() == TIMESTAMP => {
            let mut message = DynamicMessage::new(m);
            message.transcode_from(ts)?;
            ProtoValue::Message(message)
        }
        (Kind::Message(m), Value::Struct(fields)) => {
            ProtoValue::Message(raise_message(fields, &m)?)
        }
        (
            Kind::Enum(e),
            Value::Enum(EnumValue {
                variant,
                payload: None,
            }),
        ) => {
            let number = match e.get_value_by_name(variant) {
                Some(known) => known.number(),
                // Numbers missing from the schema travel as their decimal form.
                None => variant.parse::<i32>().map_err(|_| {
                    shape(field.full_name(), e.full_name(), format!("'{variant}'"))
                })?,
            };
            ProtoValue::EnumNumber(number)
        }
        (Kind::Double, Value::F64(v)) => ProtoValue::F64(*v),
        (Kind::Float, Value::F32(v)) => ProtoValue::F32(*v),
        (Kind::Int32 | Kind::Sint32 | Kind::Sfixed32, Value::I32(v)) => ProtoValue::I32(*v),
        (Kind::Int64 | Kind::Sint64 | Kind::Sfixed64, Value::I64(v)) => ProtoValue::I64(*v),
        (Kind::Uint32 | Kind::Fixed32, Value::U32(v)) => ProtoValue::U32(*v),
        (Kind::Uint64 | Kind::Fixed64, Value::U64(v)) => ProtoValue::U64(*v),
        (Kind::Bool, Value::Bool(v)) => ProtoValue::Bool(*v),
        (Kind::String, Value::String(v)) => ProtoValue::String(v.clone()),
        (Kind::Bytes, Value::Bytes(v)) => ProtoValue::Bytes(v.clone()),
        (kind, other) => {
            return Err(shape(
                field.full_name(),
                format!("{kind:?}"),
                other.kind_name(),
            ));
        }
    };

    Ok(raised)
}

fn raise_map_key(field: &ProtoField, value: &Value) -> Result<MapKey, ReflectError> {
    let key = match (field.kind(), value) {
        (Kind::Bool, Value::Bool(v)) => MapKey::Bool(*v),
        (Kind::Int32 | Kind::Sint32 | Kind::Sfixed32, Value::I32(v)) => MapKey::I32(*v),
        (Kind::Int64 | Kind::Sint64 | Kind::Sfixed64, Value::I64(v)) => MapKey::I64(*v),
        (Kind::Uint32 | Kind::Fixed32, Value::U32(v)) => MapKey::U32(*v),
        (Kind::Uint64 | Kind::Fixed64, Value::U64(v)) => MapKey::U64(*v),
        (Kind::String, Value::String(v)) => MapKey::String(v.clone()),
        (kind, other) => {
            return Err(shape(
                field.full_name(),
                format!("{kind:?} key"),
                other.kind_name(),
            ));
        }
    };

    Ok(key)
}

fn map_key_label(key: &MapKey) -> String {
    match key {
        MapKey::Bool(v) => v.to_string(),
        MapKey::I32(v) => v.to_string(),
        MapKey::I64(v) => v.to_string(),
        MapKey::U32(v) => v.to_string(),
        MapKey::U64(v) => v.to_string(),
        MapKey::String(v) => v.clone(),
    }
}
