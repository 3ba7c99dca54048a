//! # Values
//!
//! [`Value`] is the runtime counterpart of [`crate::descriptor::TypeDescriptor`]: a tree of
//! primitives, optionals, arrays, structs and enums. Values own their data and are
//! never mutated by the transformer.
use prost::bytes::Bytes;
use prost_types::Timestamp;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Bytes),
    Timestamp(Timestamp),
    Optional(Option<Box<Value>>),
    Array(Vec<Value>),
    Struct(StructValue),
    Enum(EnumValue),
}

/// Named fields, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructValue {
    fields: Vec<(String, Value)>,
}

/// One variant of a tagged union, with its payload if it wraps a value.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub variant: String,
    pub payload: Option<Box<Value>>,
}

impl Value {
    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    pub fn some(value: Value) -> Self {
        Value::Optional(Some(Box::new(value)))
    }

    pub fn none() -> Self {
        Value::Optional(None)
    }

    /// Name of the runtime shape, used when reporting mismatches.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I32(_) => "int32",
            Value::I64(_) => "int64",
            Value::U32(_) => "uint32",
            Value::U64(_) => "uint64",
            Value::F32(_) => "float",
            Value::F64(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Timestamp(_) => "timestamp",
            Value::Optional(_) => "optional",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Enum(_) => "enum",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }
}

impl StructValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style [`StructValue::set`].
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Replaces the field if it exists, appends it otherwise.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl From<StructValue> for Value {
    fn from(value: StructValue) -> Self {
        Value::Struct(value)
    }
}

impl EnumValue {
    pub fn constant(variant: impl Into<String>) -> Self {
        Self {
            variant: variant.into(),
            payload: None,
        }
    }

    pub fn wrapping(variant: impl Into<String>, payload: Value) -> Self {
        Self {
            variant: variant.into(),
            payload: Some(Box::new(payload)),
        }
    }
}

impl From<EnumValue> for Value {
    fn from(value: EnumValue) -> Self {
        Value::Enum(value)
    }
}
