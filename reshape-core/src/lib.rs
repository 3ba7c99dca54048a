//! # Reshape Core
//!
//! `reshape-core` rewrites structured values by walking them alongside a description of
//! their shape, and ships the glue needed to apply that to protobuf messages and gRPC
//! responses.
//!
//! ## Key Components
//!
//! * **[`transform`]:** The Reflective Transformer. Given a [`Value`] and its
//!   [`TypeDescriptor`], returns a copy with every string upper-cased.
//! * **[`reflect`]:** Derives descriptors from `prost-reflect` schemas and converts
//!   `DynamicMessage`s to and from [`Value`]s.
//! * **[`client::DynamicClient`]:** Calls unary gRPC methods with JSON bodies, resolving
//!   messages through a local `DescriptorPool`.
//!
//! ## Example
//!
//! ```rust
//! use reshape_core::{StructValue, TypeDescriptor, Value, transform};
//!
//! let descriptor = TypeDescriptor::structure("Pet", [("name", TypeDescriptor::string())]);
//! let pet: Value = StructValue::new().with("name", Value::string("Cheeta")).into();
//!
//! let shouted = transform(&pet, &descriptor).unwrap();
//! assert_eq!(shouted.as_struct().unwrap().get("name"), Some(&Value::string("CHEETA")));
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports `prost`, `prost-reflect`, and `tonic` to ensure that consumers
//! use compatible versions of these underlying dependencies.
pub mod client;
pub mod descriptor;
pub mod grpc;
pub mod reflect;
pub mod transform;
pub mod value;

pub use descriptor::{PrimitiveKind, TypeDescriptor};
pub use transform::{TransformError, map_strings, transform};
pub use value::{EnumValue, StructValue, Value};

// Re-exports
pub use prost;
pub use prost_reflect;
pub use tonic;

/// Type alias for the standard boxed error used in generic bounds.
type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
