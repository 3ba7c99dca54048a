//! # Generic gRPC Transport
//!
//! Low-level building blocks for calling gRPC methods with dynamic message types.
//!
//! Unlike generated `tonic` clients, which are strongly typed (e.g. `GetUserRequest`),
//! the components here work with `serde_json::Value` bodies and transcode them to the
//! Protobuf binary format on the fly.
pub mod client;
pub mod codec;
