//! # User Service
//!
//! Generated bindings for the `users` protobuf package together with a toy,
//! in-memory implementation of the `UserRegistry` service.
//!
//! The crate also embeds the `FileDescriptorSet` produced at build time so that
//! consumers can reflect over `users.User` and friends without a running server.

pub mod pb {
    include!(concat!(env!("OUT_DIR"), "/users.rs"));
}

mod registry;

pub use pb::user_registry_client::UserRegistryClient;
pub use pb::user_registry_server::{UserRegistry, UserRegistryServer};
pub use registry::InMemoryUserRegistry;

use prost_reflect::{DescriptorPool, MessageDescriptor};
use std::sync::LazyLock;

pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("descriptors");

/// Fully qualified name of the registry service.
pub const SERVICE_NAME: &str = "users.UserRegistry";

/// Fully qualified name of the `User` message.
pub const USER_MESSAGE: &str = "users.User";

static POOL: LazyLock<DescriptorPool> = LazyLock::new(|| {
    DescriptorPool::decode(FILE_DESCRIPTOR_SET).expect("descriptor set embedded at build time")
});

/// Returns the descriptor pool decoded from [`FILE_DESCRIPTOR_SET`].
pub fn descriptor_pool() -> &'static DescriptorPool {
    &POOL
}

/// Returns the runtime descriptor of `users.User`.
pub fn user_descriptor() -> MessageDescriptor {
    POOL.get_message_by_name(USER_MESSAGE)
        .expect("users.User is part of the embedded descriptor set")
}
