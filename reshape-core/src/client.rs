//! # Dynamic Client
//!
//! [`DynamicClient`] performs unary gRPC calls with JSON bodies against any service found
//! in a local `DescriptorPool`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use reshape_core::client::{DynamicClient, DynamicRequest};
//! use reshape_core::prost_reflect::DescriptorPool;
//! use std::time::Duration;
//!
//! # async fn run(pool: DescriptorPool) -> Result<(), Box<dyn std::error::Error>> {
//! let mut client =
//!     DynamicClient::connect("http://127.0.0.1:50051", pool, Duration::from_secs(5)).await?;
//!
//! let response = client
//!     .dynamic(DynamicRequest {
//!         service: "users.UserRegistry".to_string(),
//!         method: "GetUser".to_string(),
//!         body: serde_json::json!({ "name": "Tarzan" }),
//!         headers: vec![],
//!         shout: true,
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```
use crate::BoxError;
use crate::grpc::client::{CallOptions, GrpcClient, GrpcRequestError};
use http_body::Body as HttpBody;
use prost_reflect::{DescriptorPool, MethodDescriptor};
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};

/// A request object encapsulating everything needed to perform a dynamic unary call.
#[derive(Debug, Clone)]
pub struct DynamicRequest {
    /// The JSON body of the request.
    pub body: serde_json::Value,
    /// Custom gRPC metadata (headers) to attach to the request.
    pub headers: Vec<(String, String)>,
    /// The fully qualified name of the service (e.g., `users.UserRegistry`).
    pub service: String,
    /// The name of the method to call (e.g., `GetUser`).
    pub method: String,
    /// Upper-case every string of the response.
    pub shout: bool,
}

/// The outcome of a call that reached the server: a JSON body or the status it returned.
pub type DynamicResponse = Result<serde_json::Value, tonic::Status>;

/// Errors that can occur when connecting to a gRPC server.
#[derive(Debug, thiserror::Error)]
pub enum ClientConnectError {
    #[error("Invalid URL '{0}': {1}")]
    InvalidUrl(String, #[source] tonic::transport::Error),
    #[error("Failed to connect to '{0}': {1}")]
    ConnectionFailed(String, #[source] tonic::transport::Error),
}

/// Errors that can occur during a dynamic call.
#[derive(Debug, thiserror::Error)]
pub enum DynamicCallError {
    #[error("Service '{0}' not found")]
    ServiceNotFound(String),
    #[error("Method '{0}' not found")]
    MethodNotFound(String),
    #[error("Method '{0}' is streaming, only unary methods are supported")]
    StreamingUnsupported(String),
    #[error("gRPC client request error: '{0}'")]
    GrpcRequestError(#[from] GrpcRequestError),
}

/// A client calling gRPC methods through a local schema.
#[derive(Debug, Clone)]
pub struct DynamicClient<S = Channel> {
    grpc_client: GrpcClient<S>,
    pool: DescriptorPool,
}

impl DynamicClient<Channel> {
    /// Connects to a gRPC server.
    ///
    /// # Arguments
    ///
    /// * `addr` - The server URI (e.g., `http://127.0.0.1:50051`).
    /// * `pool` - The schema used to resolve services and messages.
    /// * `timeout` - Deadline applied to every request on the channel.
    pub async fn connect(
        addr: &str,
        pool: DescriptorPool,
        timeout: Duration,
    ) -> Result<Self, ClientConnectError> {
        let channel = connect_channel(addr, timeout).await?;
        Ok(Self::from_service(channel, pool))
    }
}

/// Opens a channel whose requests fail after `timeout`.
///
/// Shared by the dynamic client and by callers that want a generated, typed stub on top
/// of the same connection settings.
pub async fn connect_channel(addr: &str, timeout: Duration) -> Result<Channel, ClientConnectError> {
    let endpoint = Endpoint::new(addr.to_string())
        .map_err(|e| ClientConnectError::InvalidUrl(addr.to_string(), e))?
        .timeout(timeout)
        .connect_timeout(timeout);

    endpoint
        .connect()
        .await
        .map_err(|e| ClientConnectError::ConnectionFailed(addr.to_string(), e))
}

impl<S> DynamicClient<S>
where
    S: tonic::client::GrpcService<tonic::body::Body>,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    /// Creates a client from an existing Tonic service/channel.
    pub fn from_service(service: S, pool: DescriptorPool) -> Self {
        Self {
            grpc_client: GrpcClient::new(service),
            pool,
        }
    }

    /// Lists all services defined in the local schema.
    pub fn list_services(&self) -> Vec<String> {
        self.pool
            .services()
            .map(|s| s.full_name().to_string())
            .collect()
    }

    /// Resolves a unary method in the local schema.
    pub fn resolve_method(
        &self,
        service: &str,
        method: &str,
    ) -> Result<MethodDescriptor, DynamicCallError> {
        let method = self
            .pool
            .get_service_by_name(service)
            .ok_or_else(|| DynamicCallError::ServiceNotFound(service.to_string()))?
            .methods()
            .find(|m| m.name() == method)
            .ok_or_else(|| DynamicCallError::MethodNotFound(method.to_string()))?;

        if method.is_client_streaming() || method.is_server_streaming() {
            return Err(DynamicCallError::StreamingUnsupported(
                method.full_name().to_string(),
            ));
        }

        Ok(method)
    }

    /// Executes a dynamic unary request.
    ///
    /// # Returns
    ///
    /// * `Ok(Ok(Value))` - The server answered with a message.
    /// * `Ok(Err(Status))` - The server answered with an error status.
    /// * `Err(DynamicCallError)` - The call could not be performed.
    pub async fn dynamic(
        &mut self,
        request: DynamicRequest,
    ) -> Result<DynamicResponse, DynamicCallError> {
        let method = self.resolve_method(&request.service, &request.method)?;

        let options = CallOptions {
            headers: request.headers,
            shout: request.shout,
        };

        Ok(self.grpc_client.unary(method, request.body, options).await?)
    }
}
