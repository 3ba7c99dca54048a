//! # Generic gRPC Client
//!
//! Wraps `tonic::client::Grpc` to perform unary calls with JSON bodies. The client does
//! not know the messages it exchanges: the [`super::codec::JsonCodec`] does the transcoding
//! from the `MethodDescriptor` it receives for every call.
//!
//! * **Dynamic Pathing**: builds the HTTP/2 path (`/package.Service/Method`) at runtime.
//! * **Metadata Handling**: turns `(key, value)` string pairs into gRPC metadata.
use super::codec::JsonCodec;
use crate::BoxError;
use http_body::Body as HttpBody;
use prost_reflect::MethodDescriptor;
use std::str::FromStr;
use tonic::{
    client::GrpcService,
    metadata::{
        MetadataKey, MetadataValue,
        errors::{InvalidMetadataKey, InvalidMetadataValue},
    },
    transport::Channel,
};

#[derive(thiserror::Error, Debug)]
pub enum GrpcRequestError {
    #[error("Internal error, the client was not ready: '{0}'")]
    ClientNotReady(#[source] BoxError),
    #[error("Invalid metadata (header) key '{key}': '{source}'")]
    InvalidMetadataKey {
        key: String,
        source: InvalidMetadataKey,
    },
    #[error("Invalid metadata (header) value for key '{key}': '{source}'")]
    InvalidMetadataValue {
        key: String,
        source: InvalidMetadataValue,
    },
    #[error("Invalid gRPC path '{0}'")]
    InvalidPath(String),
}

/// Options applied to a single unary call.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Custom gRPC metadata (headers) to attach to the request.
    pub headers: Vec<(String, String)>,
    /// Upper-case every string of the response before handing it back.
    pub shout: bool,
}

/// A dynamic gRPC client speaking JSON.
#[derive(Debug, Clone)]
pub struct GrpcClient<S = Channel> {
    client: tonic::client::Grpc<S>,
}

impl<S> GrpcClient<S>
where
    S: GrpcService<tonic::body::Body>,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    pub fn new(service: S) -> Self {
        let client = tonic::client::Grpc::new(service);
        Self { client }
    }

    /// Performs a Unary gRPC call (Single Request -> Single Response).
    ///
    /// # Returns
    /// * `Ok(Ok(Value))` - Successful RPC execution.
    /// * `Ok(Err(Status))` - RPC executed, but server returned an error.
    /// * `Err(GrpcRequestError)` - Failed to build or send the request.
    pub async fn unary(
        &mut self,
        method: MethodDescriptor,
        payload: serde_json::Value,
        options: CallOptions,
    ) -> Result<Result<serde_json::Value, tonic::Status>, GrpcRequestError> {
        self.client
            .ready()
            .await
            .map_err(|e| GrpcRequestError::ClientNotReady(e.into()))?;

        let codec = JsonCodec::new(method.input(), method.output()).shouting(options.shout);
        let path = http_path(&method)?;
        let request = build_request(payload, options.headers)?;

        match self.client.unary(request, path, codec).await {
            Ok(response) => Ok(Ok(response.into_inner())),
            Err(status) => Ok(Err(status)),
        }
    }
}

fn http_path(method: &MethodDescriptor) -> Result<http::uri::PathAndQuery, GrpcRequestError> {
    let path = format!("/{}/{}", method.parent_service().full_name(), method.name());
    http::uri::PathAndQuery::from_str(&path).map_err(|_| GrpcRequestError::InvalidPath(path))
}

fn build_request<T>(
    payload: T,
    headers: Vec<(String, String)>,
) -> Result<tonic::Request<T>, GrpcRequestError> {
    let mut request = tonic::Request::new(payload);
    for (k, v) in headers {
        let key =
            MetadataKey::from_str(&k).map_err(|source| GrpcRequestError::InvalidMetadataKey {
                key: k.clone(),
                source,
            })?;
        let val = MetadataValue::from_str(&v)
            .map_err(|source| GrpcRequestError::InvalidMetadataValue { key: k, source })?;
        request.metadata_mut().insert(key, val);
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_path_uses_fully_qualified_service() {
        let method = user_service::descriptor_pool()
            .get_service_by_name(user_service::SERVICE_NAME)
            .and_then(|s| s.methods().find(|m| m.name() == "GetUser"))
            .expect("GetUser is part of the embedded schema");

        let path = http_path(&method).unwrap();

        assert_eq!(path.as_str(), "/users.UserRegistry/GetUser");
    }

    #[test]
    fn test_invalid_headers_are_rejected() {
        let err = build_request((), vec![("bad key".to_string(), "v".to_string())]).unwrap_err();
        assert!(matches!(err, GrpcRequestError::InvalidMetadataKey { .. }));

        let err = build_request((), vec![("key".to_string(), "bad\nvalue".to_string())])
            .unwrap_err();
        assert!(matches!(err, GrpcRequestError::InvalidMetadataValue { .. }));

        let request =
            build_request((), vec![("x-jungle".to_string(), "yes".to_string())]).unwrap();
        let header = request.metadata().get("x-jungle").unwrap();
        assert_eq!(header.to_str().unwrap(), "yes");
    }
}
