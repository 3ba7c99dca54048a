//! # JSON <-> Protobuf Codec
//!
//! Implements `tonic::codec::Codec` so that `tonic` can carry `serde_json::Value` bodies
//! for any method known to a `DescriptorPool`, without generated Rust structs.
//!
//! 1. **Encoder (JSON -> Proto)**: validates the JSON against the input `MessageDescriptor`
//!    through a `DynamicMessage` and writes its protobuf bytes.
//! 2. **Decoder (Proto -> JSON)**: decodes the bytes into a `DynamicMessage` of the output type,
//!    optionally upper-cases it with [`crate::reflect::transform_message`], and converts it to JSON.
use crate::reflect::transform_message;
use prost::Message;
use prost_reflect::{DynamicMessage, MessageDescriptor};
use tonic::{
    Status,
    codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder},
};

/// A Codec bridging `serde_json::Value` and the protobuf binary format.
pub struct JsonCodec {
    req_desc: MessageDescriptor,
    res_desc: MessageDescriptor,
    shout: bool,
}

impl JsonCodec {
    /// Creates a new `JsonCodec`.
    ///
    /// # Arguments
    /// * `req_desc` - Descriptor for the request message type.
    /// * `res_desc` - Descriptor for the response message type.
    pub fn new(req_desc: MessageDescriptor, res_desc: MessageDescriptor) -> Self {
        Self {
            req_desc,
            res_desc,
            shout: false,
        }
    }

    /// Upper-case every string of the decoded responses.
    pub fn shouting(mut self, shout: bool) -> Self {
        self.shout = shout;
        self
    }
}

impl Codec for JsonCodec {
    type Encode = serde_json::Value;
    type Decode = serde_json::Value;

    type Encoder = JsonEncoder;
    type Decoder = JsonDecoder;

    fn encoder(&mut self) -> Self::Encoder {
        JsonEncoder(self.req_desc.clone())
    }

    fn decoder(&mut self) -> Self::Decoder {
        JsonDecoder {
            descriptor: self.res_desc.clone(),
            shout: self.shout,
        }
    }
}

/// Encodes a JSON value into protobuf bytes.
pub struct JsonEncoder(MessageDescriptor);

impl Encoder for JsonEncoder {
    type Item = serde_json::Value;
    type Error = Status;

    fn encode(&mut self, item: Self::Item, dst: &mut EncodeBuf<'_>) -> Result<(), Self::Error> {
        // serde_json::Value implements IntoDeserializer, so it can be handed over directly.
        let msg = DynamicMessage::deserialize(self.0.clone(), item).map_err(|e| {
            Status::invalid_argument(format!(
                "JSON structure does not match '{}': {}",
                self.0.full_name(),
                e
            ))
        })?;

        msg.encode_raw(dst);
        Ok(())
    }
}

/// Decodes protobuf bytes into a JSON value.
pub struct JsonDecoder {
    descriptor: MessageDescriptor,
    shout: bool,
}

impl Decoder for JsonDecoder {
    type Item = serde_json::Value;
    type Error = Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Option<Self::Item>, Self::Error> {
        let mut msg = DynamicMessage::new(self.descriptor.clone());
        msg.merge(src)
            .map_err(|e| Status::internal(format!("Failed to decode Protobuf bytes: {}", e)))?;

        if self.shout {
            msg = transform_message(&msg)
                .map_err(|e| Status::internal(format!("Failed to transform response: {}", e)))?;
        }

        let value = serde_json::to_value(&msg)
            .map_err(|e| Status::internal(format!("Failed to map response to JSON: {}", e)))?;

        Ok(Some(value))
    }
}
