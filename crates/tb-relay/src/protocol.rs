//! Upstream listener wire frames
//!
//! The relay serializes each HTTP request it routes to an upstream
//! listener as one binary WebSocket frame; the client answers with a
//! response frame carrying the same id. Frames are bincode-encoded.

use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// A request the relay forwards down an upstream listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamRequest {
    pub id: u64,
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// The client's answer to an [`UpstreamRequest`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamResponse {
    pub id: u64,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

pub fn decode_request(bytes: &[u8]) -> Result<UpstreamRequest, RelayError> {
    Ok(bincode::deserialize(bytes)?)
}

pub fn encode_request(request: &UpstreamRequest) -> Result<Vec<u8>, RelayError> {
    Ok(bincode::serialize(request)?)
}

pub fn decode_response(bytes: &[u8]) -> Result<UpstreamResponse, RelayError> {
    Ok(bincode::deserialize(bytes)?)
}

pub fn encode_response(response: &UpstreamResponse) -> Result<Vec<u8>, RelayError> {
    Ok(bincode::serialize(response)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_frame_round_trip() {
        let request = UpstreamRequest {
            id: 7,
            method: "GET".to_string(),
            path: "/alice".to_string(),
            headers: vec![("accept".to_string(), "*/*".to_string())],
            body: vec![],
        };
        let decoded = decode_request(&encode_request(&request).unwrap()).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn garbage_frame_is_a_codec_error() {
        let err = decode_request(&[0xff; 3]).unwrap_err();
        assert!(matches!(err, RelayError::Codec(_)));
    }
}
