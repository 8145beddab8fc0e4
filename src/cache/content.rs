//! Cached response content and its on-disk encoding

use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A cached origin response
///
/// Serialized as `{"status_code": 200, "headers": {...}, "content": "<hex>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheContent {
    pub status_code: u16,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(rename = "content", with = "hex::serde", default)]
    body: Vec<u8>,
}

impl CacheContent {
    pub fn new(status_code: u16, headers: HashMap<String, String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status_code,
            headers,
            body: body.into(),
        }
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_parts(self) -> (u16, HashMap<String, String>, Bytes) {
        (self.status_code, self.headers, Bytes::from(self.body))
    }

    /// Encode for storage
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Decode from storage
    pub fn from_json(raw: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_is_hex_encoded() {
        let content = CacheContent::new(200, HashMap::new(), b"hi".to_vec());
        let json: serde_json::Value = serde_json::from_slice(&content.to_json().unwrap()).unwrap();
        assert_eq!(json["status_code"], 200);
        assert_eq!(json["content"], "6869");
    }

    #[test]
    fn test_decode_stored_entry() {
        let raw = br#"{"status_code":307,"headers":{"location":"/x"},"content":"7b7d"}"#;
        let content = CacheContent::from_json(raw).unwrap();
        assert_eq!(content.status_code, 307);
        assert_eq!(content.headers.get("location").map(String::as_str), Some("/x"));
        assert_eq!(content.body(), b"{}");
    }

    #[test]
    fn test_decode_rejects_bad_hex() {
        let raw = br#"{"status_code":200,"headers":{},"content":"zz"}"#;
        assert!(CacheContent::from_json(raw).is_err());
    }
}
