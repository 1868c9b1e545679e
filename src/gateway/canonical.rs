//! Canonical parameter representation
//!
//! The gateway verifies signatures over a deterministic rendering of the
//! request parameters: keys in ascending byte-wise order, values
//! form-urlencoded (space becomes `+`), pairs joined with `&`. The hash input
//! and the transmitted query string must be built from the same iteration
//! order or verification fails on the remote side.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use url::form_urlencoded;

/// Field name carrying the signature, never part of the hash input
pub const SECURE_HASH_FIELD: &str = "vnp_SecureHash";

/// Percent-encode a string the way `application/x-www-form-urlencoded` does
pub fn form_encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// An ordered set of request parameters.
///
/// Keys are unique and iterate in ascending byte-wise order. Empty values are
/// dropped on insert: an absent optional field must be omitted entirely, not
/// sent as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    fields: BTreeMap<String, String>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field; empty values are silently omitted
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.fields.insert(key.into(), value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.fields.remove(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The string the signature is computed over: `key=encode(value)` pairs
    pub fn hash_data(&self) -> String {
        self.render(false)
    }

    /// The transmitted form: both key and value encoded
    pub fn query_string(&self) -> String {
        self.render(true)
    }

    fn render(&self, encode_keys: bool) -> String {
        let mut out = String::new();
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                out.push('&');
            }
            if encode_keys {
                out.push_str(&form_encode(key));
            } else {
                out.push_str(key);
            }
            out.push('=');
            out.push_str(&form_encode(value));
        }
        out
    }

    /// Parse a query string back into a parameter set
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            params.insert(key.into_owned(), value.into_owned());
        }
        params
    }

    /// Serialize as a JSON object in canonical key order
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in &self.fields {
            map.insert(key.clone(), Value::String(value.clone()));
        }
        Value::Object(map)
    }
}

/// A parameter set with its derived signature
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub params: ParameterSet,
    pub secure_hash: String,
}

impl SignedRequest {
    pub fn new(params: ParameterSet, secure_hash: String) -> Self {
        Self {
            params,
            secure_hash,
        }
    }

    /// Full query string with the signature appended last
    pub fn to_query_string(&self) -> String {
        format!(
            "{}&{}={}",
            self.params.query_string(),
            SECURE_HASH_FIELD,
            self.secure_hash
        )
    }

    /// JSON payload including the signature field
    pub fn to_json(&self) -> Value {
        let mut value = self.params.to_json();
        if let Value::Object(ref mut map) = value {
            map.insert(
                SECURE_HASH_FIELD.to_string(),
                Value::String(self.secure_hash.clone()),
            );
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_keys_in_ascending_byte_order() {
        let mut params = ParameterSet::new();
        params.insert("vnp_Version", "2.1.0");
        params.insert("vnp_Amount", "10000000");
        params.insert("vnp_Command", "pay");
        assert_eq!(
            params.hash_data(),
            "vnp_Amount=10000000&vnp_Command=pay&vnp_Version=2.1.0"
        );
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let keys = ["vnp_TxnRef", "vnp_Amount", "vnp_IpAddr", "vnp_Command"];
        let mut forward = ParameterSet::new();
        for key in keys {
            forward.insert(key, "x");
        }
        let mut reverse = ParameterSet::new();
        for key in keys.iter().rev() {
            reverse.insert(*key, "x");
        }
        assert_eq!(forward.hash_data(), reverse.hash_data());
        assert_eq!(forward.query_string(), reverse.query_string());
    }

    #[test]
    fn encodes_spaces_as_plus() {
        let mut params = ParameterSet::new();
        params.insert("vnp_OrderInfo", "Payment for order: 12345678");
        assert_eq!(
            params.hash_data(),
            "vnp_OrderInfo=Payment+for+order%3A+12345678"
        );
    }

    #[test]
    fn encodes_non_ascii_as_percent_utf8() {
        let mut params = ParameterSet::new();
        params.insert("vnp_OrderInfo", "Thanh toán");
        assert_eq!(params.hash_data(), "vnp_OrderInfo=Thanh+to%C3%A1n");
    }

    #[test]
    fn empty_values_are_omitted() {
        let mut params = ParameterSet::new();
        params.insert("vnp_BankCode", "");
        params.insert("vnp_Amount", "100");
        assert_eq!(params.len(), 1);
        assert_eq!(params.hash_data(), "vnp_Amount=100");
    }

    #[test]
    fn query_string_round_trips() {
        let mut params = ParameterSet::new();
        params.insert("vnp_Amount", "10000000");
        params.insert("vnp_OrderInfo", "Payment for order: 12345678");
        params.insert("vnp_ReturnUrl", "https://merchant.test/callback?x=1");

        let parsed = ParameterSet::from_query(&params.query_string());
        assert_eq!(parsed, params);
    }

    #[test]
    fn signed_query_appends_hash_last() {
        let mut params = ParameterSet::new();
        params.insert("vnp_Amount", "100");
        let signed = SignedRequest::new(params, "abc123".to_string());
        assert_eq!(
            signed.to_query_string(),
            "vnp_Amount=100&vnp_SecureHash=abc123"
        );
    }

    #[test]
    fn json_includes_signature_field() {
        let mut params = ParameterSet::new();
        params.insert("vnp_RequestId", "12345678");
        let signed = SignedRequest::new(params, "deadbeef".to_string());
        let json = signed.to_json();
        assert_eq!(json["vnp_RequestId"], "12345678");
        assert_eq!(json["vnp_SecureHash"], "deadbeef");
    }
}
