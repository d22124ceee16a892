//! Request signing.
//!
//! The signature is the lowercase hex SHA-256 digest of
//!
//! ```text
//! secret ‖ k1 ‖ v1 ‖ k2 ‖ v2 ‖ ... ‖ body
//! ```
//!
//! where the `(k, v)` pairs are the query parameters sorted ascending by key
//! (byte order, case-sensitive) and `body` is the literal request body string.
//! Because [`QueryParams`] is a `BTreeMap`, the same map feeds both the URL
//! query string and the signer in a single canonical order.

use std::collections::BTreeMap;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Header and query parameter carrying the application id.
pub const APP_ID: &str = "appId";
/// Header and query parameter carrying the business id.
pub const BIZ_ID: &str = "bizId";
/// Header and query parameter carrying the millisecond timestamp.
pub const TIMESTAMPS: &str = "timestamps";
/// Header carrying the request signature.
pub const SIGN: &str = "sign";

/// Ordered query parameters of a single call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, replacing any previous value under the same key.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a parameter, replacing any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up a parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterate parameters in signing order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Compute the `sign` header value.
pub fn sign(secret: &str, params: &QueryParams, body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    for (key, value) in params.iter() {
        hasher.update(key.as_bytes());
        hasher.update(value.as_bytes());
    }
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a signature by recomputing it over the same inputs.
pub fn verify(secret: &str, params: &QueryParams, body: &str, signature: &str) -> bool {
    sign(secret, params, body).eq_ignore_ascii_case(signature)
}
