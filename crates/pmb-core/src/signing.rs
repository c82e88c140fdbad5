//! Canonical query construction and request signing.
//!
//! The admin API authenticates a request by recomputing
//! `md5(canonical_query + api_key)` and comparing it to the `hash` field.
//! The canonical query is `action` followed by the encoded parameters, in
//! insertion order, serialised as `application/x-www-form-urlencoded`. The
//! `hash` pair is appended afterwards and is never part of its own input.

use md5::{Digest, Md5};
use url::form_urlencoded;

use crate::params::ParamMap;

/// Name of the signature field appended to every request.
pub const HASH_FIELD: &str = "hash";

/// Name of the action field, always the first canonical pair.
pub const ACTION_FIELD: &str = "action";

/// The ordered `(key, value)` pairs a request is signed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalQuery {
    pairs: Vec<(String, String)>,
}

impl CanonicalQuery {
    pub fn new(action: &str, params: &ParamMap) -> Self {
        let mut pairs = Vec::with_capacity(params.len() + 1);
        pairs.push((ACTION_FIELD.to_string(), action.to_string()));
        pairs.extend(params.encoded_pairs());
        Self { pairs }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// URL-encoded `key=value&...` form. This exact string is the digest input.
    pub fn to_query_string(&self) -> String {
        encode_pairs(&self.pairs)
    }

    /// Compute the digest and return the signed pair list and query string.
    pub fn sign(self, api_key: &str) -> SignedQuery {
        let query = self.to_query_string();
        let hash = digest(&query, api_key);

        let mut pairs = self.pairs;
        pairs.push((HASH_FIELD.to_string(), hash.clone()));
        let query = encode_pairs(&pairs);
        SignedQuery { pairs, query, hash }
    }
}

/// A canonical query with its trailing `hash` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedQuery {
    pairs: Vec<(String, String)>,
    query: String,
    hash: String,
}

impl SignedQuery {
    /// All pairs in wire order, `hash` last.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// URL-encoded form of [`SignedQuery::pairs`].
    pub fn query_string(&self) -> &str {
        &self.query
    }

    /// Lower-case hex digest.
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

/// `hex(md5(canonical_query + api_key))`.
pub fn digest(canonical_query: &str, api_key: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(canonical_query.as_bytes());
    hasher.update(api_key.as_bytes());
    hex::encode(hasher.finalize())
}

fn encode_pairs(pairs: &[(String, String)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}
