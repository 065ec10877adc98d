//! Short code derivation
//!
//! A short code is a pure function of the original URL: the same URL always
//! yields the same code, which is what lets storage report `Conflict` for a
//! URL the owner already shortened.
//!
//! `Base64Tail` is a truncation, not a hash. Two different URLs whose encoded
//! tails line up share a code; identical URLs always do. `Digest` spreads the
//! whole input through xxh64 so unrelated URLs only collide with 64-bit hash
//! probability.
//!
//! Tail codes use the URL-safe alphabet without padding, so they do not match
//! codes cut from padded standard base64 and an older journal will not dedup
//! against them.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Width of the window taken from the encoded URL.
pub const TAIL_LEN: usize = 8;

/// Code derivation scheme
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CodeScheme {
    /// URL-safe base64 of the URL, last 8 characters (padding stripped)
    #[default]
    Base64Tail,
    /// xxh64 of the URL, URL-safe base64 of the 8 digest bytes
    Digest,
}

impl CodeScheme {
    pub fn encode(&self, url: &str) -> String {
        match self {
            CodeScheme::Base64Tail => encode_tail(url),
            CodeScheme::Digest => encode_digest(url),
        }
    }
}

/// Encode with the default scheme.
pub fn encode(url: &str) -> String {
    CodeScheme::default().encode(url)
}

fn encode_tail(url: &str) -> String {
    let encoded = URL_SAFE_NO_PAD.encode(url.as_bytes());
    // base64 输出只含 ASCII，按字节切片安全
    let start = encoded.len().saturating_sub(TAIL_LEN);
    encoded[start..].to_string()
}

fn encode_digest(url: &str) -> String {
    let digest = xxhash_rust::xxh64::xxh64(url.as_bytes(), 0);
    URL_SAFE_NO_PAD.encode(digest.to_be_bytes())
}
