//! Display names for faces matched against a face collection.
//!
//! Matched faces only carry the opaque external image id they were indexed
//! with. Newer indexers write `<version>:<32 hex uuid>:<timestamp>` ids that
//! hold no name; older ones stored the name itself, either hex-encoded or in
//! `first_last` form.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `<version>:<32 lowercase hex>:<timestamp>`
static VERSIONED_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<version>.+):[a-f0-9]{32}:[0-9]+$").expect("valid regex")
});

static HEX_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9]{6,}$").expect("valid regex"));

static WORD_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w").expect("valid regex"));

/// What to return for ids that carry no name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback<'a> {
    /// Resolve to nothing.
    Undefined,
    /// Resolve to this value instead (typically the face id).
    Value(&'a str),
    /// Resolve to the id itself.
    PassThrough,
}

/// Resolves an external image id to a display name.
pub trait FaceNameResolver {
    fn resolve(&self, external_image_id: &str, fallback: Fallback<'_>) -> Option<String>;
}

/// Default resolver for ids written by face indexers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalImageIdResolver {
    version: String,
}

impl ExternalImageIdResolver {
    pub const DEFAULT_VERSION: &'static str = "v1";

    /// Resolver for ids prefixed with the given indexer version.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    /// Whether `id` has the `<version>:<32 hex>:<digits>` form.
    pub fn is_compatible(&self, id: &str) -> bool {
        VERSIONED_ID_RE
            .captures(id)
            .is_some_and(|caps| &caps["version"] == self.version.as_str())
    }
}

impl Default for ExternalImageIdResolver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VERSION)
    }
}

impl FaceNameResolver for ExternalImageIdResolver {
    fn resolve(&self, external_image_id: &str, fallback: Fallback<'_>) -> Option<String> {
        if self.is_compatible(external_image_id) {
            return match fallback {
                Fallback::Undefined => None,
                Fallback::Value(value) => Some(value.to_string()),
                Fallback::PassThrough => Some(external_image_id.to_string()),
            };
        }

        let name = if HEX_NAME_RE.is_match(external_image_id) {
            decode_hex(external_image_id)
        } else {
            external_image_id.to_string()
        };
        Some(title_case(&name.replace('_', " ")))
    }
}

/// Decode pairs of hex digits as UTF-8. A trailing odd digit is ignored.
fn decode_hex(s: &str) -> String {
    let bytes: Vec<u8> = s
        .as_bytes()
        .chunks_exact(2)
        .filter_map(|pair| {
            let pair = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(pair, 16).ok()
        })
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Uppercase the first character of every word.
fn title_case(s: &str) -> String {
    WORD_START_RE
        .replace_all(s, |caps: &Captures| caps[0].to_uppercase())
        .into_owned()
}
