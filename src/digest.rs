//! Computes the content fingerprint that archive page file names embed.
//!
//! The digest input is serialized in one canonical order:
//!
//! 1. the version line ([`DIGEST_VERSION`] followed by `\n`);
//! 2. for each post in window order (newest-first), the post's identity,
//!    `\n`, the post's canonical metadata (see
//!    [`crate::post::Metadata::canonical`]), `\n`;
//! 3. if there is a predecessor archive page, `prev:` followed by its path.
//!
//! Because the predecessor path is mixed in last, a rename of an older page
//! cascades to every newer page but never to an older one.

use crate::paginate::Window;
use std::fmt;

/// Tags the serialization order. Changing the order or the content of the
/// digest input requires changing this value.
pub const DIGEST_VERSION: &str = "pagefeed-digest-v1";

/// A blake3 digest of an archive window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Lowercase hex encoding of the digest.
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Computes the digest for `window`, chaining in the path of the previous
/// archive page if there is one.
pub fn digest(window: &Window, prev: Option<&str>) -> Result<Digest> {
    let mut hasher = blake3::Hasher::new();
    hasher.update(DIGEST_VERSION.as_bytes());
    hasher.update(b"\n");
    for post in window.posts.iter() {
        let metadata = post.metadata.canonical().map_err(|err| Error {
            post: post.id.clone(),
            err,
        })?;
        hasher.update(post.id.as_bytes());
        hasher.update(b"\n");
        hasher.update(metadata.as_bytes());
        hasher.update(b"\n");
    }
    if let Some(prev) = prev {
        hasher.update(b"prev:");
        hasher.update(prev.as_bytes());
    }
    Ok(Digest(*hasher.finalize().as_bytes()))
}

/// The result of a fallible digest operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Returned when a post's metadata can't be serialized for hashing.
#[derive(Debug)]
pub struct Error {
    /// The identity of the offending post.
    pub post: String,

    /// The underlying serialization error.
    pub err: serde_yaml::Error,
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Serializing metadata for post `{}`: {}", self.post, self.err)
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.err)
    }
}
