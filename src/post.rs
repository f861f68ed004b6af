//! Defines the [`Post`] and [`Metadata`] types. Posts are immutable inputs to
//! a generation pass: they are produced by a
//! [`crate::source::PostSource`] and only ever read by the paginator, the
//! digest computer, and the renderer.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

/// Represents a single non-draft (or at least supposedly non-draft) post.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The stable identity of the post. For posts parsed from disk this is
    /// the source path relative to the posts directory, less the extension,
    /// with `/` separators (e.g., `2021/hello`).
    pub id: String,

    /// The absolute URL of the rendered post page.
    pub url: Url,

    /// Everything else we know about the post.
    pub metadata: Metadata,
}

/// The metadata bag for a [`Post`]. The `excerpt` and `draft` fields are the
/// only fields that drive behavior; everything not named here lives in
/// `extra`, which only matters for the digest.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    /// The title of the post.
    pub title: String,

    /// The date of the post (`YYYY-MM-DD`).
    pub date: String,

    /// The post's (slugified) tags.
    pub tags: BTreeSet<String>,

    /// The post's (slugified) categories.
    pub categories: BTreeSet<String>,

    /// The post's author, if any.
    pub author: Option<String>,

    /// The rendered HTML body.
    pub body: String,

    /// An explicit excerpt. Excluded from the digest.
    pub excerpt: Option<String>,

    /// Whether the post is a draft. Excluded from the digest.
    pub draft: bool,

    /// Any other front matter fields, ordered by key.
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// The subset of [`Metadata`] that participates in the digest. Field order
/// here is the serialization order and must not change without bumping
/// [`crate::digest::DIGEST_VERSION`].
#[derive(Serialize)]
struct CanonicalMetadata<'a> {
    title: &'a str,
    date: &'a str,
    tags: &'a BTreeSet<String>,
    categories: &'a BTreeSet<String>,
    author: &'a Option<String>,
    body: &'a str,
    extra: &'a BTreeMap<String, serde_yaml::Value>,
}

impl Metadata {
    /// Serializes the metadata into its canonical string form, omitting
    /// `excerpt` and `draft`.
    pub fn canonical(&self) -> serde_yaml::Result<String> {
        serde_yaml::to_string(&CanonicalMetadata {
            title: &self.title,
            date: &self.date,
            tags: &self.tags,
            categories: &self.categories,
            author: &self.author,
            body: &self.body,
            extra: &self.extra,
        })
    }

    /// Returns the summary of the post: the explicit excerpt if there is one,
    /// otherwise the portion of the body above the `<!-- more -->` fold (if
    /// there is a fold).
    pub fn summary(&self) -> Option<&str> {
        const FOLD_TAG: &str = "<!-- more -->";
        match &self.excerpt {
            Some(excerpt) => Some(excerpt),
            None => self.body.find(FOLD_TAG).map(|i| &self.body[..i]),
        }
    }
}
