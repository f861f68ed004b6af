//! Defines [`Site`], the site-wide values every feed page needs.

use crate::chain::FeedPath;
use url::{ParseError, Url};

/// Site-wide information made available to every feed page.
#[derive(Clone, Debug, PartialEq)]
pub struct Site {
    /// The absolute URL of the site root. Always ends in a slash.
    pub url: Url,

    /// The site's title.
    pub title: String,

    /// A short description of the site.
    pub description: String,

    /// The site's author, if any.
    pub author: Option<String>,

    /// The canonical path of the current feed.
    pub feed_path: FeedPath,
}

impl Site {
    /// Creates a [`Site`] with an empty title and description. A trailing
    /// slash is added to `url` if it's missing so that joining paths onto it
    /// doesn't drop its last segment.
    pub fn new(mut url: Url, feed_path: FeedPath) -> Site {
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Site {
            url,
            title: String::new(),
            description: String::new(),
            author: None,
            feed_path,
        }
    }

    /// Resolves a site-relative path into an absolute URL.
    pub fn url_for(&self, path: &str) -> Result<Url, ParseError> {
        self.url.join(path.trim_start_matches('/'))
    }

    /// The absolute URL of the current feed.
    pub fn feed_url(&self) -> Result<Url, ParseError> {
        self.url_for(self.feed_path.as_str())
    }
}
