//! The interfaces the generator needs from its host, plus in-memory and
//! file-system implementations of them.

use crate::page::Page;
use crate::post::Post;
use std::io;
use std::path::PathBuf;

/// Supplies the posts for a generation pass.
pub trait PostSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns every non-draft post ordered oldest-first.
    fn non_draft_posts_oldest_first(&self) -> Result<Vec<Post>, Self::Error>;
}

/// Answers whether a file exists in the site's source tree.
pub trait PathResolver {
    fn exists_in_source(&self, path: &str) -> io::Result<bool>;
}

/// Reads raw template text.
pub trait TemplateSource {
    fn read(&self, path: &str) -> io::Result<String>;
}

/// Receives finished pages in generation order.
pub trait PageSink<'a> {
    fn append(&mut self, page: Page<'a>) -> io::Result<()>;
}

/// Resolves paths against a site source directory on disk.
pub struct SourceDirectory {
    root: PathBuf,
}

impl SourceDirectory {
    pub fn new<P: Into<PathBuf>>(root: P) -> SourceDirectory {
        SourceDirectory { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl PathResolver for SourceDirectory {
    /// Unlike [`std::path::Path::exists`], errors other than "not found" (e.g.,
    /// permission errors) are reported rather than treated as absence.
    fn exists_in_source(&self, path: &str) -> io::Result<bool> {
        match std::fs::metadata(self.resolve(path)) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl TemplateSource for SourceDirectory {
    fn read(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(self.resolve(path))
    }
}

/// Collects pages in memory.
#[derive(Default)]
pub struct VecSink<'a> {
    pub pages: Vec<Page<'a>>,
}

impl<'a> PageSink<'a> for VecSink<'a> {
    fn append(&mut self, page: Page<'a>) -> io::Result<()> {
        self.pages.push(page);
        Ok(())
    }
}
