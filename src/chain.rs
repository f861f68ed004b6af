//! Assigns output paths to feed pages and links them into a chain. The
//! current page lives at the canonical feed path; archive pages live at
//! content-addressed paths derived from it.

use crate::digest::{self, Digest};
use crate::paginate::{Paginator, Window};
use log::debug;
use std::fmt;

/// The canonical feed path, split into the pieces archive page names are
/// built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedPath {
    path: String,
    dir: String,
    base: String,
    ext: String,
}

impl FeedPath {
    /// Splits `path` into directory, stem, and extension. Leading slashes
    /// are dropped since feed paths are always relative to the site root.
    /// The extension keeps its leading dot, and a leading dot on the file
    /// name is part of the stem rather than an extension.
    pub fn new(path: &str) -> FeedPath {
        let path = path.trim_start_matches('/');
        let (dir, file) = match path.rfind('/') {
            Some(i) => (&path[..i], &path[i + 1..]),
            None => ("", path),
        };
        let (base, ext) = match file.rfind('.') {
            Some(i) if i > 0 => (&file[..i], &file[i..]),
            _ => (file, ""),
        };
        FeedPath {
            path: path.to_owned(),
            dir: dir.to_owned(),
            base: base.to_owned(),
            ext: ext.to_owned(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn ext(&self) -> &str {
        &self.ext
    }

    /// Returns the path for archive page `pagenum`:
    /// `{dir}/{base}-{pagenum}-{digest}{ext}`, without the `{dir}/` prefix
    /// when the feed lives at the site root.
    pub fn archive(&self, pagenum: usize, digest: &Digest) -> String {
        let file = format!("{}-{}-{}{}", self.base, pagenum, digest, self.ext);
        match self.dir.is_empty() {
            true => file,
            false => format!("{}/{}", self.dir, file),
        }
    }
}

impl fmt::Display for FeedPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for FeedPath {
    fn default() -> Self {
        FeedPath::new("feed.xml")
    }
}

/// A [`Window`] with its output path and links resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement<'a> {
    /// The output path, relative to the site root.
    pub path: String,

    /// The path of the previous (older) archive page, if any.
    pub prev: Option<String>,

    /// The path of the current feed page. `None` for the current page
    /// itself.
    pub next: Option<String>,

    /// The posts on the page, newest-first.
    pub window: Window<'a>,
}

/// Places every window produced by `paginator`: archive pages oldest to
/// newest, then the current page. Each archive page's path depends on its
/// predecessor's path, so they have to be built in this order.
pub fn build_chain<'a>(
    feed_path: &FeedPath,
    paginator: &Paginator<'a>,
) -> digest::Result<Vec<Placement<'a>>> {
    let current_path = feed_path.as_str().to_owned();
    let mut placements = Vec::with_capacity(paginator.archive_page_count() + 1);
    let mut prev: Option<String> = None;

    for (i, window) in paginator.archive_windows().enumerate() {
        let pagenum = i + 1;
        let digest = digest::digest(&window, prev.as_deref())?;
        let path = feed_path.archive(pagenum, &digest);
        debug!("archive page {} -> {}", pagenum, path);
        placements.push(Placement {
            path: path.clone(),
            prev: prev.replace(path),
            next: Some(current_path.clone()),
            window,
        });
    }

    placements.push(Placement {
        path: current_path,
        prev,
        next: None,
        window: paginator.current_window(),
    });
    Ok(placements)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::paginate::test::posts;
    use crate::paginate::Slot;

    fn paths(placements: &[Placement]) -> Vec<String> {
        placements.iter().map(|p| p.path.clone()).collect()
    }

    #[test]
    fn test_feed_path_split() {
        let cases = [
            ("feed.xml", "", "feed", ".xml"),
            ("/feed.xml", "", "feed", ".xml"),
            ("feeds/atom.xml", "feeds", "atom", ".xml"),
            ("a/b/feed.tar.xml", "a/b", "feed.tar", ".xml"),
            ("feed", "", "feed", ""),
            ("feeds/.feed", "feeds", ".feed", ""),
        ];
        for (path, dir, base, ext) in cases.iter() {
            let feed_path = FeedPath::new(path);
            assert_eq!(*dir, feed_path.dir(), "{}", path);
            assert_eq!(*base, feed_path.base(), "{}", path);
            assert_eq!(*ext, feed_path.ext(), "{}", path);
        }
    }

    #[test]
    fn test_archive_naming() -> digest::Result<()> {
        let posts = posts(3);
        let window = Window {
            slot: Slot::Archive(1),
            posts: posts.iter().collect(),
        };
        let digest = digest::digest(&window, None)?;
        assert_eq!(
            format!("feed-12-{}.xml", digest.to_hex()),
            FeedPath::new("feed.xml").archive(12, &digest)
        );
        assert_eq!(
            format!("feeds/atom-1-{}.xml", digest.to_hex()),
            FeedPath::new("feeds/atom.xml").archive(1, &digest)
        );
        Ok(())
    }

    #[test]
    fn test_chain_links() -> digest::Result<()> {
        let posts = posts(23);
        let paginator = Paginator::new(&posts, 10);
        let placements = build_chain(&FeedPath::default(), &paginator)?;
        assert_eq!(3, placements.len());

        let (first, second, current) = (&placements[0], &placements[1], &placements[2]);
        assert!(first.path.starts_with("feed-1-") && first.path.ends_with(".xml"));
        assert!(second.path.starts_with("feed-2-") && second.path.ends_with(".xml"));
        assert_eq!(None, first.prev);
        assert_eq!(Some(first.path.clone()), second.prev);
        assert_eq!(Some(String::from("feed.xml")), first.next);
        assert_eq!(Some(String::from("feed.xml")), second.next);

        assert_eq!("feed.xml", current.path);
        assert_eq!(Some(second.path.clone()), current.prev);
        assert_eq!(None, current.next);
        assert_eq!(Slot::Current, current.window.slot);
        Ok(())
    }

    #[test]
    fn test_chain_without_archives() -> digest::Result<()> {
        let posts = posts(10);
        let paginator = Paginator::new(&posts, 10);
        let placements = build_chain(&FeedPath::new("feeds/atom.xml"), &paginator)?;
        assert_eq!(vec![String::from("feeds/atom.xml")], paths(&placements));
        assert_eq!(None, placements[0].prev);
        Ok(())
    }

    #[test]
    fn test_chain_is_deterministic() -> digest::Result<()> {
        let posts = posts(35);
        let a = build_chain(&FeedPath::default(), &Paginator::new(&posts, 10))?;
        let b = build_chain(&FeedPath::default(), &Paginator::new(&posts, 10))?;
        assert_eq!(paths(&a), paths(&b));
        Ok(())
    }

    #[test]
    fn test_newest_archive_change_is_local() -> digest::Result<()> {
        let posts = posts(35);
        let mut changed = posts.clone();
        // posts[20..30] make up the newest archive page
        changed[25].metadata.body = String::from("<p>edited</p>");

        let before = paths(&build_chain(&FeedPath::default(), &Paginator::new(&posts, 10))?);
        let after = paths(&build_chain(&FeedPath::default(), &Paginator::new(&changed, 10))?);
        assert_eq!(before[0], after[0]);
        assert_eq!(before[1], after[1]);
        assert_ne!(before[2], after[2]);
        assert_eq!(before[3], after[3]);
        Ok(())
    }

    #[test]
    fn test_oldest_archive_change_cascades() -> digest::Result<()> {
        let posts = posts(35);
        let mut changed = posts.clone();
        changed[0].metadata.title = String::from("Renamed");

        let before = paths(&build_chain(&FeedPath::default(), &Paginator::new(&posts, 10))?);
        let after = paths(&build_chain(&FeedPath::default(), &Paginator::new(&changed, 10))?);
        assert_ne!(before[0], after[0]);
        assert_ne!(before[1], after[1]);
        assert_ne!(before[2], after[2]);
        assert_eq!("feed.xml", after[3]);
        assert_eq!(before[3], after[3]);
        Ok(())
    }
}
