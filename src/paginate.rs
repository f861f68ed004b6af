//! Partitions a list of posts into archive windows and a current window.

use crate::post::Post;
use log::warn;

/// The default number of posts per feed page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Identifies which page a [`Window`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// An archive page. Page numbers start at 1 (the oldest page).
    Archive(usize),

    /// The current feed page.
    Current,
}

/// An ordered, contiguous run of posts assigned to one page. Posts are
/// ordered newest-first.
#[derive(Clone, Debug, PartialEq)]
pub struct Window<'a> {
    pub slot: Slot,
    pub posts: Vec<&'a Post>,
}

impl<'a> Window<'a> {
    fn new(slot: Slot, oldest_first: &[&'a Post]) -> Window<'a> {
        Window {
            slot,
            posts: oldest_first.iter().rev().copied().collect(),
        }
    }
}

/// Returns the number of archive pages for `n` posts with `page_size` posts
/// per page. The most recent post never lands in an archive page, so this
/// is `(n - 1) / page_size`.
pub fn archive_page_count(n: usize, page_size: usize) -> usize {
    match n {
        0 => 0,
        _ => (n - 1) / page_size,
    }
}

/// Splits posts into windows. `page_size` must be nonzero.
pub struct Paginator<'a> {
    posts: Vec<&'a Post>,
    page_size: usize,
}

impl<'a> Paginator<'a> {
    /// Creates a paginator over `posts`, which must be ordered oldest-first.
    /// Drafts are dropped here even though the post source is expected to
    /// have done so already.
    pub fn new(posts: &'a [Post], page_size: usize) -> Paginator<'a> {
        let posts = posts
            .iter()
            .filter(|post| {
                if post.metadata.draft {
                    warn!("dropping draft post `{}` from feed", post.id);
                }
                !post.metadata.draft
            })
            .collect();
        Paginator { posts, page_size }
    }

    /// The number of posts eligible for the feed.
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn archive_page_count(&self) -> usize {
        archive_page_count(self.posts.len(), self.page_size)
    }

    /// Returns the archive windows, oldest page first.
    pub fn archive_windows(&self) -> impl Iterator<Item = Window<'a>> + '_ {
        (1..=self.archive_page_count()).map(move |pagenum| {
            let start = (pagenum - 1) * self.page_size;
            let stop = pagenum * self.page_size;
            Window::new(Slot::Archive(pagenum), &self.posts[start..stop])
        })
    }

    /// Returns the window for the current page: the most recent
    /// `min(n, page_size)` posts.
    pub fn current_window(&self) -> Window<'a> {
        let start = self.posts.len().saturating_sub(self.page_size);
        Window::new(Slot::Current, &self.posts[start..])
    }
}
