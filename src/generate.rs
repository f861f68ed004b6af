//! Stitches the feed pipeline together: paginate the posts, place each
//! window in the page chain, render every page, and hand the pages to a
//! [`PageSink`] oldest archive page first and current page last.

use crate::chain::{self, FeedPath};
use crate::digest;
use crate::page::Page;
use crate::paginate::{Paginator, DEFAULT_PAGE_SIZE};
use crate::post::Post;
use crate::render::{self, Renderer, BUNDLED_TEMPLATE};
use crate::site::Site;
use crate::source::{PageSink, PathResolver, TemplateSource};
use log::{debug, info};
use std::fmt;
use std::io;

/// The site-relative path of the optional feed stylesheet.
pub const STYLESHEET_PATH: &str = "feed.xslt.xml";

/// Everything a generation pass depends on besides its collaborators.
pub struct BuildContext<'a> {
    /// Non-draft posts, oldest-first.
    pub posts: &'a [Post],

    /// The number of posts per page.
    pub page_size: usize,

    /// Site-wide values.
    pub site: &'a Site,

    /// The canonical path of the feed being generated.
    pub feed_path: &'a FeedPath,

    /// The source-relative path of the feed template. The bundled template
    /// is used when this is `None`.
    pub template: Option<&'a str>,
}

impl<'a> BuildContext<'a> {
    /// Creates a context for the site's primary feed with the default page
    /// size and the bundled template.
    pub fn new(posts: &'a [Post], site: &'a Site) -> BuildContext<'a> {
        BuildContext {
            posts,
            page_size: DEFAULT_PAGE_SIZE,
            site,
            feed_path: &site.feed_path,
            template: None,
        }
    }
}

/// What a generation pass did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A feed already exists at the canonical path in the site source, so
    /// nothing was generated.
    Skipped,

    /// This many pages were appended to the sink.
    Generated(usize),
}

/// Runs one generation pass. Either every page reaches `sink` or, if the
/// site already has a feed at the canonical path, none do.
pub fn generate<'a, R, T, S>(
    ctx: &BuildContext<'a>,
    resolver: &R,
    templates: &T,
    sink: &mut S,
) -> Result<Outcome>
where
    R: PathResolver,
    T: TemplateSource,
    S: PageSink<'a>,
{
    if ctx.page_size == 0 {
        return Err(Error::InvalidPageSize);
    }

    let feed_path = ctx.feed_path;
    if exists(resolver, feed_path.as_str())? {
        info!(
            "`{}` exists in the site source; skipping feed generation",
            feed_path
        );
        return Ok(Outcome::Skipped);
    }

    for (index, post) in ctx.posts.iter().enumerate() {
        if post.id.is_empty() {
            return Err(Error::InvalidPost { index });
        }
    }

    let renderer = match ctx.template {
        Some(path) => {
            let source = templates.read(path).map_err(|err| Error::ReadTemplate {
                path: path.to_owned(),
                err,
            })?;
            Renderer::parse(&source)?
        }
        None => Renderer::parse(BUNDLED_TEMPLATE)?,
    };
    let xsl = exists(resolver, STYLESHEET_PATH)?;

    let paginator = Paginator::new(ctx.posts, ctx.page_size);
    if paginator.is_empty() {
        info!("no posts for `{}`; its current page will be empty", feed_path);
    }
    let placements = chain::build_chain(feed_path, &paginator)?;
    let count = placements.len();
    info!(
        "generating {} feed pages for {} posts",
        count,
        paginator.len()
    );

    // Render everything before appending anything so a failure partway
    // through leaves the sink untouched.
    let mut pages = Vec::with_capacity(count);
    for placement in placements {
        let content = renderer.render(ctx.site, &placement, xsl)?;
        debug!("rendered `{}` ({} bytes)", placement.path, content.len());
        pages.push(Page::new(placement, content, xsl));
    }
    for page in pages {
        sink.append(page).map_err(Error::Sink)?;
    }
    Ok(Outcome::Generated(count))
}

fn exists<R: PathResolver>(resolver: &R, path: &str) -> Result<bool> {
    resolver
        .exists_in_source(path)
        .map_err(|err| Error::ExistenceCheck {
            path: path.to_owned(),
            err,
        })
}

/// The result of a generation pass.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for a generation pass. None of these are retried; a
/// failed pass can simply be run again.
#[derive(Debug)]
pub enum Error {
    /// Returned when the page size is zero.
    InvalidPageSize,

    /// Returned when a post has no identity. `index` is the post's position
    /// in the input.
    InvalidPost { index: usize },

    /// Returned when the feed template can't be read.
    ReadTemplate { path: String, err: io::Error },

    /// Returned when checking for an existing file fails for a reason other
    /// than the file being absent.
    ExistenceCheck { path: String, err: io::Error },

    /// Returned when an archive window can't be digested.
    Digest(digest::Error),

    /// Returned when the template can't be parsed or rendered.
    Render(render::Error),

    /// Returned when the sink rejects a page.
    Sink(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidPageSize => write!(f, "Page size must be at least 1"),
            Error::InvalidPost { index } => {
                write!(f, "Post at position {} has no identity", index)
            }
            Error::ReadTemplate { path, err } => {
                write!(f, "Reading feed template '{}': {}", path, err)
            }
            Error::ExistenceCheck { path, err } => {
                write!(f, "Checking for '{}' in the site source: {}", path, err)
            }
            Error::Digest(err) => err.fmt(f),
            Error::Render(err) => err.fmt(f),
            Error::Sink(err) => write!(f, "Writing feed page: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidPageSize => None,
            Error::InvalidPost { .. } => None,
            Error::ReadTemplate { path: _, err } => Some(err),
            Error::ExistenceCheck { path: _, err } => Some(err),
            Error::Digest(err) => Some(err),
            Error::Render(err) => Some(err),
            Error::Sink(err) => Some(err),
        }
    }
}

impl From<digest::Error> for Error {
    /// Converts [`digest::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: digest::Error) -> Error {
        Error::Digest(err)
    }
}

impl From<render::Error> for Error {
    /// Converts [`render::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: render::Error) -> Error {
        Error::Render(err)
    }
}
