use crate::chain::Placement;
use crate::paginate::Window;

/// A finished feed page, ready to be handed to a
/// [`crate::source::PageSink`].
#[derive(Clone, Debug, PartialEq)]
pub struct Page<'a> {
    /// The output path relative to the site root.
    pub path: String,

    /// The rendered page.
    pub content: String,

    /// The path of the previous archive page, if any.
    pub prev: Option<String>,

    /// The path of the current feed page, if this is an archive page.
    pub next: Option<String>,

    /// Feed pages never have a layout.
    pub layout: Option<String>,

    /// Feed pages never appear in the sitemap.
    pub sitemap: bool,

    /// Whether the site has a feed stylesheet.
    pub xsl: bool,

    /// The posts on the page, newest-first.
    pub window: Window<'a>,
}

impl<'a> Page<'a> {
    pub fn new(placement: Placement<'a>, content: String, xsl: bool) -> Page<'a> {
        Page {
            path: placement.path,
            content,
            prev: placement.prev,
            next: placement.next,
            layout: None,
            sitemap: false,
            xsl,
            window: placement.window,
        }
    }
}
