//! Renders feed pages with a [`gtmpl`] template. The template source is
//! minified and parsed once per generation pass and then reused for every
//! page; this module decides what each page's template context contains.
//!
//! The context is an object with these fields:
//!
//! * `posts`: the page's posts, newest-first (see [`crate::value::post`])
//! * `prev`: the previous archive page (`path` and `url`), or nil
//! * `next`: the current feed page (`path` and `url`) for archive pages, or
//!   nil on the current page
//! * `xsl`: whether the site has a feed stylesheet
//! * `page`: this page's `path`, `url`, and whether it's `archived`
//! * `site`: see [`crate::site::Site`]
//! * `updated`: the date of the newest post on the page

use crate::chain::Placement;
use crate::paginate::Slot;
use crate::site::Site;
use crate::value::{self, EPOCH};
use gtmpl::{Context, Template, Value};
use std::collections::HashMap;
use std::fmt;

/// The Atom template used when a site doesn't bring its own.
pub const BUNDLED_TEMPLATE: &str = include_str!("../templates/feed.xml");

/// Removes every run of ASCII whitespace that immediately follows a `>`
/// (the end of a markup tag) or a `}` (the end of a template action). All
/// other whitespace, including non-ASCII spaces such as U+00A0, is left
/// alone.
pub fn minify(source: &str) -> String {
    let mut minified = String::with_capacity(source.len());
    let mut strip = false;
    for c in source.chars() {
        if strip && matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r') {
            continue;
        }
        strip = c == '>' || c == '}';
        minified.push(c);
    }
    minified
}

/// A parsed, minified feed template.
pub struct Renderer {
    template: Template,
}

impl Renderer {
    /// Minifies and parses `source`.
    pub fn parse(source: &str) -> Result<Renderer> {
        let mut template = Template::default();
        template.parse(minify(source)).map_err(Error::Parse)?;
        Ok(Renderer { template })
    }

    /// Renders the page described by `placement`.
    pub fn render(&self, site: &Site, placement: &Placement, xsl: bool) -> Result<String> {
        let context = Context::from(context(site, placement, xsl)?).map_err(Error::Execute)?;
        let mut output: Vec<u8> = Vec::new();
        self.template
            .execute(&mut output, &context)
            .map_err(Error::Execute)?;
        Ok(String::from_utf8(output)?)
    }
}

fn handle(site: &Site, path: &Option<String>) -> Result<Value> {
    Ok(match path {
        Some(path) => value::page_handle(path, &site.url_for(path)?),
        None => Value::Nil,
    })
}

fn context(site: &Site, placement: &Placement, xsl: bool) -> Result<Value> {
    let mut posts = Vec::with_capacity(placement.window.posts.len());
    for post in placement.window.posts.iter() {
        let updated = value::rfc3339(&post.metadata.date).ok_or_else(|| Error::InvalidDate {
            post: post.id.clone(),
            date: post.metadata.date.clone(),
        })?;
        posts.push(value::post(post, &updated));
    }

    // posts are newest-first, so the first one dates the page
    let updated = match posts.first() {
        Some(Value::Object(post)) => post.get("updated").cloned(),
        _ => None,
    }
    .unwrap_or_else(|| Value::String(EPOCH.to_owned()));

    let mut page = match value::page_handle(&placement.path, &site.url_for(&placement.path)?) {
        Value::Object(m) => m,
        _ => HashMap::new(),
    };
    page.insert(
        "archived".to_owned(),
        Value::Bool(matches!(placement.window.slot, Slot::Archive(_))),
    );

    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("posts".to_owned(), Value::Array(posts));
    m.insert("prev".to_owned(), handle(site, &placement.prev)?);
    m.insert("next".to_owned(), handle(site, &placement.next)?);
    m.insert("xsl".to_owned(), Value::Bool(xsl));
    m.insert("page".to_owned(), Value::Object(page));
    m.insert("site".to_owned(), value::site(site));
    m.insert("updated".to_owned(), updated);
    Ok(Value::Object(m))
}

/// The result of a fallible rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a template or rendering a page.
#[derive(Debug)]
pub enum Error {
    /// Returned when the template can't be parsed.
    Parse(String),

    /// Returned when the template fails to execute.
    Execute(String),

    /// Returned when a post's date is neither `YYYY-MM-DD` nor RFC3339.
    InvalidDate { post: String, date: String },

    /// Returned when a page URL can't be built.
    UrlParse(url::ParseError),

    /// Returned when the template produces invalid UTF-8.
    Utf8(std::string::FromUtf8Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "Parsing feed template: {}", err),
            Error::Execute(err) => write!(f, "Rendering feed page: {}", err),
            Error::InvalidDate { post, date } => {
                write!(f, "Post `{}` has an invalid date: `{}`", post, date)
            }
            Error::UrlParse(err) => err.fmt(f),
            Error::Utf8(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(_) => None,
            Error::Execute(_) => None,
            Error::InvalidDate { .. } => None,
            Error::UrlParse(err) => Some(err),
            Error::Utf8(err) => Some(err),
        }
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL joining.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Error {
        Error::Utf8(err)
    }
}
