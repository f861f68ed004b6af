//! Conversions from feed types into template [`Value`]s. Every string that
//! ends up in markup is escaped here, including URLs, rendered bodies and
//! excerpts, so templates can drop values straight into element text or
//! attribute values.

use crate::post::Post;
use crate::site::Site;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use gtmpl_value::Value;
use pulldown_cmark::escape::escape_html;
use std::collections::HashMap;
use url::Url;

/// The `updated` value for a page with no posts.
pub const EPOCH: &str = "1970-01-01T00:00:00+00:00";

/// Escapes `&`, `<`, `>`, and `"` so `s` is safe in XML text and attribute
/// values.
pub fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    // writing into a `String` can't fail
    let _ = escape_html(&mut escaped, s);
    escaped
}

/// Parses a post date. Dates may be plain `YYYY-MM-DD` dates (interpreted
/// as midnight UTC) or full RFC3339 timestamps. Returns `None` if `date` is
/// neither.
pub fn parse_date(date: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(date) {
        return Some(datetime);
    }
    let midnight = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)?;
    Some(FixedOffset::east_opt(0)?.from_utc_datetime(&midnight))
}

/// Converts a post date into an RFC3339 timestamp. See [`parse_date`].
pub fn rfc3339(date: &str) -> Option<String> {
    parse_date(date).map(|datetime| datetime.to_rfc3339())
}

fn string(s: &str) -> Value {
    Value::String(s.to_owned())
}

fn optional(s: Option<&str>) -> Value {
    match s {
        Some(s) => string(s),
        None => Value::Nil,
    }
}

fn strings<'a>(items: impl Iterator<Item = &'a String>) -> Value {
    Value::Array(items.map(|s| Value::String(escape(s))).collect())
}

/// A reference to another feed page, as seen from a template: an object
/// with `path` and `url` fields.
pub fn page_handle(path: &str, url: &Url) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("path".to_owned(), string(path));
    m.insert("url".to_owned(), Value::String(escape(url.as_str())));
    Value::Object(m)
}

/// Converts a [`Site`] into an object with fields `url`, `title`,
/// `description`, and `author`.
pub fn site(site: &Site) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("url".to_owned(), Value::String(escape(site.url.as_str())));
    m.insert("title".to_owned(), Value::String(escape(&site.title)));
    m.insert(
        "description".to_owned(),
        Value::String(escape(&site.description)),
    );
    m.insert(
        "author".to_owned(),
        optional(site.author.as_deref().map(escape).as_deref()),
    );
    Value::Object(m)
}

/// Converts a [`Post`] into an object for templating. `updated` is the
/// post's date in RFC3339 form, computed by the caller since it's fallible.
pub fn post(post: &Post, updated: &str) -> Value {
    let metadata = &post.metadata;
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("id".to_owned(), string(&post.id));
    m.insert("url".to_owned(), Value::String(escape(post.url.as_str())));
    m.insert("title".to_owned(), Value::String(escape(&metadata.title)));
    m.insert("date".to_owned(), string(&metadata.date));
    m.insert("updated".to_owned(), string(updated));
    m.insert("tags".to_owned(), strings(metadata.tags.iter()));
    m.insert("categories".to_owned(), strings(metadata.categories.iter()));
    m.insert(
        "author".to_owned(),
        optional(metadata.author.as_deref().map(escape).as_deref()),
    );
    m.insert("body".to_owned(), Value::String(escape(&metadata.body)));
    m.insert(
        "excerpt".to_owned(),
        optional(metadata.summary().map(escape).as_deref()),
    );
    Value::Object(m)
}
