//! Renders the `<link>` tag that advertises the feed from an HTML page.

use crate::site::Site;
use crate::value::escape;
use url::ParseError;

/// Returns a `<link rel="alternate">` tag pointing at the site's current
/// feed. Attributes with empty values are left out.
pub fn meta_tag(site: &Site) -> Result<String, ParseError> {
    let href = site.feed_url()?;
    let attributes = [
        ("type", "application/atom+xml"),
        ("rel", "alternate"),
        ("href", href.as_str()),
        ("title", site.title.as_str()),
    ];
    let attributes: Vec<String> = attributes
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, value)| format!(r#"{}="{}""#, key, escape(value)))
        .collect();
    Ok(format!("<link {} />", attributes.join(" ")))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::chain::FeedPath;
    use url::Url;

    #[test]
    fn test_meta_tag() -> Result<(), ParseError> {
        let mut site = Site::new(
            Url::parse("http://example.org")?,
            FeedPath::new("atom.xml"),
        );
        site.title = String::from("My \"awesome\" site");
        assert_eq!(
            r#"<link type="application/atom+xml" rel="alternate" href="http://example.org/atom.xml" title="My &quot;awesome&quot; site" />"#,
            meta_tag(&site)?
        );
        Ok(())
    }

    #[test]
    fn test_meta_tag_without_title() -> Result<(), ParseError> {
        let site = Site::new(Url::parse("http://example.org/")?, FeedPath::default());
        assert_eq!(
            r#"<link type="application/atom+xml" rel="alternate" href="http://example.org/feed.xml" />"#,
            meta_tag(&site)?
        );
        Ok(())
    }
}
