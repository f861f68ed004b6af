//! Exports the [`build_feed`] function which stitches together the
//! high-level steps of building a site's feed: parsing the posts
//! ([`crate::parser`]), generating the feed pages ([`crate::generate`]), and
//! writing them to the output directory ([`crate::write`]).

use crate::config::Config;
use crate::generate::{generate, BuildContext, Error as GenerateError, Outcome};
use crate::parser::{Error as ParseError, Parser as PostParser};
use crate::source::{PostSource, SourceDirectory};
use crate::write::DirectorySink;
use std::fmt;
use std::path::{Path, PathBuf};

/// Builds every feed of the project described by `config`, writing pages
/// into `output_directory`. Returns one [`Outcome`] per entry of
/// `config.feeds` along with the files written, in the order they were
/// written.
pub fn build_feed(
    config: &Config,
    output_directory: &Path,
) -> Result<(Vec<Outcome>, Vec<PathBuf>)> {
    let post_parser = PostParser::new(
        config.posts_url.clone(),
        &config.posts_source_directory,
    );

    // collect all posts
    let posts = post_parser.non_draft_posts_oldest_first()?;

    let source = SourceDirectory::new(&config.project_root);
    let mut sink = DirectorySink::new(output_directory);
    let mut outcomes = Vec::with_capacity(config.feeds.len());
    for feed in config.feeds.iter() {
        let ctx = BuildContext {
            page_size: config.page_size,
            feed_path: &feed.path,
            template: feed.template.as_deref(),
            ..BuildContext::new(&posts, &config.site)
        };
        outcomes.push(generate(&ctx, &source, &source, &mut sink)?);
    }
    Ok((outcomes, sink.written))
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a feed.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors during parsing.
    Parse(ParseError),

    /// Returned for errors generating or writing feed pages.
    Generate(GenerateError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Generate(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Generate(err) => Some(err),
        }
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<GenerateError> for Error {
    /// Converts [`GenerateError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: GenerateError) -> Error {
        Error::Generate(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::PROJECT_FILE;
    use std::fs;

    fn project(posts: usize) -> std::io::Result<tempfile::TempDir> {
        project_with(posts, "site_root: https://example.org/\ntitle: Example\n")
    }

    fn project_with(posts: usize, project_file: &str) -> std::io::Result<tempfile::TempDir> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join(PROJECT_FILE), project_file)?;
        let posts_dir = dir.path().join("posts");
        fs::create_dir_all(&posts_dir)?;
        for i in 0..posts {
            fs::write(
                posts_dir.join(format!("post-{:02}.md", i)),
                format!(
                    "---\nTitle: Post {}\nDate: 2021-02-{:02}\n---\nBody {}\n",
                    i,
                    i + 1,
                    i
                ),
            )?;
        }
        Ok(dir)
    }

    #[test]
    fn test_build_feed() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = project(23)?;
        let output = tempfile::tempdir()?;
        let config = Config::from_directory(dir.path())?;

        let (outcomes, written) = build_feed(&config, output.path())?;
        assert_eq!(vec![Outcome::Generated(3)], outcomes);
        assert_eq!(3, written.len());
        assert_eq!(output.path().join("feed.xml"), written[2]);

        let current = fs::read_to_string(&written[2])?;
        assert!(current.contains("https://example.org/posts/post-22.html"));
        assert!(!current.contains("https://example.org/posts/post-12.html"));

        // rebuilding doesn't rename anything
        let rebuilt = tempfile::tempdir()?;
        let (_, rewritten) = build_feed(&config, rebuilt.path())?;
        for (a, b) in written.iter().zip(rewritten.iter()) {
            assert_eq!(a.file_name(), b.file_name());
            assert_eq!(fs::read_to_string(a)?, fs::read_to_string(b)?);
        }
        Ok(())
    }

    #[test]
    fn test_build_feed_skips_existing_feed() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = project(3)?;
        fs::write(dir.path().join("feed.xml"), "<feed/>")?;
        let output = tempfile::tempdir()?;
        let config = Config::from_directory(dir.path())?;

        let (outcomes, written) = build_feed(&config, output.path())?;
        assert_eq!(vec![Outcome::Skipped], outcomes);
        assert!(written.is_empty());
        assert_eq!(0, fs::read_dir(output.path())?.count());
        Ok(())
    }

    #[test]
    fn test_build_several_feeds() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = project_with(
            12,
            "site_root: https://example.org/\n\
             feed:\n  paths:\n    - path: feed.xml\n    \
             - path: notes/feed.xml\n      source: theme/notes.xml\n    \
             - path: hand/feed.xml\n",
        )?;
        fs::create_dir_all(dir.path().join("theme"))?;
        fs::write(
            dir.path().join("theme/notes.xml"),
            "<notes>\n  {{range .posts}}\n  <n>{{.id}}</n>\n  {{end}}\n</notes>\n",
        )?;
        fs::create_dir_all(dir.path().join("hand"))?;
        fs::write(dir.path().join("hand/feed.xml"), "<feed/>")?;
        let output = tempfile::tempdir()?;
        let config = Config::from_directory(dir.path())?;

        let (outcomes, written) = build_feed(&config, output.path())?;
        assert_eq!(
            vec![
                Outcome::Generated(2),
                Outcome::Generated(2),
                Outcome::Skipped,
            ],
            outcomes
        );
        assert_eq!(4, written.len());

        // each feed is written oldest archive page first
        assert!(written[0]
            .strip_prefix(output.path())?
            .to_string_lossy()
            .starts_with("feed-1-"));
        assert_eq!(output.path().join("feed.xml"), written[1]);
        assert!(written[2]
            .strip_prefix(output.path())?
            .to_string_lossy()
            .starts_with("notes/feed-1-"));
        assert_eq!(output.path().join("notes/feed.xml"), written[3]);

        assert!(fs::read_to_string(&written[1])?.starts_with("<?xml"));
        assert!(fs::read_to_string(&written[3])?.starts_with("<notes><n>post-11</n>"));
        assert!(!output.path().join("hand").exists());
        Ok(())
    }
}
