//! Defines the [`Parser`] and [`Error`] types: the file-system
//! [`PostSource`]. Posts are markdown files with YAML frontmatter anywhere
//! under the posts directory.

use std::{
    collections::BTreeMap,
    fmt,
    fs::File,
    path::{Path, PathBuf},
};

use log::debug;
use serde::Deserialize;
use url::Url;
use walkdir::WalkDir;

use crate::{
    markdown,
    post::{Metadata, Post},
    source::PostSource,
    value,
};

const MARKDOWN_EXTENSION: &str = "md";
const BUNDLE_INDEX: &str = "index.md";

/// Parses [`Post`] objects from source files.
pub struct Parser {
    /// `posts_url` is the base URL for post pages. It's used to prefix post
    /// page URLs (i.e., the URL for a post is `{posts_url}/{post_id}.html`).
    posts_url: Url,

    /// The directory containing the post source files.
    source_directory: PathBuf,
}

impl Parser {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new<P: Into<PathBuf>>(posts_url: Url, source_directory: P) -> Parser {
        Parser {
            posts_url,
            source_directory: source_directory.into(),
        }
    }

    /// Parses a single [`Post`], annotating any error with the post's path.
    fn parse_post(&self, relative_path: &Path) -> Result<Post> {
        match self._parse_post(relative_path) {
            Ok(p) => Ok(p),
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{}`", relative_path.display()),
                Box::new(e),
            )),
        }
    }

    fn _parse_post(&self, relative_path: &Path) -> Result<Post> {
        fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
            const FENCE: &str = "---";
            if !input.starts_with(FENCE) {
                return Err(Error::FrontmatterMissingStartFence);
            }
            match input[FENCE.len()..].find(FENCE) {
                None => Err(Error::FrontmatterMissingEndFence),
                Some(offset) => Ok((
                    FENCE.len(),                        // yaml_start
                    FENCE.len() + offset,               // yaml_stop
                    FENCE.len() + offset + FENCE.len(), // body_start
                )),
            }
        }

        use std::io::Read;
        let mut contents = String::new();
        File::open(self.source_directory.join(relative_path))?
            .read_to_string(&mut contents)?;
        let input: &str = &contents;

        let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;

        if value::parse_date(&frontmatter.date).is_none() {
            return Err(Error::InvalidDate(frontmatter.date));
        }

        let id = post_id(relative_path)?;
        let mut post = Post {
            url: self.posts_url.join(&format!("{}.html", id))?,
            id,
            metadata: Metadata {
                title: frontmatter.title,
                date: frontmatter.date,
                tags: frontmatter.tags.iter().map(|t| slug::slugify(t)).collect(),
                categories: frontmatter
                    .categories
                    .iter()
                    .map(|c| slug::slugify(c))
                    .collect(),
                author: frontmatter.author,
                body: String::default(),
                excerpt: frontmatter.excerpt,
                draft: frontmatter.draft,
                extra: frontmatter.extra,
            },
        };
        markdown::to_html(&mut post.metadata.body, &input[body_start..]);
        Ok(post)
    }

    /// Searches the source directory for post files (extension = `.md`) and
    /// returns the non-draft posts sorted by date (oldest first, ties broken
    /// by ID). Each post file must be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with fields `Title`, `Date`, and optionally
    ///    `Tags`, `Categories`, `Author`, `Excerpt`, and `Draft`. Any other
    ///    fields are kept as opaque metadata.
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Post body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// Title: Hello, world!
    /// Date: 2021-04-16
    /// Tags: [greet]
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    ///
    /// A directory containing an `index.md` is a post bundle; its ID is the
    /// directory's path.
    pub fn parse_posts(&self) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        for result in WalkDir::new(&self.source_directory).sort_by_file_name() {
            let entry = result?;
            let is_markdown = entry
                .path()
                .extension()
                .map_or(false, |ext| ext == MARKDOWN_EXTENSION);
            if !entry.file_type().is_file() || !is_markdown {
                continue;
            }

            // strip_prefix() should never fail since the walk is rooted at
            // the source directory
            let relative_path = entry
                .path()
                .strip_prefix(&self.source_directory)
                .map_err(|_| InvalidFileNameError(entry.path().to_owned()))?;
            let post = self.parse_post(relative_path)?;
            if post.metadata.draft {
                debug!("skipping draft `{}`", post.id);
                continue;
            }
            debug!("parsed post `{}`", post.id);
            posts.push(post);
        }

        // dates may carry different UTC offsets, so compare instants rather
        // than strings
        posts.sort_by_cached_key(|post| {
            (value::parse_date(&post.metadata.date), post.id.clone())
        });
        Ok(posts)
    }
}

impl PostSource for Parser {
    type Error = Error;

    fn non_draft_posts_oldest_first(&self) -> Result<Vec<Post>> {
        self.parse_posts()
    }
}

/// Derives a post's ID from its path relative to the posts directory: the
/// path less its extension, with `/` separators. Bundles (`foo/index.md`)
/// take the directory's path (`foo`).
fn post_id(relative_path: &Path) -> Result<String> {
    let without_extension = if relative_path.ends_with(BUNDLE_INDEX) {
        relative_path
            .parent()
            .ok_or_else(|| InvalidFileNameError(relative_path.to_owned()))?
            .to_owned()
    } else {
        relative_path.with_extension("")
    };

    let mut segments = Vec::new();
    for component in without_extension.components() {
        segments.push(
            component
                .as_os_str()
                .to_str()
                .ok_or_else(|| InvalidFileNameError(relative_path.to_owned()))?,
        );
    }
    if segments.is_empty() {
        return Err(InvalidFileNameError(relative_path.to_owned()).into());
    }
    Ok(segments.join("/"))
}

#[derive(Deserialize)]
struct Frontmatter {
    /// The title of the post.
    #[serde(rename = "Title", alias = "title")]
    title: String,

    /// The date of the post.
    #[serde(rename = "Date", alias = "date")]
    date: String,

    /// The tags associated with the post.
    #[serde(default, rename = "Tags", alias = "tags")]
    tags: Vec<String>,

    /// The categories associated with the post.
    #[serde(default, rename = "Categories", alias = "categories")]
    categories: Vec<String>,

    #[serde(default, rename = "Author", alias = "author")]
    author: Option<String>,

    #[serde(default, rename = "Excerpt", alias = "excerpt")]
    excerpt: Option<String>,

    #[serde(default, rename = "Draft", alias = "draft")]
    draft: bool,

    /// Everything else.
    #[serde(flatten)]
    extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug)]
pub struct InvalidFileNameError(PathBuf);

impl fmt::Display for InvalidFileNameError {
    /// Displays an [`InvalidFileNameError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid file name: {:?}", &self.0)
    }
}

impl std::error::Error for InvalidFileNameError {
    /// Implements the [`std::error::Error`] trait for [`InvalidFileNameError`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when a post's `Date` is neither `YYYY-MM-DD` nor RFC3339.
    InvalidDate(String),

    /// Returned when there is a problem parsing URLs.
    UrlParse(url::ParseError),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// Returned when a source file name isn't valid UTF-8.
    InvalidFileName(InvalidFileNameError),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Post must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::InvalidDate(date) => write!(f, "Invalid date: `{}`", date),
            Error::UrlParse(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::InvalidFileName(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::InvalidDate(_) => None,
            Error::UrlParse(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::InvalidFileName(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<InvalidFileNameError> for Error {
    fn from(err: InvalidFileNameError) -> Error {
        Error::InvalidFileName(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL parsing and joining functions.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible directory walks.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn write(dir: &Path, relative_path: &str, contents: &str) -> std::io::Result<()> {
        let path = dir.join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }

    fn parser(dir: &Path) -> Parser {
        Parser::new(Url::parse("https://example.com/posts/").unwrap(), dir)
    }

    #[test]
    fn test_parse_posts() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        write(
            dir.path(),
            "newer.md",
            "---\nTitle: Newer\nDate: 2021-04-17\nTags: [Greet, macOS]\nImage: a.png\n---\n# Hello\n",
        )?;
        write(
            dir.path(),
            "2021/older/index.md",
            "---\ntitle: Older\ndate: 2021-04-16\nexcerpt: Short\n---\nWorld\n",
        )?;
        write(
            dir.path(),
            "draft.md",
            "---\nTitle: Draft\nDate: 2021-04-18\nDraft: true\n---\nSecret\n",
        )?;
        write(dir.path(), "notes.txt", "not a post")?;

        let posts = parser(dir.path()).non_draft_posts_oldest_first()?;
        assert_eq!(2, posts.len());

        let older = &posts[0];
        assert_eq!("2021/older", older.id);
        assert_eq!("https://example.com/posts/2021/older.html", older.url.as_str());
        assert_eq!("Older", older.metadata.title);
        assert_eq!(Some(String::from("Short")), older.metadata.excerpt);
        assert_eq!("<p>World</p>\n", older.metadata.body);

        let newer = &posts[1];
        assert_eq!("newer", newer.id);
        assert_eq!("<h1>Hello</h1>\n", newer.metadata.body);
        assert!(newer.metadata.tags.contains("greet"));
        assert!(newer.metadata.tags.contains("macos"));
        assert_eq!(
            Some(&serde_yaml::Value::from("a.png")),
            newer.metadata.extra.get("Image")
        );
        assert!(!newer.metadata.draft);
        Ok(())
    }

    #[test]
    fn test_same_date_ordered_by_id() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        write(dir.path(), "b.md", "---\nTitle: B\nDate: 2021-01-01\n---\n")?;
        write(dir.path(), "a.md", "---\nTitle: A\nDate: 2021-01-01\n---\n")?;
        let posts = parser(dir.path()).parse_posts()?;
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(vec!["a", "b"], ids);
        Ok(())
    }

    #[test]
    fn test_ordered_by_instant() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        // 05:00 UTC
        write(dir.path(), "a.md", "---\nTitle: A\nDate: 2021-01-01T10:00:00+05:00\n---\n")?;
        // 08:00 UTC
        write(dir.path(), "b.md", "---\nTitle: B\nDate: 2021-01-01T08:00:00+00:00\n---\n")?;
        // midnight UTC
        write(dir.path(), "c.md", "---\nTitle: C\nDate: 2021-01-01\n---\n")?;
        let posts = parser(dir.path()).parse_posts()?;
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(vec!["c", "a", "b"], ids);
        Ok(())
    }

    #[test]
    fn test_invalid_date() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        write(dir.path(), "bad.md", "---\nTitle: Bad\nDate: yesterday\n---\n")?;
        match parser(dir.path()).parse_posts() {
            Err(Error::Annotated(annotation, err)) => {
                assert!(annotation.contains("bad.md"));
                assert!(matches!(*err, Error::InvalidDate(_)));
            }
            other => panic!("wanted an annotated error, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_missing_fences() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        write(dir.path(), "bad.md", "Title: nope\n")?;
        match parser(dir.path()).parse_posts() {
            Err(Error::Annotated(annotation, err)) => {
                assert!(annotation.contains("bad.md"));
                assert!(matches!(*err, Error::FrontmatterMissingStartFence));
            }
            other => panic!("wanted an annotated error, got {:?}", other),
        }

        write(dir.path(), "bad.md", "---\nTitle: nope\n")?;
        match parser(dir.path()).parse_posts() {
            Err(Error::Annotated(_, err)) => {
                assert!(matches!(*err, Error::FrontmatterMissingEndFence));
            }
            other => panic!("wanted an annotated error, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_missing_title() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        write(dir.path(), "bad.md", "---\nDate: 2021-01-01\n---\nBody\n")?;
        match parser(dir.path()).parse_posts() {
            Err(Error::Annotated(_, err)) => {
                assert!(matches!(*err, Error::DeserializeYaml(_)));
            }
            other => panic!("wanted an annotated error, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_post_id() -> Result<()> {
        assert_eq!("hello", post_id(Path::new("hello.md"))?);
        assert_eq!("2021/hello", post_id(Path::new("2021/hello.md"))?);
        assert_eq!("bundle", post_id(Path::new("bundle/index.md"))?);
        assert!(post_id(Path::new("index.md")).is_err());
        Ok(())
    }
}
