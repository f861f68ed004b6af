use crate::chain::FeedPath;
use crate::paginate::DEFAULT_PAGE_SIZE;
use crate::site::Site;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file.
pub const PROJECT_FILE: &str = "pagefeed.yaml";

/// One entry of `feed.paths`. Jekyll-style `feed_output_path` and
/// `feed_source_path` keys are accepted as aliases.
#[derive(Deserialize)]
struct FeedSource {
    #[serde(alias = "feed_output_path")]
    path: String,

    #[serde(default, alias = "feed_source_path")]
    source: Option<String>,
}

#[derive(Default, Deserialize)]
struct Feed {
    #[serde(default)]
    path: Option<String>,

    #[serde(default)]
    template: Option<String>,

    #[serde(default)]
    paths: Option<Vec<FeedSource>>,
}

impl Feed {
    /// A single `path` wins over `paths`; with neither, there's one feed at
    /// the default path.
    fn entries(self) -> Result<Vec<FeedEntry>> {
        let Feed {
            path,
            template,
            paths,
        } = self;
        let entries: Vec<FeedEntry> = match (path, paths) {
            (Some(path), _) => vec![FeedEntry {
                path: FeedPath::new(&path),
                template,
            }],
            (None, Some(paths)) => paths
                .into_iter()
                .map(|source| FeedEntry {
                    path: FeedPath::new(&source.path),
                    template: source.source,
                })
                .collect(),
            (None, None) => vec![FeedEntry {
                path: FeedPath::default(),
                template,
            }],
        };

        if entries.is_empty() {
            return Err(anyhow!("`feed.paths` must list at least one feed"));
        }
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|other| other.path == entry.path) {
                return Err(anyhow!("Feed path `{}` is listed twice", entry.path));
            }
        }
        Ok(entries)
    }
}

/// A feed to generate.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedEntry {
    /// The canonical path of the feed's current page.
    pub path: FeedPath,

    /// The feed template, relative to the project root. `None` means the
    /// bundled template.
    pub template: Option<String>,
}

#[derive(Deserialize)]
struct Project {
    site_root: Url,

    #[serde(default)]
    title: String,

    #[serde(default)]
    description: String,

    #[serde(default)]
    author: Option<String>,

    #[serde(default)]
    feed: Feed,
}

pub struct Config {
    /// The directory containing the project file. This is also the site
    /// source tree that the existing-feed and stylesheet checks look in.
    pub project_root: PathBuf,
    pub posts_source_directory: PathBuf,
    pub posts_url: Url,
    pub site: Site,

    /// The site's feeds, in configuration order. Never empty; the first one
    /// is `site.feed_path`.
    pub feeds: Vec<FeedEntry>,

    /// Not configurable for now.
    pub page_size: usize,
}

impl Config {
    /// Looks for the project file in `dir` and then in each of its
    /// ancestors.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            match Config::from_project_file(&path) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            }
        } else {
            match dir.parent() {
                Some(dir) => Config::from_directory(dir),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        let project: Project = serde_yaml::from_reader(file)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => {
                let feeds = project.feed.entries()?;
                let mut site = Site::new(project.site_root, feeds[0].path.clone());
                site.title = project.title;
                site.description = project.description;
                site.author = project.author;
                Ok(Config {
                    project_root: project_root.to_owned(),
                    posts_source_directory: project_root.join("posts"),
                    posts_url: site.url.join("posts/")?,
                    site,
                    feeds,
                    page_size: DEFAULT_PAGE_SIZE,
                })
            }
        }
    }
}
