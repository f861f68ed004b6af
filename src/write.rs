//! Writes finished feed pages to disk.

use crate::page::Page;
use crate::source::PageSink;
use log::debug;
use std::collections::HashSet;
use std::io;
use std::path::PathBuf;

/// A [`PageSink`] that writes each page's content to
/// `{output_directory}/{page.path}`, creating parent directories as needed.
pub struct DirectorySink {
    output_directory: PathBuf,
    seen_dirs: HashSet<PathBuf>,

    /// The files written so far, in the order they were written.
    pub written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new<P: Into<PathBuf>>(output_directory: P) -> DirectorySink {
        DirectorySink {
            output_directory: output_directory.into(),
            seen_dirs: HashSet::new(),
            written: Vec::new(),
        }
    }
}

impl<'a> PageSink<'a> for DirectorySink {
    fn append(&mut self, page: Page<'a>) -> io::Result<()> {
        let file_path = self.output_directory.join(page.path.trim_start_matches('/'));
        // `file_path` is always below `output_directory`, so it has a parent
        if let Some(dir) = file_path.parent() {
            if self.seen_dirs.insert(dir.to_owned()) {
                std::fs::create_dir_all(dir)?;
            }
        }
        std::fs::write(&file_path, page.content.as_bytes())?;
        debug!("wrote `{}`", file_path.display());
        self.written.push(file_path);
        Ok(())
    }
}
