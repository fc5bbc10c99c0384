use std::io;
use std::path::{Path, PathBuf};

use dns_zone::zones::deserialise::IncludeResolver;

/// Resolve `$INCLUDE` file names by reading them from disk.  Relative
/// names are taken relative to a base directory.
#[derive(Debug, Clone)]
pub struct FileIncludeResolver {
    base_dir: PathBuf,
}

impl FileIncludeResolver {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// The path a file name refers to.  Absolute names are used as-is.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        let path = Path::new(filename);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl IncludeResolver for FileIncludeResolver {
    fn resolve(&mut self, filename: &str) -> io::Result<String> {
        let path = self.path_for(filename);
        tracing::debug!(?path, "reading included file");
        std::fs::read_to_string(&path).inspect_err(|error| {
            tracing::warn!(?path, ?error, "could not read included file");
        })
    }
}
