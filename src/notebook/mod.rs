mod migration;
mod paths;
mod settings;
mod templates;

pub use migration::{migrate_layout, MigrationSummary};
pub use paths::NotebookPaths;
pub use settings::*;
pub use templates::*;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A named notebook root folder.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Notebook {
    pub name: String,
    pub path: PathBuf,
}

impl Notebook {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(name: S, path: P) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// A notebook named after its folder.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Self::new(name, path)
    }
}
