use std::path::{Path, PathBuf};

/// Locations inside a notebook, all derived from its root folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookPaths {
    root: PathBuf,
}

impl NotebookPaths {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn notes(&self) -> PathBuf {
        self.root.join("notes")
    }

    pub fn templates(&self) -> PathBuf {
        self.root.join("templates")
    }

    pub fn html(&self) -> PathBuf {
        self.root.join("html").join("notes")
    }

    /// Search index folder.
    pub fn index(&self) -> PathBuf {
        self.notes().join(".indexdir")
    }

    pub fn attachments(&self) -> PathBuf {
        self.root.join("attachments")
    }

    pub fn css(&self) -> PathBuf {
        self.root.join("css")
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("notebook.conf")
    }

    pub fn templates_config_file(&self) -> PathBuf {
        self.templates().join("template_settings.conf")
    }

    pub fn css_file(&self) -> PathBuf {
        self.css().join("notebook.css")
    }

    pub fn search_css_file(&self) -> PathBuf {
        self.css().join("search-window.css")
    }

    /// Search index location before notes moved into `notes/`.
    pub fn legacy_index(&self) -> PathBuf {
        self.root.join(".indexdir")
    }

    /// Stylesheet location before the `css/` folder existed.
    pub fn legacy_css_file(&self) -> PathBuf {
        self.root.join("notes.css")
    }
}
