use std::collections::{BTreeMap, BTreeSet};

use super::{ExtensionConfig, ExtensionError, ExtensionHost, MODULE_PREFIX};

/// Extensions that ship with the markdown engine.
const STANDARD_EXTENSIONS: [&str; 18] = [
    "abbr",
    "admonition",
    "attr_list",
    "codehilite",
    "def_list",
    "extra",
    "fenced_code",
    "footnotes",
    "headerid",
    "meta",
    "nl2br",
    "sane_lists",
    "smart_strong",
    "smarty",
    "tables",
    "toc",
    "wikilinks",
    "md_in_html",
];

/// Extensions bundled with the application.
const BUNDLED_EXTENSIONS: [&str; 3] = ["asciimathml", "headerlink", "strkundr"];

/// Extension host that knows which extensions are installed.
#[derive(Debug, Clone)]
pub struct ExtensionRegistry {
    installed: BTreeSet<String>,
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self {
            installed: STANDARD_EXTENSIONS
                .iter()
                .chain(BUNDLED_EXTENSIONS.iter())
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl ExtensionRegistry {
    /// A registry with nothing installed.
    pub fn empty() -> Self {
        Self {
            installed: BTreeSet::new(),
        }
    }

    pub fn register<S: Into<String>>(mut self, name: S) -> Self {
        self.installed.insert(name.into());
        self
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.installed.contains(name)
    }
}

impl ExtensionHost for ExtensionRegistry {
    type Renderer = Markdown;

    fn build(
        &self,
        extensions: &[String],
        config: &ExtensionConfig,
    ) -> Result<Markdown, ExtensionError> {
        if let Some(missing) = extensions.iter().find(|name| !self.is_installed(name)) {
            return Err(ExtensionError::MissingModule {
                module: format!("{MODULE_PREFIX}{missing}"),
            });
        }
        let options = extensions
            .iter()
            .filter_map(|name| config.get(name).map(|opts| (name.clone(), opts.clone())))
            .collect();
        Ok(Markdown {
            extensions: extensions.to_vec(),
            options,
        })
    }
}

/// Renderer setup: the enabled extensions in load order and their options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markdown {
    extensions: Vec<String>,
    options: ExtensionConfig,
}

impl Markdown {
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn is_enabled(&self, extension: &str) -> bool {
        self.extensions.iter().any(|e| e == extension)
    }

    pub fn options(&self, extension: &str) -> Option<&BTreeMap<String, String>> {
        self.options.get(extension)
    }
}
