mod registry;

pub use registry::{ExtensionRegistry, Markdown};

use thiserror::Error;

use crate::store::NestedMap;

/// Per extension options, `extension -> option -> value`.
pub type ExtensionConfig = NestedMap;

/// Why a markdown renderer could not be built from a list of extensions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionError {
    #[error("Failed to initiate extension '{name}': it does not provide an extension entry point")]
    NotAnExtension { name: String },
    #[error("No module named '{module}'")]
    MissingModule { module: String },
    #[error("Markdown renderer failed to initialize: {0}")]
    Renderer(String),
}

impl ExtensionError {
    /// The listed extension responsible for this error, if any.
    pub fn culprit<'a>(&self, extensions: &'a [String]) -> Option<&'a String> {
        match self {
            ExtensionError::NotAnExtension { name } => extensions.iter().find(|e| *e == name),
            ExtensionError::MissingModule { module } => {
                let stripped = module.strip_prefix(MODULE_PREFIX);
                extensions
                    .iter()
                    .find(|e| Some(e.as_str()) == stripped)
                    .or_else(|| extensions.iter().find(|e| *e == module))
            }
            ExtensionError::Renderer(_) => None,
        }
    }
}

/// Prefix used by third party extension modules.
pub const MODULE_PREFIX: &str = "mdx_";

/// Something that can build a markdown renderer from a set of extensions.
pub trait ExtensionHost {
    type Renderer;

    fn build(
        &self,
        extensions: &[String],
        config: &ExtensionConfig,
    ) -> Result<Self::Renderer, ExtensionError>;
}

/// A renderer built from the extensions that survived validation.
#[derive(Debug)]
pub struct LoadedExtensions<R> {
    pub renderer: R,
    /// Extensions that were dropped from the list because they failed to load.
    pub faulty: Vec<String>,
}

/// Builds a renderer, dropping extensions from `extensions` until the build succeeds.
///
/// Every retry removes one extension, so at most `extensions.len() + 1`
/// builds are attempted. An error that cannot be blamed on a listed extension
/// is returned as is.
pub fn load_extensions<H: ExtensionHost>(
    host: &H,
    extensions: &mut Vec<String>,
    config: &ExtensionConfig,
) -> Result<LoadedExtensions<H::Renderer>, ExtensionError> {
    let mut faulty = vec![];
    loop {
        tracing::debug!(?extensions, "Initializing markdown renderer");
        let err = match host.build(extensions, config) {
            Ok(renderer) => return Ok(LoadedExtensions { renderer, faulty }),
            Err(err) => err,
        };
        let Some(culprit) = err.culprit(extensions).cloned() else {
            return Err(err);
        };
        tracing::warn!(
            extension = %culprit,
            error = %err,
            "Found invalid markdown extension, temporarily disabling it. Save the notebook settings to disable it permanently"
        );
        extensions.retain(|e| *e != culprit);
        faulty.push(culprit);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    /// Fails on the first listed extension that is in `broken`.
    struct FlakyHost {
        broken: Vec<ExtensionError>,
        builds: Cell<usize>,
    }

    impl FlakyHost {
        fn new(broken: Vec<ExtensionError>) -> Self {
            Self {
                broken,
                builds: Cell::new(0),
            }
        }
    }

    impl ExtensionHost for FlakyHost {
        type Renderer = Vec<String>;

        fn build(
            &self,
            extensions: &[String],
            _config: &ExtensionConfig,
        ) -> Result<Self::Renderer, ExtensionError> {
            self.builds.set(self.builds.get() + 1);
            for err in &self.broken {
                if err.culprit(extensions).is_some() {
                    return Err(err.clone());
                }
            }
            Ok(extensions.to_vec())
        }
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn valid_list_builds_once() {
        let host = FlakyHost::new(vec![]);
        let mut extensions = names(&["nl2br", "footnotes"]);
        let loaded = load_extensions(&host, &mut extensions, &ExtensionConfig::new()).unwrap();
        assert_eq!(host.builds.get(), 1);
        assert!(loaded.faulty.is_empty());
        assert_eq!(loaded.renderer, names(&["nl2br", "footnotes"]));
    }

    #[test]
    fn empty_list_builds_once() {
        let host = FlakyHost::new(vec![]);
        let mut extensions = vec![];
        let loaded = load_extensions(&host, &mut extensions, &ExtensionConfig::new()).unwrap();
        assert_eq!(host.builds.get(), 1);
        assert!(loaded.faulty.is_empty());
    }

    #[test]
    fn drops_extension_without_entry_point() {
        let host = FlakyHost::new(vec![ExtensionError::NotAnExtension {
            name: "strkundr".to_string(),
        }]);
        let mut extensions = names(&["nl2br", "strkundr", "footnotes"]);
        let loaded = load_extensions(&host, &mut extensions, &ExtensionConfig::new()).unwrap();
        assert_eq!(extensions, names(&["nl2br", "footnotes"]));
        assert_eq!(loaded.faulty, names(&["strkundr"]));
        assert_eq!(host.builds.get(), 2);
    }

    #[test]
    fn drops_missing_prefixed_module() {
        let host = FlakyHost::new(vec![ExtensionError::MissingModule {
            module: "mdx_asciimathml".to_string(),
        }]);
        let mut extensions = names(&["asciimathml", "toc"]);
        let loaded = load_extensions(&host, &mut extensions, &ExtensionConfig::new()).unwrap();
        assert_eq!(extensions, names(&["toc"]));
        assert_eq!(loaded.faulty, names(&["asciimathml"]));
    }

    #[test]
    fn drops_missing_plain_module() {
        let host = FlakyHost::new(vec![ExtensionError::MissingModule {
            module: "wikilinks".to_string(),
        }]);
        let mut extensions = names(&["wikilinks"]);
        let loaded = load_extensions(&host, &mut extensions, &ExtensionConfig::new()).unwrap();
        assert!(extensions.is_empty());
        assert_eq!(loaded.faulty, names(&["wikilinks"]));
    }

    #[test]
    fn drops_every_broken_extension() {
        let host = FlakyHost::new(vec![
            ExtensionError::MissingModule {
                module: "mdx_headerlink".to_string(),
            },
            ExtensionError::NotAnExtension {
                name: "strkundr".to_string(),
            },
        ]);
        let mut extensions = names(&["strkundr", "headerlink", "tables"]);
        let loaded = load_extensions(&host, &mut extensions, &ExtensionConfig::new()).unwrap();
        assert_eq!(extensions, names(&["tables"]));
        assert_eq!(loaded.faulty, names(&["headerlink", "strkundr"]));
        assert_eq!(host.builds.get(), 3);
    }

    #[test]
    fn unrelated_failure_is_returned() {
        struct BrokenHost;
        impl ExtensionHost for BrokenHost {
            type Renderer = ();
            fn build(&self, _: &[String], _: &ExtensionConfig) -> Result<(), ExtensionError> {
                Err(ExtensionError::MissingModule {
                    module: "pygments".to_string(),
                })
            }
        }
        let mut extensions = names(&["codehilite"]);
        let err = load_extensions(&BrokenHost, &mut extensions, &ExtensionConfig::new()).unwrap_err();
        assert_eq!(
            err,
            ExtensionError::MissingModule {
                module: "pygments".to_string()
            }
        );
        assert_eq!(extensions, names(&["codehilite"]));
    }
}
