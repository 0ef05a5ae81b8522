use std::path::PathBuf;

use eyre::WrapErr;

use super::{
    migrate_layout, list_body_templates, BodyTitlePair, Notebook, NotebookPaths, TitleTemplate,
    BODY_TITLE_PAIRS_KEY, TITLE_TEMPLATES_KEY,
};
use crate::{
    markdown::{load_extensions, ExtensionConfig, ExtensionHost, ExtensionRegistry, Markdown},
    store::{read_array, read_dict, read_list, write_array, write_dict, write_list, SettingsStore},
};

/// Layout version written once a notebook has been migrated.
pub const LAYOUT_VERSION: &str = "0";

pub const DEFAULT_EXTENSIONS: [&str; 8] = [
    "nl2br",
    "strkundr",
    "codehilite",
    "fenced_code",
    "headerid",
    "headerlink",
    "footnotes",
    "asciimathml",
];
pub const DEFAULT_FILE_EXT: &str = ".md";
/// Copied to the attachments folder and inserted as image links.
pub const DEFAULT_ATTACHMENT_IMAGE: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".svg"];
/// Copied to the attachments folder and inserted as plain links.
pub const DEFAULT_ATTACHMENT_DOCUMENT: [&str; 3] = [".pdf", ".doc", ".odt"];
pub const DEFAULT_MATHJAX: &str =
    "http://cdn.mathjax.org/mathjax/latest/MathJax.js?config=TeX-AMS-MML_HTMLorMML";

const EXTENSIONS_KEY: &str = "extensions";
const FILE_EXT_KEY: &str = "fileExt";
const ATTACHMENT_IMAGE_KEY: &str = "attachmentImage";
const ATTACHMENT_DOCUMENT_KEY: &str = "attachmentDocument";
const VERSION_KEY: &str = "version";
const GEOMETRY_KEY: &str = "geometry";
const WINDOW_STATE_KEY: &str = "windowstate";
const MATHJAX_KEY: &str = "mathJax";
const EXTENSIONS_CONFIG_KEY: &str = "extensionsConfig";
const RECENT_NOTES_KEY: &str = "recentViewedNoteList";

/// Settings of one notebook, read from `notebook.conf` and `template_settings.conf`.
///
/// Every setter writes to disk before returning.
#[derive(Debug)]
pub struct NotebookSettings<R = Markdown> {
    name: String,
    paths: NotebookPaths,
    store: SettingsStore,
    template_store: SettingsStore,
    extensions: Vec<String>,
    faulty_extensions: Vec<String>,
    file_ext: String,
    attachment_image: Vec<String>,
    attachment_document: Vec<String>,
    version: Option<String>,
    geometry: Option<Vec<u8>>,
    window_state: Option<Vec<u8>>,
    mathjax: String,
    extension_config: ExtensionConfig,
    title_templates: Vec<TitleTemplate>,
    body_title_pairs: Vec<BodyTitlePair>,
    markdown: R,
}

impl NotebookSettings<Markdown> {
    /// Opens `notebook` using the installed markdown extensions.
    pub fn open(notebook: &Notebook) -> eyre::Result<Self> {
        Self::open_with(notebook, &ExtensionRegistry::default())
    }
}

impl<R> NotebookSettings<R> {
    /// Loads the notebook settings, filling in defaults and migrating old layouts.
    pub fn open_with<H>(notebook: &Notebook, host: &H) -> eyre::Result<Self>
    where
        H: ExtensionHost<Renderer = R>,
    {
        let paths = NotebookPaths::new(&notebook.path);
        std::fs::create_dir_all(paths.root())
            .wrap_err_with(|| format!("Could not create notebook folder {:?}", paths.root()))?;

        let config_file = paths.config_file();
        if !config_file.exists() {
            tracing::info!(notebook = %notebook.name, "No notebook configuration found, using defaults");
        }
        let mut store = SettingsStore::open(config_file);

        let mut extensions = read_list(&store, EXTENSIONS_KEY);
        let mut file_ext = store.text(FILE_EXT_KEY).unwrap_or_default();
        let mut attachment_image = read_list(&store, ATTACHMENT_IMAGE_KEY);
        let mut attachment_document = read_list(&store, ATTACHMENT_DOCUMENT_KEY);
        let mut version = store
            .text(VERSION_KEY)
            .filter(|version| !version.trim().is_empty());
        let geometry = store.bytes(GEOMETRY_KEY);
        let window_state = store.bytes(WINDOW_STATE_KEY);
        let mut mathjax = store.text(MATHJAX_KEY).unwrap_or_default();
        let extension_config = read_dict(&store, EXTENSIONS_CONFIG_KEY);

        if extensions.is_empty() {
            extensions = to_strings(&DEFAULT_EXTENSIONS);
            write_list(&mut store, EXTENSIONS_KEY, &extensions)?;
        }

        let loaded = load_extensions(host, &mut extensions, &extension_config)
            .wrap_err("Could not initialize the markdown renderer")?;

        if file_ext.is_empty() {
            file_ext = DEFAULT_FILE_EXT.to_string();
            store.set_value(FILE_EXT_KEY, file_ext.as_str())?;
        }

        if attachment_image.is_empty() {
            attachment_image = to_strings(&DEFAULT_ATTACHMENT_IMAGE);
            write_list(&mut store, ATTACHMENT_IMAGE_KEY, &attachment_image)?;
        }

        if attachment_document.is_empty() {
            attachment_document = to_strings(&DEFAULT_ATTACHMENT_DOCUMENT);
            write_list(&mut store, ATTACHMENT_DOCUMENT_KEY, &attachment_document)?;
        }

        if version.is_none() {
            migrate_layout(&paths)?;
            store.set_value(VERSION_KEY, LAYOUT_VERSION)?;
            version = Some(LAYOUT_VERSION.to_string());
        }

        if mathjax.is_empty() {
            mathjax = DEFAULT_MATHJAX.to_string();
            store.set_value(MATHJAX_KEY, mathjax.as_str())?;
        }

        // the migration may have moved templates/ into notes/
        let templates = paths.templates();
        let templates_existed = templates.exists();
        if !templates_existed {
            std::fs::create_dir_all(&templates)
                .wrap_err_with(|| format!("Could not create templates folder {templates:?}"))?;
        }
        let template_store = SettingsStore::open(paths.templates_config_file());
        let (title_templates, body_title_pairs): (Vec<TitleTemplate>, Vec<BodyTitlePair>) =
            if templates_existed {
                (
                    read_array(&template_store, TITLE_TEMPLATES_KEY),
                    read_array(&template_store, BODY_TITLE_PAIRS_KEY),
                )
            } else {
                (vec![], vec![])
            };

        if !loaded.faulty.is_empty() {
            tracing::warn!(
                notebook = %notebook.name,
                faulty = ?loaded.faulty,
                "Some markdown extensions were disabled for this session"
            );
        }

        Ok(Self {
            name: notebook.name.clone(),
            paths,
            store,
            template_store,
            extensions,
            faulty_extensions: loaded.faulty,
            file_ext,
            attachment_image,
            attachment_document,
            version,
            geometry,
            window_state,
            mathjax,
            extension_config,
            title_templates,
            body_title_pairs,
            markdown: loaded.renderer,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn paths(&self) -> &NotebookPaths {
        &self.paths
    }

    /// Extensions the renderer was built with.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Extensions disabled during this session because they failed to load.
    pub fn faulty_extensions(&self) -> &[String] {
        &self.faulty_extensions
    }

    pub fn markdown(&self) -> &R {
        &self.markdown
    }

    pub fn file_ext(&self) -> &str {
        &self.file_ext
    }

    pub fn attachment_image(&self) -> &[String] {
        &self.attachment_image
    }

    pub fn attachment_document(&self) -> &[String] {
        &self.attachment_document
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn geometry(&self) -> Option<&[u8]> {
        self.geometry.as_deref()
    }

    pub fn window_state(&self) -> Option<&[u8]> {
        self.window_state.as_deref()
    }

    pub fn mathjax(&self) -> &str {
        &self.mathjax
    }

    pub fn extension_config(&self) -> &ExtensionConfig {
        &self.extension_config
    }

    pub fn save_geometry(&mut self, geometry: &[u8]) -> eyre::Result<()> {
        self.store.set_value(GEOMETRY_KEY, geometry)?;
        self.geometry = Some(geometry.to_vec());
        Ok(())
    }

    pub fn save_window_state(&mut self, state: &[u8]) -> eyre::Result<()> {
        self.store.set_value(WINDOW_STATE_KEY, state)?;
        self.window_state = Some(state.to_vec());
        Ok(())
    }

    pub fn recent_viewed_notes(&self) -> Vec<String> {
        read_list(&self.store, RECENT_NOTES_KEY)
    }

    pub fn update_recent_viewed_notes(&mut self, notes: &[String]) -> eyre::Result<()> {
        write_list(&mut self.store, RECENT_NOTES_KEY, notes)
    }

    pub fn title_templates(&self) -> &[TitleTemplate] {
        &self.title_templates
    }

    /// Changes are kept in memory until [`Self::update_title_templates`].
    pub fn title_templates_mut(&mut self) -> &mut Vec<TitleTemplate> {
        &mut self.title_templates
    }

    pub fn update_title_templates(&mut self) -> eyre::Result<()> {
        write_array(
            &mut self.template_store,
            TITLE_TEMPLATES_KEY,
            &self.title_templates,
        )
    }

    pub fn body_title_pairs(&self) -> &[BodyTitlePair] {
        &self.body_title_pairs
    }

    /// Changes are kept in memory until [`Self::update_body_title_pairs`].
    pub fn body_title_pairs_mut(&mut self) -> &mut Vec<BodyTitlePair> {
        &mut self.body_title_pairs
    }

    pub fn update_body_title_pairs(&mut self) -> eyre::Result<()> {
        write_array(
            &mut self.template_store,
            BODY_TITLE_PAIRS_KEY,
            &self.body_title_pairs,
        )
    }

    /// Body template files in the templates folder.
    pub fn body_templates(&self) -> eyre::Result<Vec<PathBuf>> {
        list_body_templates(&self.paths.templates(), &self.file_ext)
    }

    /// Stores the extension list, the renderer picks it up the next time the notebook is opened.
    pub fn update_extensions(&mut self, extensions: Vec<String>) -> eyre::Result<()> {
        write_list(&mut self.store, EXTENSIONS_KEY, &extensions)?;
        self.extensions = extensions;
        Ok(())
    }

    pub fn update_extension_config(&mut self, config: ExtensionConfig) -> eyre::Result<()> {
        write_dict(&mut self.store, EXTENSIONS_CONFIG_KEY, &config)?;
        self.extension_config = config;
        Ok(())
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
