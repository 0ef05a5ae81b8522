use std::path::{Path, PathBuf};

use eyre::WrapErr;

use crate::store::{RecordFields, SettingsRecord};

pub const TITLE_TEMPLATES_KEY: &str = "titleTemplates";
pub const BODY_TITLE_PAIRS_KEY: &str = "bodyTitlePairs";

/// A pattern used to name new notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleTemplate {
    pub friendly_name: String,
    pub content: String,
    pub kind: String,
}

impl SettingsRecord for TitleTemplate {
    const FIELDS: &'static [&'static str] = &["friendlyName", "content", "type"];

    fn from_fields(mut fields: RecordFields) -> Self {
        Self {
            friendly_name: fields.remove("friendlyName").unwrap_or_default(),
            content: fields.remove("content").unwrap_or_default(),
            kind: fields.remove("type").unwrap_or_default(),
        }
    }

    fn to_fields(&self) -> RecordFields {
        RecordFields::from([
            ("friendlyName", self.friendly_name.clone()),
            ("content", self.content.clone()),
            ("type", self.kind.clone()),
        ])
    }
}

/// A body template file combined with one of the title templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyTitlePair {
    pub friendly_name: String,
    pub body_template: String,
    /// Index into the title templates, kept as stored.
    pub title_template: String,
}

impl BodyTitlePair {
    pub fn title_template_index(&self) -> Option<usize> {
        self.title_template.trim().parse().ok()
    }
}

impl SettingsRecord for BodyTitlePair {
    const FIELDS: &'static [&'static str] = &["friendlyName", "bodyTpl", "titleNum"];

    fn from_fields(mut fields: RecordFields) -> Self {
        Self {
            friendly_name: fields.remove("friendlyName").unwrap_or_default(),
            body_template: fields.remove("bodyTpl").unwrap_or_default(),
            title_template: fields.remove("titleNum").unwrap_or_default(),
        }
    }

    fn to_fields(&self) -> RecordFields {
        RecordFields::from([
            ("friendlyName", self.friendly_name.clone()),
            ("bodyTpl", self.body_template.clone()),
            ("titleNum", self.title_template.clone()),
        ])
    }
}

/// Files in `folder` whose name ends with `file_ext`, sorted by name.
pub fn list_body_templates(folder: &Path, file_ext: &str) -> eyre::Result<Vec<PathBuf>> {
    let files = std::fs::read_dir(folder)
        .wrap_err_with(|| format!("Could not list templates in {folder:?}"))?;
    let mut result = vec![];
    for file in files.flatten() {
        let path = file.path();
        let matches = path.is_file()
            && path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .ends_with(file_ext);
        if matches {
            result.push(path);
        }
    }
    result.sort();
    Ok(result)
}
