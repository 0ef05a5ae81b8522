use std::path::PathBuf;

use eyre::WrapErr;

use super::NotebookPaths;

const NOTE_SUFFIXES: [&str; 3] = ["md", "mkd", "markdown"];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    /// Entries moved from the notebook root into `notes/`, by name.
    pub moved: Vec<PathBuf>,
    pub removed_legacy_index: bool,
    pub moved_stylesheet: bool,
}

/// Moves a notebook from the flat pre 0.3.0 layout into the current one.
///
/// There is no rollback: the first failing filesystem call aborts the
/// migration and leaves whatever was already moved in place.
pub fn migrate_layout(paths: &NotebookPaths) -> eyre::Result<MigrationSummary> {
    tracing::info!(notebook = %paths.root().display(), "Migrating notebook to the notes/ folder layout");
    let mut summary = MigrationSummary::default();

    let mut to_move = vec![];
    let entries = std::fs::read_dir(paths.root())
        .wrap_err_with(|| format!("Could not list notebook folder {:?}", paths.root()))?;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        if name_str.starts_with('.') {
            continue;
        }
        let file_type = entry.file_type()?;
        let is_note_folder = file_type.is_dir() && name_str != "css" && name_str != "notes";
        let is_note_file = file_type.is_file() && has_note_suffix(&name_str);
        if is_note_folder || is_note_file {
            to_move.push(PathBuf::from(name));
        }
    }
    to_move.sort();

    let notes = paths.notes();
    std::fs::create_dir_all(&notes).wrap_err_with(|| format!("Could not create {notes:?}"))?;
    for name in to_move {
        let from = paths.root().join(&name);
        let to = notes.join(&name);
        tracing::debug!(from = %from.display(), to = %to.display(), "Moving note");
        std::fs::rename(&from, &to)
            .wrap_err_with(|| format!("Could not move {from:?} to {to:?}"))?;
        summary.moved.push(name);
    }

    let legacy_index = paths.legacy_index();
    if legacy_index.exists() {
        //the index is rebuilt from the notes, nothing is lost
        std::fs::remove_dir_all(&legacy_index)
            .wrap_err_with(|| format!("Could not remove old index {legacy_index:?}"))?;
        summary.removed_legacy_index = true;
    }

    let css = paths.css();
    std::fs::create_dir_all(&css).wrap_err_with(|| format!("Could not create {css:?}"))?;
    let legacy_css = paths.legacy_css_file();
    if legacy_css.exists() {
        let css_file = paths.css_file();
        std::fs::rename(&legacy_css, &css_file)
            .wrap_err_with(|| format!("Could not move {legacy_css:?} to {css_file:?}"))?;
        summary.moved_stylesheet = true;
    }

    tracing::info!(
        moved = summary.moved.len(),
        removed_legacy_index = summary.removed_legacy_index,
        moved_stylesheet = summary.moved_stylesheet,
        "Notebook migration finished"
    );
    Ok(summary)
}

fn has_note_suffix(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(stem, suffix)| !stem.is_empty() && NOTE_SUFFIXES.contains(&suffix))
        .unwrap_or(false)
}
