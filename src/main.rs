use eyre::eyre;
use notekeeper::{
    logging::init_logging,
    settings::{save_settings, Settings},
    Notebook, NotebookSettings,
};

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let mut settings = Settings::new()?;
    let _guard = init_logging(settings.debug);

    let notebook = match std::env::args_os().nth(1) {
        Some(path) => {
            let notebook = Notebook::from_path(path);
            if settings.add_notebook(notebook.clone()) {
                tracing::info!(notebook = %notebook.name, "Adding notebook to the notebook list");
                save_settings(&settings)?;
            }
            notebook
        }
        None => settings.notebooks.first().cloned().ok_or_else(|| {
            eyre!("No notebook configured, start with the notebook folder as the first argument")
        })?,
    };

    let notebook_settings = NotebookSettings::open(&notebook)?;
    tracing::info!(
        notebook = %notebook_settings.name(),
        path = %notebook_settings.paths().root().display(),
        extensions = ?notebook_settings.extensions(),
        file_ext = notebook_settings.file_ext(),
        "Notebook opened"
    );

    let faulty = notebook_settings.faulty_extensions();
    if !faulty.is_empty() {
        println!(
            "The following markdown extensions could not be loaded and were disabled: {}",
            faulty.join(", ")
        );
        println!("Remove them from the notebook settings to disable them permanently");
    }

    let title_templates = notebook_settings.title_templates().len();
    let body_templates = notebook_settings.body_templates()?.len();
    println!(
        "Opened notebook {} ({} title templates, {} body templates)",
        notebook_settings.name(),
        title_templates,
        body_templates
    );

    Ok(())
}
