pub mod config;
pub mod logging;
pub mod markdown;
pub mod notebook;
pub mod settings;
pub mod store;

pub use notebook::{Notebook, NotebookSettings};
pub use settings::Settings;
