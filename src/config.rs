use std::path::PathBuf;

pub const APP_NAME: &str = "notekeeper";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Folder holding the application config and log file.
#[cfg(target_family = "unix")]
pub fn get_config_folder() -> PathBuf {
    unix_config_folder(
        std::env::var("XDG_CONFIG_HOME").ok(),
        std::env::var("HOME").ok(),
    )
}

#[cfg(windows)]
pub fn get_config_folder() -> PathBuf {
    windows_config_folder(std::env::var("APPDATA").ok())
}

pub fn get_config_file() -> PathBuf {
    get_config_folder().join(CONFIG_FILE_NAME)
}

/// An empty `XDG_CONFIG_HOME` counts as unset. Without either variable the
/// folder is relative to the working directory.
#[cfg(target_family = "unix")]
fn unix_config_folder(xdg_config_home: Option<String>, home: Option<String>) -> PathBuf {
    let non_empty = |value: Option<String>| value.filter(|value| !value.is_empty());
    match (non_empty(xdg_config_home), non_empty(home)) {
        (Some(config_home), _) => PathBuf::from(config_home).join(APP_NAME),
        (None, Some(home)) => PathBuf::from(home).join(".config").join(APP_NAME),
        (None, None) => PathBuf::from(APP_NAME),
    }
}

#[cfg(windows)]
fn windows_config_folder(app_data: Option<String>) -> PathBuf {
    match app_data.filter(|value| !value.is_empty()) {
        Some(app_data) => PathBuf::from(app_data).join(APP_NAME),
        None => PathBuf::from(APP_NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[test]
    #[cfg(target_family = "unix")]
    fn xdg_config_home_wins_over_home() {
        assert_eq!(
            unix_config_folder(some("/xdg"), some("/home/ada")),
            PathBuf::from("/xdg/notekeeper")
        );
    }

    #[test]
    #[cfg(target_family = "unix")]
    fn home_only_uses_dot_config() {
        assert_eq!(
            unix_config_folder(None, some("/home/ada")),
            PathBuf::from("/home/ada/.config/notekeeper")
        );
    }

    #[test]
    #[cfg(target_family = "unix")]
    fn empty_xdg_config_home_falls_back_to_home() {
        assert_eq!(
            unix_config_folder(some(""), some("/home/ada")),
            PathBuf::from("/home/ada/.config/notekeeper")
        );
    }

    #[test]
    #[cfg(target_family = "unix")]
    fn no_env_uses_relative_folder() {
        assert_eq!(unix_config_folder(None, None), PathBuf::from("notekeeper"));
    }

    #[test]
    #[cfg(windows)]
    fn app_data_holds_the_folder() {
        assert_eq!(
            windows_config_folder(some("C:\\Users\\ada\\AppData\\Roaming")),
            PathBuf::from("C:\\Users\\ada\\AppData\\Roaming").join("notekeeper")
        );
        assert_eq!(windows_config_folder(None), PathBuf::from("notekeeper"));
    }

    #[test]
    fn config_file_is_toml_in_config_folder() {
        let file = get_config_file();
        assert_eq!(file.file_name().and_then(|name| name.to_str()), Some("config.toml"));
        assert_eq!(file.parent(), Some(get_config_folder().as_path()));
    }
}
