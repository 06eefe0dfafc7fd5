//! Discovery of `stencil.toml`.
//!
//! Checks two locations in precedence order:
//! 1. `./stencil.toml` (project-local)
//! 2. `~/.config/stencil/stencil.toml` (user-global)

use std::path::PathBuf;

use super::StencilConfig;

const CONFIG_FILENAME: &str = "stencil.toml";
const GLOBAL_CONFIG_DIR: &str = ".config/stencil";

/// Load config from the first discovered location, or return defaults.
///
/// Unlike [`StencilConfig::from_file`], read and parse failures are logged and
/// fall back to defaults.
pub fn load_config() -> StencilConfig {
    if let Some(path) = find_config_file() {
        match StencilConfig::from_file(&path) {
            Ok(config) => {
                tracing::debug!(?path, "Loaded stencil config");
                return config;
            }
            Err(e) => {
                tracing::warn!(?path, error = %e, "Failed to load stencil config, using defaults");
            }
        }
    }
    StencilConfig::default()
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.is_file() {
        return Some(local);
    }

    let global = home_dir()?.join(GLOBAL_CONFIG_DIR).join(CONFIG_FILENAME);
    global.is_file().then_some(global)
}

/// Resolve a leading `~/` to the home directory.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct HomeGuard(Option<String>);

    impl HomeGuard {
        fn set(path: &std::path::Path) -> Self {
            let previous = std::env::var("HOME").ok();
            std::env::set_var("HOME", path);
            Self(previous)
        }
    }

    impl Drop for HomeGuard {
        fn drop(&mut self) {
            match &self.0 {
                Some(home) => std::env::set_var("HOME", home),
                None => std::env::remove_var("HOME"),
            }
        }
    }

    #[test]
    #[serial]
    fn test_expand_path_tilde() {
        let home = tempfile::tempdir().unwrap();
        let _guard = HomeGuard::set(home.path());
        assert_eq!(expand_path("~/templates"), home.path().join("templates"));
    }

    #[test]
    fn test_expand_path_plain() {
        assert_eq!(expand_path("/srv/templates"), PathBuf::from("/srv/templates"));
        assert_eq!(expand_path("./templates"), PathBuf::from("./templates"));
    }

    #[test]
    #[serial]
    fn test_global_config_is_discovered() {
        let home = tempfile::tempdir().unwrap();
        let dir = home.path().join(GLOBAL_CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILENAME), "auto-reload = false\n").unwrap();
        let _guard = HomeGuard::set(home.path());

        if PathBuf::from(CONFIG_FILENAME).is_file() {
            return;
        }
        assert!(!load_config().auto_reload);
    }

    #[test]
    #[serial]
    fn test_broken_config_falls_back_to_defaults() {
        let home = tempfile::tempdir().unwrap();
        let dir = home.path().join(GLOBAL_CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILENAME), "template-paths = 3").unwrap();
        let _guard = HomeGuard::set(home.path());

        if PathBuf::from(CONFIG_FILENAME).is_file() {
            return;
        }
        assert_eq!(load_config(), StencilConfig::default());
    }
}
