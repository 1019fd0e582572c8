//! Configuration loader for Waymark.
//!
//! Reads `waymark.toml` (or an explicit path) and deserializes it into
//! [`WaymarkConfig`]. Falls back to defaults when the file is missing or
//! malformed.

use std::path::{Path, PathBuf};

use waymark_types::config::WaymarkConfig;

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "waymark.toml";

/// Load configuration from `path`, or from `./waymark.toml` if `None`.
///
/// - If the file does not exist, returns [`WaymarkConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub fn load_config(path: Option<&Path>) -> WaymarkConfig {
    let config_path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);

    let content = match std::fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", config_path.display());
            return WaymarkConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return WaymarkConfig::default();
        }
    };

    match toml::from_str::<WaymarkConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            WaymarkConfig::default()
        }
    }
}

/// Resolve the directory holding workflow definitions.
///
/// Relative `definitions_dir` values are resolved against the directory of
/// the config file.
pub fn resolve_definitions_dir(config: &WaymarkConfig, config_path: Option<&Path>) -> PathBuf {
    let dir = Path::new(&config.definitions_dir);
    if dir.is_absolute() {
        return dir.to_path_buf();
    }

    match config_path.and_then(Path::parent) {
        Some(base) if !base.as_os_str().is_empty() => base.join(dir),
        _ => dir.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(Some(&tmp.path().join("waymark.toml")));
        assert_eq!(config.log_filter, "warn");
        assert!(config.strict_definitions);
    }

    #[test]
    fn test_load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("waymark.toml");
        std::fs::write(
            &config_path,
            r#"
log_filter = "waymark=debug"
enable_otel = true
definitions_dir = "flows"
"#,
        )
        .unwrap();

        let config = load_config(Some(&config_path));
        assert_eq!(config.log_filter, "waymark=debug");
        assert!(config.enable_otel);
        assert_eq!(config.definitions_dir, "flows");
        assert!(config.strict_definitions);
    }

    #[test]
    fn test_load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("waymark.toml");
        std::fs::write(&config_path, "this is not valid toml {{{").unwrap();

        let config = load_config(Some(&config_path));
        assert_eq!(config.definitions_dir, "workflows");
    }

    #[test]
    fn test_definitions_dir_is_relative_to_config_file() {
        let config = WaymarkConfig::default();
        assert_eq!(
            resolve_definitions_dir(&config, Some(Path::new("/etc/waymark/waymark.toml"))),
            PathBuf::from("/etc/waymark/workflows")
        );
        assert_eq!(
            resolve_definitions_dir(&config, Some(Path::new("waymark.toml"))),
            PathBuf::from("workflows")
        );
        assert_eq!(resolve_definitions_dir(&config, None), PathBuf::from("workflows"));
    }
}
