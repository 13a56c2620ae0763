use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::MeridianConfig;

pub const DEFAULT_CONFIG_PATHS: &[&str] = &["meridian.toml", "config/meridian.toml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("config file {0} does not exist")]
    Missing(PathBuf),
}

/// 显式传入的路径必须存在；未指定时依次尝试默认路径，都不存在则使用默认配置。
pub fn load_config(path: Option<PathBuf>) -> Result<MeridianConfig, ConfigError> {
    if let Some(explicit) = path {
        return try_load_file(&explicit)?.ok_or(ConfigError::Missing(explicit));
    }

    for candidate in DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from) {
        if let Some(config) = try_load_file(&candidate)? {
            return Ok(config);
        }
    }

    Ok(MeridianConfig::default())
}

fn try_load_file(path: &Path) -> Result<Option<MeridianConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config: MeridianConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[routing]\nhub_chain = \"Optimism\"").expect("write config");

        let config = load_config(Some(file.path().to_path_buf())).expect("load config");
        assert_eq!(config.routing.hub_chain, "Optimism");
        assert_eq!(config.api.base_url, "https://li.quest/v1");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("nope.toml");
        let err = load_config(Some(missing.clone())).expect_err("missing file");
        assert!(matches!(err, ConfigError::Missing(path) if path == missing));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[routing\nhub_chain = 1").expect("write config");

        let err = load_config(Some(file.path().to_path_buf())).expect_err("parse error");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
