use crate::{AppConfig, SeqAlignError};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "seqalign.toml";

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub path: PathBuf,
    pub exists: bool,
    pub portable: bool,
}

/// Load a config file from an explicit location, falling back to defaults
/// when it does not exist.
pub fn load_config_from(path: &Path) -> Result<LoadedConfig, SeqAlignError> {
    let exists = path.exists();

    let config: AppConfig = if exists {
        let data = fs::read_to_string(path)?;
        toml::from_str(&data).map_err(|e| SeqAlignError::Serialization(e.to_string()))?
    } else {
        AppConfig::default()
    };

    validate_config(&config)?;

    Ok(LoadedConfig {
        portable: config.portable_mode,
        config,
        path: path.to_path_buf(),
        exists,
    })
}

/// Load the config from its default location, writing the defaults there on
/// first run.
pub fn ensure_config(prefer_portable: bool) -> Result<LoadedConfig, SeqAlignError> {
    let (path, portable) = resolve_config_path(prefer_portable)?;
    let mut loaded = ensure_config_at(&path)?;
    loaded.config.portable_mode = portable;
    loaded.portable = portable;
    Ok(loaded)
}

pub fn ensure_config_at(path: &Path) -> Result<LoadedConfig, SeqAlignError> {
    let loaded = load_config_from(path)?;
    if !loaded.exists {
        save_config(path, &loaded.config)?;
    }
    Ok(loaded)
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), SeqAlignError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let data = toml::to_string_pretty(config)
        .map_err(|e| SeqAlignError::Serialization(e.to_string()))?;
    fs::write(path, data)?;
    Ok(())
}

fn validate_config(config: &AppConfig) -> Result<(), SeqAlignError> {
    if config.default_chunk_width == 0 {
        return Err(SeqAlignError::Config(
            "default_chunk_width must be at least 1".to_string(),
        ));
    }
    if !(config.font.size.is_finite() && config.font.size > 0.0) {
        return Err(SeqAlignError::Config(format!(
            "font.size must be positive, got {}",
            config.font.size
        )));
    }
    if !(config.font.advance_ratio.is_finite() && config.font.advance_ratio > 0.0) {
        return Err(SeqAlignError::Config(format!(
            "font.advance_ratio must be positive, got {}",
            config.font.advance_ratio
        )));
    }
    Ok(())
}

fn resolve_config_path(prefer_portable: bool) -> Result<(PathBuf, bool), SeqAlignError> {
    if let Some(portable_path) = portable_config_path() {
        if prefer_portable || portable_path.exists() {
            return Ok((portable_path, true));
        }
    }

    let dirs = ProjectDirs::from("", "", "seqalign")
        .ok_or_else(|| SeqAlignError::Config("Unable to determine config directory".to_string()))?;
    Ok((dirs.config_dir().join(CONFIG_FILE_NAME), false))
}

fn portable_config_path() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
}
