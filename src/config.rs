use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_ENV: &str = "SCHOOLD_CONFIG";
const DEFAULT_IMPORT_MAX_ROWS: usize = 5000;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_filter: String,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Uploads with more data rows than this are refused outright.
    pub max_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            import: ImportConfig::default(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_IMPORT_MAX_ROWS,
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let path = path.as_ref();
    tracing::debug!("loading configuration from {:?}", path);
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    parse_config(&text).with_context(|| format!("failed to parse config file {:?}", path))
}

pub fn parse_config(text: &str) -> anyhow::Result<Config> {
    let cfg: Config = toml::from_str(text)?;
    if cfg.import.max_rows == 0 {
        anyhow::bail!("import.max_rows must be at least 1");
    }
    Ok(cfg)
}

/// Config from `$SCHOOLD_CONFIG` when set, otherwise defaults.
pub fn load_from_env() -> anyhow::Result<Config> {
    match std::env::var_os(CONFIG_ENV) {
        Some(p) if !p.is_empty() => load_config(p),
        _ => Ok(Config::default()),
    }
}
