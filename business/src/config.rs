use std::path::PathBuf;

use serde::Deserialize;

use crate::history::HISTORY_KEY;
use crate::render::DEFAULT_MARGIN;

#[derive(Debug, Clone)]
pub struct BusinessConfig {
    /// Name of the durable slot holding the history.
    pub storage_key: String,
    /// Quiet zone around rendered codes, in modules.
    pub margin: u32,
    /// Where the native build keeps its storage files.
    pub data_dir: PathBuf,
    /// Where the native build writes downloaded PNGs.
    pub download_dir: PathBuf,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            storage_key: HISTORY_KEY.to_owned(),
            margin: DEFAULT_MARGIN,
            data_dir: default_data_dir(),
            download_dir: default_download_dir(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("qrgenie")
}

#[cfg(not(target_arch = "wasm32"))]
fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(target_arch = "wasm32")]
fn default_data_dir() -> PathBuf {
    PathBuf::new()
}

#[cfg(target_arch = "wasm32")]
fn default_download_dir() -> PathBuf {
    PathBuf::new()
}

#[derive(Debug, Default, Deserialize)]
struct RawEnv {
    qrgenie_data_dir: Option<String>,
    qrgenie_download_dir: Option<String>,
}

impl BusinessConfig {
    /// Defaults, with `QRGENIE_DATA_DIR` / `QRGENIE_DOWNLOAD_DIR` overrides.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, S>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let raw: RawEnv = serde_env::from_iter(vars)?;
        let mut config = Self::default();

        if let Some(dir) = raw.qrgenie_data_dir.filter(|d| !d.is_empty()) {
            log::info!("Using QRGENIE_DATA_DIR={dir}");
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = raw.qrgenie_download_dir.filter(|d| !d.is_empty()) {
            log::info!("Using QRGENIE_DOWNLOAD_DIR={dir}");
            config.download_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BusinessConfig::default();
        assert_eq!(config.storage_key, "qrHistory");
        assert_eq!(config.margin, 2);
        if cfg!(not(target_arch = "wasm32")) {
            assert!(config.data_dir.ends_with("qrgenie"));
        }
    }

    #[test]
    fn environment_overrides_directories() {
        let config = BusinessConfig::from_vars(vec![
            ("QRGENIE_DATA_DIR", "/tmp/qr-data"),
            ("QRGENIE_DOWNLOAD_DIR", "/tmp/qr-downloads"),
            ("UNRELATED", "value"),
        ])
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/qr-data"));
        assert_eq!(config.download_dir, PathBuf::from("/tmp/qr-downloads"));
    }

    #[test]
    fn absent_variables_keep_defaults() {
        let config = BusinessConfig::from_vars(Vec::<(&str, &str)>::new()).unwrap();
        assert_eq!(config.data_dir, BusinessConfig::default().data_dir);
    }
}
