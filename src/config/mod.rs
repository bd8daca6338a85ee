use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const DEFAULT_MODEL: &str = "hermes3";
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_CHAT_TEMPLATE: &str = "chatml";
const DEFAULT_MAX_DEPTH: usize = 5;
const DEFAULT_N_THREADS: u32 = 4;
const DEFAULT_CONFIG_PATH: &str = "config/pythia.toml";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: String,
    pub base_url: String,
    pub chat_template: String,
    pub max_depth: usize,
    pub n_threads: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    model: Option<String>,
    base_url: Option<String>,
    chat_template: Option<String>,
    max_depth: Option<usize>,
    n_threads: Option<u32>,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return read_config(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        match read_config(default_path) {
            Ok(config) => Ok(config),
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!("Configuration file not found; using defaults");
                Ok(Self::default())
            }
            Err(other) => Err(other),
        }
    }

}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_template: DEFAULT_CHAT_TEMPLATE.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            n_threads: DEFAULT_N_THREADS,
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading configuration file");
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(AppConfig {
        model: parsed.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        base_url: parsed
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        chat_template: parsed
            .chat_template
            .unwrap_or_else(|| DEFAULT_CHAT_TEMPLATE.to_string()),
        max_depth: parsed.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
        n_threads: parsed.n_threads.unwrap_or(DEFAULT_N_THREADS),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    static WORKDIR_GUARD: Mutex<()> = Mutex::new(());

    #[test]
    fn returns_default_when_missing() {
        let _lock = WORKDIR_GUARD.lock().expect("lock guard");
        let original_dir = env::current_dir().expect("current dir");
        let temp = tempfile::tempdir().expect("tempdir");
        env::set_current_dir(temp.path()).expect("switch to temp dir");

        let config = AppConfig::load(None).expect("load succeeds");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.chat_template, DEFAULT_CHAT_TEMPLATE);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.n_threads, DEFAULT_N_THREADS);

        env::set_current_dir(original_dir).expect("restore current dir");
    }

    #[test]
    fn reads_model_and_template() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pythia.toml");
        fs::write(
            &path,
            r#"
model = "mistral"
chat_template = "zephyr"
"#,
        )
        .expect("write config");

        let config = AppConfig::load(Some(&path)).expect("load config");
        assert_eq!(config.model, "mistral");
        assert_eq!(config.chat_template, "zephyr");
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn falls_back_to_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pythia.toml");
        fs::write(&path, "max_depth = 3\nn_threads = 8").expect("write");

        let config = AppConfig::load(Some(&path)).expect("load");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.n_threads, 8);
    }

    #[test]
    fn reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pythia.toml");
        fs::write(&path, "model = [not toml").expect("write");

        let err = AppConfig::load(Some(&path)).expect_err("parse failure");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("pythia.toml"));
    }
}
