use std::{
    env::{self, VarError},
    fs::{self, File},
    path::{Path, PathBuf},
    time::Duration,
};

use browse_core::{error::Error, loader::LoaderConfig, webapi::WebApiConfig};
use platform_dirs::AppDirs;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "Browse";
const CONFIG_FILENAME: &str = "config.json";
const PROXY_ENV_VAR: &str = "HTTPS_PROXY";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub client_version: String,
    pub language: String,
    pub region: String,
    pub fetch_timeout_secs: u64,
    /// How close to the end of the list the viewer gets before asking for
    /// more.
    pub lookahead: usize,
    /// Items printed per screen.
    pub rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        let web = WebApiConfig::default();
        Self {
            base_url: web.base_url,
            client_version: web.client_version,
            language: web.hl,
            region: web.gl,
            fetch_timeout_secs: LoaderConfig::default().fetch_timeout.as_secs(),
            lookahead: 3,
            rows: 10,
        }
    }
}

impl Config {
    fn app_dirs() -> Option<AppDirs> {
        const USE_XDG_ON_MACOS: bool = false;

        AppDirs::new(Some(APP_NAME), USE_XDG_ON_MACOS)
    }

    pub fn config_dir() -> Option<PathBuf> {
        Self::app_dirs().map(|dirs| dirs.config_dir)
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(CONFIG_FILENAME))
    }

    pub fn load() -> Result<Option<Config>, Error> {
        let path = Self::config_path()
            .ok_or_else(|| Error::ConfigError("failed to get config path".into()))?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Option<Config>, Error> {
        match File::open(path) {
            Ok(file) => {
                log::info!("loading config: {:?}", path);
                Ok(Some(serde_json::from_reader(file)?))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self) -> Result<(), Error> {
        let path = Self::config_path()
            .ok_or_else(|| Error::ConfigError("failed to get config path".into()))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Error> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn proxy() -> Option<String> {
        env::var(PROXY_ENV_VAR).map_or_else(
            |err| match err {
                VarError::NotPresent => None,
                VarError::NotUnicode(_) => {
                    log::error!("proxy URL is not a valid unicode");
                    None
                }
            },
            Some,
        )
    }

    pub fn web_api(&self) -> WebApiConfig {
        WebApiConfig {
            base_url: self.base_url.clone(),
            client_version: self.client_version.clone(),
            hl: self.language.clone(),
            gl: self.region.clone(),
            proxy_url: Self::proxy(),
            ..WebApiConfig::default()
        }
    }

    pub fn loader(&self) -> LoaderConfig {
        LoaderConfig {
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs.max(1)),
        }
    }
}
