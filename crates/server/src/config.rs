use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrEngine {
    /// Spawn the `tesseract` binary per image.
    Cli,
    /// In-process libtesseract; needs the `tesseract` feature.
    Leptess,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub ocr_engine: OcrEngine,
    pub tesseract_cmd: PathBuf,
    pub tesseract_data_path: Option<String>,
    pub ocr_languages: String,
    pub ocr_timeout_secs: u64,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_path: PathBuf::from("wattcompare.db"),
            ocr_engine: OcrEngine::Cli,
            tesseract_cmd: PathBuf::from("/usr/bin/tesseract"),
            tesseract_data_path: None,
            ocr_languages: wattcompare_ocr::DEFAULT_LANGUAGES.to_string(),
            ocr_timeout_secs: 60,
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Defaults, then `wattcompare.toml`, then `WATTCOMPARE_*` variables, then a bare `PORT`.
    pub fn load() -> Result<Self> {
        Ok(Self::figment().extract()?)
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("wattcompare.toml"))
            .merge(Env::prefixed("WATTCOMPARE_"))
            .merge(Env::raw().only(&["PORT"]))
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_all_interfaces_on_5000() {
        let cfg = Config::default();
        assert_eq!(cfg.socket_addr().unwrap(), "0.0.0.0:5000".parse().unwrap());
        assert_eq!(cfg.ocr_engine, OcrEngine::Cli);
        assert_eq!(cfg.ocr_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn toml_overrides_defaults() {
        let cfg: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string(
                "port = 8080\nocr_engine = \"leptess\"\ndatabase_path = \"/tmp/w.db\"",
            ))
            .extract()
            .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.ocr_engine, OcrEngine::Leptess);
        assert_eq!(cfg.database_path, PathBuf::from("/tmp/w.db"));
        assert_eq!(cfg.host, "0.0.0.0");
    }

    #[test]
    fn invalid_host_is_rejected() {
        let cfg = Config {
            host: "not a host".into(),
            ..Config::default()
        };
        assert!(cfg.socket_addr().is_err());
    }
}
