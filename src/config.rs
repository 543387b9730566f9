use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "gemmaria";
const CONFIG_FILE_ENV: &str = "GEMMARIA_CONFIG";
const ENV_PREFIX: &str = "GEMMARIA";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub backend_url: String,
    /// Where slice images and the rendered report live. Either an
    /// `http(s)://` base URL or a local directory.
    pub asset_root: String,
    pub total_slices: u16,
    pub initial_slice: u16,
    pub prefetch_radius: u16,
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            asset_root: "http://localhost:3000".to_string(),
            total_slices: 154,
            initial_slice: 77,
            prefetch_radius: 5,
            log_level: LogLevel::Info,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let file =
            std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_builder(
            Self::defaults()?
                .add_source(File::with_name(&file).required(false))
                .add_source(Environment::with_prefix(ENV_PREFIX)),
        )
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let defaults = AppConfig::default();
        Config::builder()
            .set_default("backend_url", defaults.backend_url)?
            .set_default("asset_root", defaults.asset_root)?
            .set_default("total_slices", i64::from(defaults.total_slices))?
            .set_default("initial_slice", i64::from(defaults.initial_slice))?
            .set_default("prefetch_radius", i64::from(defaults.prefetch_radius))?
            .set_default("log_level", "info")
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.total_slices == 0 {
            return Err(ConfigError::Message(
                "total_slices must be greater than zero".to_string(),
            ));
        }
        if self.initial_slice >= self.total_slices {
            return Err(ConfigError::Message(format!(
                "initial_slice {} is outside 0..{}",
                self.initial_slice, self.total_slices
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<AppConfig, ConfigError> {
        AppConfig::from_builder(
            AppConfig::defaults()?.add_source(File::from_str(toml, FileFormat::Toml)),
        )
    }

    #[test]
    fn defaults_match_the_stock_study() {
        let config = from_toml("").unwrap();
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert_eq!(config.total_slices, 154);
        assert_eq!(config.initial_slice, 77);
        assert_eq!(config.prefetch_radius, 5);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn file_values_override_defaults() {
        let config = from_toml(
            r#"
            backend_url = "http://inference:9000"
            asset_root = "/srv/gemmaria/public"
            total_slices = 20
            initial_slice = 3
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend_url, "http://inference:9000");
        assert_eq!(config.asset_root, "/srv/gemmaria/public");
        assert_eq!(config.total_slices, 20);
        assert_eq!(config.initial_slice, 3);
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn initial_slice_must_be_in_range() {
        let err = from_toml("total_slices = 10\ninitial_slice = 10").unwrap_err();
        assert!(err.to_string().contains("initial_slice"));
    }

    #[test]
    fn empty_study_is_rejected() {
        assert!(from_toml("total_slices = 0\ninitial_slice = 0").is_err());
    }
}
