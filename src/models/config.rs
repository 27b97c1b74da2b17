//! Configuration model loaded from external sources.

use std::env;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::crawlers::sites::KNOWN_SOURCES;

/// Environment variable naming the YAML configuration file.
pub const CONFIG_PATH_ENV: &str = "PIPELINE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/pipeline";

#[derive(Clone, Debug, Deserialize)]
/// Settings for one pipeline run.
pub struct PipelineConfig {
    pub database_url: String,
    /// Collector names, run in this order.
    pub sources: Vec<String>,
    pub top_n: usize,
    pub batch_size: usize,
    /// Versioned label vocabulary artifact.
    pub labels_path: String,
    pub match_threshold: f32,
    pub collector_concurrency: usize,
    pub collector_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub stage_timeout_secs: u64,
}

impl PipelineConfig {
    /// Load defaults, then the optional YAML file, then `JOBREC_*`
    /// environment overrides. `DATABASE_URL` wins over everything.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let config = Config::builder()
            .set_default("database_url", "jobs.db")?
            .set_default(
                "sources",
                KNOWN_SOURCES.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            )?
            .set_default("top_n", 6)?
            .set_default("batch_size", 4)?
            .set_default("labels_path", "models/labels.json")?
            .set_default("match_threshold", 0.8)?
            .set_default("collector_concurrency", 5)?
            .set_default("collector_timeout_secs", 300)?
            .set_default("request_timeout_secs", 30)?
            .set_default("stage_timeout_secs", 3600)?
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix("JOBREC")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("sources"),
            )
            .set_override_option("database_url", env::var("DATABASE_URL").ok())?
            .build()?;

        let settings: PipelineConfig = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Message("batch_size must be positive".to_string()));
        }
        if self.collector_concurrency == 0 {
            return Err(ConfigError::Message(
                "collector_concurrency must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(ConfigError::Message(
                "match_threshold must be within [0, 1]".to_string(),
            ));
        }
        if let Some(unknown) = self
            .sources
            .iter()
            .find(|source| !KNOWN_SOURCES.contains(&source.as_str()))
        {
            return Err(ConfigError::Message(format!("unknown source {unknown}")));
        }
        Ok(())
    }

    pub fn collector_timeout(&self) -> Duration {
        Duration::from_secs(self.collector_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }
}
