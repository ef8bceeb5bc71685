#[macro_use]
extern crate tracing;

mod app_config;
mod args;

use app_config::AppConfig;
pub use app_config::get_config_dir;
pub use args::Args;
use bind_stats_gatherer::{
    CollectionConfig,
    Target,
};
use color_eyre::Result;
use eyre::Context as _;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::HashMap,
    path::Path,
    time::Duration,
};
use url::Url;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten, skip_serializing)]
    pub(crate) app_config: AppConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<Url>,
    #[serde(default)]
    pub gather_memory_contexts: bool,
    #[serde(default)]
    pub gather_views: bool,
    /// Per-request HTTP timeout, humantime syntax.
    pub timeout: String,
    #[serde(default)]
    pub verbose: bool,
}

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl config::Source for Config {
    fn clone_into_box(&self) -> Box<dyn config::Source + Send + Sync> {
        Box::new((*self).clone())
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        let mut cache = HashMap::<String, config::Value>::new();
        if !self.targets.is_empty() {
            cache.insert(
                "targets".to_string(),
                self.targets.iter().map(Url::to_string).collect::<Vec<_>>().into(),
            );
        }
        cache.insert("gather_memory_contexts".to_string(), self.gather_memory_contexts.into());
        cache.insert("gather_views".to_string(), self.gather_views.into());
        cache.insert("timeout".to_string(), self.timeout.clone().into());
        cache.insert("verbose".to_string(), self.verbose.into());
        Ok(cache)
    }
}

impl Config {
    /// Layers defaults, the user's `config.yaml`, an explicit `--config` file
    /// and finally the command-line arguments.
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        Self::build(args, &get_config_dir())
    }

    #[instrument(level = "debug", skip(args))]
    fn build(args: Args, config_dir: &Path) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?;

        builder = builder.add_source(Config::default());

        let config_files = [("config.yaml", config::FileFormat::Yaml)];

        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
        }

        if let Some(path) = &args.config {
            debug!(?path, "adding explicit config file");
            builder = builder.add_source(config::File::from(path.as_path()).format(config::FileFormat::Yaml));
        }

        builder = builder.add_source(args);

        let cfg: Self = builder.build()?.try_deserialize()?;

        Ok(cfg)
    }

    pub fn config_dir(&self) -> &Path {
        &self.app_config.config_dir
    }

    pub fn collection(&self) -> CollectionConfig {
        CollectionConfig::new(self.gather_memory_contexts, self.gather_views)
    }

    pub fn timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.timeout).wrap_err_with(|| format!("Invalid timeout {:?}", self.timeout))
    }

    pub fn targets(&self) -> Vec<Target> {
        self.targets.iter().cloned().map(Target::from).collect()
    }
}
