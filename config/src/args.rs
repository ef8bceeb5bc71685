use clap::Parser;
use std::path::PathBuf;

/// Collect statistics from BIND name servers and print them as JSON lines
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// Statistics endpoint to collect from, e.g. `http://localhost:8053/xml/v3`.
    /// May be given multiple times; replaces the configured targets.
    #[clap(long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// Additional YAML configuration file, layered over the user configuration.
    #[clap(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit one gauge per memory context.
    #[clap(long, action)]
    pub gather_memory_contexts: bool,

    /// Emit per-view query type and resolver counters.
    #[clap(long, action)]
    pub gather_views: bool,

    /// HTTP timeout per request, e.g. `5s` or `1m 30s`.
    #[clap(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[clap(long = "verbose", action)]
    pub verbose: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if !self.urls.is_empty() {
                cache.insert("targets".to_string(), self.urls.clone().into());
            }
            if self.gather_memory_contexts {
                cache.insert("gather_memory_contexts".to_string(), true.into());
            }
            if self.gather_views {
                cache.insert("gather_views".to_string(), true.into());
            }
            if let Some(timeout) = &self.timeout {
                cache.insert("timeout".to_string(), timeout.clone().into());
            }
            if self.verbose {
                cache.insert("verbose".to_string(), true.into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();

    format!(
        "\
Authors: {author}

Config directory: {config_dir_path}"
    )
}
