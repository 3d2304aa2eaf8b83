use std::path::PathBuf;

use clap::{Args, builder::BoolishValueParser};

/// Settings-related flags shared by every command.
#[derive(Debug, Args, Default, Clone)]
pub struct SettingsArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "CHOPLINK_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: SettingsOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SettingsOverrides {
    /// Override the backend base URL.
    #[arg(long = "base-url", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Override the request timeout.
    #[arg(long = "timeout-seconds", value_name = "SECONDS", global = true)]
    pub timeout_seconds: Option<u64>,

    /// Override how long cached queries stay fresh.
    #[arg(long = "cache-stale-seconds", value_name = "SECONDS", global = true)]
    pub cache_stale_seconds: Option<u64>,

    /// Override how many times a failed query is retried.
    #[arg(long = "cache-retry", value_name = "COUNT", global = true)]
    pub cache_retry: Option<u32>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}
