use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use serde::Serialize;

use super::{LogLevel, OutputMode, Settings, smart_load};

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Prefix for environment variable overrides, e.g. `PATHRUN_WORKERS=8`
pub const ENV_PREFIX: &str = "PATHRUN_";

/// Values given on the command line; unset fields leave config untouched
#[derive(Debug, Clone, Default, Serialize)]
pub struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
}

pub struct PathrunConfig {
    figment: Figment,
}

impl PathrunConfig {
    pub fn load() -> Result<Self> {
        Self::load_with_custom_config(None, &CliOverrides::default())
    }

    pub fn load_with_custom_config(custom_config: Option<&str>, overrides: &CliOverrides) -> Result<Self> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG)); // Embedded defaults

        // If custom config is specified, use only that + defaults + env vars
        if let Some(custom_path) = custom_config {
            figment = figment.merge(smart_load::auto(custom_path));
        } else {
            let user_config = Self::user_config_path();
            figment = figment
                // User config - support multiple formats
                .merge(Toml::file(format!("{user_config}.toml")))
                .merge(Json::file(format!("{user_config}.json")))
                .merge(Yaml::file(format!("{user_config}.yaml")))
                .merge(Yaml::file(format!("{user_config}.yml")))
                // Project config in the working directory
                .merge(Toml::file("pathrun.toml"))
                .merge(Json::file("pathrun.json"))
                .merge(Yaml::file("pathrun.yaml"))
                .merge(Yaml::file("pathrun.yml"));
        }

        // Environment variables beat files, command-line flags beat everything
        figment = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides));

        Ok(PathrunConfig { figment })
    }

    /// Extract and validate the merged settings
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .context("Failed to load configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Log level to start logging with, even when the rest of the config is invalid
    pub fn log_level(&self) -> LogLevel {
        self.figment.extract_inner("log_level").unwrap_or_default()
    }

    /// Get the full merged configuration as a structured value
    pub fn get_full_config(&self) -> Result<serde_json::Value> {
        Ok(self.figment.extract()?)
    }

    /// Config file path without extension
    fn user_config_path() -> String {
        match std::env::var("HOME") {
            Ok(home) => format!("{home}/.config/pathrun/config"),
            Err(_) => "~/.config/pathrun/config".to_string(),
        }
    }
}
