use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    /// User-visible strings; a manual may override these
    #[serde(default)]
    pub labels: Labels,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Event poll interval for the TUI loop
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Delay between a successful check and the automatic advance
    #[serde(default = "default_ack_delay")]
    pub ack_delay_ms: u64,
    /// Smallest scrollbar thumb, in terminal columns
    #[serde(default = "default_min_thumb")]
    pub min_thumb_width: u16,
}

fn default_tick_rate() -> u64 {
    100
}

fn default_ack_delay() -> u64 {
    500
}

fn default_min_thumb() -> u16 {
    3
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            ack_delay_ms: default_ack_delay(),
            min_thumb_width: default_min_thumb(),
        }
    }
}

impl UiConfig {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    pub fn ack_delay(&self) -> Duration {
        Duration::from_millis(self.ack_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Where logs and other runtime files go
    #[serde(default = "default_state_path")]
    pub state: String,
}

fn default_state_path() -> String {
    ".walkthrough".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state: default_state_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

/// Strings shown to the user.
///
/// Entries mentioning `{{command}}` or `{{expected}}` are handlebars templates
/// rendered with the step's values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub lang: String,
    pub next: String,
    pub restart: String,
    pub previous: String,
    pub warning_title: String,
    pub intro_description: String,
    pub learn_heading: String,
    pub duration_label: String,
    pub default_duration: String,
    pub skill_label: String,
    pub default_skill: String,
    pub tip_label: String,
    pub command_prompt: String,
    pub command_tip: String,
    pub check_button: String,
    pub command_success: String,
    pub command_failure: String,
    pub input_success: String,
    pub input_failure: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            next: "Next step →".to_string(),
            restart: "Start over".to_string(),
            previous: "← Previous step".to_string(),
            warning_title: "Note".to_string(),
            intro_description:
                "This guide shows you step by step how to carry out this task in the system."
                    .to_string(),
            learn_heading: "What you will learn:".to_string(),
            duration_label: "Time".to_string(),
            default_duration: "About 5 minutes".to_string(),
            skill_label: "Skill".to_string(),
            default_skill: "Basic knowledge of the system".to_string(),
            tip_label: "Tip".to_string(),
            command_prompt:
                "Enter <strong>{{command}}</strong> in the command field and press Enter:"
                    .to_string(),
            command_tip: "If you are already in another window, enter /n{{command}} to go straight to {{command}}.".to_string(),
            check_button: "Check command".to_string(),
            command_success: "Correct! The {{command}} window opens.".to_string(),
            command_failure: "Enter {{command}} or /n{{command}} in the command field."
                .to_string(),
            input_success: "Correct!".to_string(),
            input_failure: "Enter {{expected}} in the field.".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from embedded defaults, the user config file, an
    /// explicit file, and `WALKTHROUGH__` environment variables, in that order.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        // User config in ~/.config/walkthrough/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("walkthrough").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("WALKTHROUGH")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.paths.state);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.ui.ack_delay(), Duration::from_millis(500));
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.to_file);
        assert_eq!(config.labels.next, "Next step →");
    }

    #[test]
    fn test_load_explicit_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[ui]\nack_delay_ms = 250\n\n[labels]\nnext = \"Næsta skref →\"\n"
        )
        .unwrap();

        let config = Config::load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(config.ui.ack_delay_ms, 250);
        assert_eq!(config.ui.tick_rate_ms, 100);
        assert_eq!(config.labels.next, "Næsta skref →");
        assert_eq!(config.labels.restart, "Start over");
    }

    #[test]
    fn test_partial_labels_fill_in_defaults() {
        let labels: Labels = toml::from_str("restart = \"Byrja aftur\"").unwrap();
        assert_eq!(labels.restart, "Byrja aftur");
        assert_eq!(labels.previous, Labels::default().previous);
    }

    #[test]
    fn test_logs_path_under_state() {
        let mut config = Config::default();
        config.paths.state = "/tmp/walkthrough-state".to_string();
        assert_eq!(
            config.logs_path(),
            PathBuf::from("/tmp/walkthrough-state/logs")
        );
    }
}
