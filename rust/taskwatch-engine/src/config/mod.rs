//! Configuration management for the compliance engine.
//!
//! Configuration is loaded in layers: built-in defaults, an optional
//! `config/taskwatch` file, then environment variables with the `TASKWATCH`
//! prefix (`__` separator). A `.env` file is honored when present.
//!
//! The historical grace-period fallbacks (15-minute start tolerance,
//! 60-minute window after the last occurrence of a day) are named constants
//! here rather than literals scattered through the classification logic.

use serde::{Deserialize, Serialize};

/// Default grace period, in minutes, after an occurrence's nominal time
/// before it counts as past due.
pub const DEFAULT_START_TOLERANCE_MIN: i64 = 15;

/// Completion window, in minutes, granted to a started occurrence that has
/// no later occurrence on the same day.
pub const LAST_OCCURRENCE_WINDOW_MIN: i64 = 60;

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Classification defaults.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Privileged job authentication.
    #[serde(default)]
    pub auth: AuthConfig,
    /// HTTP trigger surface.
    #[serde(default)]
    pub trigger: TriggerConfig,
}

/// Classification defaults applied when task definitions omit them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Grace period after an occurrence's nominal time, in minutes.
    pub default_tolerance_minutes: i64,
    /// Completion window for the last occurrence of a day, in minutes.
    pub last_occurrence_window_minutes: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_tolerance_minutes: DEFAULT_START_TOLERANCE_MIN,
            last_occurrence_window_minutes: LAST_OCCURRENCE_WINDOW_MIN,
        }
    }
}

/// Privileged authentication configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Service credential establishing the privileged job identity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_credential: Option<String>,
    /// Subject name the run executes as.
    #[serde(default = "default_subject")]
    pub subject: String,
}

fn default_subject() -> String {
    "taskwatch-job".to_owned()
}

/// HTTP trigger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Host to bind the trigger server to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Shared secret required as the `key` query parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_secret: Option<String>,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8090,
            shared_secret: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, config files, and environment.
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            // Start with defaults
            .set_default("engine.default_tolerance_minutes", DEFAULT_START_TOLERANCE_MIN)?
            .set_default(
                "engine.last_occurrence_window_minutes",
                LAST_OCCURRENCE_WINDOW_MIN,
            )?
            .set_default("auth.subject", "taskwatch-job")?
            .set_default("trigger.host", "127.0.0.1")?
            .set_default("trigger.port", 8090)?
            // Add config file if it exists
            .add_source(config::File::with_name("config/taskwatch").required(false))
            // Override with environment variables
            .add_source(
                config::Environment::with_prefix("TASKWATCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

        // Secrets are also accepted via their conventional flat names.
        if let Ok(credential) = std::env::var("TASKWATCH_SERVICE_CREDENTIAL") {
            app_config.auth.service_credential = Some(credential);
        }
        if let Ok(secret) = std::env::var("TASKWATCH_TRIGGER_SECRET") {
            app_config.trigger.shared_secret = Some(secret);
        }

        app_config.validate()?;
        Ok(app_config)
    }

    /// Validate value ranges.
    fn validate(&self) -> anyhow::Result<()> {
        if self.engine.default_tolerance_minutes < 0 {
            anyhow::bail!("engine.default_tolerance_minutes must not be negative");
        }
        if self.engine.last_occurrence_window_minutes <= 0 {
            anyhow::bail!("engine.last_occurrence_window_minutes must be positive");
        }
        Ok(())
    }
}
