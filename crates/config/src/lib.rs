//! Configuration loading for the crop advisory service
//!
//! Settings are layered: `config/default.yaml`, then `config/{env}.yaml`,
//! then `KRISHI_`-prefixed environment variables. Missing files are fine;
//! every section has serde defaults so the service boots with no config
//! directory at all. The model credential is NOT part of settings; it is
//! read by the credential gate from the process environment.

mod settings;

pub use settings::{
    GenAiSettings, RuntimeEnvironment, ServerSettings, Settings, StoreSettings,
};

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Load settings for the given environment name (e.g. "production").
///
/// Priority: env vars > `config/{env}.yaml` > `config/default.yaml` > defaults.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder()
        .add_source(config::File::with_name("config/default").required(false));

    if let Some(env) = env {
        builder = builder
            .add_source(config::File::with_name(&format!("config/{env}")).required(false));
    }

    let raw = builder
        .add_source(config::Environment::with_prefix("KRISHI").separator("__"))
        .build()?;

    let settings: Settings = raw.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}
