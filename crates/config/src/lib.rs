// Configuration loading

pub mod settings;

pub use settings::{
    config_dir, AssistantSettings, ConfigError, ExportSettings, SessionSettings, Settings,
    ASSISTANT_URL_ENV,
};
