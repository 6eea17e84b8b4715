pub mod app_config;
pub mod config;
pub mod identity;
pub mod models;
pub mod post;

pub use app_config::{AppConfig, DbConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, load_db_config_from_env};
pub use identity::UserId;
pub use models::{
    AnalyticsSnapshot, DraftUpdate, ImageAsset, Insight, NewDraft, NewInsight, PostDraft,
    PostStatus, Profile, ProfileUpdate, Topic, TopicInput,
};
pub use post::PostStructure;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid post status: {0}")]
    InvalidStatus(String),

    #[error("invalid user id: {0}")]
    InvalidUserId(String),
}
