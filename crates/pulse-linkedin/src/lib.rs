pub mod client;
pub mod dry_run;
pub mod error;
pub mod types;

pub use client::LinkedinClient;
pub use dry_run::DryRunPublisher;
pub use error::LinkedinError;
