//! Publisher that records nothing upstream and fabricates a share URN.

use chrono::Utc;

use crate::error::LinkedinError;

/// Stand-in publisher for local development and demos.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunPublisher;

impl DryRunPublisher {
    /// Logs the post and returns `urn:li:share:{unix_millis}`.
    ///
    /// # Errors
    ///
    /// Returns [`LinkedinError::MissingToken`] when `access_token` is blank.
    pub fn publish(
        &self,
        access_token: &str,
        text: &str,
        image_url: Option<&str>,
    ) -> Result<String, LinkedinError> {
        if access_token.trim().is_empty() {
            return Err(LinkedinError::MissingToken);
        }
        let preview: String = text.chars().take(80).collect();
        tracing::info!(
            preview = %preview,
            image_url = image_url.unwrap_or("none"),
            "dry-run LinkedIn publish"
        );
        Ok(format!("urn:li:share:{}", Utc::now().timestamp_millis()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_share_urn() {
        let id = DryRunPublisher.publish("tok", "Hello", None).unwrap();
        assert!(id.starts_with("urn:li:share:"));
        assert!(id["urn:li:share:".len()..].parse::<i64>().is_ok());
    }

    #[test]
    fn blank_token_is_rejected() {
        assert!(matches!(
            DryRunPublisher.publish(" ", "Hello", None),
            Err(LinkedinError::MissingToken)
        ));
    }
}
