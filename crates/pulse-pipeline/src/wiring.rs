use std::sync::Arc;

use pulse_core::AppConfig;
use pulse_linkedin::{DryRunPublisher, LinkedinClient};
use pulse_openai::OpenAiClient;
use pulse_search::TavilyClient;
use pulse_storage::SupabaseStorage;
use sqlx::PgPool;

use crate::capabilities::{CapabilityError, SocialPublisher};
use crate::store::PgStore;
use crate::Capabilities;

/// Builds the HTTP-backed capabilities described by `config` over `pool`.
///
/// # Errors
///
/// Returns [`CapabilityError`] if any client cannot be constructed, e.g. an
/// unparseable base URL.
pub fn production_capabilities(
    config: &AppConfig,
    pool: PgPool,
) -> Result<Capabilities, CapabilityError> {
    let timeout = config.http_timeout_secs;

    let search = TavilyClient::with_base_url(
        config.tavily_api_key.clone(),
        timeout,
        &config.search_base_url,
    )?;
    if !search.has_api_key() {
        tracing::warn!("TAVILY_API_KEY not set; insight search will return no results");
    }

    let openai = Arc::new(
        OpenAiClient::with_base_url(&config.openai_api_key, timeout, &config.openai_base_url)?
            .with_models(&config.openai_model, &config.openai_image_model),
    );

    let blobs = SupabaseStorage::new(
        &config.storage_url,
        &config.storage_service_key,
        &config.storage_bucket,
        timeout,
    )?;

    let publisher: Arc<dyn SocialPublisher> = if config.linkedin_dry_run {
        tracing::warn!("LinkedIn dry run enabled; posts will not be published");
        Arc::new(DryRunPublisher)
    } else {
        Arc::new(LinkedinClient::with_base_url(
            timeout,
            &config.linkedin_base_url,
        )?)
    };

    Ok(Capabilities {
        store: Arc::new(PgStore::new(pool)),
        search: Arc::new(search),
        generator: openai.clone(),
        images: openai,
        blobs: Arc::new(blobs),
        publisher,
    })
}
