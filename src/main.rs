use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use policy_advisor::application::ports::{
    DocumentReader, KnowledgeBaseStore, SamplingConfig, StagingStore,
};
use policy_advisor::application::services::{
    KnowledgeBaseBuilder, RecommendationService, RequestGovernor,
};
use policy_advisor::infrastructure::llm::GeminiClient;
use policy_advisor::infrastructure::observability::init_tracing;
use policy_advisor::infrastructure::storage::{FileKnowledgeBaseStore, LocalStagingStore};
use policy_advisor::infrastructure::text_processing::CompositeDocumentReader;
use policy_advisor::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env()?;
    let settings = Settings::load(environment).context("failed to load settings")?;

    init_tracing(&settings.logging.tracing_config(environment))
        .context("failed to initialize tracing")?;

    let llm_client = Arc::new(GeminiClient::new(
        settings.llm.api_key.clone(),
        settings.llm.model.clone(),
        Some(settings.llm.base_url.clone()),
    ));
    let document_reader: Arc<dyn DocumentReader> =
        Arc::new(CompositeDocumentReader::for_documents());
    let knowledge_base_store: Arc<dyn KnowledgeBaseStore> = Arc::new(FileKnowledgeBaseStore::new(
        settings.knowledge_base.output_file.clone(),
    ));
    let staging_store: Arc<dyn StagingStore> = Arc::new(
        LocalStagingStore::new(settings.staging.dir.clone())
            .context("failed to prepare staging directory")?,
    );

    let knowledge_base_builder = Arc::new(KnowledgeBaseBuilder::new(
        document_reader,
        Arc::clone(&llm_client),
        Arc::clone(&knowledge_base_store),
        settings.knowledge_base.documents_dir.clone(),
        SamplingConfig::default(),
    ));

    let governor = RequestGovernor::new(settings.governor.policy());
    tracing::info!(
        model = %llm_client.model(),
        cooldown_secs = governor.policy().cooldown.as_secs(),
        max_attempts = governor.policy().max_attempts,
        "Model provider configured"
    );

    let recommendation_service = Arc::new(RecommendationService::new(
        Arc::clone(&llm_client),
        knowledge_base_store,
        staging_store,
        governor,
        settings.analysis.sampling(),
    ));

    let state = AppState::new(
        knowledge_base_builder,
        recommendation_service,
        settings.max_upload_bytes(),
    );

    match state.recommendation_service.knowledge_base().await {
        Ok(Some(_)) => tracing::info!("Knowledge base ready"),
        Ok(None) => tracing::warn!("Knowledge base not built yet"),
        Err(e) => tracing::warn!(error = %e, "Knowledge base unreadable"),
    }

    let router = create_router(state);

    let host: std::net::IpAddr = settings
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server.host {}", settings.server.host))?;
    let addr = SocketAddr::new(host, settings.server.port);
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
