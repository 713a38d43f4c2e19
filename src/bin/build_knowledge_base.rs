use std::sync::Arc;

use anyhow::Context;

use policy_advisor::application::ports::{DocumentReader, KnowledgeBaseStore, SamplingConfig};
use policy_advisor::application::services::KnowledgeBaseBuilder;
use policy_advisor::infrastructure::llm::GeminiClient;
use policy_advisor::infrastructure::observability::init_tracing;
use policy_advisor::infrastructure::storage::FileKnowledgeBaseStore;
use policy_advisor::infrastructure::text_processing::CompositeDocumentReader;
use policy_advisor::presentation::{Environment, Settings};

/// One-shot knowledge-base build from the configured documents directory.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env()?;
    let settings = Settings::load(environment).context("failed to load settings")?;

    init_tracing(&settings.logging.tracing_config(environment))
        .context("failed to initialize tracing")?;

    let document_reader: Arc<dyn DocumentReader> =
        Arc::new(CompositeDocumentReader::for_documents());
    let store: Arc<dyn KnowledgeBaseStore> = Arc::new(FileKnowledgeBaseStore::new(
        settings.knowledge_base.output_file.clone(),
    ));
    let llm_client = Arc::new(GeminiClient::new(
        settings.llm.api_key.clone(),
        settings.llm.model.clone(),
        Some(settings.llm.base_url.clone()),
    ));

    let builder = KnowledgeBaseBuilder::new(
        document_reader,
        llm_client,
        store,
        settings.knowledge_base.documents_dir.clone(),
        SamplingConfig::default(),
    );

    tracing::info!(
        documents_dir = %builder.documents_dir().display(),
        model = %settings.llm.model,
        "Building knowledge base"
    );

    let report = builder
        .build()
        .await
        .context("knowledge base build failed")?;

    tracing::info!(
        documents_processed = report.documents_processed,
        documents_skipped = report.documents_skipped,
        output = %settings.knowledge_base.output_file.display(),
        "Knowledge base summary saved"
    );

    Ok(())
}
