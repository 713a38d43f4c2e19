use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::application::ports::{
    GenerationRequest, KnowledgeBaseStore, KnowledgeBaseStoreError, LlmClient, LlmClientError,
    SamplingConfig, StagingStore, StagingStoreError,
};
use crate::domain::{AudioUpload, KnowledgeBase, Recommendation, StoragePath};

use super::prompts::recommendation_prompt;
use super::request_governor::{CooldownCheck, GovernorError, RequestGovernor};
use super::session_registry::SessionContext;

pub struct RecommendationService<L>
where
    L: LlmClient,
{
    llm_client: Arc<L>,
    knowledge_base_store: Arc<dyn KnowledgeBaseStore>,
    staging_store: Arc<dyn StagingStore>,
    governor: RequestGovernor,
    sampling: SamplingConfig,
}

impl<L> RecommendationService<L>
where
    L: LlmClient,
{
    pub fn new(
        llm_client: Arc<L>,
        knowledge_base_store: Arc<dyn KnowledgeBaseStore>,
        staging_store: Arc<dyn StagingStore>,
        governor: RequestGovernor,
        sampling: SamplingConfig,
    ) -> Self {
        Self {
            llm_client,
            knowledge_base_store,
            staging_store,
            governor,
            sampling,
        }
    }

    pub fn governor(&self) -> &RequestGovernor {
        &self.governor
    }

    pub async fn knowledge_base(&self) -> Result<Option<KnowledgeBase>, KnowledgeBaseStoreError> {
        Ok(self
            .knowledge_base_store
            .load()
            .await?
            .filter(|kb| !kb.is_empty()))
    }

    pub async fn analyze(
        &self,
        session: &SessionContext,
        audio: AudioUpload,
    ) -> Result<Recommendation, AnalysisError> {
        self.analyze_on(session, audio, Local::now().date_naive()).await
    }

    /// Produces a recommendation for one recorded call as of `today`.
    ///
    /// The knowledge base is checked before the cooldown, so a request refused
    /// for a missing knowledge base does not start the session's timer. The
    /// staged recording is removed whatever the outcome.
    #[tracing::instrument(
        skip(self, session, audio),
        fields(session_id = %session.id(), filename = %audio.filename, bytes = audio.data.len())
    )]
    pub async fn analyze_on(
        &self,
        session: &SessionContext,
        audio: AudioUpload,
        today: NaiveDate,
    ) -> Result<Recommendation, AnalysisError> {
        let knowledge_base = self
            .knowledge_base()
            .await?
            .ok_or(AnalysisError::MissingKnowledgeBase)?;

        if let CooldownCheck::Blocked { remaining_secs } =
            session.with_cooldown(|state| self.governor.check_cooldown(state))
        {
            return Err(AnalysisError::CooldownActive { remaining_secs });
        }

        let staged_path = StoragePath::for_staged_audio(&audio.filename);
        let result = self
            .stage_and_analyze(&staged_path, &audio, &knowledge_base, today)
            .await;

        if let Err(e) = self.staging_store.delete(&staged_path).await {
            tracing::warn!(
                error = %e,
                path = %staged_path,
                "Failed to delete staged recording"
            );
        }

        match &result {
            Ok(recommendation) => tracing::info!(
                report_chars = recommendation.report.len(),
                "Recommendation generated"
            ),
            Err(e) => tracing::error!(error = %e, "Analysis failed"),
        }

        result
    }

    async fn stage_and_analyze(
        &self,
        staged_path: &StoragePath,
        audio: &AudioUpload,
        knowledge_base: &KnowledgeBase,
        today: NaiveDate,
    ) -> Result<Recommendation, AnalysisError> {
        self.staging_store
            .store(staged_path, audio.data.clone())
            .await?;

        let staged = self.staging_store.fetch(staged_path).await?;
        let file_reference = self
            .llm_client
            .upload_file(&audio.filename, audio.format.as_mime(), staged)
            .await
            .map_err(AnalysisError::Upload)?;
        tracing::debug!(file = %file_reference.name, "Recording uploaded to model provider");

        let prompt = recommendation_prompt(today, knowledge_base);
        let request =
            GenerationRequest::text(prompt, self.sampling).with_attachment(file_reference);

        let report = self
            .governor
            .call_with_retry(|| self.llm_client.generate(&request))
            .await?;

        Ok(Recommendation {
            report,
            generated_on: today,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("knowledge base has not been built yet")]
    MissingKnowledgeBase,
    #[error("please wait {remaining_secs} seconds before running again")]
    CooldownActive { remaining_secs: u64 },
    #[error("API quota reached. Please wait a few minutes and try again.")]
    QuotaExceeded,
    #[error("audio upload: {0}")]
    Upload(LlmClientError),
    #[error("generation: {0}")]
    Generation(LlmClientError),
    #[error("staging: {0}")]
    Staging(#[from] StagingStoreError),
    #[error("knowledge base: {0}")]
    KnowledgeBase(#[from] KnowledgeBaseStoreError),
}

impl From<GovernorError> for AnalysisError {
    fn from(error: GovernorError) -> Self {
        match error {
            GovernorError::QuotaExceeded => Self::QuotaExceeded,
            GovernorError::Provider(e) => Self::Generation(e),
        }
    }
}
