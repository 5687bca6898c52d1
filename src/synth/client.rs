use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    config::Settings,
    wine::{Citation, WineAnalysis},
};

use super::{
    RequestKind, SynthesisError, image, response, schema,
    transport::{GenAiTransport, HttpTransport},
};

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Outcome of free-text research.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Research {
    /// Validated analysis.
    pub analysis: WineAnalysis,
    /// Grounding citations, possibly empty.
    pub sources: Vec<Citation>,
}

/// Client for the two synthesis requests.
///
/// The credential is checked at call time, so a synthesizer can be built
/// without one and only fails when actually used.
#[derive(Clone)]
pub struct WineSynthesizer {
    transport: Arc<dyn GenAiTransport>,
    api_key: Option<String>,
    model: String,
}

impl WineSynthesizer {
    /// Synthesizer over `transport` using [`DEFAULT_MODEL`].
    pub fn new(transport: Arc<dyn GenAiTransport>, api_key: Option<String>) -> Self {
        Self {
            transport,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Overrides the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// HTTP-backed synthesizer configured from `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, SynthesisError> {
        let transport = HttpTransport::new(&settings.base_url, settings.request_timeout())?;
        Ok(Self::new(Arc::new(transport), settings.api_key.clone()).with_model(settings.model.clone()))
    }

    /// Model requests are sent to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Identifies the wine on a label photo given as a data URL.
    pub async fn analyze_from_image(&self, image_data_url: &str) -> Result<WineAnalysis, SynthesisError> {
        let api_key = self.credential()?;
        let img = image::parse_data_url(image_data_url)?;
        info!(model = %self.model, mime = %img.mime_type, "requesting label identification");

        let body = schema::image_request(&img.mime_type, img.data);
        let data = self.send(RequestKind::Image, api_key, body).await?;
        let text = response::extract_text(&data)?;
        response::parse_analysis(&text).inspect_err(|e| warn!(kind = "image", error = %e, "unusable model output"))
    }

    /// Researches a wine described in free text.
    pub async fn research_from_query(&self, query: &str) -> Result<Research, SynthesisError> {
        let api_key = self.credential()?;
        let query = query.trim();
        if query.is_empty() {
            return Err(SynthesisError::EmptyQuery);
        }
        info!(model = %self.model, query, "requesting wine research");

        let data = self
            .send(RequestKind::Research, api_key, schema::research_request(query))
            .await?;
        let text = response::extract_text(&data)?;
        let analysis = response::parse_analysis(&text)
            .inspect_err(|e| warn!(kind = "research", error = %e, "unusable model output"))?;
        let sources = response::extract_citations(&data);
        info!(citations = sources.len(), "research complete");
        Ok(Research { analysis, sources })
    }

    fn credential(&self) -> Result<&str, SynthesisError> {
        self.api_key
            .as_deref()
            .ok_or_else(SynthesisError::credential_missing)
    }

    async fn send(
        &self,
        kind: RequestKind,
        api_key: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, SynthesisError> {
        self.transport
            .generate_content(api_key, &self.model, body)
            .await
            .inspect_err(|e| warn!(kind = kind.as_str(), error = %e, "synthesis request failed"))
    }
}
