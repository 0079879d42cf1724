use crate::artifact::Interaction;
use crate::context::Context;
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// GenerationRequest / GenerationOutcome
// ---------------------------------------------------------------------------

/// Everything a generation backend needs for one call: the assembled context
/// and, on the update path, the prior conversation window in chronological
/// order.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub context: Context,
    pub history: Vec<Interaction>,
}

impl GenerationRequest {
    pub fn new(context: Context) -> Self {
        Self {
            context,
            history: Vec::new(),
        }
    }

    pub fn with_history(context: Context, history: Vec<Interaction>) -> Self {
        Self { context, history }
    }
}

/// The terminal result of a generation call. Either field may be absent: a
/// backend can return document content, conversational commentary, both, or
/// neither.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutcome {
    pub content: Option<String>,
    pub commentary: Option<String>,
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// The external LLM-generation collaborator. The core assembles a [`Context`]
/// and hands it over; prompt templates, providers, and transport are entirely
/// the implementor's concern.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Drive one generation call to completion.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutcome>;

    /// Streaming variant: deliver partial output chunks over `chunks` as they
    /// become available, then return the terminal outcome. The default
    /// implementation does not stream and falls back to [`generate`](Self::generate).
    async fn generate_streaming(
        &self,
        request: GenerationRequest,
        chunks: mpsc::Sender<String>,
    ) -> Result<GenerationOutcome> {
        drop(chunks);
        self.generate(request).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
