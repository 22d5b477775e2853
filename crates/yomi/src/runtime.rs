//! Host-facing runtime: model lifecycle and generation entry points.

use anyhow::Context as _;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use yomi_core::decoder::GreedyDecoder;
use yomi_core::engine::{Model, ModelLoader, ModelParams};
use yomi_core::session::SessionParams;
use yomi_core::text::to_katakana;

use crate::prompt;

/// Tokens generated per conversion request.
pub const MAX_GENERATED_TOKENS: usize = 32;

/// Process-wide generation runtime.
///
/// Holds the loaded model (shared, read-only) and runs one fresh inference
/// session per request. The lock serializes re-initialization against
/// in-flight requests; requests themselves only take a brief read lock to
/// clone the model reference, so they run concurrently.
pub struct Runtime {
    loader: Box<dyn ModelLoader>,
    model_params: ModelParams,
    session_params: SessionParams,
    model: RwLock<Option<Arc<dyn Model>>>,
}

impl Runtime {
    /// Create a runtime that loads models through `loader`.
    ///
    /// No model is installed yet; generation before [`Runtime::init_model`]
    /// yields the uninitialized-error string.
    pub fn new(loader: Box<dyn ModelLoader>) -> Self {
        Self {
            loader,
            model_params: ModelParams::default(),
            session_params: SessionParams::default(),
            model: RwLock::new(None),
        }
    }

    /// Override the model loading parameters.
    pub fn with_model_params(mut self, params: ModelParams) -> Self {
        self.model_params = params;
        self
    }

    /// Override the per-request session parameters.
    pub fn with_session_params(mut self, params: SessionParams) -> Self {
        self.session_params = params;
        self
    }

    /// Load the model at `path`.
    ///
    /// Idempotent: any previously installed model is released before the
    /// new one is loaded. On failure no model remains installed; the error
    /// is logged and returned.
    pub fn init_model(&self, path: &Path) -> anyhow::Result<()> {
        let mut slot = self.model.write();
        if slot.take().is_some() {
            info!("released previously installed model");
        }

        let loaded = self.loader.load(path, &self.model_params);
        if let Err(e) = &loaded {
            error!("failed to load model from {}: {e}", path.display());
        }
        let model =
            loaded.with_context(|| format!("failed to load model from {}", path.display()))?;

        info!("model loaded from {}", path.display());
        *slot = Some(model);
        Ok(())
    }

    /// Whether a model is currently installed.
    pub fn is_loaded(&self) -> bool {
        self.model.read().is_some()
    }

    /// Generate a continuation of `prompt`.
    ///
    /// The prompt is treated opaquely; callers frame it (see
    /// [`crate::prompt`]) before handing it over. Always returns a string,
    /// never an error: failure cases are encoded in the output per the
    /// decoder's contract.
    pub fn generate(&self, prompt: &str) -> String {
        let model = self.model.read().clone();
        GreedyDecoder::new(model.as_deref())
            .with_session_params(self.session_params.clone())
            .decode(prompt, MAX_GENERATED_TOKENS)
    }

    /// Convert `input` in the given left context.
    ///
    /// Folds the input to katakana, frames it with the conversion
    /// sentinels after the raw left context, and generates greedily.
    pub fn generate_with_context(&self, left_context: &str, input: &str) -> String {
        let framed = prompt::frame(left_context, &to_katakana(input));
        self.generate(&framed)
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("loaded", &self.is_loaded())
            .field("session_params", &self.session_params)
            .finish()
    }
}
