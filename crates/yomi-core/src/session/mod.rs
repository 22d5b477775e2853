//! Per-request inference sessions.
//!
//! A session is created fresh for every decoding request, owns the engine's
//! transformer state (attention cache) for that request, and is destroyed
//! unconditionally when the request ends. Sessions are never reused or
//! shared; recreating them per request trades priming overhead for a
//! stateless request boundary.

use crate::engine::{Model, Session};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Per-session engine configuration.
///
/// Fixed for every request in this design; not request-configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionParams {
    /// Context window in tokens.
    pub n_ctx: usize,
    /// Compute threads for single-token steps.
    pub n_threads: usize,
    /// Compute threads for batched steps.
    pub n_threads_batch: usize,
    /// Maximum tokens per submitted batch.
    pub n_batch: usize,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            n_ctx: 512,
            n_threads: 4,
            n_threads_batch: 4,
            n_batch: 512,
        }
    }
}

/// Open a session on `model`.
///
/// Creation failure is logged and returned to the caller, which must treat
/// it as terminal for the request. The returned session is released by
/// dropping it; the caller that opens a session owns that release on every
/// exit path.
pub fn open<'m>(model: &'m dyn Model, params: &SessionParams) -> Result<Box<dyn Session + 'm>> {
    match model.new_session(params) {
        Ok(session) => {
            debug!(n_ctx = params.n_ctx, n_batch = params.n_batch, "session opened");
            Ok(session)
        }
        Err(e) => {
            error!("failed to create inference session: {e}");
            Err(e)
        }
    }
}
