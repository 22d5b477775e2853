//! The boundary with the inference engine collaborator.
//!
//! Everything the decoding pipeline needs from an engine is expressed as the
//! object-safe traits here: loading weights, deriving the vocabulary view,
//! creating per-request sessions, and the raw tokenize/detokenize
//! primitives. The engine's internals (weight storage, forward pass,
//! batching) stay behind this boundary, and tests inject the scripted
//! implementation from [`scripted`] in its place.

mod params;
pub mod scripted;

pub use params::ModelParams;

use crate::error::Result;
use crate::session::SessionParams;
use std::path::Path;
use std::sync::Arc;

/// Engine-native token identifier.
///
/// Only meaningful relative to the vocabulary that produced it.
pub type TokenId = i32;

/// Loads model weights from disk.
///
/// Dropping the returned [`Model`] releases the weights.
pub trait ModelLoader: Send + Sync {
    /// Load a model from the given path.
    fn load(&self, path: &Path, params: &ModelParams) -> Result<Arc<dyn Model>>;
}

/// A loaded model: shared, read-only after loading.
///
/// The vocabulary view borrowed through [`Model::vocab`] stays valid exactly
/// as long as the model itself.
pub trait Model: Send + Sync {
    /// The vocabulary derived from the loaded weights.
    fn vocab(&self) -> &dyn Vocab;

    /// Create a fresh inference session.
    ///
    /// The session borrows the model and must be dropped before it; dropping
    /// the session releases all engine-internal state (attention cache) it
    /// accumulated.
    fn new_session(&self, params: &SessionParams) -> Result<Box<dyn Session + '_>>;
}

/// Read-only vocabulary view of a loaded model.
///
/// The tokenize and piece primitives follow the engine's size-probing
/// convention: the caller supplies an output buffer, and a negative return
/// value reports the required buffer length as its magnitude. The
/// [`Tokenizer`](crate::tokenizer::Tokenizer) adapter owns the retry
/// protocol; callers should go through it rather than these primitives.
pub trait Vocab {
    /// Tokenize `text` into `out`.
    ///
    /// Returns the token count on success, or a negative value whose
    /// magnitude is the required buffer length when `out` is too small.
    /// `add_leading` asks the engine to prepend its beginning-of-sequence
    /// marker.
    fn tokenize_into(&self, text: &str, out: &mut [TokenId], add_leading: bool) -> i32;

    /// Write the textual piece for `token` into `out`.
    ///
    /// Same return convention as [`Vocab::tokenize_into`].
    fn piece_into(&self, token: TokenId, out: &mut [u8]) -> i32;

    /// Whether `token` carries structural meaning rather than display text.
    fn is_control(&self, token: TokenId) -> bool;

    /// The end-of-sequence token.
    fn eos(&self) -> TokenId;

    /// Number of entries in the vocabulary.
    fn n_tokens(&self) -> usize;
}

/// One in-flight inference session.
///
/// Exclusively owned by a single decoding request. Holds the attention cache
/// accumulated across steps; dropping the session invalidates it.
pub trait Session {
    /// Submit a batch of tokens and advance the engine state.
    ///
    /// Priming submits the whole prompt at once; the autoregressive loop
    /// submits one token per call.
    fn step(&mut self, tokens: &[TokenId]) -> Result<()>;

    /// Logits for the most recently produced position, one per vocabulary
    /// entry, or `None` when unavailable.
    fn logits(&self) -> Option<&[f32]>;
}
