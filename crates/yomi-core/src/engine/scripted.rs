//! Scripted reference engine.
//!
//! An in-process implementation of the engine traits driven by a fixed
//! token script: after priming, each step produces a logit row whose
//! maximum sits on the next scripted token, and the script's end is
//! reported as end-of-sequence. Used by tests, benches, and examples in
//! place of a real engine; failure injection covers session creation,
//! priming, mid-loop steps, and logit availability.

use crate::engine::{Model, ModelLoader, ModelParams, Session, TokenId, Vocab};
use crate::error::{Result, YomiError};
use crate::session::SessionParams;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Vocabulary backed by an explicit piece table.
///
/// Token ids are assigned in insertion order: id 0 is the `<s>` marker,
/// id 1 the `</s>` marker (both control tokens), display pieces follow.
/// Tokenization is greedy longest-prefix match over the display pieces;
/// characters no piece covers are dropped.
pub struct ScriptedVocab {
    pieces: Vec<String>,
    control: Vec<bool>,
    exact_sizing: bool,
    tokenize_calls: AtomicUsize,
    piece_calls: AtomicUsize,
}

/// Id of the beginning-of-sequence marker.
const BOS_ID: TokenId = 0;
/// Id of the end-of-sequence marker.
const EOS_ID: TokenId = 1;

impl ScriptedVocab {
    /// Build a vocabulary from display pieces.
    pub fn new<I, S>(pieces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self {
            pieces: vec!["<s>".to_string(), "</s>".to_string()],
            control: vec![true, true],
            exact_sizing: false,
            tokenize_calls: AtomicUsize::new(0),
            piece_calls: AtomicUsize::new(0),
        };
        for piece in pieces {
            vocab.push_piece(piece.into(), false);
        }
        vocab
    }

    /// Demand exactly sized tokenize buffers.
    ///
    /// Mimics a primitive that reports the required size whenever the
    /// supplied buffer does not match it, forcing the caller's retry path.
    pub fn exact_sizing(mut self) -> Self {
        self.exact_sizing = true;
        self
    }

    fn push_piece(&mut self, piece: String, control: bool) -> TokenId {
        self.pieces.push(piece);
        self.control.push(control);
        (self.pieces.len() - 1) as TokenId
    }

    /// The beginning-of-sequence token.
    pub fn bos(&self) -> TokenId {
        BOS_ID
    }

    /// Look up the id of a piece.
    pub fn token_for(&self, piece: &str) -> Option<TokenId> {
        self.pieces.iter().position(|p| p == piece).map(|i| i as TokenId)
    }

    /// Number of calls made to the tokenize primitive.
    pub fn tokenize_calls(&self) -> usize {
        self.tokenize_calls.load(Ordering::Relaxed)
    }

    /// Number of calls made to the piece primitive.
    pub fn piece_calls(&self) -> usize {
        self.piece_calls.load(Ordering::Relaxed)
    }

    fn match_pieces(&self, text: &str, add_leading: bool) -> Vec<TokenId> {
        let mut ids = Vec::new();
        if add_leading {
            ids.push(BOS_ID);
        }
        let mut rest = text;
        while !rest.is_empty() {
            let mut best: Option<(usize, usize)> = None;
            for (id, piece) in self.pieces.iter().enumerate() {
                if self.control[id] || piece.is_empty() {
                    continue;
                }
                if rest.starts_with(piece.as_str())
                    && best.map_or(true, |(_, len)| piece.len() > len)
                {
                    best = Some((id, piece.len()));
                }
            }
            match best {
                Some((id, len)) => {
                    ids.push(id as TokenId);
                    rest = &rest[len..];
                }
                None => {
                    let mut chars = rest.chars();
                    chars.next();
                    rest = chars.as_str();
                }
            }
        }
        ids
    }
}

impl Vocab for ScriptedVocab {
    fn tokenize_into(&self, text: &str, out: &mut [TokenId], add_leading: bool) -> i32 {
        self.tokenize_calls.fetch_add(1, Ordering::Relaxed);

        let ids = self.match_pieces(text, add_leading);
        let needed = ids.len();
        if out.len() < needed || (self.exact_sizing && out.len() != needed) {
            return -(needed as i32);
        }
        out[..needed].copy_from_slice(&ids);
        needed as i32
    }

    fn piece_into(&self, token: TokenId, out: &mut [u8]) -> i32 {
        self.piece_calls.fetch_add(1, Ordering::Relaxed);

        if token < 0 {
            return 0;
        }
        let Some(piece) = self.pieces.get(token as usize) else {
            return 0;
        };
        let bytes = piece.as_bytes();
        if out.len() < bytes.len() {
            return -(bytes.len() as i32);
        }
        out[..bytes.len()].copy_from_slice(bytes);
        bytes.len() as i32
    }

    fn is_control(&self, token: TokenId) -> bool {
        token >= 0 && self.control.get(token as usize).copied().unwrap_or(false)
    }

    fn eos(&self) -> TokenId {
        EOS_ID
    }

    fn n_tokens(&self) -> usize {
        self.pieces.len()
    }
}

/// Builder for [`ScriptedModel`].
pub struct ScriptedModelBuilder {
    vocab: ScriptedVocab,
    script: Vec<TokenId>,
    fail_session_create: bool,
    fail_on_step: Option<usize>,
    hide_logits_after: Option<usize>,
}

impl ScriptedModelBuilder {
    fn new() -> Self {
        Self {
            vocab: ScriptedVocab::new(Vec::<String>::new()),
            script: Vec::new(),
            fail_session_create: false,
            fail_on_step: None,
            hide_logits_after: None,
        }
    }

    /// Add display pieces to the vocabulary.
    pub fn pieces<I, S>(mut self, pieces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for piece in pieces {
            self.vocab.push_piece(piece.into(), false);
        }
        self
    }

    /// Add a control token with the given piece.
    pub fn control_piece(mut self, piece: impl Into<String>) -> Self {
        self.vocab.push_piece(piece.into(), true);
        self
    }

    /// Demand exactly sized tokenize buffers (see
    /// [`ScriptedVocab::exact_sizing`]).
    pub fn exact_sizing(mut self) -> Self {
        self.vocab.exact_sizing = true;
        self
    }

    /// Append pieces to the generation script by piece text.
    ///
    /// # Panics
    ///
    /// Panics if a piece is not in the vocabulary.
    pub fn script_pieces<I, S>(mut self, pieces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for piece in pieces {
            let id = self
                .vocab
                .token_for(piece.as_ref())
                .expect("scripted piece not in vocabulary");
            self.script.push(id);
        }
        self
    }

    /// Append an end-of-sequence token to the generation script.
    pub fn script_eos(mut self) -> Self {
        self.script.push(EOS_ID);
        self
    }

    /// Make session creation fail.
    pub fn fail_session_create(mut self) -> Self {
        self.fail_session_create = true;
        self
    }

    /// Make the `n`-th step call fail (0 is the priming step).
    pub fn fail_on_step(mut self, n: usize) -> Self {
        self.fail_on_step = Some(n);
        self
    }

    /// Make logits unavailable once `n` rows have been produced.
    pub fn hide_logits_after(mut self, n: usize) -> Self {
        self.hide_logits_after = Some(n);
        self
    }

    /// Finish building.
    pub fn build(self) -> ScriptedModel {
        ScriptedModel {
            vocab: self.vocab,
            script: self.script,
            fail_session_create: self.fail_session_create,
            fail_on_step: self.fail_on_step,
            hide_logits_after: self.hide_logits_after,
            live: AtomicUsize::new(0),
            created: AtomicUsize::new(0),
            steps: AtomicUsize::new(0),
        }
    }
}

/// Model whose generations follow a fixed token script.
pub struct ScriptedModel {
    vocab: ScriptedVocab,
    script: Vec<TokenId>,
    fail_session_create: bool,
    fail_on_step: Option<usize>,
    hide_logits_after: Option<usize>,
    live: AtomicUsize,
    created: AtomicUsize,
    steps: AtomicUsize,
}

impl ScriptedModel {
    /// Create a model builder.
    pub fn builder() -> ScriptedModelBuilder {
        ScriptedModelBuilder::new()
    }

    /// The typed vocabulary, for id lookups in assertions.
    pub fn scripted_vocab(&self) -> &ScriptedVocab {
        &self.vocab
    }

    /// Sessions currently alive.
    pub fn live_sessions(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }

    /// Sessions created over the model's lifetime.
    pub fn sessions_created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    /// Successful step calls across all sessions.
    pub fn steps_taken(&self) -> usize {
        self.steps.load(Ordering::Relaxed)
    }
}

impl Model for ScriptedModel {
    fn vocab(&self) -> &dyn Vocab {
        &self.vocab
    }

    fn new_session(&self, params: &SessionParams) -> Result<Box<dyn Session + '_>> {
        if self.fail_session_create {
            return Err(YomiError::Session("scripted creation failure".to_string()));
        }
        self.created.fetch_add(1, Ordering::Relaxed);
        self.live.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(ScriptedSession {
            model: self,
            n_ctx: params.n_ctx,
            used: 0,
            row: Vec::new(),
            emitted: 0,
            calls: 0,
        }))
    }
}

struct ScriptedSession<'m> {
    model: &'m ScriptedModel,
    n_ctx: usize,
    used: usize,
    row: Vec<f32>,
    /// Logit rows produced so far.
    emitted: usize,
    /// Step calls made, failed ones included.
    calls: usize,
}

impl Session for ScriptedSession<'_> {
    fn step(&mut self, tokens: &[TokenId]) -> Result<()> {
        let call = self.calls;
        self.calls += 1;

        if self.model.fail_on_step == Some(call) {
            return Err(YomiError::Step(format!("scripted failure at step {call}")));
        }
        if tokens.is_empty() {
            return Err(YomiError::Step("empty batch".to_string()));
        }
        self.used += tokens.len();
        if self.used > self.n_ctx {
            return Err(YomiError::Step(format!(
                "context window exceeded: {} > {}",
                self.used, self.n_ctx
            )));
        }

        let target = self
            .model
            .script
            .get(self.emitted)
            .copied()
            .unwrap_or(EOS_ID);
        let mut row = vec![0.0; self.model.vocab.n_tokens()];
        if let Some(slot) = row.get_mut(target as usize) {
            *slot = 1.0;
        }
        self.row = row;
        self.emitted += 1;

        self.model.steps.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn logits(&self) -> Option<&[f32]> {
        if self.emitted == 0 {
            return None;
        }
        if let Some(limit) = self.model.hide_logits_after {
            if self.emitted >= limit {
                return None;
            }
        }
        Some(&self.row)
    }
}

impl Drop for ScriptedSession<'_> {
    fn drop(&mut self) {
        self.model.live.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Loader that hands out pre-built models in order.
///
/// An empty queue makes [`ModelLoader::load`] fail, which stands in for a
/// missing or corrupt weight file.
#[derive(Default)]
pub struct ScriptedLoader {
    queue: Mutex<VecDeque<Arc<dyn Model>>>,
    loads: AtomicUsize,
}

impl ScriptedLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a model for the next load.
    pub fn push(&self, model: Arc<dyn Model>) {
        self.queue.lock().push_back(model);
    }

    /// Load attempts made, successful or not.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

impl ModelLoader for ScriptedLoader {
    fn load(&self, path: &Path, _params: &ModelParams) -> Result<Arc<dyn Model>> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        self.queue
            .lock()
            .pop_front()
            .ok_or_else(|| YomiError::Model(format!("no model at {}", path.display())))
    }
}
