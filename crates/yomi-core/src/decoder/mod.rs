//! Greedy decoding over an inference session.
//!
//! Drives the full request pipeline: normalize the left context, encode it,
//! prime a fresh session with the prompt in one batched step, then select
//! the argmax token and feed it back one step at a time until the
//! end-of-sequence token, a step failure, or the token budget ends the
//! loop. Whatever was generated by then is detokenized and returned;
//! failures surface as strings, never as errors.

use crate::engine::{Model, TokenId};
use crate::session::{self, SessionParams};
use crate::text::normalize;
use crate::tokenizer::Tokenizer;
use tracing::{debug, warn};

/// Returned when no model is installed.
pub const UNINITIALIZED_OUTPUT: &str = "[error] model not initialized";

/// Returned when the inference session could not be created.
pub const SESSION_FAILURE_OUTPUT: &str = "[error] failed to create context";

/// Greedy decoder bound to the currently installed model, if any.
pub struct GreedyDecoder<'m> {
    model: Option<&'m dyn Model>,
    session_params: SessionParams,
}

impl<'m> GreedyDecoder<'m> {
    /// Create a decoder over `model`.
    ///
    /// `None` represents the uninitialized state: every decode call then
    /// yields [`UNINITIALIZED_OUTPUT`] without touching the engine.
    pub fn new(model: Option<&'m dyn Model>) -> Self {
        Self {
            model,
            session_params: SessionParams::default(),
        }
    }

    /// Override the per-request session configuration.
    pub fn with_session_params(mut self, params: SessionParams) -> Self {
        self.session_params = params;
        self
    }

    /// Generate a continuation of `left_context`, at most `max_tokens`
    /// tokens long.
    ///
    /// The session lives exactly as long as this call. An empty prompt
    /// after tokenization, a priming failure, and a mid-loop step failure
    /// all resolve to plain (possibly empty, possibly partial) output;
    /// only a missing model or a failed session creation produce the
    /// `[error]` strings above.
    pub fn decode(&self, left_context: &str, max_tokens: usize) -> String {
        let Some(model) = self.model else {
            return UNINITIALIZED_OUTPUT.to_string();
        };

        let mut session = match session::open(model, &self.session_params) {
            Ok(session) => session,
            Err(_) => return SESSION_FAILURE_OUTPUT.to_string(),
        };

        let vocab = model.vocab();
        let tokenizer = Tokenizer::new(vocab);

        let prompt = normalize(left_context);
        let prompt_tokens = tokenizer.encode(&prompt, false, false);
        if prompt_tokens.is_empty() {
            debug!("empty prompt after tokenization, nothing to generate");
            return String::new();
        }

        if let Err(e) = session.step(&prompt_tokens) {
            warn!(prompt_tokens = prompt_tokens.len(), "priming failed: {e}");
            return String::new();
        }

        let eos = vocab.eos();
        let n_vocab = vocab.n_tokens();
        let mut generated: Vec<TokenId> = Vec::with_capacity(max_tokens);

        for _ in 0..max_tokens {
            let next = match session.logits() {
                Some(logits) => argmax(&logits[..n_vocab.min(logits.len())]),
                None => {
                    debug!(generated = generated.len(), "logits unavailable, stopping");
                    break;
                }
            };
            let Some(next) = next else {
                break;
            };

            if next == eos {
                break;
            }
            generated.push(next);

            if let Err(e) = session.step(&[next]) {
                warn!(generated = generated.len(), "decode step failed: {e}");
                break;
            }
        }

        debug!(
            prompt_tokens = prompt_tokens.len(),
            generated = generated.len(),
            "greedy decode finished"
        );
        tokenizer.decode(&generated)
    }
}

/// Index of the strictly largest value; the first maximum wins ties.
fn argmax(logits: &[f32]) -> Option<TokenId> {
    let mut best_id = 0usize;
    let mut best_logit = *logits.first()?;
    for (id, &logit) in logits.iter().enumerate().skip(1) {
        if logit > best_logit {
            best_logit = logit;
            best_id = id;
        }
    }
    Some(best_id as TokenId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scripted::ScriptedModel;

    #[test]
    fn argmax_picks_largest() {
        assert_eq!(argmax(&[0.1, 2.0, -1.0]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn argmax_tie_breaks_to_lowest_id() {
        assert_eq!(argmax(&[1.0, 1.0, 1.0]), Some(0));
        assert_eq!(argmax(&[0.0, 3.0, 3.0]), Some(1));
    }

    #[test]
    fn uninitialized_model() {
        let decoder = GreedyDecoder::new(None);
        assert_eq!(decoder.decode("きょうは", 32), UNINITIALIZED_OUTPUT);
    }

    #[test]
    fn session_creation_failure() {
        let model = ScriptedModel::builder()
            .pieces(["あ"])
            .fail_session_create()
            .build();

        let decoder = GreedyDecoder::new(Some(&model));
        assert_eq!(decoder.decode("あ", 32), SESSION_FAILURE_OUTPUT);
        assert_eq!(model.live_sessions(), 0);
    }

    #[test]
    fn generates_scripted_continuation() {
        let model = ScriptedModel::builder()
            .pieces(["きょう", "は", "晴", "れ"])
            .script_pieces(["晴", "れ"])
            .build();

        let decoder = GreedyDecoder::new(Some(&model));
        assert_eq!(decoder.decode("きょうは", 32), "晴れ");
        assert_eq!(model.live_sessions(), 0);
        // Priming, then one feedback step per generated token. The final
        // end-of-sequence pick is never fed back.
        assert_eq!(model.steps_taken(), 3);
    }

    #[test]
    fn empty_prompt_yields_empty_output() {
        let model = ScriptedModel::builder()
            .pieces(["あ"])
            .script_pieces(["あ"])
            .build();

        let decoder = GreedyDecoder::new(Some(&model));
        assert_eq!(decoder.decode("", 32), "");
        // A session was still created and released.
        assert_eq!(model.sessions_created(), 1);
        assert_eq!(model.live_sessions(), 0);
        assert_eq!(model.steps_taken(), 0);
    }

    #[test]
    fn priming_failure_yields_empty_output() {
        let model = ScriptedModel::builder()
            .pieces(["あ"])
            .script_pieces(["あ"])
            .fail_on_step(0)
            .build();

        let decoder = GreedyDecoder::new(Some(&model));
        assert_eq!(decoder.decode("あ", 32), "");
        assert_eq!(model.live_sessions(), 0);
    }

    #[test]
    fn zero_budget_runs_priming_only() {
        let model = ScriptedModel::builder()
            .pieces(["あ"])
            .script_pieces(["あ"])
            .build();

        let decoder = GreedyDecoder::new(Some(&model));
        assert_eq!(decoder.decode("あ", 0), "");
        assert_eq!(model.steps_taken(), 1);
        assert_eq!(model.live_sessions(), 0);
    }

    #[test]
    fn budget_bounds_generation() {
        let model = ScriptedModel::builder()
            .pieces(["あ", "め", "か"])
            .script_pieces(["あ", "め", "か"])
            .build();

        let decoder = GreedyDecoder::new(Some(&model));
        assert_eq!(decoder.decode("か", 2), "あめ");
    }

    #[test]
    fn eos_stops_generation_and_is_excluded() {
        let model = ScriptedModel::builder()
            .pieces(["あ", "め"])
            .script_pieces(["あ"])
            .script_eos()
            .script_pieces(["め"])
            .build();

        let decoder = GreedyDecoder::new(Some(&model));
        // The scripted "め" sits after the end marker and must never appear.
        assert_eq!(decoder.decode("め", 32), "あ");
        assert_eq!(model.steps_taken(), 2);
    }

    #[test]
    fn control_token_is_filtered_but_generation_continues() {
        let model = ScriptedModel::builder()
            .pieces(["あ", "め"])
            .control_piece("<sep>")
            .script_pieces(["あ", "<sep>", "め"])
            .build();

        let decoder = GreedyDecoder::new(Some(&model));
        assert_eq!(decoder.decode("め", 32), "あめ");
        // The control token is still fed back to advance the session.
        assert_eq!(model.steps_taken(), 4);
    }

    #[test]
    fn step_failure_keeps_partial_output() {
        let model = ScriptedModel::builder()
            .pieces(["あ", "め", "か"])
            .script_pieces(["あ", "め", "か"])
            .fail_on_step(2)
            .build();

        let decoder = GreedyDecoder::new(Some(&model));
        // Priming and the first feedback succeed; the second feedback fails
        // after "め" was already selected.
        assert_eq!(decoder.decode("か", 32), "あめ");
        assert_eq!(model.live_sessions(), 0);
    }

    #[test]
    fn logits_unavailable_stops_with_partial_output() {
        let model = ScriptedModel::builder()
            .pieces(["あ", "め"])
            .script_pieces(["あ", "め"])
            .hide_logits_after(2)
            .build();

        let decoder = GreedyDecoder::new(Some(&model));
        assert_eq!(decoder.decode("め", 32), "あ");
        assert_eq!(model.live_sessions(), 0);
    }

    #[test]
    fn sessions_never_leak_across_outcomes() {
        for max_tokens in [0, 1, 32] {
            let model = ScriptedModel::builder()
                .pieces(["あ", "め"])
                .script_pieces(["あ", "め"])
                .build();
            let decoder = GreedyDecoder::new(Some(&model));

            decoder.decode("あ", max_tokens);
            decoder.decode("", max_tokens);
            assert_eq!(model.live_sessions(), 0);
            assert_eq!(model.sessions_created(), 2);
        }
    }
}
