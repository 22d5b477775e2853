//! Tokenizer adapter over the engine's vocabulary primitives.
//!
//! The raw primitives ([`Vocab::tokenize_into`], [`Vocab::piece_into`])
//! report an unknown required buffer size as a negative count. This adapter
//! owns the probe-then-allocate retry protocol in one place and exposes the
//! plain encode/decode surface the decoder works with.

use crate::engine::{TokenId, Vocab};

/// Initial buffer size for single-token piece lookups.
const PIECE_BUFFER_HINT: usize = 8;

/// Probe-then-allocate wrapper for size-probing primitives.
///
/// Calls `op` with a buffer of `hint` elements; when it reports a negative
/// required size, retries exactly once with a buffer of exactly that length.
/// A final count of zero or less yields an empty result.
fn probe_realloc<T: Default + Clone>(hint: usize, mut op: impl FnMut(&mut [T]) -> i32) -> Vec<T> {
    let mut buf = vec![T::default(); hint];
    let mut n = op(&mut buf);
    if n < 0 {
        buf = vec![T::default(); n.unsigned_abs() as usize];
        n = op(&mut buf);
    }
    if n <= 0 {
        return Vec::new();
    }
    buf.truncate(n as usize);
    buf
}

/// Encode/decode adapter bound to one vocabulary.
///
/// A detached adapter (no vocabulary installed) is valid: encoding yields an
/// empty sequence and decoding an empty string, never an error.
pub struct Tokenizer<'v> {
    vocab: Option<&'v dyn Vocab>,
}

impl<'v> Tokenizer<'v> {
    /// Create an adapter over `vocab`.
    pub fn new(vocab: &'v dyn Vocab) -> Self {
        Self { vocab: Some(vocab) }
    }

    /// Create an adapter with no vocabulary behind it.
    pub fn detached() -> Self {
        Self { vocab: None }
    }

    /// Encode `text` into engine tokens.
    ///
    /// `add_leading` asks the engine to prepend its beginning-of-sequence
    /// marker. `add_trailing` appends the vocabulary's end-of-sequence token
    /// after the primitive call completes; this is separate from the
    /// engine's own marker insertion and is not validated against it.
    pub fn encode(&self, text: &str, add_leading: bool, add_trailing: bool) -> Vec<TokenId> {
        let Some(vocab) = self.vocab else {
            return Vec::new();
        };

        let hint = text.len() + if add_leading { 2 } else { 1 };
        let mut tokens = probe_realloc(hint, |buf| vocab.tokenize_into(text, buf, add_leading));
        if tokens.is_empty() {
            return tokens;
        }

        if add_trailing {
            tokens.push(vocab.eos());
        }
        tokens
    }

    /// Decode one token to its textual piece.
    ///
    /// Unknown or piece-less tokens yield an empty string.
    pub fn decode_token(&self, token: TokenId) -> String {
        String::from_utf8_lossy(&self.piece_bytes(token)).into_owned()
    }

    /// Decode a generated sequence, skipping control tokens.
    ///
    /// Pieces are concatenated as raw bytes before conversion: a multi-byte
    /// character can be split across adjacent tokens.
    pub fn decode(&self, tokens: &[TokenId]) -> String {
        let Some(vocab) = self.vocab else {
            return String::new();
        };

        let mut bytes = Vec::new();
        for &token in tokens {
            if vocab.is_control(token) {
                continue;
            }
            bytes.extend_from_slice(&self.piece_bytes(token));
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn piece_bytes(&self, token: TokenId) -> Vec<u8> {
        let Some(vocab) = self.vocab else {
            return Vec::new();
        };
        probe_realloc(PIECE_BUFFER_HINT, |buf| vocab.piece_into(token, buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scripted::ScriptedVocab;
    use crate::text::normalize;

    #[test]
    fn detached_adapter_is_empty() {
        let tokenizer = Tokenizer::detached();
        assert!(tokenizer.encode("hello", false, false).is_empty());
        assert_eq!(tokenizer.decode_token(3), "");
        assert_eq!(tokenizer.decode(&[1, 2, 3]), "");
    }

    #[test]
    fn encode_empty_text() {
        let vocab = ScriptedVocab::new(["a"]);
        let tokenizer = Tokenizer::new(&vocab);
        assert!(tokenizer.encode("", false, false).is_empty());
    }

    #[test]
    fn encode_matches_pieces() {
        let vocab = ScriptedVocab::new(["wo", "rld"]);
        let tokenizer = Tokenizer::new(&vocab);

        let tokens = tokenizer.encode("world", false, false);
        assert_eq!(
            tokens,
            vec![
                vocab.token_for("wo").unwrap(),
                vocab.token_for("rld").unwrap()
            ]
        );
    }

    #[test]
    fn encode_leading_and_trailing_markers() {
        let vocab = ScriptedVocab::new(["hi"]);
        let tokenizer = Tokenizer::new(&vocab);

        let tokens = tokenizer.encode("hi", true, true);
        assert_eq!(tokens.first().copied(), Some(vocab.bos()));
        assert_eq!(tokens.last().copied(), Some(vocab.eos()));
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn trailing_marker_skipped_on_empty_result() {
        let vocab = ScriptedVocab::new(["a"]);
        let tokenizer = Tokenizer::new(&vocab);
        // Nothing tokenizable, so no end marker either.
        assert!(tokenizer.encode("", false, true).is_empty());
    }

    #[test]
    fn size_probe_retries_exactly_once() {
        let vocab = ScriptedVocab::new(["wo", "w"]).exact_sizing();
        let tokenizer = Tokenizer::new(&vocab);

        // Initial hint is len+1 = 4, actual count is 2: the first call
        // reports -2 and the retry runs with a buffer of exactly 2.
        let tokens = tokenizer.encode("wow", false, false);
        assert_eq!(tokens.len(), 2);
        assert_eq!(vocab.tokenize_calls(), 2);
    }

    #[test]
    fn long_piece_grows_buffer() {
        // 15 bytes of UTF-8, well past the 8-byte initial buffer.
        let vocab = ScriptedVocab::new(["こんにちは"]);
        let tokenizer = Tokenizer::new(&vocab);

        let token = vocab.token_for("こんにちは").unwrap();
        assert_eq!(tokenizer.decode_token(token), "こんにちは");
        assert_eq!(vocab.piece_calls(), 2);
    }

    #[test]
    fn unknown_token_decodes_empty() {
        let vocab = ScriptedVocab::new(["a"]);
        let tokenizer = Tokenizer::new(&vocab);
        assert_eq!(tokenizer.decode_token(999), "");
        assert_eq!(tokenizer.decode_token(-1), "");
    }

    #[test]
    fn decode_skips_control_tokens() {
        let vocab = ScriptedVocab::new(["あ", "め"]);
        let tokenizer = Tokenizer::new(&vocab);

        let tokens = vec![
            vocab.token_for("あ").unwrap(),
            vocab.eos(),
            vocab.token_for("め").unwrap(),
        ];
        assert_eq!(tokenizer.decode(&tokens), "あめ");
    }

    #[test]
    fn round_trip_reproduces_normalized_text() {
        let vocab = ScriptedVocab::new(["今日", "は", "\u{3000}", "晴れ"]);
        let tokenizer = Tokenizer::new(&vocab);

        let text = normalize("今日は 晴れ");
        let tokens = tokenizer.encode(&text, false, false);
        assert_eq!(tokenizer.decode(&tokens), text);
    }
}
