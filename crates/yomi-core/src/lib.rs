//! # Yomi Core
//!
//! Core pipeline for greedy text generation over a loaded causal language
//! model. The engine itself (weights, forward pass) stays behind the traits
//! in [`engine`]; this crate owns everything between the host's request
//! string and the generated continuation:
//!
//! - **Text normalization** applied before tokenization
//! - **Tokenizer adapter** with probe-then-allocate buffer sizing
//! - **Per-request inference sessions** with guaranteed release
//! - **Greedy decoder** running the encode, prime, argmax, detokenize loop

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod decoder;
pub mod engine;
pub mod error;
pub mod session;
pub mod text;
pub mod tokenizer;

pub use error::{Result, YomiError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::decoder::GreedyDecoder;
    pub use crate::engine::{Model, ModelLoader, ModelParams, Session, TokenId, Vocab};
    pub use crate::error::{Result, YomiError};
    pub use crate::session::SessionParams;
    pub use crate::text::{normalize, to_katakana};
    pub use crate::tokenizer::Tokenizer;
}
