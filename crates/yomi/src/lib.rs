//! # Yomi
//!
//! Host-facing runtime for greedy text generation over a loaded causal
//! language model, built for kana-to-kanji conversion workloads. The
//! [`Runtime`] owns the model lifecycle (explicit init, release on re-init)
//! and exposes the conversion entry points; the pipeline underneath lives in
//! [`yomi_core`] behind the engine traits.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use yomi::engine::scripted::{ScriptedLoader, ScriptedModel};
//! use yomi::Runtime;
//!
//! let model = ScriptedModel::builder()
//!     .pieces(["きょうは", "アメ", "雨"])
//!     .script_pieces(["雨"])
//!     .build();
//! let loader = ScriptedLoader::new();
//! loader.push(Arc::new(model));
//!
//! let runtime = Runtime::new(Box::new(loader));
//! runtime.init_model(std::path::Path::new("model.gguf")).unwrap();
//!
//! assert_eq!(runtime.generate_with_context("きょうは", "あめ"), "雨");
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// Re-export core crate
pub use yomi_core::*;

pub mod prompt;

mod runtime;

pub use runtime::{Runtime, MAX_GENERATED_TOKENS};

/// Commonly used types.
pub mod prelude {
    pub use crate::prompt;
    pub use crate::runtime::{Runtime, MAX_GENERATED_TOKENS};
    pub use yomi_core::prelude::*;
}
