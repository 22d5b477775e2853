//! Text preprocessing applied before tokenization.
//!
//! - [`normalize`] rewrites whitespace the way the conversion model was
//!   trained to see it
//! - [`to_katakana`] folds hiragana input into katakana

mod kana;
mod normalize;

pub use kana::to_katakana;
pub use normalize::normalize;
