//! Prompt assembly for conversion requests.
//!
//! The conversion model is trained on prompts where the editable input is
//! delimited by a pair of private-use sentinels, preceded by the raw left
//! context. The decoder itself treats the assembled string opaquely.

/// Sentinel opening the editable input region.
pub const INPUT_START: char = '\u{ee00}';

/// Sentinel closing the editable input region.
pub const INPUT_END: char = '\u{ee01}';

/// Frame a conversion request for the model.
pub fn frame(left_context: &str, input: &str) -> String {
    let mut out = String::with_capacity(left_context.len() + input.len() + 8);
    out.push_str(left_context);
    out.push(INPUT_START);
    out.push_str(input);
    out.push(INPUT_END);
    out
}
