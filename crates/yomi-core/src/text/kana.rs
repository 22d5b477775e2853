//! Hiragana to katakana folding.

/// Fold hiragana scalars into their katakana counterparts.
///
/// Each scalar in U+3041..=U+3096 is shifted by 0x60 into the katakana
/// block; everything else (katakana, kanji, ASCII, the prolonged sound mark)
/// is left as-is.
pub fn to_katakana(text: &str) -> String {
    text.chars()
        .map(|c| {
            if ('ぁ'..='ゖ').contains(&c) {
                char::from_u32(c as u32 + 0x60).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_hiragana() {
        assert_eq!(to_katakana("あめ"), "アメ");
        assert_eq!(to_katakana("きょう"), "キョウ");
    }

    #[test]
    fn range_boundaries() {
        // U+3041 and U+3096 are the first and last folded scalars.
        assert_eq!(to_katakana("ぁ"), "ァ");
        assert_eq!(to_katakana("ゖ"), "ヶ");
        // U+3097 is outside the fold range.
        assert_eq!(to_katakana("\u{3097}"), "\u{3097}");
    }

    #[test]
    fn katakana_and_ascii_unchanged() {
        assert_eq!(to_katakana("アメ123 abc"), "アメ123 abc");
        assert_eq!(to_katakana("データー"), "データー");
    }
}
