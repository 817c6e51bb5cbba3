//! Speech-token cost estimation.

use crate::defaults;

/// Estimate the speech tokens the synthesis engine will spend on a span of
/// text with `word_count` words.
///
/// Chatterbox expands each text token into roughly 6-8 acoustic tokens; 7 is
/// the empirical average. A CFG weight above zero runs a second guided
/// forward pass, doubling the cost.
///
/// Purely advisory: the planner uses it to close batches, nothing validates
/// it against the engine's actual behavior.
pub fn estimate_speech_tokens(word_count: usize, cfg_weight: f32) -> u32 {
    let mut tokens = word_count as u32 * defaults::SPEECH_TOKENS_PER_WORD;
    if cfg_weight > 0.0 {
        tokens *= 2;
    }
    tokens
}

/// Word count of a text span, used as the token proxy for estimation.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_without_cfg() {
        assert_eq!(estimate_speech_tokens(10, 0.0), 70);
    }

    #[test]
    fn test_estimate_doubles_under_cfg() {
        assert_eq!(estimate_speech_tokens(10, 0.35), 140);
        assert_eq!(estimate_speech_tokens(10, 1.0), 140);
    }

    #[test]
    fn test_estimate_empty_text_is_zero() {
        assert_eq!(estimate_speech_tokens(0, 0.0), 0);
        assert_eq!(estimate_speech_tokens(0, 0.5), 0);
    }

    #[test]
    fn test_word_count_splits_on_whitespace() {
        assert_eq!(word_count("Hello world"), 2);
        assert_eq!(word_count("  spaced   out\ttabs\nand newlines "), 5);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
    }
}
