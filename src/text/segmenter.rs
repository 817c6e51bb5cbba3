//! Sentence segmentation.
//!
//! Splits raw text into ordered sentence units at terminal punctuation.
//! Downstream batch planning operates on whole sentences only, so a span
//! that never terminates would otherwise be lost; the whole-input fallback
//! guards against that.

/// Split text into trimmed sentence units.
///
/// A sentence ends at `.`, `!`, `?`, a three-dot ellipsis, or the single
/// ellipsis glyph `…`. A run of dots is kept with the sentence it closes.
/// A terminator with no preceding span is discarded. When the input contains
/// no terminated sentence at all, the entire trimmed input is returned as a
/// single unit.
///
/// The output is never empty for non-whitespace input, and unit order
/// matches reading order.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '!' | '?' | '…' => {
                if current.is_empty() {
                    continue;
                }
                current.push(c);
                push_trimmed(&mut sentences, &mut current);
            }
            '.' => {
                // Consume the whole dot run; "..." is an ellipsis and stays
                // with the sentence it closes.
                let mut dots = 1;
                while chars.peek() == Some(&'.') {
                    dots += 1;
                    chars.next();
                }
                if current.is_empty() {
                    continue;
                }
                for _ in 0..dots {
                    current.push('.');
                }
                push_trimmed(&mut sentences, &mut current);
            }
            _ => current.push(c),
        }
    }

    if sentences.is_empty() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            sentences.push(trimmed.to_string());
        }
    }

    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_sentences() {
        let sentences = split_sentences("Hello world. How are you? Great!");
        assert_eq!(sentences, vec!["Hello world.", "How are you?", "Great!"]);
    }

    #[test]
    fn test_three_dot_ellipsis_stays_with_sentence() {
        let sentences = split_sentences("Wait for it... here it comes.");
        assert_eq!(sentences, vec!["Wait for it...", "here it comes."]);
    }

    #[test]
    fn test_ellipsis_glyph() {
        let sentences = split_sentences("But here's what they didn't know… The key hums.");
        assert_eq!(
            sentences,
            vec!["But here's what they didn't know…", "The key hums."]
        );
    }

    #[test]
    fn test_no_terminator_returns_whole_trimmed_input() {
        let sentences = split_sentences("  a fragment without any ending  ");
        assert_eq!(sentences, vec!["a fragment without any ending"]);
    }

    #[test]
    fn test_terminator_only_input_falls_back_to_whole_input() {
        assert_eq!(split_sentences("..."), vec!["..."]);
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n\t ").is_empty());
    }

    #[test]
    fn test_order_is_preserved() {
        let text = "One. Two! Three? Four.";
        let sentences = split_sentences(text);
        assert_eq!(sentences, vec!["One.", "Two!", "Three?", "Four."]);
    }

    #[test]
    fn test_leading_terminators_are_discarded() {
        let sentences = split_sentences("?? Hello. !");
        assert_eq!(sentences, vec!["Hello.", "!"]);
    }

    #[test]
    fn test_interior_whitespace_trimmed_per_sentence() {
        let sentences = split_sentences("  First one.   Second one.  ");
        assert_eq!(sentences, vec!["First one.", "Second one."]);
    }

    #[test]
    fn test_units_are_never_empty() {
        for input in ["a. b. c.", "...", "x", "! ! !", "one… two…"] {
            for unit in split_sentences(input) {
                assert!(!unit.trim().is_empty(), "empty unit from {:?}", input);
            }
        }
    }

    #[test]
    fn test_abbreviation_dots_split_naively() {
        // Sentence detection is punctuation-only by design; abbreviations
        // split. The planner re-joins adjacent units, so synthesis output
        // is unaffected.
        let sentences = split_sentences("Dr. Porter spoke.");
        assert_eq!(sentences, vec!["Dr.", "Porter spoke."]);
    }
}
