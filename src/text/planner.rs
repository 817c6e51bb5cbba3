//! Greedy batch planning.
//!
//! Packs ordered sentences into batches whose estimated speech-token cost
//! stays within the engine's per-call budget. One left-to-right pass; a
//! batch closes only when adding the next sentence would strictly exceed
//! the budget.

use crate::text::budget::{estimate_speech_tokens, word_count};

/// An ordered group of sentences synthesized in a single engine call.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBatch {
    sentences: Vec<String>,
    estimated_tokens: u32,
}

impl TextBatch {
    /// Sentences in this batch, in reading order.
    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    /// Accumulated speech-token estimate for the whole batch.
    pub fn estimated_tokens(&self) -> u32 {
        self.estimated_tokens
    }

    /// Batch text handed to the engine: sentences joined by single spaces.
    pub fn text(&self) -> String {
        self.sentences.join(" ")
    }

    fn push(&mut self, sentence: String, cost: u32) {
        self.sentences.push(sentence);
        self.estimated_tokens += cost;
    }

    fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

/// Pack sentences into cost-bounded batches.
///
/// Guarantees:
/// - no batch is empty;
/// - batch order and intra-batch sentence order follow the input;
/// - every batch's estimate is within `max_speech_tokens`, except a batch
///   holding a single sentence whose own estimate already exceeds it — that
///   sentence still gets its own batch rather than being dropped or split.
///
/// Reaching the budget exactly does not close a batch; only strict
/// exceedance does.
pub fn plan_batches(
    sentences: impl IntoIterator<Item = String>,
    max_speech_tokens: u32,
    cfg_weight: f32,
) -> Vec<TextBatch> {
    let mut batches = Vec::new();
    let mut current = TextBatch {
        sentences: Vec::new(),
        estimated_tokens: 0,
    };

    for sentence in sentences {
        let cost = estimate_speech_tokens(word_count(&sentence), cfg_weight);

        if !current.is_empty() && current.estimated_tokens + cost > max_speech_tokens {
            batches.push(std::mem::replace(
                &mut current,
                TextBatch {
                    sentences: Vec::new(),
                    estimated_tokens: 0,
                },
            ));
        }

        current.push(sentence, cost);
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}
