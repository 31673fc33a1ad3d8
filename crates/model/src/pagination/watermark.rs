use crate::records::batch::ResultBatch;
use serde::{Deserialize, Serialize};

/// Where the tail is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TailPhase {
    /// No row has been seen yet; the next poll fetches the initial snapshot.
    Priming,

    /// A watermark is set; polls only fetch rows with a greater key.
    Tailing,
}

/// Text form of the greatest key delivered so far.
///
/// The watermark is only ever replaced by the key of the last row of a
/// non-empty batch. Batches come back ordered ascending by the key and are
/// restricted to keys greater than the current watermark, so replacing it
/// never moves backwards. No comparison happens on this side: ordering is
/// entirely the server's business.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermark(Option<String>);

impl Watermark {
    pub fn new() -> Self {
        Watermark(None)
    }

    pub fn at(key: impl Into<String>) -> Self {
        Watermark(Some(key.into()))
    }

    pub fn current(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn phase(&self) -> TailPhase {
        match self.0 {
            Some(_) => TailPhase::Tailing,
            None => TailPhase::Priming,
        }
    }

    /// Moves the watermark to the greatest key in the batch: the key of the
    /// last row whose key is not NULL. NULL keys sort last, so they are
    /// skipped.
    ///
    /// Returns `true` when the watermark moved. An empty batch, or one whose
    /// keys are all NULL, leaves it untouched.
    pub fn advance(&mut self, batch: &ResultBatch, key_index: usize) -> bool {
        match batch.rows.iter().rev().find_map(|row| row.get(key_index)) {
            Some(key) => {
                self.0 = Some(key.to_string());
                true
            }
            None => false,
        }
    }
}
