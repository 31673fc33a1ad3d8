//! Turns a poll's [`ResultBatch`] into lines on the output stream.

use crate::{
    error::TailError,
    render::{aligned::AlignedText, structured::StructuredRows},
};
use model::{
    execution::poll::{OutputMode, PollConfig},
    records::batch::ResultBatch,
};
use std::io::Write;

pub mod aligned;
pub mod structured;
pub mod widths;

pub trait BatchRenderer: Send + Sync {
    /// Writes every row of the batch, preceded by a header line when
    /// `with_header` is set and the format has one. Returns the number of
    /// rows written.
    fn render(
        &self,
        batch: &ResultBatch,
        with_header: bool,
        out: &mut dyn Write,
    ) -> Result<usize, TailError>;
}

pub fn renderer_for(config: &PollConfig) -> Box<dyn BatchRenderer> {
    match config.mode() {
        OutputMode::AlignedText => Box::new(AlignedText::new(
            config.separator(),
            config.align(),
            config.columns().len(),
        )),
        OutputMode::StructuredPerRow => Box::new(StructuredRows),
    }
}
