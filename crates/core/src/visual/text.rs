//! Plain-text frame dump
//!
//! Writes the oxygen, fuel, heat and state maps of every frame, in that
//! order, to stdout or any other writer.

use super::VisualizerSink;
use crate::error::SinkError;
use crate::state::State;
use std::io::{self, Write};

/// Dumps every map of every frame as text
pub struct TextVisualizer {
    out: Box<dyn Write + Send>,
    frame: usize,
}

impl TextVisualizer {
    pub const NAME: &'static str = "TextVisualizer";

    #[must_use]
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    #[must_use]
    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Box::new(out),
            frame: 0,
        }
    }
}

impl std::fmt::Debug for TextVisualizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextVisualizer")
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl VisualizerSink for TextVisualizer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn visualize(&mut self, state: &State) -> Result<(), SinkError> {
        writeln!(self.out, "##### step {}: #####", self.frame)?;
        write!(self.out, "{state}")?;
        self.frame += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.out.flush()?;
        Ok(())
    }
}
