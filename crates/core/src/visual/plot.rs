//! Time-series sinks
//!
//! Both collect one row per frame and write a single CSV on `finish`.

use super::{sink_dir, VisualizerSink};
use crate::config::Config;
use crate::error::SinkError;
use crate::state::{CellState, State};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Aggregates of one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    /// Cells per state, indexed by [`CellState::index`]
    pub counts: [usize; CellState::COUNT],
    pub avg_cell_state: f32,
    pub avg_heat: f32,
    pub avg_oxygen: f32,
    pub avg_fuel: f32,
}

impl FrameStats {
    #[must_use]
    pub fn of(state: &State) -> Self {
        let mut counts = [0; CellState::COUNT];
        for s in state.cell_state() {
            counts[s.index()] += 1;
        }
        Self {
            counts,
            avg_cell_state: state.mean_cell_state(),
            avg_heat: state.mean_heat(),
            avg_oxygen: state.mean_oxygen(),
            avg_fuel: state.mean_fuel(),
        }
    }

    #[must_use]
    pub fn count(&self, state: CellState) -> usize {
        self.counts[state.index()]
    }
}

fn create_output(dir: &Path, name: &str) -> Result<(PathBuf, BufWriter<File>), SinkError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    let file = File::create(&path)?;
    Ok((path, BufWriter::new(file)))
}

/// Mean heat per frame
#[derive(Debug, Clone)]
pub struct HeatPlotVisualizer {
    dir: PathBuf,
    name: String,
    avg_heat: Vec<f32>,
}

impl HeatPlotVisualizer {
    pub const NAME: &'static str = "HeatPlotVisualizer";
    pub const DEFAULT_DIRECTORY: &'static str = "plot/";
    pub const DEFAULT_FILE: &'static str = "heat.csv";

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let section = config.sink(Self::NAME);
        Self {
            dir: sink_dir(config, &section, Self::DEFAULT_DIRECTORY),
            name: section.name.unwrap_or_else(|| Self::DEFAULT_FILE.to_owned()),
            avg_heat: Vec::new(),
        }
    }

    /// Collected means, one per frame
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.avg_heat
    }
}

impl VisualizerSink for HeatPlotVisualizer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn visualize(&mut self, state: &State) -> Result<(), SinkError> {
        self.avg_heat.push(state.mean_heat());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        let (path, mut writer) = create_output(&self.dir, &self.name)?;

        writeln!(writer, "step,avg_heat")?;
        for (step, heat) in self.avg_heat.iter().enumerate() {
            writeln!(writer, "{step},{heat}")?;
        }
        writer.flush()?;
        debug!("Heat plot written to {}", path.display());
        Ok(())
    }
}

/// State counts and field means per frame
#[derive(Debug, Clone)]
pub struct AllAttributePlotVisualizer {
    dir: PathBuf,
    name: String,
    frames: Vec<FrameStats>,
}

impl AllAttributePlotVisualizer {
    pub const NAME: &'static str = "AllAttributePlotVisualizer";
    pub const DEFAULT_DIRECTORY: &'static str = "allplot/";
    pub const DEFAULT_FILE: &'static str = "attributes.csv";
    pub const HEADER: &'static str =
        "step,fire,incombustible,hot,vegetation,avg_cell_state,avg_heat,avg_oxygen,avg_fuel";

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let section = config.sink(Self::NAME);
        Self {
            dir: sink_dir(config, &section, Self::DEFAULT_DIRECTORY),
            name: section.name.unwrap_or_else(|| Self::DEFAULT_FILE.to_owned()),
            frames: Vec::new(),
        }
    }

    #[must_use]
    pub fn frames(&self) -> &[FrameStats] {
        &self.frames
    }
}

impl VisualizerSink for AllAttributePlotVisualizer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn visualize(&mut self, state: &State) -> Result<(), SinkError> {
        self.frames.push(FrameStats::of(state));
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        let (path, mut writer) = create_output(&self.dir, &self.name)?;

        writeln!(writer, "{}", Self::HEADER)?;
        for (step, frame) in self.frames.iter().enumerate() {
            writeln!(
                writer,
                "{step},{},{},{},{},{},{},{},{}",
                frame.count(CellState::Fire),
                frame.count(CellState::Incombustible),
                frame.count(CellState::Hot),
                frame.count(CellState::Vegetation),
                frame.avg_cell_state,
                frame.avg_heat,
                frame.avg_oxygen,
                frame.avg_fuel,
            )?;
        }
        writer.flush()?;
        debug!("Attribute plot written to {}", path.display());
        Ok(())
    }
}
