//! Per-frame image sinks

use super::{frame_file_name, sink_dir, VisualizerSink};
use crate::config::Config;
use crate::error::SinkError;
use crate::state::{CellState, State};
use image::{ImageFormat, Rgb, RgbImage};
use rayon::prelude::*;
use std::io;
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_PATTERN: &str = "output-%03d.png";
const DEFAULT_SCALING: u32 = 20;

/// Writes one image file per frame below a directory
#[derive(Debug, Clone)]
struct FrameWriter {
    dir: PathBuf,
    pattern: String,
    scaling: u32,
    frame: usize,
}

impl FrameWriter {
    fn from_config(config: &Config, name: &str, default_dir: &str) -> Self {
        let section = config.sink(name);
        Self {
            dir: sink_dir(config, &section, default_dir),
            pattern: section
                .pattern
                .unwrap_or_else(|| DEFAULT_PATTERN.to_owned()),
            scaling: section.scaling.unwrap_or(DEFAULT_SCALING).max(1),
            frame: 0,
        }
    }

    /// Paint every cell as a `scaling × scaling` block and save the frame
    ///
    /// The frame index advances even when saving fails, so later frames keep
    /// their own file names.
    fn write(&mut self, width: usize, colors: &[Rgb<u8>]) -> Result<(), SinkError> {
        let frame = self.frame;
        self.frame += 1;

        let height = if width == 0 { 0 } else { colors.len() / width };
        let scale = self.scaling as usize;
        let image_width = pixel_extent(width, self.scaling)?;
        let image_height = pixel_extent(height, self.scaling)?;

        let image = RgbImage::from_fn(image_width, image_height, |px, py| {
            colors[(py as usize / scale) * width + px as usize / scale]
        });

        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(frame_file_name(&self.pattern, frame));
        let format = ImageFormat::from_path(&path)?;
        image.save_with_format(&path, format)?;
        debug!("Wrote frame {} to {}", frame, path.display());
        Ok(())
    }
}

fn pixel_extent(cells: usize, scaling: u32) -> Result<u32, SinkError> {
    u32::try_from(cells)
        .ok()
        .and_then(|c| c.checked_mul(scaling))
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{cells} cells at scaling {scaling} exceed the image size limit"),
            )
            .into()
        })
}

/// One image per frame, each cell colored by its state
#[derive(Debug, Clone)]
pub struct CellStateVisualizer {
    writer: FrameWriter,
}

impl CellStateVisualizer {
    pub const NAME: &'static str = "CellStateVisualizer";
    pub const DEFAULT_DIRECTORY: &'static str = "cellstate/";

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            writer: FrameWriter::from_config(config, Self::NAME, Self::DEFAULT_DIRECTORY),
        }
    }

    /// Flat color for `state`
    #[must_use]
    pub const fn color(state: CellState) -> Rgb<u8> {
        match state {
            CellState::Incombustible => Rgb([0x23, 0x00, 0x07]),
            CellState::Vegetation => Rgb([0x60, 0x6C, 0x38]),
            CellState::Hot => Rgb([0xD2, 0x82, 0x31]),
            CellState::Fire => Rgb([0xC1, 0x1D, 0x1D]),
        }
    }
}

impl VisualizerSink for CellStateVisualizer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn visualize(&mut self, state: &State) -> Result<(), SinkError> {
        let colors: Vec<Rgb<u8>> = state.cell_state().iter().map(|&s| Self::color(s)).collect();
        self.writer.write(state.width(), &colors)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

// (add to red, subtract from green and blue) indexed by whole heat level
const HEAT_LUT_FIRE: [(f64, f64); 6] = [
    (0.0, 0.0),
    (40.0, 20.0),
    (80.0, 40.0),
    (120.0, 60.0),
    (160.0, 80.0),
    (200.0, 100.0),
];
const HEAT_LUT_HOT: [(f64, f64); 6] = [
    (0.0, 0.0),
    (10.0, 15.0),
    (20.0, 25.0),
    (30.0, 35.0),
    (40.0, 45.0),
    (50.0, 60.0),
];
const HEAT_LUT: [(f64, f64); 6] = [
    (0.0, 0.0),
    (30.0, 10.0),
    (60.0, 20.0),
    (100.0, 35.0),
    (140.0, 50.0),
    (180.0, 70.0),
];

// Brightness multiplier by fuel level
const FUEL_LUT: [f64; 6] = [0.40, 0.52, 0.64, 0.78, 0.90, 1.00];

// Saturation kept by oxygen level; 0 is fully gray
const OXYGEN_LUT: [f64; 6] = [0.65, 0.70, 0.74, 0.77, 0.79, 0.80];

/// Whole level used to index the lookup tables
fn level(value: f32) -> usize {
    (value.max(0.0) as usize).min(5)
}

/// One image per frame, state color shaded by heat, fuel and oxygen
#[derive(Debug, Clone)]
pub struct FullVisualizer {
    writer: FrameWriter,
}

impl FullVisualizer {
    pub const NAME: &'static str = "FullVisualizer";
    pub const DEFAULT_DIRECTORY: &'static str = "full/";

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            writer: FrameWriter::from_config(config, Self::NAME, Self::DEFAULT_DIRECTORY),
        }
    }

    /// Color of a single cell
    ///
    /// Heat pushes the base color toward red, fuel scales brightness and low
    /// oxygen pulls the result toward gray.
    #[must_use]
    pub fn cell_color(state: CellState, heat: f32, fuel: f32, oxygen: f32) -> Rgb<u8> {
        let (base, heat_lut) = match state {
            CellState::Fire => ([255.0, 29.0, 29.0], &HEAT_LUT_FIRE),
            CellState::Hot => ([201.0, 147.0, 46.0], &HEAT_LUT_HOT),
            CellState::Vegetation => ([96.0, 108.0, 56.0], &HEAT_LUT),
            CellState::Incombustible => ([35.0, 0.0, 7.0], &HEAT_LUT),
        };
        let (add_red, sub_green_blue) = heat_lut[level(heat)];
        let brightness = FUEL_LUT[level(fuel)];

        let r = (base[0] + add_red) * brightness;
        let g = (base[1] - sub_green_blue) * brightness;
        let b = (base[2] - sub_green_blue) * brightness;

        let gray = ((r + g + b) / 3.0).floor();
        let saturation = OXYGEN_LUT[level(oxygen)];
        let channel = |c: f64| (gray + (c - gray) * saturation).clamp(0.0, 255.0) as u8;

        Rgb([channel(r), channel(g), channel(b)])
    }
}

impl VisualizerSink for FullVisualizer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn visualize(&mut self, state: &State) -> Result<(), SinkError> {
        let colors: Vec<Rgb<u8>> = state
            .cell_state()
            .par_iter()
            .zip(state.heat().par_iter())
            .zip(state.fuel().par_iter())
            .zip(state.oxygen().par_iter())
            .map(|(((&s, &heat), &fuel), &oxygen)| Self::cell_color(s, heat, fuel, oxygen))
            .collect();
        self.writer.write(state.width(), &colors)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}
