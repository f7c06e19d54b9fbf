//! Visualizer sinks
//!
//! A [`VisualizerSink`] receives every frame of a run (frame 0 is the
//! initial state) and one `finish` call at the end. Sinks own whatever
//! history or files they produce; the driver keeps none.
//!
//! Sinks are selected by name through [`create_sinks`], an explicit
//! registration table:
//!
//! | Name | Output |
//! |---|---|
//! | `CellStateVisualizer` | one image per frame, colored by cell state |
//! | `FullVisualizer` | one image per frame, state color shaded by heat, fuel, oxygen |
//! | `HeatPlotVisualizer` | CSV of mean heat per frame |
//! | `AllAttributePlotVisualizer` | CSV of state counts and field means per frame |
//! | `TextVisualizer` | text dump of every map to stdout |

mod plot;
mod raster;
mod text;

pub use plot::{AllAttributePlotVisualizer, FrameStats, HeatPlotVisualizer};
pub use raster::{CellStateVisualizer, FullVisualizer};
pub use text::TextVisualizer;

use crate::config::{Config, SinkConfig};
use crate::error::SinkError;
use crate::observer::{ObserverHandle, SimEvent};
use crate::state::State;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

/// Consumer of simulation frames
pub trait VisualizerSink {
    /// Registry name
    fn name(&self) -> &'static str;

    /// Handle one frame
    fn visualize(&mut self, state: &State) -> Result<(), SinkError>;

    /// Called once after the last frame
    fn finish(&mut self) -> Result<(), SinkError>;
}

/// Build one sink by name
#[must_use]
pub fn create_sink(name: &str, config: &Config) -> Option<Box<dyn VisualizerSink>> {
    let sink: Box<dyn VisualizerSink> = match name {
        CellStateVisualizer::NAME => Box::new(CellStateVisualizer::from_config(config)),
        FullVisualizer::NAME => Box::new(FullVisualizer::from_config(config)),
        HeatPlotVisualizer::NAME => Box::new(HeatPlotVisualizer::from_config(config)),
        AllAttributePlotVisualizer::NAME => {
            Box::new(AllAttributePlotVisualizer::from_config(config))
        }
        TextVisualizer::NAME => Box::new(TextVisualizer::stdout()),
        _ => return None,
    };
    Some(sink)
}

/// Build the configured sinks in order
///
/// Unknown names are reported and skipped; a repeated name is added once.
#[must_use]
pub fn create_sinks<S: AsRef<str>>(
    names: &[S],
    config: &Config,
    observer: &ObserverHandle,
) -> Vec<Box<dyn VisualizerSink>> {
    let mut seen = FxHashSet::default();
    let mut sinks = Vec::new();
    for name in names {
        let name = name.as_ref();
        if !seen.insert(name) {
            continue;
        }
        match create_sink(name, config) {
            Some(sink) => {
                observer.on_event(&SimEvent::SinkAdded {
                    name: name.to_owned(),
                });
                sinks.push(sink);
            }
            None => observer.on_event(&SimEvent::UnknownSink {
                name: name.to_owned(),
            }),
        }
    }
    sinks
}

/// Directory a sink writes to: `output.directory / <sink directory>`
fn sink_dir(config: &Config, section: &SinkConfig, default_dir: &str) -> PathBuf {
    config
        .output
        .directory
        .join(section.directory.as_deref().unwrap_or(default_dir))
}

/// Expand the first `%d` / `%0Nd` / `%Nd` placeholder in `pattern` with
/// `frame`
///
/// A pattern without a placeholder gets `-<frame>` inserted before its
/// extension, so frames never overwrite each other.
#[must_use]
pub fn frame_file_name(pattern: &str, frame: usize) -> String {
    if let Some(start) = pattern.find('%') {
        let spec = &pattern[start + 1..];
        let digits = spec.chars().take_while(char::is_ascii_digit).count();
        if spec[digits..].starts_with('d') {
            let width_spec = &spec[..digits];
            let zero_pad = width_spec.starts_with('0');
            let width: usize = width_spec.parse().unwrap_or(0);
            let number = if zero_pad {
                format!("{frame:0width$}")
            } else {
                format!("{frame:width$}")
            };
            return format!("{}{}{}", &pattern[..start], number, &spec[digits + 1..]);
        }
    }

    let path = Path::new(pattern);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => {
            let file = format!(
                "{}-{frame}.{}",
                stem.to_string_lossy(),
                ext.to_string_lossy()
            );
            path.with_file_name(file).to_string_lossy().into_owned()
        }
        _ => format!("{pattern}-{frame}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::RecordingObserver;

    #[test]
    fn test_frame_file_name_patterns() {
        assert_eq!(frame_file_name("output-%03d.png", 7), "output-007.png");
        assert_eq!(frame_file_name("output-%d.ppm", 12), "output-12.ppm");
        assert_eq!(frame_file_name("f%4d.png", 3), "f   3.png");
        assert_eq!(frame_file_name("frame.png", 2), "frame-2.png");
        assert_eq!(frame_file_name("frame", 2), "frame-2");
        // A percent sign that is not a placeholder is kept
        assert_eq!(frame_file_name("100%.png", 1), "100%-1.png");
    }

    #[test]
    fn test_create_sinks_skips_unknown_and_duplicates() {
        let recorder = RecordingObserver::new();
        let observer: ObserverHandle = recorder.clone();
        let config = Config::default();

        let sinks = create_sinks(
            &[
                "HeatPlotVisualizer",
                "HologramVisualizer",
                "HeatPlotVisualizer",
                "AllAttributePlotVisualizer",
            ],
            &config,
            &observer,
        );

        let names: Vec<&str> = sinks.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["HeatPlotVisualizer", "AllAttributePlotVisualizer"]);
        assert!(recorder.events().contains(&SimEvent::UnknownSink {
            name: "HologramVisualizer".into()
        }));
    }

    #[test]
    fn test_every_registered_name_builds() {
        let config = Config::default();
        for name in [
            "CellStateVisualizer",
            "FullVisualizer",
            "HeatPlotVisualizer",
            "AllAttributePlotVisualizer",
            "TextVisualizer",
        ] {
            let sink = create_sink(name, &config).expect(name);
            assert_eq!(sink.name(), name);
        }
    }

    #[test]
    fn test_sink_dir_uses_section_override() {
        let mut config = Config::default();
        config.output.directory = PathBuf::from("/tmp/run");
        let section = SinkConfig {
            directory: Some("frames".into()),
            ..SinkConfig::default()
        };
        assert_eq!(
            sink_dir(&config, &section, "cellstate/"),
            PathBuf::from("/tmp/run/frames")
        );
        assert_eq!(
            sink_dir(&config, &SinkConfig::default(), "cellstate/"),
            PathBuf::from("/tmp/run/cellstate/")
        );
    }
}
