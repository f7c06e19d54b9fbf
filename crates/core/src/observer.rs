//! Engine event reporting
//!
//! The engine never logs through global state. Every constructor that can
//! report something takes an [`ObserverHandle`]; [`NoopObserver`] is the
//! default and [`TracingObserver`] forwards events to `tracing`.

use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

/// Something worth reporting during construction or a run
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// A configured rule was added to the pipeline
    RuleAdded { name: String },
    /// A configured rule name matched nothing in the registry
    UnknownRule { name: String },
    /// `earlier` runs ahead of `later` in the pipeline, so a vegetation cell
    /// can reach FIRE within a single tick
    RuleOrder {
        earlier: &'static str,
        later: &'static str,
    },
    /// A neighborhood implementation was chosen
    NeighborhoodSelected { name: &'static str },
    /// The configured neighborhood name was missing or unknown
    NeighborhoodFallback {
        requested: Option<String>,
        fallback: &'static str,
    },
    /// The ignition approach was missing or unknown
    ApproachFallback { requested: String },
    /// A preset was chosen
    PresetSelected { name: &'static str },
    /// The configured preset source was unknown
    PresetFallback {
        requested: String,
        fallback: &'static str,
    },
    /// A visualizer sink was added
    SinkAdded { name: String },
    /// A configured sink name matched nothing in the registry
    UnknownSink { name: String },
    /// A sink returned an error while handling a frame or `finish`
    SinkFailed {
        name: &'static str,
        frame: Option<usize>,
        error: String,
    },
    /// No seed was configured; this one was drawn for the run
    SeedChosen { seed: u64 },
    /// A tick completed
    StepCompleted { step: usize },
    /// The run finished after `steps` ticks
    RunFinished { steps: usize },
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RuleAdded { name } => write!(f, "Append {name}"),
            Self::UnknownRule { name } => write!(f, "Invalid rule: {name}"),
            Self::RuleOrder { earlier, later } => write!(
                f,
                "{earlier} runs before {later}; vegetation can ignite within one step"
            ),
            Self::NeighborhoodSelected { name } => write!(f, "{name} chosen"),
            Self::NeighborhoodFallback {
                requested,
                fallback,
            } => match requested {
                Some(name) => {
                    write!(f, "Invalid neighborhood '{name}', falling back to {fallback}")
                }
                None => write!(f, "No neighborhood given, falling back to {fallback}"),
            },
            Self::ApproachFallback { requested } => {
                write!(f, "Unknown rule approach '{requested}', using general")
            }
            Self::PresetSelected { name } => write!(f, "{name} preset chosen"),
            Self::PresetFallback {
                requested,
                fallback,
            } => write!(f, "Invalid preset '{requested}', falling back to {fallback}"),
            Self::SinkAdded { name } => write!(f, "Append {name}"),
            Self::UnknownSink { name } => write!(f, "Invalid visualizer: {name}"),
            Self::SinkFailed { name, frame, error } => match frame {
                Some(frame) => write!(f, "{name} failed on frame {frame}: {error}"),
                None => write!(f, "{name} failed to finish: {error}"),
            },
            Self::SeedChosen { seed } => write!(f, "No seed configured, using {seed}"),
            Self::StepCompleted { step } => write!(f, "Step {step} complete"),
            Self::RunFinished { steps } => write!(f, "Run finished after {steps} steps"),
        }
    }
}

/// Receiver for [`SimEvent`]s
pub trait Observer: Send + Sync {
    fn on_event(&self, event: &SimEvent);
}

/// Shared observer handle passed into constructors
pub type ObserverHandle = Arc<dyn Observer>;

/// Observer that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn on_event(&self, _event: &SimEvent) {}
}

/// Handle to a [`NoopObserver`]
#[must_use]
pub fn noop() -> ObserverHandle {
    Arc::new(NoopObserver)
}

/// Observer that forwards events to `tracing` at a level matching their
/// severity
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_event(&self, event: &SimEvent) {
        match event {
            SimEvent::UnknownRule { .. }
            | SimEvent::UnknownSink { .. }
            | SimEvent::NeighborhoodFallback { .. }
            | SimEvent::PresetFallback { .. }
            | SimEvent::SinkFailed { .. } => error!("{event}"),
            SimEvent::ApproachFallback { .. } | SimEvent::RuleOrder { .. } => warn!("{event}"),
            SimEvent::PresetSelected { .. }
            | SimEvent::SeedChosen { .. }
            | SimEvent::RunFinished { .. } => info!("{event}"),
            SimEvent::RuleAdded { .. }
            | SimEvent::NeighborhoodSelected { .. }
            | SimEvent::SinkAdded { .. }
            | SimEvent::StepCompleted { .. } => debug!("{event}"),
        }
    }
}

/// Observer that keeps every event in memory, for inspection after a run
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<SimEvent>>,
}

impl RecordingObserver {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of the events received so far
    #[must_use]
    pub fn events(&self) -> Vec<SimEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl Observer for RecordingObserver {
    fn on_event(&self, event: &SimEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_keeps_order() {
        let recorder = RecordingObserver::new();
        let handle: ObserverHandle = recorder.clone();
        handle.on_event(&SimEvent::RuleAdded {
            name: "VegetationToHotRule".into(),
        });
        handle.on_event(&SimEvent::StepCompleted { step: 0 });

        assert_eq!(
            recorder.events(),
            vec![
                SimEvent::RuleAdded {
                    name: "VegetationToHotRule".into()
                },
                SimEvent::StepCompleted { step: 0 },
            ]
        );
    }

    #[test]
    fn test_event_messages() {
        let event = SimEvent::NeighborhoodFallback {
            requested: None,
            fallback: "NeumannNeighborhood",
        };
        assert_eq!(
            event.to_string(),
            "No neighborhood given, falling back to NeumannNeighborhood"
        );

        let event = SimEvent::SinkFailed {
            name: "HeatPlotVisualizer",
            frame: None,
            error: "disk full".into(),
        };
        assert_eq!(event.to_string(), "HeatPlotVisualizer failed to finish: disk full");
    }
}
