//! Simulation driver
//!
//! [`Simulation`] owns the grid, the neighborhood, the rule pipeline and the
//! sinks. Each tick computes one [`NeighborhoodSummary`](crate::neighborhood::NeighborhoodSummary)
//! from the current state and folds the pipeline over it; the result replaces
//! the state and is published to every sink.

use crate::config::Config;
use crate::error::SimError;
use crate::neighborhood::{create_neighborhood, Neighborhood};
use crate::observer::{ObserverHandle, SimEvent};
use crate::preset::create_preset;
use crate::rules::RulePipeline;
use crate::state::State;
use crate::visual::{create_sinks, VisualizerSink};

/// Cellular automaton run: state plus everything that advances and observes it
pub struct Simulation {
    state: State,
    neighborhood: Box<dyn Neighborhood>,
    pipeline: RulePipeline,
    sinks: Vec<Box<dyn VisualizerSink>>,
    observer: ObserverHandle,
    /// Ticks applied so far; also the index of the current frame
    step: usize,
}

impl Simulation {
    /// Assemble a simulation from parts
    ///
    /// # Errors
    ///
    /// [`SimError::IncompatibleRule`] if a rule reads a summary field the
    /// neighborhood does not compute.
    pub fn new(
        state: State,
        neighborhood: Box<dyn Neighborhood>,
        pipeline: RulePipeline,
        sinks: Vec<Box<dyn VisualizerSink>>,
        observer: ObserverHandle,
    ) -> Result<Self, SimError> {
        pipeline.check_compatible(neighborhood.as_ref())?;
        Ok(Self {
            state,
            neighborhood,
            pipeline,
            sinks,
            observer,
            step: 0,
        })
    }

    /// Build a simulation from configuration
    ///
    /// Without a configured seed one is drawn from OS entropy and reported
    /// as [`SimEvent::SeedChosen`]; the preset and the ignition rule both use
    /// the resolved seed.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidDimensions`] for a zero width or height, or
    /// [`SimError::IncompatibleRule`] as in [`Simulation::new`].
    pub fn from_config(config: &Config, observer: ObserverHandle) -> Result<Self, SimError> {
        let (width, height) = (config.width(), config.height());
        if width == 0 || height == 0 {
            return Err(SimError::InvalidDimensions { width, height });
        }

        let seed = resolve_seed(config.simulation.seed, &observer);
        let state = create_preset(&config.preset.source, seed, &observer).generate(width, height);
        let neighborhood =
            create_neighborhood(config.simulation.neighborhood.as_deref(), &observer);
        let pipeline = RulePipeline::from_names(
            &config.simulation.rules,
            &config.rule,
            seed,
            neighborhood.as_ref(),
            &observer,
        )?;
        let sinks = create_sinks(&config.simulation.visualizers, config, &observer);

        Self::new(state, neighborhood, pipeline, sinks, observer)
    }

    /// Append a sink after the configured ones
    pub fn add_sink(&mut self, sink: Box<dyn VisualizerSink>) {
        self.sinks.push(sink);
    }

    /// Advance one tick without publishing
    pub fn step(&mut self) {
        let state = std::mem::take(&mut self.state);
        let summary = self.neighborhood.calculate(&state);
        self.state = self.pipeline.apply(state, &summary);
        self.step += 1;
        self.observer
            .on_event(&SimEvent::StepCompleted { step: self.step });
    }

    /// Publish the current frame, run `steps` ticks publishing each result,
    /// then finish every sink once
    ///
    /// A failing sink is reported through the observer and keeps receiving
    /// frames; the other sinks are unaffected.
    pub fn run(&mut self, steps: usize) {
        self.publish();
        for _ in 0..steps {
            self.step();
            self.publish();
        }
        self.finish_sinks();
        self.observer.on_event(&SimEvent::RunFinished { steps });
    }

    fn publish(&mut self) {
        let frame = self.step;
        for sink in &mut self.sinks {
            if let Err(e) = sink.visualize(&self.state) {
                self.observer.on_event(&SimEvent::SinkFailed {
                    name: sink.name(),
                    frame: Some(frame),
                    error: e.to_string(),
                });
            }
        }
    }

    fn finish_sinks(&mut self) {
        for sink in &mut self.sinks {
            if let Err(e) = sink.finish() {
                self.observer.on_event(&SimEvent::SinkFailed {
                    name: sink.name(),
                    frame: None,
                    error: e.to_string(),
                });
            }
        }
    }

    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    #[must_use]
    pub fn into_state(self) -> State {
        self.state
    }

    /// Ticks applied so far
    #[must_use]
    pub fn steps_taken(&self) -> usize {
        self.step
    }

    #[must_use]
    pub fn neighborhood_name(&self) -> &'static str {
        self.neighborhood.name()
    }

    #[must_use]
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.pipeline.names()
    }

    #[must_use]
    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }
}

fn resolve_seed(configured: Option<u64>, observer: &ObserverHandle) -> u64 {
    configured.unwrap_or_else(|| {
        let seed = rand::random();
        observer.on_event(&SimEvent::SeedChosen { seed });
        seed
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::neighborhood::NeumannNeighborhood;
    use crate::observer::{noop, RecordingObserver};
    use crate::rules::{DecreaseWhenBurning, OxygenRecovery};
    use crate::state::{Cell, CellState};
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Log {
        frames: Vec<State>,
        finished: usize,
    }

    struct CollectingSink(Arc<Mutex<Log>>);

    impl VisualizerSink for CollectingSink {
        fn name(&self) -> &'static str {
            "CollectingSink"
        }

        fn visualize(&mut self, state: &State) -> Result<(), SinkError> {
            self.0.lock().unwrap().frames.push(state.clone());
            Ok(())
        }

        fn finish(&mut self) -> Result<(), SinkError> {
            self.0.lock().unwrap().finished += 1;
            Ok(())
        }
    }

    struct BrokenSink;

    impl VisualizerSink for BrokenSink {
        fn name(&self) -> &'static str {
            "BrokenSink"
        }

        fn visualize(&mut self, _state: &State) -> Result<(), SinkError> {
            Err(io::Error::other("disk full").into())
        }

        fn finish(&mut self) -> Result<(), SinkError> {
            Err(io::Error::other("disk full").into())
        }
    }

    fn burning_center() -> State {
        let mut state = State::uniform(3, 3, 0.0, 0.0, 4.0, CellState::Vegetation);
        state.set_cell(1, 1, Cell::new(CellState::Fire, 4.0, 4.0, 4.0));
        state
    }

    #[test]
    fn test_run_publishes_initial_frame_and_every_tick() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut sim = Simulation::new(
            burning_center(),
            Box::new(NeumannNeighborhood),
            RulePipeline::new().with_rule(DecreaseWhenBurning),
            vec![Box::new(CollectingSink(log.clone()))],
            noop(),
        )
        .unwrap();

        sim.run(3);

        let log = log.lock().unwrap();
        assert_eq!(log.frames.len(), 4);
        assert_eq!(log.finished, 1);
        assert_eq!(log.frames[0], burning_center());
        let heat: Vec<f32> = log.frames.iter().map(|s| s.cell(1, 1).heat).collect();
        assert_eq!(heat, vec![4.0, 3.0, 2.0, 1.0]);
        assert_eq!(sim.steps_taken(), 3);
    }

    #[test]
    fn test_step_does_not_publish() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut sim = Simulation::new(
            burning_center(),
            Box::new(NeumannNeighborhood),
            RulePipeline::new().with_rule(DecreaseWhenBurning),
            vec![Box::new(CollectingSink(log.clone()))],
            noop(),
        )
        .unwrap();

        sim.step();

        assert!(log.lock().unwrap().frames.is_empty());
        assert_eq!(sim.state().cell(1, 1).fuel, 3.0);
    }

    #[test]
    fn test_broken_sink_is_isolated() {
        let recorder = RecordingObserver::new();
        let log = Arc::new(Mutex::new(Log::default()));
        let mut sim = Simulation::new(
            burning_center(),
            Box::new(NeumannNeighborhood),
            RulePipeline::new(),
            vec![
                Box::new(BrokenSink),
                Box::new(CollectingSink(log.clone())),
            ],
            recorder.clone(),
        )
        .unwrap();

        sim.run(2);

        let log = log.lock().unwrap();
        assert_eq!(log.frames.len(), 3);
        assert_eq!(log.finished, 1);

        let failures: Vec<Option<usize>> = recorder
            .events()
            .into_iter()
            .filter_map(|e| match e {
                SimEvent::SinkFailed { name, frame, .. } => {
                    assert_eq!(name, "BrokenSink");
                    Some(frame)
                }
                _ => None,
            })
            .collect();
        assert_eq!(failures, vec![Some(0), Some(1), Some(2), None]);
    }

    #[test]
    fn test_incompatible_pipeline_is_rejected() {
        let result = Simulation::new(
            burning_center(),
            Box::new(NeumannNeighborhood),
            RulePipeline::new().with_rule(OxygenRecovery),
            Vec::new(),
            noop(),
        );
        assert!(matches!(result, Err(SimError::IncompatibleRule { .. })));
    }

    #[test]
    fn test_from_config_rejects_empty_grid() {
        let mut config = Config::default();
        config.simulation.width = Some(0);
        let result = Simulation::from_config(&config, noop());
        assert!(matches!(
            result,
            Err(SimError::InvalidDimensions {
                width: 0,
                height: 10
            })
        ));
    }

    #[test]
    fn test_from_config_reports_drawn_seed() {
        let recorder = RecordingObserver::new();
        let sim = Simulation::from_config(&Config::default(), recorder.clone()).unwrap();

        assert_eq!(sim.state().dimensions(), (10, 10));
        assert_eq!(sim.rule_names(), vec!["DecreaseWhenFireRule", "CellOnFireRule"]);
        assert_eq!(sim.sink_names(), vec!["CellStateVisualizer"]);
        assert!(recorder
            .events()
            .iter()
            .any(|e| matches!(e, SimEvent::SeedChosen { .. })));
    }

    #[test]
    fn test_from_config_with_seed_does_not_report_one() {
        let recorder = RecordingObserver::new();
        let mut config = Config::default();
        config.simulation.seed = Some(5);
        config.simulation.rules = vec!["DecreaseWhenFireRule".into(), "CellOnFireRule".into()];
        let sim = Simulation::from_config(&config, recorder.clone()).unwrap();

        assert_eq!(sim.rule_names(), vec!["DecreaseWhenFireRule", "CellOnFireRule"]);
        assert_eq!(sim.neighborhood_name(), "NeumannNeighborhood");
        assert_eq!(sim.sink_names(), vec!["CellStateVisualizer"]);
        assert!(!recorder
            .events()
            .iter()
            .any(|e| matches!(e, SimEvent::SeedChosen { .. })));
    }
}
