//! Fire Spread Cellular Automaton Core Library
//!
//! A grid of cells, each carrying heat, fuel and oxygen levels and a
//! combustion state, advanced in discrete ticks. Every tick:
//!
//! 1. a [`Neighborhood`] aggregates the 4-connected neighbors of every cell
//!    into a [`NeighborhoodSummary`];
//! 2. the [`RulePipeline`] applies its rules in configured order, threading
//!    the owned [`State`] from rule to rule;
//! 3. the result replaces the state and is published to every
//!    [`VisualizerSink`].
//!
//! Cells move `VEGETATION → HOT → FIRE → INCOMBUSTIBLE` and never back.
//! Whether a hot cell ignites is decided by [`IgnitionRule`] with one of three
//! approaches (`general`, `individual`, `stochastic`).
//!
//! ## Quick start
//!
//! ```no_run
//! use fire_ca_core::{Config, Simulation, TracingObserver};
//! use std::sync::Arc;
//!
//! let config = Config::from_file("sim.toml")?;
//! let mut sim = Simulation::from_config(&config, Arc::new(TracingObserver))?;
//! sim.run(config.simulation.steps);
//! # Ok::<(), fire_ca_core::SimError>(())
//! ```

pub mod config;
pub mod error;
pub mod field;
pub mod neighborhood;
pub mod observer;
pub mod preset;
pub mod rules;
pub mod simulation;
pub mod state;
pub mod visual;

pub use config::Config;
pub use error::{SimError, SinkError};
pub use field::Field;
pub use neighborhood::{
    create_neighborhood, ExtendedNeumannNeighborhood, Neighborhood, NeighborhoodSummary,
    NeumannNeighborhood,
};
pub use observer::{
    noop, NoopObserver, Observer, ObserverHandle, RecordingObserver, SimEvent, TracingObserver,
};
pub use preset::{create_preset, FireWallPreset, Preset, RandomPreset, SparkPreset};
pub use rules::{
    create_rule, IgnitionApproach, IgnitionParams, IgnitionRule, Rule, RulePipeline,
};
pub use simulation::Simulation;
pub use state::{Cell, CellState, State, MAX_LEVEL};
pub use visual::{create_sinks, VisualizerSink};
