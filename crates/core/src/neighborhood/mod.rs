//! Neighborhood aggregation
//!
//! A [`Neighborhood`] turns the current [`State`] into a
//! [`NeighborhoodSummary`]: per-cell sums and counts over the neighboring
//! cells. The summary is computed once per tick and stays read-only while
//! the rule pipeline runs.
//!
//! # Selection
//!
//! Implementations are chosen by name through [`create_neighborhood`]. An
//! unknown or missing name falls back to [`NeumannNeighborhood`]; a
//! simulation never runs without a neighborhood.

mod von_neumann;

pub use von_neumann::{ExtendedNeumannNeighborhood, NeumannNeighborhood};

use crate::field::Field;
use crate::observer::{ObserverHandle, SimEvent};
use crate::state::{CellState, State};

/// Optional summary fields a neighborhood may compute
///
/// Used both as the capability set of a [`Neighborhood`] and as the
/// requirement set of a [`crate::rules::Rule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SummaryFields {
    /// `oxygen_higher_count`: neighbors whose oxygen exceeds the cell's own
    pub oxygen_higher_count: bool,
}

impl SummaryFields {
    /// Only the always-present sums and state counts
    pub const BASIC: Self = Self {
        oxygen_higher_count: false,
    };

    /// Every optional field
    pub const EXTENDED: Self = Self {
        oxygen_higher_count: true,
    };

    /// Name of the first field required by `self` that `available` lacks
    #[must_use]
    pub fn first_missing(&self, available: SummaryFields) -> Option<&'static str> {
        (self.oxygen_higher_count && !available.oxygen_higher_count)
            .then_some("oxygen_higher_count")
    }
}

/// Per-cell aggregates over the neighbors of every cell
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodSummary {
    /// Sum of neighbor oxygen
    pub oxygen_sum: Field<f32>,
    /// Sum of neighbor fuel
    pub fuel_sum: Field<f32>,
    /// Sum of neighbor heat
    pub heat_sum: Field<f32>,
    /// Per state, number of neighbors in that state (indexed by
    /// [`CellState::index`])
    pub state_counts: [Field<u8>; CellState::COUNT],
    /// Number of neighbors with strictly higher oxygen, when the
    /// neighborhood computes it
    pub oxygen_higher_count: Option<Field<u8>>,
}

impl NeighborhoodSummary {
    /// Neighbor counts for `state`, row-major
    #[must_use]
    pub fn state_count(&self, state: CellState) -> &[u8] {
        self.state_counts[state.index()].as_slice()
    }

    /// `(width, height)` of every field in the summary
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        self.oxygen_sum.dimensions()
    }
}

/// Aggregation strategy producing a [`NeighborhoodSummary`]
pub trait Neighborhood: Send + Sync {
    /// Registry name
    fn name(&self) -> &'static str;

    /// Optional summary fields this implementation fills in
    fn provides(&self) -> SummaryFields {
        SummaryFields::BASIC
    }

    /// Compute the summary for `state`
    ///
    /// Pure and deterministic; the output has the same dimensions as `state`.
    fn calculate(&self, state: &State) -> NeighborhoodSummary;
}

/// Select a neighborhood implementation by name
///
/// Unknown or missing names fall back to [`NeumannNeighborhood`] and report
/// [`SimEvent::NeighborhoodFallback`].
#[must_use]
pub fn create_neighborhood(name: Option<&str>, observer: &ObserverHandle) -> Box<dyn Neighborhood> {
    let neighborhood: Box<dyn Neighborhood> = match name {
        Some(NeumannNeighborhood::NAME) => Box::new(NeumannNeighborhood),
        Some(ExtendedNeumannNeighborhood::NAME) => Box::new(ExtendedNeumannNeighborhood),
        requested => {
            observer.on_event(&SimEvent::NeighborhoodFallback {
                requested: requested.map(str::to_owned),
                fallback: NeumannNeighborhood::NAME,
            });
            return Box::new(NeumannNeighborhood);
        }
    };
    observer.on_event(&SimEvent::NeighborhoodSelected {
        name: neighborhood.name(),
    });
    neighborhood
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::RecordingObserver;

    #[test]
    fn test_registry_selects_by_name() {
        let observer: ObserverHandle = RecordingObserver::new();
        let n = create_neighborhood(Some("ExtendedNeumannNeighborhood"), &observer);
        assert_eq!(n.name(), "ExtendedNeumannNeighborhood");
        assert!(n.provides().oxygen_higher_count);

        let n = create_neighborhood(Some("NeumannNeighborhood"), &observer);
        assert_eq!(n.provides(), SummaryFields::BASIC);
    }

    #[test]
    fn test_unknown_neighborhood_falls_back() {
        let recorder = RecordingObserver::new();
        let observer: ObserverHandle = recorder.clone();

        let n = create_neighborhood(Some("MooreNeighborhood"), &observer);
        assert_eq!(n.name(), "NeumannNeighborhood");

        let n = create_neighborhood(None, &observer);
        assert_eq!(n.name(), "NeumannNeighborhood");

        assert_eq!(
            recorder.events(),
            vec![
                SimEvent::NeighborhoodFallback {
                    requested: Some("MooreNeighborhood".into()),
                    fallback: "NeumannNeighborhood",
                },
                SimEvent::NeighborhoodFallback {
                    requested: None,
                    fallback: "NeumannNeighborhood",
                },
            ]
        );
    }

    #[test]
    fn test_first_missing_field() {
        assert_eq!(
            SummaryFields::EXTENDED.first_missing(SummaryFields::BASIC),
            Some("oxygen_higher_count")
        );
        assert_eq!(SummaryFields::EXTENDED.first_missing(SummaryFields::EXTENDED), None);
        assert_eq!(SummaryFields::BASIC.first_missing(SummaryFields::BASIC), None);
    }
}
