//! Resource rules: consumption while burning, oxygen inflow from neighbors

use super::Rule;
use crate::neighborhood::{NeighborhoodSummary, SummaryFields};
use crate::state::{CellState, State, MAX_LEVEL};
use rayon::prelude::*;

/// Burning cells consume one unit of oxygen, fuel and heat per tick
///
/// Each field is clamped at 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecreaseWhenBurning;

impl DecreaseWhenBurning {
    pub const NAME: &'static str = "DecreaseWhenFireRule";
    pub const ALIAS: &'static str = "DecreaseWhenBurning";
}

impl Rule for DecreaseWhenBurning {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn calculate(&mut self, mut state: State, _summary: &NeighborhoodSummary) -> State {
        let cells = state.fields_mut();
        cells
            .heat
            .par_iter_mut()
            .zip(cells.fuel.par_iter_mut())
            .zip(cells.oxygen.par_iter_mut())
            .zip(cells.cell_state.par_iter())
            .for_each(|(((heat, fuel), oxygen), &cell)| {
                if cell == CellState::Fire {
                    *oxygen = (*oxygen - 1.0).max(0.0);
                    *fuel = (*fuel - 1.0).max(0.0);
                    *heat = (*heat - 1.0).max(0.0);
                }
            });
        state
    }
}

/// +1 oxygen (capped at 5) for cells with at least two neighbors holding
/// more oxygen than they do
///
/// Needs `oxygen_higher_count`, so only runs with a neighborhood that
/// provides it.
#[derive(Debug, Default, Clone, Copy)]
pub struct OxygenRecovery;

impl OxygenRecovery {
    pub const NAME: &'static str = "IncreaseOxygenIfNeighborsHigherRule";
    pub const ALIAS: &'static str = "OxygenRecovery";
}

impl Rule for OxygenRecovery {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn requires(&self) -> SummaryFields {
        SummaryFields::EXTENDED
    }

    fn calculate(&mut self, mut state: State, summary: &NeighborhoodSummary) -> State {
        // Pipelines are checked at construction, so the field is present here
        let Some(higher) = summary.oxygen_higher_count.as_ref() else {
            return state;
        };
        state
            .oxygen_mut()
            .par_iter_mut()
            .zip(higher.as_slice().par_iter())
            .for_each(|(oxygen, &count)| {
                if count >= 2 {
                    *oxygen = (*oxygen + 1.0).min(MAX_LEVEL);
                }
            });
        state
    }
}
