//! Heat rules: gain from hot and burning neighbors, cooldown of burnt cells

use super::Rule;
use crate::neighborhood::NeighborhoodSummary;
use crate::state::{CellState, State, MAX_LEVEL};
use rayon::prelude::*;

/// Add `amount` heat (capped at [`MAX_LEVEL`]) wherever `mask(count)` holds
fn boost_heat_where(
    state: &mut State,
    counts: &[u8],
    amount: f32,
    mask: impl Fn(u8) -> bool + Sync,
) {
    state
        .heat_mut()
        .par_iter_mut()
        .zip(counts.par_iter())
        .for_each(|(heat, &count)| {
            if mask(count) {
                *heat = (*heat + amount).min(MAX_LEVEL);
            }
        });
}

/// Every cell gains one heat per HOT neighbor, capped at 5
#[derive(Debug, Default, Clone, Copy)]
pub struct HeatFromHotNeighbor;

impl HeatFromHotNeighbor {
    pub const NAME: &'static str = "IncreaseHotForNeighborRule";
    pub const ALIAS: &'static str = "HeatFromHotNeighbor";
}

impl Rule for HeatFromHotNeighbor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn calculate(&mut self, mut state: State, summary: &NeighborhoodSummary) -> State {
        state
            .heat_mut()
            .par_iter_mut()
            .zip(summary.state_count(CellState::Hot).par_iter())
            .for_each(|(heat, &hot)| *heat = (*heat + f32::from(hot)).min(MAX_LEVEL));
        state
    }
}

/// +2 heat for cells with exactly one burning neighbor
#[derive(Debug, Default, Clone, Copy)]
pub struct HeatBoostSingleFireNeighbor;

impl HeatBoostSingleFireNeighbor {
    pub const NAME: &'static str = "IncreaseHeatExactlyOneFireRule";
    pub const ALIAS: &'static str = "HeatBoostSingleFireNeighbor";
}

impl Rule for HeatBoostSingleFireNeighbor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn calculate(&mut self, mut state: State, summary: &NeighborhoodSummary) -> State {
        boost_heat_where(
            &mut state,
            summary.state_count(CellState::Fire),
            2.0,
            |fire| fire == 1,
        );
        state
    }
}

/// +4 heat for cells with more than one burning neighbor
#[derive(Debug, Default, Clone, Copy)]
pub struct HeatBoostMultiFireNeighbor;

impl HeatBoostMultiFireNeighbor {
    pub const NAME: &'static str = "IncreaseHeatMoreThanOneFireRule";
    pub const ALIAS: &'static str = "HeatBoostMultiFireNeighbor";
}

impl Rule for HeatBoostMultiFireNeighbor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn calculate(&mut self, mut state: State, summary: &NeighborhoodSummary) -> State {
        boost_heat_where(
            &mut state,
            summary.state_count(CellState::Fire),
            4.0,
            |fire| fire > 1,
        );
        state
    }
}

/// INCOMBUSTIBLE cells lose one heat per tick, down to 0
#[derive(Debug, Default, Clone, Copy)]
pub struct IncombustibleCooldown;

impl IncombustibleCooldown {
    pub const NAME: &'static str = "DecreaseHeatInIncombustibleRule";
    pub const ALIAS: &'static str = "IncombustibleCooldown";
}

impl Rule for IncombustibleCooldown {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn calculate(&mut self, mut state: State, _summary: &NeighborhoodSummary) -> State {
        let cells = state.fields_mut();
        cells
            .heat
            .par_iter_mut()
            .zip(cells.cell_state.par_iter())
            .for_each(|(heat, &cell)| {
                if cell == CellState::Incombustible {
                    *heat = (*heat - 1.0).max(0.0);
                }
            });
        state
    }
}
