//! Combustion state machine
//!
//! ```text
//! VEGETATION --heat > 0--> HOT --approach--> FIRE --extinction--> INCOMBUSTIBLE
//! ```
//!
//! [`VegetationIgnitesToHot`] handles the first transition. [`IgnitionRule`]
//! handles `HOT → FIRE` and `FIRE → INCOMBUSTIBLE` according to one of three
//! approaches:
//!
//! - `general`: ignite when `heat + fuel + oxygen >= threshold_sum`
//! - `individual`: ignite when each level reaches its own threshold
//! - `stochastic`: ignite with probability `pb`
//!
//! A HOT cell needs `fuel > 0 && oxygen > 0` under every approach. The
//! deterministic approaches extinguish a burning cell as soon as heat, fuel
//! or oxygen is depleted. The stochastic approach instead extinguishes each
//! burning cell with probability `po` and does not look at its resources.
//! Nothing ever returns to VEGETATION and INCOMBUSTIBLE is final.

use super::Rule;
use crate::neighborhood::NeighborhoodSummary;
use crate::observer::{ObserverHandle, SimEvent};
use crate::state::{CellState, State};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// VEGETATION cells with any heat become HOT
#[derive(Debug, Default, Clone, Copy)]
pub struct VegetationIgnitesToHot;

impl VegetationIgnitesToHot {
    pub const NAME: &'static str = "VegetationToHotRule";
    pub const ALIAS: &'static str = "VegetationIgnitesToHot";
}

impl Rule for VegetationIgnitesToHot {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn calculate(&mut self, mut state: State, _summary: &NeighborhoodSummary) -> State {
        let cells = state.fields_mut();
        cells
            .cell_state
            .par_iter_mut()
            .zip(cells.heat.par_iter())
            .for_each(|(cell, &heat)| {
                if *cell == CellState::Vegetation && heat > 0.0 {
                    *cell = CellState::Hot;
                }
            });
        state
    }
}

/// Policy deciding `HOT → FIRE` and `FIRE → INCOMBUSTIBLE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IgnitionApproach {
    /// Sum of the three levels against `threshold_sum`
    #[default]
    General,
    /// Each level against its own threshold
    Individual,
    /// Bernoulli draws with `pb` (ignition) and `po` (extinction)
    Stochastic,
}

impl IgnitionApproach {
    /// Parse a configured approach name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "general" => Some(Self::General),
            "individual" => Some(Self::Individual),
            "stochastic" => Some(Self::Stochastic),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Individual => "individual",
            Self::Stochastic => "stochastic",
        }
    }
}

/// Ignition parameters, read from the `[rule]` configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnitionParams {
    /// `general`, `individual` or `stochastic`; anything else means `general`
    pub rule_approach: String,
    /// `general`: minimum `heat + fuel + oxygen`
    pub threshold_sum: f32,
    /// `individual`: minimum heat
    pub t_heat: f32,
    /// `individual`: minimum fuel
    pub t_fuel: f32,
    /// `individual`: minimum oxygen
    pub t_oxygen: f32,
    /// `stochastic`: ignition probability per eligible cell and tick
    pub pb: f64,
    /// `stochastic`: extinction probability per burning cell and tick
    pub po: f64,
}

impl Default for IgnitionParams {
    fn default() -> Self {
        Self {
            rule_approach: IgnitionApproach::General.name().to_owned(),
            threshold_sum: 8.0,
            t_heat: 3.0,
            t_fuel: 1.0,
            t_oxygen: 1.0,
            pb: 0.05,
            po: 0.10,
        }
    }
}

/// `HOT → FIRE` ignition and `FIRE → INCOMBUSTIBLE` extinction
///
/// Owns a private generator seeded once at construction, so a run is
/// reproducible from its seed. In stochastic mode every tick draws one
/// number per cell for ignition and then one per cell for extinction, in
/// row-major order, whatever the cell states are.
#[derive(Debug, Clone)]
pub struct IgnitionRule {
    approach: IgnitionApproach,
    params: IgnitionParams,
    rng: StdRng,
}

impl IgnitionRule {
    pub const NAME: &'static str = "CellOnFireRule";
    pub const ALIAS: &'static str = "IgnitionRule";

    /// Create the rule, resolving `params.rule_approach`
    ///
    /// An unknown approach falls back to `general` and is reported through
    /// `observer`.
    #[must_use]
    pub fn new(params: IgnitionParams, seed: u64, observer: &ObserverHandle) -> Self {
        let approach = IgnitionApproach::from_name(&params.rule_approach).unwrap_or_else(|| {
            observer.on_event(&SimEvent::ApproachFallback {
                requested: params.rule_approach.clone(),
            });
            IgnitionApproach::General
        });
        Self {
            approach,
            params,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub fn approach(&self) -> IgnitionApproach {
        self.approach
    }

    /// Deterministic ignition followed by the depletion check
    ///
    /// Both decisions only look at the cell itself, so cells are processed
    /// in parallel.
    fn apply_deterministic(&self, state: &mut State) {
        let approach = self.approach;
        let IgnitionParams {
            threshold_sum,
            t_heat,
            t_fuel,
            t_oxygen,
            ..
        } = self.params;

        let ignites = move |heat: f32, fuel: f32, oxygen: f32| match approach {
            IgnitionApproach::Individual => heat >= t_heat && fuel >= t_fuel && oxygen >= t_oxygen,
            IgnitionApproach::General | IgnitionApproach::Stochastic => {
                heat + fuel + oxygen >= threshold_sum
            }
        };

        let cells = state.fields_mut();
        cells
            .cell_state
            .par_iter_mut()
            .zip(cells.heat.par_iter())
            .zip(cells.fuel.par_iter())
            .zip(cells.oxygen.par_iter())
            .for_each(|(((cell, &heat), &fuel), &oxygen)| {
                if *cell == CellState::Hot
                    && fuel > 0.0
                    && oxygen > 0.0
                    && ignites(heat, fuel, oxygen)
                {
                    *cell = CellState::Fire;
                }
                if *cell == CellState::Fire && (heat <= 0.0 || oxygen <= 0.0 || fuel <= 0.0) {
                    *cell = CellState::Incombustible;
                }
            });
    }

    /// Probabilistic ignition then probabilistic extinction
    ///
    /// Sequential so the random stream is consumed in a fixed order.
    fn apply_stochastic(&mut self, state: &mut State) {
        let (pb, po) = (self.params.pb, self.params.po);
        let cells = state.fields_mut();

        for (i, cell) in cells.cell_state.iter_mut().enumerate() {
            let draw: f64 = self.rng.random();
            if *cell == CellState::Hot
                && cells.fuel[i] > 0.0
                && cells.oxygen[i] > 0.0
                && draw < pb
            {
                *cell = CellState::Fire;
            }
        }

        for cell in cells.cell_state.iter_mut() {
            let draw: f64 = self.rng.random();
            if *cell == CellState::Fire && draw < po {
                *cell = CellState::Incombustible;
            }
        }
    }
}

impl Rule for IgnitionRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn calculate(&mut self, mut state: State, _summary: &NeighborhoodSummary) -> State {
        match self.approach {
            IgnitionApproach::General | IgnitionApproach::Individual => {
                self.apply_deterministic(&mut state);
            }
            IgnitionApproach::Stochastic => self.apply_stochastic(&mut state),
        }
        state
    }
}
