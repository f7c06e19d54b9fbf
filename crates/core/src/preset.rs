//! Initial grid generators
//!
//! A [`Preset`] builds the state a run starts from. Presets are selected by
//! name through [`create_preset`]; unknown names fall back to `random`.

use crate::field::Field;
use crate::observer::{ObserverHandle, SimEvent};
use crate::state::{Cell, CellState, State};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Untouched vegetation: oxygen but no fuel and no heat
const VEGETATION: Cell = Cell::new(CellState::Vegetation, 0.0, 0.0, 4.0);

/// Freshly lit cell
const FIRE: Cell = Cell::new(CellState::Fire, 4.0, 4.0, 4.0);

/// Factory for the initial [`State`]
pub trait Preset {
    /// Registry name
    fn name(&self) -> &'static str;

    /// Build a `width × height` grid
    fn generate(&self, width: usize, height: usize) -> State;
}

/// Grid built cell by cell from a generator function
fn from_cells(width: usize, height: usize, cell_at: impl FnMut(usize, usize) -> Cell) -> State {
    State::from_cells(&Field::from_fn(width, height, cell_at))
}

/// Vegetation with scattered fires
///
/// Each cell independently starts burning with probability
/// [`RandomPreset::FIRE_PROBABILITY`], drawn from a generator seeded with
/// the run seed.
#[derive(Debug, Clone, Copy)]
pub struct RandomPreset {
    seed: u64,
}

impl RandomPreset {
    pub const NAME: &'static str = "random";
    pub const FIRE_PROBABILITY: f64 = 0.1;

    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Preset for RandomPreset {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn generate(&self, width: usize, height: usize) -> State {
        let mut rng = StdRng::seed_from_u64(self.seed);
        from_cells(width, height, |_, _| {
            if rng.random::<f64>() < Self::FIRE_PROBABILITY {
                FIRE
            } else {
                VEGETATION
            }
        })
    }
}

/// Vegetation between two burning columns on the left and right edge
#[derive(Debug, Default, Clone, Copy)]
pub struct FireWallPreset;

impl FireWallPreset {
    pub const NAME: &'static str = "firewall";
}

impl Preset for FireWallPreset {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn generate(&self, width: usize, height: usize) -> State {
        from_cells(width, height, |x, _| {
            if x == 0 || x + 1 == width {
                FIRE
            } else {
                VEGETATION
            }
        })
    }
}

/// Fuelled vegetation with a single fire in the center
#[derive(Debug, Default, Clone, Copy)]
pub struct SparkPreset;

impl SparkPreset {
    pub const NAME: &'static str = "spark";
}

impl Preset for SparkPreset {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn generate(&self, width: usize, height: usize) -> State {
        let fuelled = Cell::new(CellState::Vegetation, 0.0, 4.0, 4.0);
        let center = (width / 2, height / 2);
        from_cells(width, height, |x, y| {
            if (x, y) == center {
                FIRE
            } else {
                fuelled
            }
        })
    }
}

/// Select a preset by name
///
/// Unknown names fall back to [`RandomPreset`] and report
/// [`SimEvent::PresetFallback`].
#[must_use]
pub fn create_preset(source: &str, seed: u64, observer: &ObserverHandle) -> Box<dyn Preset> {
    let preset: Box<dyn Preset> = match source {
        RandomPreset::NAME => Box::new(RandomPreset::new(seed)),
        FireWallPreset::NAME => Box::new(FireWallPreset),
        SparkPreset::NAME => Box::new(SparkPreset),
        requested => {
            observer.on_event(&SimEvent::PresetFallback {
                requested: requested.to_owned(),
                fallback: RandomPreset::NAME,
            });
            return Box::new(RandomPreset::new(seed));
        }
    };
    observer.on_event(&SimEvent::PresetSelected {
        name: preset.name(),
    });
    preset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{noop, RecordingObserver};

    #[test]
    fn test_presets_have_requested_shape() {
        let presets: [Box<dyn Preset>; 3] = [
            Box::new(RandomPreset::new(1)),
            Box::new(FireWallPreset),
            Box::new(SparkPreset),
        ];
        for preset in &presets {
            let state = preset.generate(7, 4);
            assert_eq!(state.dimensions(), (7, 4), "{}", preset.name());
        }
    }

    #[test]
    fn test_random_preset_is_seeded() {
        let a = RandomPreset::new(11).generate(20, 20);
        let b = RandomPreset::new(11).generate(20, 20);
        assert_eq!(a, b);

        // Only the two template cells appear
        for y in 0..20 {
            for x in 0..20 {
                let cell = a.cell(x, y);
                assert!(cell == FIRE || cell == VEGETATION);
            }
        }
    }

    #[test]
    fn test_random_preset_fire_share() {
        let state = RandomPreset::new(3).generate(100, 100);
        let fires = state.count(CellState::Fire);
        // 10% of 10_000 cells, with generous slack
        assert!((700..1300).contains(&fires), "got {fires} fires");
    }

    #[test]
    fn test_firewall_preset() {
        let state = FireWallPreset.generate(5, 3);
        for y in 0..3 {
            assert_eq!(state.cell(0, y), FIRE);
            assert_eq!(state.cell(4, y), FIRE);
            for x in 1..4 {
                assert_eq!(state.cell(x, y), VEGETATION);
            }
        }
    }

    #[test]
    fn test_spark_preset() {
        let state = SparkPreset.generate(5, 5);
        assert_eq!(state.count(CellState::Fire), 1);
        assert_eq!(state.cell(2, 2), FIRE);
        assert_eq!(state.cell(0, 0).fuel, 4.0);
    }

    #[test]
    fn test_registry_fallback() {
        let recorder = RecordingObserver::new();
        let observer: ObserverHandle = recorder.clone();

        assert_eq!(create_preset("firewall", 0, &noop()).name(), "firewall");
        assert_eq!(create_preset("volcano", 0, &observer).name(), "random");
        assert_eq!(
            recorder.events(),
            vec![SimEvent::PresetFallback {
                requested: "volcano".into(),
                fallback: "random",
            }]
        );
    }
}
