//! Rule pipeline
//!
//! A [`Rule`] transforms the whole grid once per tick, given the tick's
//! [`NeighborhoodSummary`]. The [`RulePipeline`] applies its rules strictly
//! in configured order, threading the owned [`State`] from one rule to the
//! next: rule *i + 1* sees what rule *i* wrote this tick, while the summary
//! stays the one computed before the first rule ran.
//!
//! # Rule catalog
//!
//! | Config name | Alias |
//! |---|---|
//! | `DecreaseWhenFireRule` | `DecreaseWhenBurning` |
//! | `IncreaseHotForNeighborRule` | `HeatFromHotNeighbor` |
//! | `IncreaseHeatExactlyOneFireRule` | `HeatBoostSingleFireNeighbor` |
//! | `IncreaseHeatMoreThanOneFireRule` | `HeatBoostMultiFireNeighbor` |
//! | `IncreaseOxygenIfNeighborsHigherRule` | `OxygenRecovery` |
//! | `VegetationToHotRule` | `VegetationIgnitesToHot` |
//! | `DecreaseHeatInIncombustibleRule` | `IncombustibleCooldown` |
//! | `CellOnFireRule` | `IgnitionRule` |

mod heat;
mod ignition;
mod resource;

pub use heat::{
    HeatBoostMultiFireNeighbor, HeatBoostSingleFireNeighbor, HeatFromHotNeighbor,
    IncombustibleCooldown,
};
pub use ignition::{IgnitionApproach, IgnitionParams, IgnitionRule, VegetationIgnitesToHot};
pub use resource::{DecreaseWhenBurning, OxygenRecovery};

use crate::error::SimError;
use crate::neighborhood::{Neighborhood, NeighborhoodSummary, SummaryFields};
use crate::observer::{ObserverHandle, SimEvent};
use crate::state::State;

/// One stage of the per-tick update
pub trait Rule: Send {
    /// Registry name
    fn name(&self) -> &'static str;

    /// Optional summary fields this rule reads
    fn requires(&self) -> SummaryFields {
        SummaryFields::BASIC
    }

    /// Apply the rule to every cell and hand the state on
    fn calculate(&mut self, state: State, summary: &NeighborhoodSummary) -> State;
}

/// Look up a rule by config name or alias
///
/// `ignition` and `seed` only matter for the ignition rule, which owns a
/// generator seeded from `seed`.
#[must_use]
pub fn create_rule(
    name: &str,
    ignition: &IgnitionParams,
    seed: u64,
    observer: &ObserverHandle,
) -> Option<Box<dyn Rule>> {
    let rule: Box<dyn Rule> = match name {
        DecreaseWhenBurning::NAME | DecreaseWhenBurning::ALIAS => Box::new(DecreaseWhenBurning),
        HeatFromHotNeighbor::NAME | HeatFromHotNeighbor::ALIAS => Box::new(HeatFromHotNeighbor),
        HeatBoostSingleFireNeighbor::NAME | HeatBoostSingleFireNeighbor::ALIAS => {
            Box::new(HeatBoostSingleFireNeighbor)
        }
        HeatBoostMultiFireNeighbor::NAME | HeatBoostMultiFireNeighbor::ALIAS => {
            Box::new(HeatBoostMultiFireNeighbor)
        }
        OxygenRecovery::NAME | OxygenRecovery::ALIAS => Box::new(OxygenRecovery),
        VegetationIgnitesToHot::NAME | VegetationIgnitesToHot::ALIAS => {
            Box::new(VegetationIgnitesToHot)
        }
        IncombustibleCooldown::NAME | IncombustibleCooldown::ALIAS => {
            Box::new(IncombustibleCooldown)
        }
        IgnitionRule::NAME | IgnitionRule::ALIAS => {
            Box::new(IgnitionRule::new(ignition.clone(), seed, observer))
        }
        _ => return None,
    };
    Some(rule)
}

/// Ordered list of rules applied once per tick
#[derive(Default)]
pub struct RulePipeline {
    rules: Vec<Box<dyn Rule>>,
}

impl RulePipeline {
    /// Empty pipeline; a tick leaves the state unchanged
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule at the end of the pipeline
    pub fn push(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Builder-style [`RulePipeline::push`]
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Build a pipeline from configured rule names
    ///
    /// Unknown names are reported through `observer` and skipped. The
    /// finished pipeline is checked against `neighborhood` once, here.
    ///
    /// # Errors
    ///
    /// [`SimError::IncompatibleRule`] if a rule needs a summary field the
    /// neighborhood does not compute.
    pub fn from_names<S: AsRef<str>>(
        names: &[S],
        ignition: &IgnitionParams,
        seed: u64,
        neighborhood: &dyn Neighborhood,
        observer: &ObserverHandle,
    ) -> Result<Self, SimError> {
        let mut pipeline = Self::new();
        for name in names {
            let name = name.as_ref();
            match create_rule(name, ignition, seed, observer) {
                Some(rule) => {
                    observer.on_event(&SimEvent::RuleAdded {
                        name: rule.name().to_owned(),
                    });
                    pipeline.push(rule);
                }
                None => observer.on_event(&SimEvent::UnknownRule {
                    name: name.to_owned(),
                }),
            }
        }
        pipeline.check_order(observer);
        pipeline.check_compatible(neighborhood)?;
        Ok(pipeline)
    }

    /// Report [`SimEvent::RuleOrder`] when `VegetationToHotRule` runs ahead
    /// of `CellOnFireRule`
    fn check_order(&self, observer: &ObserverHandle) {
        let names = self.names();
        let position = |name: &str| names.iter().position(|&n| n == name);
        if let (Some(to_hot), Some(ignite)) = (
            position(VegetationIgnitesToHot::NAME),
            position(IgnitionRule::NAME),
        ) {
            if to_hot < ignite {
                observer.on_event(&SimEvent::RuleOrder {
                    earlier: VegetationIgnitesToHot::NAME,
                    later: IgnitionRule::NAME,
                });
            }
        }
    }

    /// Verify every rule's summary requirements against `neighborhood`
    ///
    /// # Errors
    ///
    /// [`SimError::IncompatibleRule`] naming the first offending rule.
    pub fn check_compatible(&self, neighborhood: &dyn Neighborhood) -> Result<(), SimError> {
        let available = neighborhood.provides();
        for rule in &self.rules {
            if let Some(field) = rule.requires().first_missing(available) {
                return Err(SimError::IncompatibleRule {
                    rule: rule.name(),
                    field,
                    neighborhood: neighborhood.name(),
                });
            }
        }
        Ok(())
    }

    /// Run every rule in order for one tick
    pub fn apply(&mut self, state: State, summary: &NeighborhoodSummary) -> State {
        self.rules
            .iter_mut()
            .fold(state, |state, rule| rule.calculate(state, summary))
    }

    /// Rule names in application order
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for RulePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RulePipeline")
            .field("rules", &self.names())
            .finish()
    }
}
