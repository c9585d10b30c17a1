#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;

use crate::{
    darwin, fire, rps, segregation, wator, DarwinRule, FallingSandRule, FireRule, LatticeError,
    LifeRule, LoopRule, ParamValue, Parameters, PercolationRule, Result, RockPaperScissorsRule,
    Rule, SegregationRule, WaTorRule,
};

/// The built-in automata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AutomatonKind {
    /// Life-like birth/survival rule.
    GameOfLife,
    /// Flow through open cells.
    Percolation,
    /// Forest fire.
    Fire,
    /// Schelling segregation.
    Segregation,
    /// Wa-Tor predator/prey.
    WaTor,
    /// Sand and water particles.
    FallingSand,
    /// Cyclic dominance.
    RockPaperScissors,
    /// Langton's loop.
    Langton,
    /// Chou-Reggia loop.
    ChouReg2,
    /// Petelka loop.
    Petelka,
    /// Program-driven creatures.
    Darwin,
}

impl AutomatonKind {
    /// Every kind.
    pub const ALL: [AutomatonKind; 11] = [
        AutomatonKind::GameOfLife,
        AutomatonKind::Percolation,
        AutomatonKind::Fire,
        AutomatonKind::Segregation,
        AutomatonKind::WaTor,
        AutomatonKind::FallingSand,
        AutomatonKind::RockPaperScissors,
        AutomatonKind::Langton,
        AutomatonKind::ChouReg2,
        AutomatonKind::Petelka,
        AutomatonKind::Darwin,
    ];

    /// Identifier used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            AutomatonKind::GameOfLife => "GameOfLife",
            AutomatonKind::Percolation => "Percolation",
            AutomatonKind::Fire => "Fire",
            AutomatonKind::Segregation => "Segregation",
            AutomatonKind::WaTor => "WaTor",
            AutomatonKind::FallingSand => "FallingSand",
            AutomatonKind::RockPaperScissors => "RockPaperScissors",
            AutomatonKind::Langton => "Langton",
            AutomatonKind::ChouReg2 => "ChouReg2",
            AutomatonKind::Petelka => "Petelka",
            AutomatonKind::Darwin => "Darwin",
        }
    }

    /// Numeric defaults beyond the shared history bound.
    pub fn default_parameters(self) -> &'static [(&'static str, f64)] {
        match self {
            AutomatonKind::Fire => fire::DEFAULTS,
            AutomatonKind::Segregation => segregation::DEFAULTS,
            AutomatonKind::WaTor => wator::DEFAULTS,
            AutomatonKind::RockPaperScissors => rps::DEFAULTS,
            AutomatonKind::Darwin => darwin::DEFAULTS,
            _ => &[],
        }
    }

    /// Typed extras seeded for this kind.
    pub fn default_extras(self) -> Vec<(&'static str, ParamValue)> {
        match self {
            AutomatonKind::GameOfLife => {
                let (birth, survive) = crate::rules::LIFE;
                vec![
                    (crate::life::BIRTH_KEY, ParamValue::IntList(birth.to_vec())),
                    (crate::life::SURVIVE_KEY, ParamValue::IntList(survive.to_vec())),
                ]
            }
            AutomatonKind::Darwin => vec![
                ("program1", ParamValue::Text(darwin::programs::FLYTRAP.to_string())),
                ("program2", ParamValue::Text(darwin::programs::ROVER.to_string())),
            ],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for AutomatonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AutomatonKind {
    type Err = LatticeError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                tracing::error!(identifier = s, "unknown automaton");
                LatticeError::UnknownAutomaton(s.to_string())
            })
    }
}

/// Builds a rule from its parameters and a random source.
pub type RuleFactory = fn(Parameters, StdRng) -> Result<Box<dyn Rule>>;

/// Maps automaton kinds to rule factories.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    factories: HashMap<AutomatonKind, RuleFactory>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in automaton.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(AutomatonKind::GameOfLife, |p, _| Ok(Box::new(LifeRule::new(p))));
        registry.register(AutomatonKind::Percolation, |p, _| {
            Ok(Box::new(PercolationRule::new(p)))
        });
        registry.register(AutomatonKind::Fire, |p, rng| Ok(Box::new(FireRule::new(p, rng))));
        registry.register(AutomatonKind::Segregation, |p, rng| {
            Ok(Box::new(SegregationRule::new(p, rng)))
        });
        registry.register(AutomatonKind::WaTor, |p, rng| Ok(Box::new(WaTorRule::new(p, rng))));
        registry.register(AutomatonKind::FallingSand, |p, rng| {
            Ok(Box::new(FallingSandRule::new(p, rng)))
        });
        registry.register(AutomatonKind::RockPaperScissors, |p, _| {
            Ok(Box::new(RockPaperScissorsRule::new(p)?))
        });
        registry.register(AutomatonKind::Langton, |p, _| Ok(Box::new(LoopRule::langton(p))));
        registry.register(AutomatonKind::ChouReg2, |p, _| {
            Ok(Box::new(LoopRule::chou_reg2(p)))
        });
        registry.register(AutomatonKind::Petelka, |p, _| Ok(Box::new(LoopRule::petelka(p))));
        registry.register(AutomatonKind::Darwin, |p, rng| {
            Ok(Box::new(DarwinRule::new(p, rng)?))
        });
        registry
    }

    /// Adds or replaces the factory for `kind`.
    pub fn register(&mut self, kind: AutomatonKind, factory: RuleFactory) {
        self.factories.insert(kind, factory);
    }

    /// Whether `kind` has a factory.
    pub fn contains(&self, kind: AutomatonKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Builds the rule for `kind`.
    ///
    /// Starts from the kind's defaults, merges `overrides` and `extras`, and
    /// hands the result to the registered factory.
    pub fn create(
        &self,
        kind: AutomatonKind,
        overrides: impl IntoIterator<Item = (String, f64)>,
        extras: impl IntoIterator<Item = (String, ParamValue)>,
        rng: StdRng,
    ) -> Result<Box<dyn Rule>> {
        let Some(factory) = self.factories.get(&kind) else {
            tracing::error!(%kind, "no rule registered");
            return Err(LatticeError::UnregisteredRule(kind));
        };
        let mut params = Parameters::for_kind(kind);
        params.extend(overrides);
        for (key, value) in extras {
            params.set_extra(key, value);
        }
        let rule = factory(params, rng)?;
        tracing::debug!(%kind, states = rule.num_states(), "rule created");
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0)
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("wator".parse::<AutomatonKind>(), Ok(AutomatonKind::WaTor));
        assert_eq!(
            "GameOfLife".parse::<AutomatonKind>(),
            Ok(AutomatonKind::GameOfLife)
        );
        assert_eq!("darwin".parse::<AutomatonKind>(), Ok(AutomatonKind::Darwin));
        assert!("Turmite".parse::<AutomatonKind>().is_err());
        for kind in AutomatonKind::ALL {
            assert_eq!(kind.name().parse::<AutomatonKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_standard_builds_every_kind() {
        let registry = RuleRegistry::standard();
        for kind in AutomatonKind::ALL {
            let rule = registry.create(kind, [], [], rng()).unwrap();
            assert_eq!(rule.kind(), kind);
            assert!(rule.num_states() >= 2);
            assert_eq!(rule.parameters().max_history(), Ok(10));
        }
    }

    #[test]
    fn test_state_counts() {
        let registry = RuleRegistry::standard();
        let states = |kind| registry.create(kind, [], [], rng()).unwrap().num_states();
        assert_eq!(states(AutomatonKind::GameOfLife), 2);
        assert_eq!(states(AutomatonKind::FallingSand), 4);
        assert_eq!(states(AutomatonKind::RockPaperScissors), 3);
        assert_eq!(states(AutomatonKind::Langton), 8);
        assert_eq!(states(AutomatonKind::ChouReg2), 8);
        assert_eq!(states(AutomatonKind::Petelka), 5);
        assert_eq!(states(AutomatonKind::Darwin), 3);
    }

    #[test]
    fn test_overrides_and_extras() {
        let registry = RuleRegistry::standard();
        let rule = registry
            .create(
                AutomatonKind::RockPaperScissors,
                [("numStates".to_string(), 4.0)],
                [],
                rng(),
            )
            .unwrap();
        assert_eq!(rule.num_states(), 4);

        let rule = registry
            .create(
                AutomatonKind::GameOfLife,
                [],
                [("B".to_string(), ParamValue::IntList(vec![3, 6]))],
                rng(),
            )
            .unwrap();
        assert_eq!(rule.parameters().int_list("B"), Some(&[3, 6][..]));
    }

    #[test]
    fn test_darwin_species_from_extras() {
        let registry = RuleRegistry::standard();
        let rule = registry
            .create(
                AutomatonKind::Darwin,
                [],
                [(
                    "program3".to_string(),
                    ParamValue::Text("left 90\n".to_string()),
                )],
                rng(),
            )
            .unwrap();
        assert_eq!(rule.num_states(), 4);

        let broken = registry.create(
            AutomatonKind::Darwin,
            [],
            [("program1".to_string(), ParamValue::Text("go 9\n".to_string()))],
            rng(),
        );
        assert!(matches!(broken, Err(LatticeError::InvalidProgram { species: 1, .. })));
    }

    #[test]
    fn test_unregistered_kind() {
        let registry = RuleRegistry::new();
        assert_eq!(
            registry
                .create(AutomatonKind::Fire, [], [], rng())
                .unwrap_err(),
            LatticeError::UnregisteredRule(AutomatonKind::Fire)
        );
    }
}
