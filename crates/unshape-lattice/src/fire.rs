use rand::rngs::StdRng;
use rand::Rng;

use crate::{AutomatonKind, CellContext, Parameters, Result, Rule};

/// Bare ground.
pub const EMPTY: u32 = 0;
/// Unburnt tree.
pub const TREE: u32 = 1;
/// Burning tree.
pub const BURNING: u32 = 2;

/// Chance per tick that an isolated tree catches fire.
pub const IGNITION_LIKELIHOOD: &str = "ignitionLikelihood";
/// Chance per tick that empty ground grows a tree.
pub const TREE_SPAWN_LIKELIHOOD: &str = "treeSpawnLikelihood";

/// Default parameter values.
pub const DEFAULTS: &[(&str, f64)] = &[(IGNITION_LIKELIHOOD, 0.1), (TREE_SPAWN_LIKELIHOOD, 0.01)];

/// Forest fire: burning trees burn out, fire spreads to adjacent trees, and
/// lightning and regrowth happen at random.
#[derive(Debug, Clone)]
pub struct FireRule {
    params: Parameters,
    rng: StdRng,
}

impl FireRule {
    /// Creates the rule drawing randomness from `rng`.
    pub fn new(params: Parameters, rng: StdRng) -> Self {
        Self { params, rng }
    }
}

impl Rule for FireRule {
    fn kind(&self) -> AutomatonKind {
        AutomatonKind::Fire
    }

    fn num_states(&self) -> u32 {
        3
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn apply(&mut self, ctx: &mut CellContext<'_>) -> Result<u32> {
        match ctx.state() {
            BURNING => Ok(EMPTY),
            TREE => {
                if ctx.has_neighbor(BURNING)? {
                    return Ok(BURNING);
                }
                let ignition = self.params.get(IGNITION_LIKELIHOOD)?;
                Ok(if self.rng.gen::<f64>() < ignition {
                    BURNING
                } else {
                    TREE
                })
            }
            _ => {
                let spawn = self.params.get(TREE_SPAWN_LIKELIHOOD)?;
                Ok(if self.rng.gen::<f64>() < spawn {
                    TREE
                } else {
                    EMPTY
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, Grid};
    use rand::SeedableRng;

    fn rule(ignition: f64, spawn: f64) -> FireRule {
        let mut params = Parameters::for_kind(AutomatonKind::Fire);
        params.set(IGNITION_LIKELIHOOD, ignition).unwrap();
        params.set(TREE_SPAWN_LIKELIHOOD, spawn).unwrap();
        FireRule::new(params, StdRng::seed_from_u64(7))
    }

    fn next(rule: &mut FireRule, states: &[u32], id: usize) -> u32 {
        let cells = states.iter().map(|&s| Cell::new(s, 3).unwrap()).collect();
        let mut grid = Grid::new(cells, 3, 3).unwrap();
        grid.set_moore_neighbors().unwrap();
        let mut ctx = CellContext::new(id, grid.cells_mut());
        rule.compute_next(&mut ctx).unwrap();
        grid.cells()[id].next_state()
    }

    #[test]
    fn test_burning_becomes_empty() {
        let mut rule = rule(1.0, 1.0);
        assert_eq!(next(&mut rule, &[0, 0, 0, 0, 2, 0, 0, 0, 0], 4), EMPTY);
    }

    #[test]
    fn test_fire_spreads() {
        let mut rule = rule(0.0, 0.0);
        assert_eq!(next(&mut rule, &[2, 0, 0, 0, 1, 0, 0, 0, 0], 4), BURNING);
    }

    #[test]
    fn test_isolated_tree_with_no_lightning() {
        let mut rule = rule(0.0, 0.0);
        assert_eq!(next(&mut rule, &[1; 9], 4), TREE);
    }

    #[test]
    fn test_certain_lightning_and_growth() {
        let mut rule = rule(1.0, 1.0);
        assert_eq!(next(&mut rule, &[1; 9], 4), BURNING);
        assert_eq!(next(&mut rule, &[0; 9], 4), TREE);
    }

    #[test]
    fn test_no_growth() {
        let mut rule = rule(0.0, 0.0);
        assert_eq!(next(&mut rule, &[0; 9], 4), EMPTY);
    }
}
