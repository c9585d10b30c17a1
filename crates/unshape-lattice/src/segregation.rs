use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::{AutomatonKind, CellContext, Parameters, Result, Rule};

/// Vacant lot.
pub const EMPTY: u32 = 0;
/// Agent of the first group.
pub const AGENT_A: u32 = 1;
/// Agent of the second group.
pub const AGENT_B: u32 = 2;

/// Minimum share of like neighbors an agent accepts.
pub const TOLERANCE_THRESHOLD: &str = "toleranceThreshold";

/// Default parameter values.
pub const DEFAULTS: &[(&str, f64)] = &[(TOLERANCE_THRESHOLD, 0.5)];

/// Schelling segregation: unsatisfied agents move to a vacant neighbor.
#[derive(Debug, Clone)]
pub struct SegregationRule {
    params: Parameters,
    rng: StdRng,
}

impl SegregationRule {
    /// Creates the rule drawing randomness from `rng`.
    pub fn new(params: Parameters, rng: StdRng) -> Self {
        Self { params, rng }
    }

    /// Whether the acting agent has enough like neighbors.
    ///
    /// An agent with no neighbors at all is satisfied.
    pub fn is_satisfied(&self, ctx: &CellContext<'_>) -> Result<bool> {
        let total = ctx.neighbors()?.len();
        if total == 0 {
            return Ok(true);
        }
        let similar = ctx.count_neighbors(ctx.state())?;
        let threshold = self.params.get(TOLERANCE_THRESHOLD)?;
        Ok(similar as f64 / total as f64 >= threshold)
    }
}

impl Rule for SegregationRule {
    fn kind(&self) -> AutomatonKind {
        AutomatonKind::Segregation
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

    fn should_skip(&self, ctx: &CellContext<'_>) -> bool {
        ctx.cell().is_claimed()
    }

    fn apply(&mut self, ctx: &mut CellContext<'_>) -> Result<u32> {
        let agent = ctx.state();
        if agent == EMPTY || self.is_satisfied(ctx)? {
            return Ok(agent);
        }
        let vacancies = ctx.find_neighbors(|cell| {
            cell.state() == EMPTY && cell.next_state() == EMPTY && !cell.is_claimed()
        })?;
        match vacancies.choose(&mut self.rng) {
            Some(&target) => {
                ctx.claim(target, agent)?;
                Ok(EMPTY)
            }
            None => Ok(agent),
        }
    }
}
