use crate::{AutomatonKind, CellContext, LatticeError, Parameters, Result, Rule};

/// Number of cyclic states; fixed once the rule is built.
pub const NUM_STATES: &str = "numStates";
/// Share of neighbors in the winning state needed to convert.
pub const PERCENTAGE_TO_WIN: &str = "percentageToWin";

/// Default parameter values.
pub const DEFAULTS: &[(&str, f64)] = &[(NUM_STATES, 3.0), (PERCENTAGE_TO_WIN, 0.5)];

/// Cyclic dominance: state `s` is beaten by `(s + 1) % n`.
///
/// A cell adopts the state that beats it when more than the configured
/// share of its neighbors hold that state.
#[derive(Debug, Clone)]
pub struct RockPaperScissorsRule {
    params: Parameters,
    num_states: u32,
}

impl RockPaperScissorsRule {
    /// Creates the rule, fixing the state count from `numStates`.
    pub fn new(mut params: Parameters) -> Result<Self> {
        let value = params.get(NUM_STATES)?;
        if !(1.0..=f64::from(u32::MAX)).contains(&value) {
            tracing::error!(value, "invalid state count");
            return Err(LatticeError::InvalidParameter {
                key: NUM_STATES.to_string(),
                value,
            });
        }
        params.lock(NUM_STATES);
        Ok(Self {
            params,
            num_states: value.round() as u32,
        })
    }

    /// The state that beats `state`.
    pub fn winner_over(&self, state: u32) -> u32 {
        (state + 1) % self.num_states
    }
}

impl Rule for RockPaperScissorsRule {
    fn kind(&self) -> AutomatonKind {
        AutomatonKind::RockPaperScissors
    }

    fn num_states(&self) -> u32 {
        self.num_states
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn apply(&mut self, ctx: &mut CellContext<'_>) -> Result<u32> {
        let state = ctx.state();
        let total = ctx.neighbors()?.len();
        if total == 0 {
            return Ok(state);
        }
        let winner = self.winner_over(state);
        let wins = ctx.count_neighbors(winner)?;
        let threshold = self.params.get(PERCENTAGE_TO_WIN)?;
        Ok(if wins as f64 / total as f64 > threshold {
            winner
        } else {
            state
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, Grid};

    fn next(rule: &mut RockPaperScissorsRule, states: &[u32], id: usize) -> u32 {
        let n = rule.num_states();
        let cells = states.iter().map(|&s| Cell::new(s, n).unwrap()).collect();
        let mut grid = Grid::new(cells, 3, 3).unwrap();
        grid.set_moore_neighbors().unwrap();
        let mut ctx = CellContext::new(id, grid.cells_mut());
        rule.compute_next(&mut ctx).unwrap();
        grid.cells()[id].next_state()
    }

    fn rule() -> RockPaperScissorsRule {
        RockPaperScissorsRule::new(Parameters::for_kind(AutomatonKind::RockPaperScissors)).unwrap()
    }

    #[test]
    fn test_converts_on_majority() {
        let mut rule = rule();
        // 5 of 8 neighbors beat rock
        assert_eq!(next(&mut rule, &[1, 1, 1, 1, 0, 1, 0, 0, 0], 4), 1);
    }

    #[test]
    fn test_exact_threshold_does_not_convert() {
        let mut rule = rule();
        assert_eq!(next(&mut rule, &[1, 1, 1, 1, 0, 0, 0, 0, 0], 4), 0);
    }

    #[test]
    fn test_cycle_wraps() {
        let mut rule = rule();
        assert_eq!(rule.winner_over(2), 0);
        assert_eq!(next(&mut rule, &[0, 0, 0, 0, 2, 0, 0, 0, 0], 4), 0);
    }

    #[test]
    fn test_losing_neighbors_ignored() {
        let mut rule = rule();
        // scissors neighbors lose to rock
        assert_eq!(next(&mut rule, &[2, 2, 2, 2, 0, 2, 2, 2, 2], 4), 0);
    }

    #[test]
    fn test_num_states_locked() {
        let mut rule = rule();
        assert_eq!(
            rule.parameters_mut().set(NUM_STATES, 5.0),
            Err(LatticeError::LockedParameter(NUM_STATES.into()))
        );
        assert_eq!(rule.num_states(), 3);
    }

    #[test]
    fn test_custom_state_count() {
        let mut params = Parameters::for_kind(AutomatonKind::RockPaperScissors);
        params.extend([(NUM_STATES, 5.0)]);
        let mut rule = RockPaperScissorsRule::new(params).unwrap();
        assert_eq!(rule.num_states(), 5);
        assert_eq!(next(&mut rule, &[4, 4, 4, 4, 3, 4, 4, 4, 4], 4), 4);
    }

    #[test]
    fn test_rejects_zero_states() {
        let mut params = Parameters::for_kind(AutomatonKind::RockPaperScissors);
        params.extend([(NUM_STATES, 0.0)]);
        assert!(RockPaperScissorsRule::new(params).is_err());
    }
}
