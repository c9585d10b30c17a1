use crate::{AutomatonKind, CellContext, Parameters, Result, Rule};

/// Impassable cell.
pub const BLOCKED: u32 = 0;
/// Open cell not yet reached.
pub const OPEN: u32 = 1;
/// Open cell reached by the flow.
pub const PERCOLATED: u32 = 2;

/// Flow spreads into open cells adjacent to percolated ones.
#[derive(Debug, Clone)]
pub struct PercolationRule {
    params: Parameters,
}

impl PercolationRule {
    /// Creates the rule.
    pub fn new(params: Parameters) -> Self {
        Self { params }
    }
}

impl Rule for PercolationRule {
    fn kind(&self) -> AutomatonKind {
        AutomatonKind::Percolation
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
        if ctx.state() == OPEN && ctx.has_neighbor(PERCOLATED)? {
            Ok(PERCOLATED)
        } else {
            Ok(ctx.state())
        }
    }
}
