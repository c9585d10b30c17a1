use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::{AutomatonKind, CellContext, CellId, Direction, Parameters, Result, Rule};

/// Air.
pub const EMPTY: u32 = 0;
/// Immovable wall.
pub const STEEL: u32 = 1;
/// Falls and piles up; sinks through water.
pub const SAND: u32 = 2;
/// Falls and spreads sideways.
pub const WATER: u32 = 3;

/// Falling-sand particle physics on directional neighbors.
///
/// Sand falls straight down, displaces water beneath it, or slides
/// diagonally. Water falls straight down or flows sideways. A particle only
/// moves into a cell that is empty now and that nothing else has targeted
/// this tick.
#[derive(Debug, Clone)]
pub struct FallingSandRule {
    params: Parameters,
    rng: StdRng,
}

impl FallingSandRule {
    /// Creates the rule drawing randomness from `rng`.
    pub fn new(params: Parameters, rng: StdRng) -> Self {
        Self { params, rng }
    }

    fn vacant_toward(ctx: &CellContext<'_>, direction: Direction) -> Result<Option<CellId>> {
        let Some(id) = ctx.toward(direction)? else {
            return Ok(None);
        };
        let cell = ctx.neighbor(id)?;
        let vacant = cell.state() == EMPTY && cell.next_state() == EMPTY && !cell.is_claimed();
        Ok(vacant.then_some(id))
    }

    /// Moves the acting particle into the first vacancy found, trying
    /// `first` before a random pick from `fallback`.
    fn settle(
        &mut self,
        ctx: &mut CellContext<'_>,
        particle: u32,
        first: Direction,
        fallback: [Direction; 2],
    ) -> Result<u32> {
        if let Some(target) = Self::vacant_toward(ctx, first)? {
            ctx.claim(target, particle)?;
            return Ok(EMPTY);
        }
        let mut options = Vec::with_capacity(2);
        for direction in fallback {
            if let Some(target) = Self::vacant_toward(ctx, direction)? {
                options.push(target);
            }
        }
        match options.choose(&mut self.rng) {
            Some(&target) => {
                ctx.claim(target, particle)?;
                Ok(EMPTY)
            }
            None => Ok(particle),
        }
    }

    fn sand(&mut self, ctx: &mut CellContext<'_>) -> Result<u32> {
        if Self::vacant_toward(ctx, Direction::S)?.is_none() {
            if let Some(below) = ctx.toward(Direction::S)? {
                let cell = ctx.neighbor(below)?;
                if cell.state() == WATER && cell.next_state() == WATER && !cell.is_claimed() {
                    ctx.claim(below, SAND)?;
                    return Ok(WATER);
                }
            }
        }
        self.settle(ctx, SAND, Direction::S, [Direction::SE, Direction::SW])
    }

    fn water(&mut self, ctx: &mut CellContext<'_>) -> Result<u32> {
        self.settle(ctx, WATER, Direction::S, [Direction::E, Direction::W])
    }
}

impl Rule for FallingSandRule {
    fn kind(&self) -> AutomatonKind {
        AutomatonKind::FallingSand
    }

    fn num_states(&self) -> u32 {
        4
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn should_skip(&self, ctx: &CellContext<'_>) -> bool {
        ctx.state() == EMPTY || ctx.cell().is_claimed()
    }

    fn apply(&mut self, ctx: &mut CellContext<'_>) -> Result<u32> {
        match ctx.state() {
            SAND => self.sand(ctx),
            WATER => self.water(ctx),
            other => Ok(other),
        }
    }
}
