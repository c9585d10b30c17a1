use std::fmt;

use crate::{AutomatonKind, Cell, CellId, Direction, LatticeError, Parameters, Result};

/// A transition rule for one automaton.
///
/// The engine drives a rule through [`Rule::compute_next`] once per cell per
/// tick, after every cell has snapshotted and before any cell commits. Rules
/// read committed states through the [`CellContext`] and may write pending
/// states of neighbors only through [`CellContext::claim`].
pub trait Rule: fmt::Debug {
    /// Which automaton this rule implements.
    fn kind(&self) -> AutomatonKind;

    /// Number of states; valid states are `0..num_states`.
    fn num_states(&self) -> u32;

    /// Tuning values.
    fn parameters(&self) -> &Parameters;

    /// Tuning values, mutably.
    fn parameters_mut(&mut self) -> &mut Parameters;

    /// Computes the candidate next state of the acting cell.
    fn apply(&mut self, ctx: &mut CellContext<'_>) -> Result<u32>;

    /// Whether to leave the acting cell untouched this tick.
    fn should_skip(&self, _ctx: &CellContext<'_>) -> bool {
        false
    }

    /// Stores the candidate produced by [`Rule::apply`].
    fn post_process(&mut self, ctx: &mut CellContext<'_>, state: u32) -> Result<()> {
        ctx.cell_mut().set_next_state(state)
    }

    /// Clears per-tick bookkeeping after every cell has committed.
    fn reset_cell(&self, _cell: &mut Cell) {}

    /// Initializes per-cell bookkeeping for the cell's committed state.
    ///
    /// Called on construction and after stepping back.
    fn prepare_cell(&self, _cell: &mut Cell) {}

    /// Skip check, then apply, then post-process.
    fn compute_next(&mut self, ctx: &mut CellContext<'_>) -> Result<()> {
        if self.should_skip(ctx) {
            return Ok(());
        }
        let state = self.apply(ctx)?;
        self.post_process(ctx, state)
    }
}

/// The acting cell's view of the grid during the compute phase.
///
/// Reads are unrestricted within the neighborhood; writes outside the acting
/// cell must target a neighbor.
pub struct CellContext<'a> {
    id: CellId,
    cells: &'a mut [Cell],
}

impl<'a> CellContext<'a> {
    /// Creates a context for cell `id` of `cells`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn new(id: CellId, cells: &'a mut [Cell]) -> Self {
        assert!(id < cells.len(), "cell id {id} out of range");
        Self { id, cells }
    }

    /// Id of the acting cell.
    pub fn id(&self) -> CellId {
        self.id
    }

    /// The acting cell.
    pub fn cell(&self) -> &Cell {
        &self.cells[self.id]
    }

    /// The acting cell, mutably.
    pub fn cell_mut(&mut self) -> &mut Cell {
        &mut self.cells[self.id]
    }

    /// Committed state of the acting cell.
    pub fn state(&self) -> u32 {
        self.cell().state()
    }

    /// Neighbor ids of the acting cell.
    pub fn neighbors(&self) -> Result<&[CellId]> {
        self.cell().neighbors()
    }

    /// Neighbor cells of the acting cell.
    pub fn neighbor_cells(&self) -> Result<impl Iterator<Item = (CellId, &Cell)> + '_> {
        let ids = self.neighbors()?;
        Ok(ids.iter().map(move |&id| (id, &self.cells[id])))
    }

    /// Number of neighbors whose committed state is `state`.
    pub fn count_neighbors(&self, state: u32) -> Result<usize> {
        Ok(self
            .neighbor_cells()?
            .filter(|(_, cell)| cell.state() == state)
            .count())
    }

    /// Whether any neighbor is in `state`.
    pub fn has_neighbor(&self, state: u32) -> Result<bool> {
        Ok(self.neighbor_cells()?.any(|(_, cell)| cell.state() == state))
    }

    /// Neighbor ids matching `predicate`.
    pub fn find_neighbors(&self, predicate: impl Fn(&Cell) -> bool) -> Result<Vec<CellId>> {
        Ok(self
            .neighbor_cells()?
            .filter(|(_, cell)| predicate(cell))
            .map(|(id, _)| id)
            .collect())
    }

    /// Nearest neighbor toward `direction`, if any.
    pub fn toward(&self, direction: Direction) -> Result<Option<CellId>> {
        Ok(self.cell().neighbors_toward(direction)?.first().copied())
    }

    /// Committed state of the nearest neighbor toward `direction`.
    pub fn state_toward(&self, direction: Direction) -> Result<Option<u32>> {
        Ok(self.toward(direction)?.map(|id| self.cells[id].state()))
    }

    /// A neighbor by id.
    pub fn neighbor(&self, id: CellId) -> Result<&Cell> {
        self.check_neighbor(id)?;
        Ok(&self.cells[id])
    }

    /// A neighbor by id, mutably.
    pub fn neighbor_mut(&mut self, id: CellId) -> Result<&mut Cell> {
        self.check_neighbor(id)?;
        Ok(&mut self.cells[id])
    }

    /// Writes `state` as the pending state of neighbor `id` and marks it
    /// claimed for the rest of the tick.
    pub fn claim(&mut self, id: CellId, state: u32) -> Result<()> {
        let cell = self.neighbor_mut(id)?;
        cell.set_next_state(state)?;
        cell.set_claimed();
        Ok(())
    }

    fn check_neighbor(&self, id: CellId) -> Result<()> {
        if self.neighbors()?.contains(&id) {
            Ok(())
        } else {
            let target = self
                .cells
                .get(id)
                .map(Cell::position)
                .unwrap_or_default();
            Err(LatticeError::NotANeighbor {
                actor: self.cell().position(),
                target,
            })
        }
    }
}

impl fmt::Debug for CellContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellContext")
            .field("id", &self.id)
            .field("cell", self.cell())
            .finish()
    }
}
