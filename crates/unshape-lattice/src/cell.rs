#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::collections::VecDeque;
use std::fmt;

use crate::{Direction, LatticeError, Result};

/// Smallest history bound accepted by [`Cell::snapshot`].
pub const MIN_HISTORY_SIZE: usize = 1;

/// Index of a cell in its grid's arena (row-major).
pub type CellId = usize;

/// Grid coordinates of a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
}

impl Position {
    /// Creates a position.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Per-agent bookkeeping carried between ticks.
///
/// Wa-Tor agents use `age` and `energy`; Darwin creatures use
/// `instruction` and `heading`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vitals {
    /// Ticks since birth or last reproduction.
    pub age: u32,
    /// Remaining energy.
    pub energy: i32,
    /// Index of the next program instruction.
    pub instruction: u32,
    /// Facing direction.
    pub heading: Direction,
}

/// A single lattice site.
///
/// Holds the committed state, the pending state for the current tick, a
/// bounded history for stepping back, and the neighbor handles installed by
/// the [`Grid`](crate::Grid).
#[derive(Debug, Clone)]
pub struct Cell {
    current: u32,
    next: u32,
    num_states: u32,
    history: VecDeque<u32>,
    state_length: u32,
    position: Position,
    neighbors: Option<Vec<CellId>>,
    directional: [Vec<CellId>; 8],
    vitals: Vitals,
    next_vitals: Vitals,
    claimed: bool,
}

impl Cell {
    /// Creates a cell in `state` for an automaton with `num_states` states.
    ///
    /// The initial state is recorded as the first history entry.
    pub fn new(state: u32, num_states: u32) -> Result<Self> {
        if num_states == 0 {
            return Err(LatticeError::NoStates);
        }
        check_state(state, num_states)?;
        Ok(Self {
            current: state,
            next: state,
            num_states,
            history: VecDeque::from([state]),
            state_length: 1,
            position: Position::default(),
            neighbors: None,
            directional: Default::default(),
            vitals: Vitals::default(),
            next_vitals: Vitals::default(),
            claimed: false,
        })
    }

    /// Committed state.
    pub fn state(&self) -> u32 {
        self.current
    }

    /// Pending state for the current tick.
    pub fn next_state(&self) -> u32 {
        self.next
    }

    /// Number of states of the owning automaton.
    pub fn num_states(&self) -> u32 {
        self.num_states
    }

    /// Number of consecutive ticks the state has stayed unchanged.
    pub fn state_length(&self) -> u32 {
        self.state_length
    }

    /// Grid position.
    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Recorded states, oldest first.
    pub fn history(&self) -> impl Iterator<Item = u32> + '_ {
        self.history.iter().copied()
    }

    /// Number of recorded states.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Sets the committed state.
    pub fn set_current_state(&mut self, state: u32) -> Result<()> {
        check_state(state, self.num_states)?;
        self.current = state;
        Ok(())
    }

    /// Sets the pending state.
    pub fn set_next_state(&mut self, state: u32) -> Result<()> {
        check_state(state, self.num_states)?;
        self.next = state;
        Ok(())
    }

    /// All neighbors in installation order.
    pub fn neighbors(&self) -> Result<&[CellId]> {
        self.neighbors
            .as_deref()
            .ok_or(LatticeError::NeighborsUnset(self.position))
    }

    /// Neighbors whose offset points toward `direction`, nearest first.
    pub fn neighbors_toward(&self, direction: Direction) -> Result<&[CellId]> {
        if self.neighbors.is_none() {
            return Err(LatticeError::NeighborsUnset(self.position));
        }
        Ok(&self.directional[direction as usize])
    }

    /// Whether the grid has installed this cell's neighbors.
    pub fn has_neighbors(&self) -> bool {
        self.neighbors.is_some()
    }

    pub(crate) fn set_neighbors(&mut self, neighbors: Vec<CellId>, directional: [Vec<CellId>; 8]) {
        self.neighbors = Some(neighbors);
        self.directional = directional;
    }

    pub(crate) fn take_neighbors(&mut self) -> (Option<Vec<CellId>>, [Vec<CellId>; 8]) {
        (
            self.neighbors.take(),
            std::mem::take(&mut self.directional),
        )
    }

    /// Counters for the committed tick.
    pub fn vitals(&self) -> Vitals {
        self.vitals
    }

    /// Sets the committed counters.
    pub fn set_vitals(&mut self, vitals: Vitals) {
        self.vitals = vitals;
    }

    /// Counters that take effect at the next reset.
    pub fn next_vitals(&self) -> Vitals {
        self.next_vitals
    }

    /// Sets the counters that take effect at the next reset.
    pub fn set_next_vitals(&mut self, vitals: Vitals) {
        self.next_vitals = vitals;
    }

    /// Promotes the pending counters and clears them for the next tick.
    pub fn roll_vitals(&mut self) {
        self.vitals = std::mem::take(&mut self.next_vitals);
    }

    /// Whether another cell wrote this cell's pending state this tick.
    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    pub(crate) fn set_claimed(&mut self) {
        self.claimed = true;
    }

    /// Records the committed state, evicting the oldest entries beyond
    /// `max_history`.
    pub fn snapshot(&mut self, max_history: usize) -> Result<()> {
        if max_history < MIN_HISTORY_SIZE {
            return Err(LatticeError::HistoryTooSmall {
                size: max_history,
                min: MIN_HISTORY_SIZE,
            });
        }
        self.history.push_back(self.current);
        while self.history.len() > max_history {
            self.history.pop_front();
        }
        Ok(())
    }

    /// Restores the most recently recorded state.
    ///
    /// Returns `false` and leaves the cell untouched when only one entry
    /// remains.
    pub fn step_back(&mut self) -> bool {
        if self.history.len() < 2 {
            return false;
        }
        match self.history.pop_back() {
            Some(state) => {
                self.current = state;
                self.next = state;
                true
            }
            None => false,
        }
    }

    /// Makes the pending state current.
    pub fn commit(&mut self) {
        if self.next == self.current {
            self.state_length += 1;
        } else {
            self.state_length = 1;
        }
        self.current = self.next;
        self.claimed = false;
    }
}

fn check_state(state: u32, num_states: u32) -> Result<()> {
    if state < num_states {
        Ok(())
    } else {
        Err(LatticeError::InvalidState { state, num_states })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_records_initial_state() {
        let cell = Cell::new(1, 2).unwrap();
        assert_eq!(cell.state(), 1);
        assert_eq!(cell.next_state(), 1);
        assert_eq!(cell.history().collect::<Vec<_>>(), vec![1]);
        assert_eq!(cell.state_length(), 1);
    }

    #[test]
    fn test_new_rejects_invalid_state() {
        assert_eq!(
            Cell::new(2, 2).unwrap_err(),
            LatticeError::InvalidState {
                state: 2,
                num_states: 2
            }
        );
        assert_eq!(Cell::new(0, 0).unwrap_err(), LatticeError::NoStates);
    }

    #[test]
    fn test_invalid_set_keeps_prior_state() {
        let mut cell = Cell::new(1, 3).unwrap();
        assert!(cell.set_current_state(3).is_err());
        assert!(cell.set_next_state(7).is_err());
        assert_eq!(cell.state(), 1);
        assert_eq!(cell.next_state(), 1);
    }

    #[test]
    fn test_snapshot_evicts_oldest() {
        let mut cell = Cell::new(0, 4).unwrap();
        for state in 1..4 {
            cell.set_current_state(state).unwrap();
            cell.snapshot(2).unwrap();
        }
        assert_eq!(cell.history().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_snapshot_rejects_zero_bound() {
        let mut cell = Cell::new(0, 2).unwrap();
        assert_eq!(
            cell.snapshot(0).unwrap_err(),
            LatticeError::HistoryTooSmall { size: 0, min: 1 }
        );
        assert_eq!(cell.history_len(), 1);
    }

    #[test]
    fn test_step_back_walks_history() {
        let mut cell = Cell::new(0, 4).unwrap();
        cell.set_current_state(1).unwrap();
        cell.snapshot(2).unwrap();
        cell.set_current_state(2).unwrap();
        cell.snapshot(2).unwrap();
        cell.set_current_state(3).unwrap();

        assert!(cell.step_back());
        assert_eq!(cell.state(), 2);
        // the remaining entry is older than the state it would replace
        assert!(!cell.step_back());
        assert_eq!(cell.state(), 2);
        assert_eq!(cell.next_state(), 2);
        assert_eq!(cell.history().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_commit_tracks_state_length() {
        let mut cell = Cell::new(0, 2).unwrap();
        cell.commit();
        assert_eq!(cell.state_length(), 2);
        cell.set_next_state(1).unwrap();
        cell.commit();
        assert_eq!(cell.state(), 1);
        assert_eq!(cell.state_length(), 1);
    }

    #[test]
    fn test_commit_clears_claim() {
        let mut cell = Cell::new(0, 2).unwrap();
        cell.set_claimed();
        cell.commit();
        assert!(!cell.is_claimed());
    }

    #[test]
    fn test_neighbors_unset() {
        let cell = Cell::new(0, 2).unwrap();
        assert!(matches!(
            cell.neighbors(),
            Err(LatticeError::NeighborsUnset(_))
        ));
        assert!(cell.neighbors_toward(Direction::N).is_err());
    }

    #[test]
    fn test_roll_vitals() {
        let mut cell = Cell::new(1, 3).unwrap();
        let counters = Vitals {
            age: 2,
            energy: 4,
            instruction: 3,
            heading: Direction::SW,
        };
        cell.set_next_vitals(counters);
        cell.roll_vitals();
        assert_eq!(cell.vitals(), counters);
        assert_eq!(cell.next_vitals(), Vitals::default());
    }
}
