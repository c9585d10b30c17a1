//! Error types for lattice construction and simulation.

use crate::{AutomatonKind, Position};

/// Broad category of a [`LatticeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or inconsistent configuration (dimensions, identifiers).
    Configuration,
    /// A state outside `[0, num_states)`.
    State,
    /// Missing, empty or locked parameter key.
    Parameter,
    /// Invalid history bound.
    History,
    /// Neighbor data requested before it was installed, or not a neighbor.
    Topology,
}

/// Errors produced by the lattice engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LatticeError {
    /// Grid dimensions must both be non-zero.
    #[error("grid dimensions must be non-zero (got {rows}x{cols})")]
    EmptyGrid {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        cols: usize,
    },

    /// The cell count `rows * cols` does not fit in `usize`.
    #[error("grid of {rows}x{cols} is too large")]
    GridTooLarge {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        cols: usize,
    },

    /// The supplied cells do not fill the grid exactly.
    #[error("grid of {rows}x{cols} needs {expected} cells, got {actual}")]
    CellCountMismatch {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        cols: usize,
        /// `rows * cols`.
        expected: usize,
        /// Number of cells supplied.
        actual: usize,
    },

    /// A position lies outside the grid.
    #[error("position ({0}, {1}) out of bounds")]
    OutOfBounds(usize, usize),

    /// Unrecognized edge policy identifier.
    #[error("unknown edge policy '{0}'")]
    UnknownEdgePolicy(String),

    /// Unrecognized shape identifier.
    #[error("unknown grid shape '{0}'")]
    UnknownShape(String),

    /// Unrecognized neighborhood identifier.
    #[error("unknown neighborhood '{0}'")]
    UnknownNeighborhood(String),

    /// Unrecognized automaton identifier.
    #[error("unknown automaton '{0}'")]
    UnknownAutomaton(String),

    /// No direction strategy registered for a shape/neighborhood pair.
    #[error("no direction strategy registered for {shape} {neighborhood}")]
    UnregisteredTopology {
        /// Shape name.
        shape: String,
        /// Neighborhood name.
        neighborhood: String,
    },

    /// No rule factory registered for an automaton kind.
    #[error("no rule registered for {0}")]
    UnregisteredRule(AutomatonKind),

    /// Malformed life-like rule notation.
    #[error("invalid rule notation '{0}'")]
    InvalidNotation(String),

    /// A creature program that cannot be run.
    #[error("invalid program for species {species}, line {line}: {reason}")]
    InvalidProgram {
        /// Species (state) the program belongs to.
        species: u32,
        /// One-based source line.
        line: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// A state outside the automaton's range.
    #[error("state {state} out of range [0, {num_states})")]
    InvalidState {
        /// Offending state.
        state: u32,
        /// Number of states of the automaton.
        num_states: u32,
    },

    /// An automaton must have at least one state.
    #[error("automaton must have at least one state")]
    NoStates,

    /// Parameter key was empty.
    #[error("parameter key must not be empty")]
    EmptyParameterKey,

    /// Parameter key not present.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// Parameter cannot change after the rule was created.
    #[error("parameter '{0}' is locked")]
    LockedParameter(String),

    /// Parameter value is unusable (NaN, negative count, ...).
    #[error("invalid value {value} for parameter '{key}'")]
    InvalidParameter {
        /// Parameter key.
        key: String,
        /// Rejected value.
        value: f64,
    },

    /// History bound below the minimum.
    #[error("history size {size} is below the minimum of {min}")]
    HistoryTooSmall {
        /// Requested bound.
        size: usize,
        /// Minimum bound.
        min: usize,
    },

    /// Neighbors requested before the grid installed them.
    #[error("neighbors of cell at {0} have not been set")]
    NeighborsUnset(Position),

    /// A write targeted a cell outside the acting cell's neighborhood.
    #[error("cell {target} is not a neighbor of cell {actor}")]
    NotANeighbor {
        /// Acting cell.
        actor: Position,
        /// Target cell.
        target: Position,
    },
}

impl LatticeError {
    /// Returns the broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyGrid { .. }
            | Self::GridTooLarge { .. }
            | Self::CellCountMismatch { .. }
            | Self::OutOfBounds(..)
            | Self::UnknownEdgePolicy(_)
            | Self::UnknownShape(_)
            | Self::UnknownNeighborhood(_)
            | Self::UnknownAutomaton(_)
            | Self::UnregisteredTopology { .. }
            | Self::UnregisteredRule(_)
            | Self::InvalidNotation(_)
            | Self::InvalidProgram { .. } => ErrorKind::Configuration,
            Self::InvalidState { .. } | Self::NoStates => ErrorKind::State,
            Self::EmptyParameterKey
            | Self::UnknownParameter(_)
            | Self::LockedParameter(_)
            | Self::InvalidParameter { .. } => ErrorKind::Parameter,
            Self::HistoryTooSmall { .. } => ErrorKind::History,
            Self::NeighborsUnset(_) | Self::NotANeighbor { .. } => ErrorKind::Topology,
        }
    }
}

/// Result alias for lattice operations.
pub type Result<T> = std::result::Result<T, LatticeError>;
