//! Symmetric lookup over sparse transition tables.
//!
//! Loop automata define each transition once; the search tries every
//! rotation (and optionally reflection) of the neighborhood so a single
//! entry covers all orientations of a pattern.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::{CellContext, Direction, Result};

/// A sparse transition table keyed by state strings.
///
/// A key is the acting cell's state followed by one neighbor state per ring
/// direction, each as a single digit. The hash map is built on first use.
#[derive(Debug)]
pub struct RuleTable {
    entries: &'static [(&'static str, u32)],
    map: OnceLock<HashMap<&'static str, u32>>,
}

impl RuleTable {
    /// Wraps a static entry list.
    pub const fn new(entries: &'static [(&'static str, u32)]) -> Self {
        Self {
            entries,
            map: OnceLock::new(),
        }
    }

    /// Looks up a key.
    pub fn get(&self, key: &str) -> Option<u32> {
        self.map
            .get_or_init(|| self.entries.iter().copied().collect())
            .get(key)
            .copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the state key of the acting cell for `ring`.
///
/// Directions without a neighbor are written as `missing`, or omitted when
/// `missing` is `None`, so keys of edge cells are then shorter than
/// `ring.len() + 1`.
pub fn state_key(
    ctx: &CellContext<'_>,
    ring: &[Direction],
    missing: Option<u32>,
) -> Result<String> {
    let mut key = String::with_capacity(ring.len() + 1);
    push_state(&mut key, ctx.state());
    for &direction in ring {
        if let Some(state) = ctx.state_toward(direction)?.or(missing) {
            push_state(&mut key, state);
        }
    }
    Ok(key)
}

fn push_state(key: &mut String, state: u32) {
    match char::from_digit(state, 36) {
        Some(c) => key.push(c),
        None => key.push_str(&state.to_string()),
    }
}

/// Result of a symmetric lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Some orientation matched a table entry.
    Found(u32),
    /// Every direction had a neighbor but no orientation matched.
    Unmatched,
    /// At least one direction had no neighbor.
    Incomplete,
}

/// The orientations tried for a lookup.
#[derive(Debug, Clone, Copy)]
pub struct SymmetrySearch {
    /// Directions read in key order.
    pub ring: &'static [Direction],
    /// Ring positions advanced per quarter turn.
    pub quarter_turn: usize,
    /// Mirror orderings tried after the rotations.
    pub reflections: &'static [[Direction; 8]],
    /// State read for a direction with no neighbor; `None` omits it.
    pub missing: Option<u32>,
}

impl SymmetrySearch {
    /// North, east, south, west; four rotations.
    pub const CARDINAL: SymmetrySearch = SymmetrySearch {
        ring: &Direction::CARDINALS,
        quarter_turn: 1,
        reflections: &[],
        missing: None,
    };

    /// All eight directions; four rotations and four reflections.
    pub const OCTAGONAL: SymmetrySearch = SymmetrySearch {
        ring: &Direction::RING,
        quarter_turn: 2,
        missing: None,
        reflections: &[
            // across the north-south axis
            [
                Direction::N,
                Direction::NW,
                Direction::W,
                Direction::SW,
                Direction::S,
                Direction::SE,
                Direction::E,
                Direction::NE,
            ],
            // across the east-west axis
            [
                Direction::S,
                Direction::SE,
                Direction::E,
                Direction::NE,
                Direction::N,
                Direction::NW,
                Direction::W,
                Direction::SW,
            ],
            // across the main diagonal
            [
                Direction::W,
                Direction::SW,
                Direction::S,
                Direction::SE,
                Direction::E,
                Direction::NE,
                Direction::N,
                Direction::NW,
            ],
            // across the anti-diagonal
            [
                Direction::E,
                Direction::NE,
                Direction::N,
                Direction::NW,
                Direction::W,
                Direction::SW,
                Direction::S,
                Direction::SE,
            ],
        ],
    };

    /// Reads absent neighbors as `state` instead of omitting them.
    pub const fn padded(self, state: u32) -> Self {
        Self {
            missing: Some(state),
            ..self
        }
    }

    /// Direction orderings in search order: rotations, then reflections.
    pub fn orientations(&self) -> Vec<Vec<Direction>> {
        let len = self.ring.len();
        let rotations = (0..4).map(|turn| {
            (0..len)
                .map(|i| self.ring[(i + turn * self.quarter_turn) % len])
                .collect::<Vec<_>>()
        });
        rotations
            .chain(self.reflections.iter().map(|r| r.to_vec()))
            .collect()
    }

    /// Searches `table` for any orientation of the acting cell's
    /// neighborhood.
    pub fn search(&self, ctx: &CellContext<'_>, table: &RuleTable) -> Result<Lookup> {
        let full = self.ring.len() + 1;
        for orientation in self.orientations() {
            let key = state_key(ctx, &orientation, self.missing)?;
            if key.len() != full {
                return Ok(Lookup::Incomplete);
            }
            if let Some(state) = table.get(&key) {
                return Ok(Lookup::Found(state));
            }
        }
        Ok(Lookup::Unmatched)
    }
}
