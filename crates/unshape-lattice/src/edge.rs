#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::LatticeError;

/// How neighbor offsets that fall off the grid are resolved.
///
/// ```text
///  None       Mirror       Toroidal
///  ·|A B C    A|A B C|C    C|A B C|A
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EdgePolicy {
    /// Out-of-bounds offsets have no neighbor.
    #[default]
    None,
    /// Reflect across the violated edge.
    Mirror,
    /// Wrap around modulo the grid dimension.
    Toroidal,
}

impl EdgePolicy {
    /// All policies.
    pub const ALL: [EdgePolicy; 3] = [EdgePolicy::None, EdgePolicy::Mirror, EdgePolicy::Toroidal];

    /// Resolves `(row, col) + offset` on a `rows x cols` grid.
    ///
    /// In-bounds targets always resolve to themselves. Returns `None` only
    /// under [`EdgePolicy::None`] when the target is off the grid.
    pub fn resolve(
        self,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
        offset: (i32, i32),
    ) -> Option<(usize, usize)> {
        let r = row as i64 + offset.0 as i64;
        let c = col as i64 + offset.1 as i64;
        let resolved = match self {
            EdgePolicy::None => {
                if r < 0 || c < 0 || r >= rows as i64 || c >= cols as i64 {
                    None
                } else {
                    Some((r as usize, c as usize))
                }
            }
            EdgePolicy::Mirror => Some((mirror(r, rows), mirror(c, cols))),
            EdgePolicy::Toroidal => Some((
                r.rem_euclid(rows as i64) as usize,
                c.rem_euclid(cols as i64) as usize,
            )),
        };
        tracing::trace!(policy = ?self, row, col, ?offset, ?resolved, "edge resolution");
        resolved
    }

    /// Identifier used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            EdgePolicy::None => "NONE",
            EdgePolicy::Mirror => "MIRROR",
            EdgePolicy::Toroidal => "TOROIDAL",
        }
    }
}

/// Reflects `coord` into `[0, bound)`, reflecting repeatedly for large offsets.
fn mirror(coord: i64, bound: usize) -> usize {
    let n = bound as i64;
    let m = coord.rem_euclid(2 * n);
    (if m >= n { 2 * n - 1 - m } else { m }) as usize
}

impl fmt::Display for EdgePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EdgePolicy {
    type Err = LatticeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(EdgePolicy::None),
            "MIRROR" => Ok(EdgePolicy::Mirror),
            "TOROIDAL" => Ok(EdgePolicy::Toroidal),
            _ => {
                tracing::error!(identifier = s, "unknown edge policy");
                Err(LatticeError::UnknownEdgePolicy(s.to_string()))
            }
        }
    }
}
