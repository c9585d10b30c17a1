#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::{EdgePolicy, LatticeError, Result};

/// Cell shape of the tiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Shape {
    /// Square cells.
    #[default]
    Rectangle,
    /// Hexagonal cells in even-r offset layout (odd rows shifted right).
    Hexagon,
    /// Alternating up- and down-pointing triangles.
    Triangle,
}

impl Shape {
    /// All shapes.
    pub const ALL: [Shape; 3] = [Shape::Rectangle, Shape::Hexagon, Shape::Triangle];

    /// Identifier used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            Shape::Rectangle => "RECTANGLE",
            Shape::Hexagon => "HEXAGON",
            Shape::Triangle => "TRIANGLE",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Shape {
    type Err = LatticeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RECTANGLE" | "SQUARE" => Ok(Shape::Rectangle),
            "HEXAGON" => Ok(Shape::Hexagon),
            "TRIANGLE" => Ok(Shape::Triangle),
            _ => {
                tracing::error!(identifier = s, "unknown grid shape");
                Err(LatticeError::UnknownShape(s.to_string()))
            }
        }
    }
}

/// Which cells count as neighbors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NeighborhoodKind {
    /// Every cell sharing an edge or a corner.
    #[default]
    Moore,
    /// Every cell sharing an edge.
    VonNeumann,
    /// Moore plus the next ring out.
    ExtendedMoore,
}

impl NeighborhoodKind {
    /// All neighborhood kinds.
    pub const ALL: [NeighborhoodKind; 3] = [
        NeighborhoodKind::Moore,
        NeighborhoodKind::VonNeumann,
        NeighborhoodKind::ExtendedMoore,
    ];

    /// Identifier used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            NeighborhoodKind::Moore => "MOORE",
            NeighborhoodKind::VonNeumann => "VON_NEUMANN",
            NeighborhoodKind::ExtendedMoore => "EXTENDED_MOORE",
        }
    }
}

impl fmt::Display for NeighborhoodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NeighborhoodKind {
    type Err = LatticeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
            "MOORE" => Ok(NeighborhoodKind::Moore),
            "VON_NEUMANN" | "VONNEUMANN" => Ok(NeighborhoodKind::VonNeumann),
            "EXTENDED_MOORE" | "EXTENDEDMOORE" => Ok(NeighborhoodKind::ExtendedMoore),
            _ => {
                tracing::error!(identifier = s, "unknown neighborhood");
                Err(LatticeError::UnknownNeighborhood(s.to_string()))
            }
        }
    }
}

/// Complete description of how a grid's cells are connected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Topology {
    /// Cell shape.
    pub shape: Shape,
    /// Neighborhood kind.
    pub neighborhood: NeighborhoodKind,
    /// Edge handling.
    pub edge: EdgePolicy,
}

impl Topology {
    /// Creates a topology.
    pub fn new(shape: Shape, neighborhood: NeighborhoodKind, edge: EdgePolicy) -> Self {
        Self {
            shape,
            neighborhood,
            edge,
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.shape, self.neighborhood, self.edge)
    }
}

/// Produces the neighbor offsets of a cell.
///
/// Offsets are `(drow, dcol)` relative to the cell and never include
/// `(0, 0)`. Implementations may depend on the cell's position, which is
/// how non-square tilings express their alternating orientations.
pub trait DirectionStrategy: fmt::Debug + Send + Sync {
    /// Returns the offsets for the cell at `(row, col)`.
    fn offsets(&self, row: usize, col: usize) -> Vec<(i32, i32)>;
}

/// The same offsets for every cell.
#[derive(Debug, Clone, Copy)]
pub struct ParityFree(pub &'static [(i32, i32)]);

impl DirectionStrategy for ParityFree {
    fn offsets(&self, _row: usize, _col: usize) -> Vec<(i32, i32)> {
        self.0.to_vec()
    }
}

/// Offsets selected by row parity.
#[derive(Debug, Clone, Copy)]
pub struct RowParity {
    /// Offsets for even rows.
    pub even: &'static [(i32, i32)],
    /// Offsets for odd rows.
    pub odd: &'static [(i32, i32)],
}

impl DirectionStrategy for RowParity {
    fn offsets(&self, row: usize, _col: usize) -> Vec<(i32, i32)> {
        let table = if row % 2 == 0 { self.even } else { self.odd };
        table.to_vec()
    }
}

/// Offsets selected by whether row and column parities agree.
#[derive(Debug, Clone, Copy)]
pub struct RowColParity {
    /// Offsets when `row % 2 == col % 2`.
    pub same: &'static [(i32, i32)],
    /// Offsets when the parities differ.
    pub different: &'static [(i32, i32)],
}

impl DirectionStrategy for RowColParity {
    fn offsets(&self, row: usize, col: usize) -> Vec<(i32, i32)> {
        let table = if row % 2 == col % 2 {
            self.same
        } else {
            self.different
        };
        table.to_vec()
    }
}

/// Offset tables for the built-in tilings.
pub mod offsets {
    /// Square Moore neighborhood.
    ///
    /// ```text
    /// ┌───┬───┬───┐
    /// │ X │ X │ X │
    /// ├───┼───┼───┤
    /// │ X │ · │ X │
    /// ├───┼───┼───┤
    /// │ X │ X │ X │
    /// └───┴───┴───┘
    /// ```
    pub const RECT_MOORE: &[(i32, i32)] = &[
        (-1, 0),
        (1, 0),
        (0, -1),
        (0, 1),
        (-1, -1),
        (-1, 1),
        (1, -1),
        (1, 1),
    ];

    /// Square von Neumann neighborhood.
    pub const RECT_VON_NEUMANN: &[(i32, i32)] = &[(-1, 0), (1, 0), (0, -1), (0, 1)];

    /// Square 5x5 block minus the center.
    pub const RECT_EXTENDED_MOORE: &[(i32, i32)] = &[
        (-1, 0),
        (1, 0),
        (0, -1),
        (0, 1),
        (-1, -1),
        (-1, 1),
        (1, -1),
        (1, 1),
        (-2, -2),
        (-1, -2),
        (0, -2),
        (1, -2),
        (2, -2),
        (2, 2),
        (1, 2),
        (0, 2),
        (-1, 2),
        (-2, 2),
        (-2, -1),
        (-2, 0),
        (-2, 1),
        (2, -1),
        (2, 0),
        (2, 1),
    ];

    /// Hexagon neighbors for even rows.
    pub const HEX_MOORE_EVEN: &[(i32, i32)] = &[(-1, -1), (-1, 0), (0, -1), (0, 1), (1, -1), (1, 0)];

    /// Hexagon neighbors for odd rows.
    pub const HEX_MOORE_ODD: &[(i32, i32)] = &[(-1, 0), (-1, 1), (0, -1), (0, 1), (1, 0), (1, 1)];

    /// Hexagon von Neumann: the two cells in the same row.
    pub const HEX_VON_NEUMANN: &[(i32, i32)] = &[(0, -1), (0, 1)];

    /// Hexagon two-ring neighborhood for even rows.
    pub const HEX_EXTENDED_EVEN: &[(i32, i32)] = &[
        (-2, -1),
        (-2, 0),
        (-2, 1),
        (-1, -2),
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (0, -2),
        (0, -1),
        (0, 1),
        (0, 2),
        (1, -2),
        (1, -1),
        (1, 0),
        (1, 1),
        (2, -1),
        (2, 0),
        (2, 1),
    ];

    /// Hexagon two-ring neighborhood for odd rows.
    pub const HEX_EXTENDED_ODD: &[(i32, i32)] = &[
        (-2, -1),
        (-2, 0),
        (-2, 1),
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (-1, 2),
        (0, -2),
        (0, -1),
        (0, 1),
        (0, 2),
        (1, -1),
        (1, 0),
        (1, 1),
        (1, 2),
        (2, -1),
        (2, 0),
        (2, 1),
    ];

    /// Vertex-sharing neighbors of an up-pointing triangle.
    pub const TRI_MOORE_UP: &[(i32, i32)] = &[
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (0, -2),
        (0, -1),
        (0, 1),
        (0, 2),
        (1, -2),
        (1, -1),
        (1, 0),
        (1, 1),
        (1, 2),
    ];

    /// Vertex-sharing neighbors of a down-pointing triangle.
    pub const TRI_MOORE_DOWN: &[(i32, i32)] = &[
        (-1, -2),
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (-1, 2),
        (0, -2),
        (0, -1),
        (0, 1),
        (0, 2),
        (1, -1),
        (1, 0),
        (1, 1),
    ];

    /// Edge-sharing neighbors of an up-pointing triangle.
    pub const TRI_VON_NEUMANN_UP: &[(i32, i32)] = &[(0, -1), (0, 1), (1, 0)];

    /// Edge-sharing neighbors of a down-pointing triangle.
    pub const TRI_VON_NEUMANN_DOWN: &[(i32, i32)] = &[(-1, 0), (0, -1), (0, 1)];

    /// Two-ring neighbors of an up-pointing triangle.
    pub const TRI_EXTENDED_UP: &[(i32, i32)] = &[
        (-2, -2),
        (-2, -1),
        (-2, 0),
        (-2, 1),
        (-2, 2),
        (-1, -3),
        (-1, -2),
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (-1, 2),
        (-1, 3),
        (0, -4),
        (0, -3),
        (0, -2),
        (0, -1),
        (0, 1),
        (0, 2),
        (0, 3),
        (0, 4),
        (1, -4),
        (1, -3),
        (1, -2),
        (1, -1),
        (1, 0),
        (1, 1),
        (1, 2),
        (1, 3),
        (1, 4),
        (2, -3),
        (2, -2),
        (2, -1),
        (2, 0),
        (2, 1),
        (2, 2),
        (2, 3),
    ];

    /// Two-ring neighbors of a down-pointing triangle.
    pub const TRI_EXTENDED_DOWN: &[(i32, i32)] = &[
        (-2, -3),
        (-2, -2),
        (-2, -1),
        (-2, 0),
        (-2, 1),
        (-2, 2),
        (-2, 3),
        (-1, -4),
        (-1, -3),
        (-1, -2),
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (-1, 2),
        (-1, 3),
        (-1, 4),
        (0, -4),
        (0, -3),
        (0, -2),
        (0, -1),
        (0, 1),
        (0, 2),
        (0, 3),
        (0, 4),
        (1, -3),
        (1, -2),
        (1, -1),
        (1, 0),
        (1, 1),
        (1, 2),
        (1, 3),
        (2, -2),
        (2, -1),
        (2, 0),
        (2, 1),
        (2, 2),
    ];
}

/// Maps `(shape, neighborhood)` pairs to direction strategies.
#[derive(Debug, Default)]
pub struct DirectionRegistry {
    strategies: HashMap<(Shape, NeighborhoodKind), Box<dyn DirectionStrategy>>,
}

impl DirectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding all nine built-in combinations.
    pub fn standard() -> Self {
        use offsets::*;

        let mut registry = Self::new();
        registry.register(Shape::Rectangle, NeighborhoodKind::Moore, ParityFree(RECT_MOORE));
        registry.register(
            Shape::Rectangle,
            NeighborhoodKind::VonNeumann,
            ParityFree(RECT_VON_NEUMANN),
        );
        registry.register(
            Shape::Rectangle,
            NeighborhoodKind::ExtendedMoore,
            ParityFree(RECT_EXTENDED_MOORE),
        );
        registry.register(
            Shape::Hexagon,
            NeighborhoodKind::Moore,
            RowParity {
                even: HEX_MOORE_EVEN,
                odd: HEX_MOORE_ODD,
            },
        );
        registry.register(
            Shape::Hexagon,
            NeighborhoodKind::VonNeumann,
            ParityFree(HEX_VON_NEUMANN),
        );
        registry.register(
            Shape::Hexagon,
            NeighborhoodKind::ExtendedMoore,
            RowParity {
                even: HEX_EXTENDED_EVEN,
                odd: HEX_EXTENDED_ODD,
            },
        );
        registry.register(
            Shape::Triangle,
            NeighborhoodKind::Moore,
            RowColParity {
                same: TRI_MOORE_UP,
                different: TRI_MOORE_DOWN,
            },
        );
        registry.register(
            Shape::Triangle,
            NeighborhoodKind::VonNeumann,
            RowColParity {
                same: TRI_VON_NEUMANN_UP,
                different: TRI_VON_NEUMANN_DOWN,
            },
        );
        registry.register(
            Shape::Triangle,
            NeighborhoodKind::ExtendedMoore,
            RowColParity {
                same: TRI_EXTENDED_UP,
                different: TRI_EXTENDED_DOWN,
            },
        );
        registry
    }

    /// Adds or replaces the strategy for a pair.
    pub fn register(
        &mut self,
        shape: Shape,
        neighborhood: NeighborhoodKind,
        strategy: impl DirectionStrategy + 'static,
    ) {
        self.strategies
            .insert((shape, neighborhood), Box::new(strategy));
    }

    /// Looks up the strategy for a pair.
    pub fn get(
        &self,
        shape: Shape,
        neighborhood: NeighborhoodKind,
    ) -> Result<&dyn DirectionStrategy> {
        match self.strategies.get(&(shape, neighborhood)) {
            Some(strategy) => Ok(strategy.as_ref()),
            None => {
                tracing::error!(%shape, %neighborhood, "no direction strategy registered");
                Err(LatticeError::UnregisteredTopology {
                    shape: shape.to_string(),
                    neighborhood: neighborhood.to_string(),
                })
            }
        }
    }

    /// Returns the offsets of `(row, col)` for a pair.
    pub fn offsets(
        &self,
        shape: Shape,
        neighborhood: NeighborhoodKind,
        row: usize,
        col: usize,
    ) -> Result<Vec<(i32, i32)>> {
        Ok(self.get(shape, neighborhood)?.offsets(row, col))
    }
}
