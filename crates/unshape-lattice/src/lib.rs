//! Grid cellular automata with pluggable topologies.
//!
//! Cells sit on a rectangular, hexagonal or triangular tiling and advance in
//! lock-step under a [`Rule`]. Every tick snapshots each cell into a bounded
//! history, so a [`Simulation`] can also step backwards.
//!
//! Eleven automata are built in: Game of Life, percolation, forest fire,
//! Schelling segregation, Wa-Tor, falling sand, rock-paper-scissors, the
//! Langton, Chou-Reggia and Petelka self-replicating loops, and Darwin's
//! World, where creatures run small programs.
//!
//! # Example
//!
//! ```
//! use unshape_lattice::{
//!     AutomatonKind, EdgePolicy, NeighborhoodKind, Shape, Simulation, SimulationConfig, Topology,
//! };
//!
//! // Percolation on a hexagonal grid
//! let config = SimulationConfig::new(
//!     AutomatonKind::Percolation,
//!     2,
//!     3,
//!     vec![2, 1, 1, 0, 0, 1],
//! )
//! .with_topology(Topology::new(
//!     Shape::Hexagon,
//!     NeighborhoodKind::Moore,
//!     EdgePolicy::None,
//! ));
//!
//! let mut sim = Simulation::new(config).unwrap();
//! sim.step().unwrap();
//! assert_eq!(sim.current_state(0, 1).unwrap(), 2);
//! sim.step().unwrap();
//! assert_eq!(sim.current_state(0, 2).unwrap(), 2);
//! ```

mod cell;
mod direction;
mod edge;
mod error;
mod grid;
mod neighborhood;
mod params;
mod registry;
mod rule;
mod simulation;
mod symmetry;

pub mod darwin;
pub mod falling_sand;
pub mod fire;
pub mod life;
pub mod loops;
pub mod percolation;
pub mod rps;
pub mod segregation;
pub mod wator;

pub use cell::*;
pub use direction::*;
pub use edge::*;
pub use error::*;
pub use grid::*;
pub use neighborhood::*;
pub use params::*;
pub use registry::*;
pub use rule::*;
pub use simulation::*;
pub use symmetry::*;

pub use darwin::DarwinRule;
pub use falling_sand::FallingSandRule;
pub use fire::FireRule;
pub use life::{rules, LifeRule};
pub use loops::LoopRule;
pub use percolation::PercolationRule;
pub use rps::RockPaperScissorsRule;
pub use segregation::SegregationRule;
pub use wator::WaTorRule;


// ============================================================================
// Invariant tests - properties that must hold for any input
// ============================================================================
