#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{
    AutomatonKind, Cell, CellContext, EdgePolicy, Grid, NeighborhoodKind, ParamValue,
    Parameters, Position, Result, Rule, RuleRegistry, Shape, Topology,
};

/// Everything needed to build a [`Simulation`].
///
/// Produced by whatever loads simulation files; the engine only validates it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// Which automaton to run.
    pub kind: AutomatonKind,
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// Initial states, row-major.
    pub states: Vec<u32>,
    /// Numeric parameter overrides.
    pub parameters: BTreeMap<String, f64>,
    /// Typed parameter extras.
    pub extras: BTreeMap<String, ParamValue>,
    /// Cell connectivity.
    pub topology: Topology,
    /// Seed for probabilistic rules; `None` draws from the OS.
    pub seed: Option<u64>,
}

impl SimulationConfig {
    /// Creates a config with default parameters and a square Moore topology
    /// without wrapping.
    pub fn new(kind: AutomatonKind, rows: usize, cols: usize, states: Vec<u32>) -> Self {
        Self {
            kind,
            rows,
            cols,
            states,
            parameters: BTreeMap::new(),
            extras: BTreeMap::new(),
            topology: Topology::default(),
            seed: None,
        }
    }

    /// Overrides a numeric parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    /// Sets a typed extra.
    pub fn with_extra(mut self, key: impl Into<String>, value: ParamValue) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    /// Sets the topology.
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Fixes the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// A running automaton: a grid, a rule, and a tick counter.
///
/// Each [`Simulation::step`] runs four phases, each over every cell before
/// the next begins: snapshot, compute, commit, reset.
///
/// # Example
///
/// ```
/// use unshape_lattice::{AutomatonKind, Simulation, SimulationConfig};
///
/// // a blinker
/// let config = SimulationConfig::new(
///     AutomatonKind::GameOfLife,
///     3,
///     3,
///     vec![0, 1, 0, 0, 1, 0, 0, 1, 0],
/// );
/// let mut sim = Simulation::new(config).unwrap();
/// sim.step().unwrap();
/// assert_eq!(sim.current_state(1, 0).unwrap(), 1);
/// assert_eq!(sim.current_state(0, 1).unwrap(), 0);
///
/// sim.step_back();
/// assert_eq!(sim.current_state(0, 1).unwrap(), 1);
/// ```
#[derive(Debug)]
pub struct Simulation {
    rule: Box<dyn Rule>,
    grid: Grid,
    iterations: u64,
}

impl Simulation {
    /// Builds a simulation from the built-in rules.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Self::with_registry(&RuleRegistry::standard(), config)
    }

    /// Builds a simulation using rules from `registry`.
    pub fn with_registry(registry: &RuleRegistry, config: SimulationConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let rule = registry.create(config.kind, config.parameters, config.extras, rng)?;
        let num_states = rule.num_states();

        let cells = config
            .states
            .iter()
            .map(|&state| Cell::new(state, num_states))
            .collect::<Result<Vec<_>>>()
            .inspect_err(|err| tracing::error!(%err, kind = %config.kind, "invalid initial state"))?;
        let mut grid = Grid::new(cells, config.rows, config.cols)?;
        grid.set_neighbors(config.topology)?;
        for cell in grid.cells_mut() {
            rule.prepare_cell(cell);
        }

        tracing::debug!(
            kind = %config.kind,
            rows = config.rows,
            cols = config.cols,
            topology = %config.topology,
            "simulation created"
        );
        Ok(Self {
            rule,
            grid,
            iterations: 0,
        })
    }

    /// Advances every cell by one tick.
    pub fn step(&mut self) -> Result<()> {
        let max_history = self.rule.parameters().max_history()?;
        for cell in self.grid.cells_mut() {
            cell.snapshot(max_history)?;
        }
        for id in 0..self.grid.len() {
            let mut ctx = CellContext::new(id, self.grid.cells_mut());
            self.rule.compute_next(&mut ctx)?;
        }
        for cell in self.grid.cells_mut() {
            cell.commit();
        }
        for cell in self.grid.cells_mut() {
            self.rule.reset_cell(cell);
        }
        self.iterations += 1;
        tracing::trace!(iteration = self.iterations, "tick");
        Ok(())
    }

    /// Rewinds every cell by one recorded tick.
    ///
    /// Returns `false`, leaving the grid as it was, once no cell has older
    /// history to restore.
    pub fn step_back(&mut self) -> bool {
        let mut rewound = false;
        for cell in self.grid.cells_mut() {
            if cell.step_back() {
                self.rule.prepare_cell(cell);
                rewound = true;
            }
        }
        if rewound {
            self.iterations = self.iterations.saturating_sub(1);
        }
        rewound
    }

    /// Committed state at `(row, col)`.
    pub fn current_state(&self, row: usize, col: usize) -> Result<u32> {
        Ok(self.grid.cell(row, col)?.state())
    }

    /// Ticks the state at `(row, col)` has gone unchanged.
    pub fn state_length(&self, row: usize, col: usize) -> Result<u32> {
        Ok(self.grid.cell(row, col)?.state_length())
    }

    /// Reads a numeric parameter.
    pub fn parameter(&self, key: &str) -> Result<f64> {
        self.rule.parameters().get(key)
    }

    /// Updates a numeric parameter; takes effect on the next tick.
    pub fn set_parameter(&mut self, key: &str, value: f64) -> Result<()> {
        self.rule.parameters_mut().set(key, value)
    }

    /// Numeric parameter keys.
    pub fn parameter_keys(&self) -> Vec<String> {
        self.rule.parameters().keys().map(str::to_string).collect()
    }

    /// Typed extra keys.
    pub fn extra_parameter_keys(&self) -> Vec<String> {
        self.rule
            .parameters()
            .extra_keys()
            .map(str::to_string)
            .collect()
    }

    /// All parameters.
    pub fn parameters(&self) -> &Parameters {
        self.rule.parameters()
    }

    /// Rebuilds every cell's neighbors for a new topology.
    pub fn set_neighbors(
        &mut self,
        shape: Shape,
        neighborhood: NeighborhoodKind,
        edge: EdgePolicy,
    ) -> Result<()> {
        self.grid
            .set_neighbors(Topology::new(shape, neighborhood, edge))
    }

    /// Overwrites the committed state at `(row, col)`.
    pub fn set_state(&mut self, row: usize, col: usize, state: u32) -> Result<()> {
        let cell = self.grid.cell_mut(row, col)?;
        cell.set_current_state(state)?;
        cell.set_next_state(state)?;
        self.rule.prepare_cell(cell);
        Ok(())
    }

    /// `(position, state)` for every cell, row-major.
    pub fn cell_states(&self) -> impl Iterator<Item = (Position, u32)> + '_ {
        self.grid
            .cells()
            .iter()
            .map(|cell| (cell.position(), cell.state()))
    }

    /// Committed states as rows.
    pub fn state_rows(&self) -> Vec<Vec<u32>> {
        self.grid
            .cells()
            .chunks(self.grid.cols())
            .map(|row| row.iter().map(Cell::state).collect())
            .collect()
    }

    /// Which automaton is running.
    pub fn kind(&self) -> AutomatonKind {
        self.rule.kind()
    }

    /// Number of states of the running automaton.
    pub fn num_states(&self) -> u32 {
        self.rule.num_states()
    }

    /// Ticks since creation, less any stepped back.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    /// The underlying grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Current topology.
    pub fn topology(&self) -> Option<Topology> {
        self.grid.topology()
    }
}
