use crate::{
    Cell, CellId, Direction, DirectionRegistry, EdgePolicy, LatticeError, NeighborhoodKind,
    Position, Result, Shape, Topology,
};

/// Rectangular arena of cells addressed by `(row, col)`.
///
/// Cells are stored row-major; a [`CellId`] is `row * cols + col`. Neighbor
/// lists hold ids, so the grid owns every cell outright.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    topology: Option<Topology>,
}

impl Grid {
    /// Places `cells` row-major on a `rows x cols` grid.
    ///
    /// Neighbors are not installed; call one of the `set_*_neighbors`
    /// methods before stepping.
    pub fn new(cells: Vec<Cell>, rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            tracing::error!(rows, cols, "empty grid");
            return Err(LatticeError::EmptyGrid { rows, cols });
        }
        let Some(expected) = rows.checked_mul(cols) else {
            tracing::error!(rows, cols, "grid too large");
            return Err(LatticeError::GridTooLarge { rows, cols });
        };
        if cells.len() != expected {
            tracing::error!(rows, cols, actual = cells.len(), "cell count mismatch");
            return Err(LatticeError::CellCountMismatch {
                rows,
                cols,
                expected,
                actual: cells.len(),
            });
        }

        let mut grid = Self {
            rows,
            cols,
            cells,
            topology: None,
        };
        for id in 0..expected {
            let position = grid.position_of(id);
            grid.cells[id].set_position(position);
        }
        Ok(grid)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; grids have at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Topology installed by the last [`Grid::set_neighbors`], if any.
    pub fn topology(&self) -> Option<Topology> {
        self.topology
    }

    /// Id of the cell at `(row, col)`.
    pub fn cell_id(&self, row: usize, col: usize) -> Result<CellId> {
        if row < self.rows && col < self.cols {
            Ok(row * self.cols + col)
        } else {
            Err(LatticeError::OutOfBounds(row, col))
        }
    }

    fn position_of(&self, id: CellId) -> Position {
        Position::new(id / self.cols, id % self.cols)
    }

    /// Cell at `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> Result<&Cell> {
        let id = self.cell_id(row, col)?;
        Ok(&self.cells[id])
    }

    /// Mutable cell at `(row, col)`.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Result<&mut Cell> {
        let id = self.cell_id(row, col)?;
        Ok(&mut self.cells[id])
    }

    /// Cell with the given id.
    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id)
    }

    /// Replaces the cell at `(row, col)`.
    ///
    /// The replacement takes over the slot's position and neighbor lists.
    pub fn set_cell(&mut self, row: usize, col: usize, mut cell: Cell) -> Result<()> {
        let id = self.cell_id(row, col)?;
        let (neighbors, directional) = self.cells[id].take_neighbors();
        cell.set_position(Position::new(row, col));
        if let Some(neighbors) = neighbors {
            cell.set_neighbors(neighbors, directional);
        }
        self.cells[id] = cell;
        Ok(())
    }

    /// Neighbor ids of the cell at `position`.
    pub fn neighbors(&self, position: Position) -> Result<&[CellId]> {
        self.cell(position.row, position.col)?.neighbors()
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// All cells, row-major, mutably.
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Installs neighbors for `topology` using the built-in strategies.
    pub fn set_neighbors(&mut self, topology: Topology) -> Result<()> {
        self.set_neighbors_with(&DirectionRegistry::standard(), topology)
    }

    /// Installs neighbors for `topology` using `registry`.
    ///
    /// Replaces every cell's neighbor lists.
    pub fn set_neighbors_with(
        &mut self,
        registry: &DirectionRegistry,
        topology: Topology,
    ) -> Result<()> {
        let strategy = registry.get(topology.shape, topology.neighborhood)?;
        self.install(topology.edge, |row, col| strategy.offsets(row, col));
        self.topology = Some(topology);
        tracing::debug!(%topology, cells = self.cells.len(), "neighbors rebuilt");
        Ok(())
    }

    /// Installs neighbors from a fixed offset table.
    pub fn set_neighbors_from_offsets(&mut self, offsets: &[(i32, i32)], edge: EdgePolicy) {
        self.install(edge, |_, _| offsets.to_vec());
        self.topology = None;
        tracing::debug!(count = offsets.len(), %edge, "neighbors rebuilt from offsets");
    }

    /// Installs the square Moore neighborhood without wrapping.
    pub fn set_moore_neighbors(&mut self) -> Result<()> {
        self.set_neighbors(Topology::new(
            Shape::Rectangle,
            NeighborhoodKind::Moore,
            EdgePolicy::None,
        ))
    }

    /// Installs the four orthogonally adjacent cells without wrapping.
    pub fn set_adjacent_neighbors(&mut self) -> Result<()> {
        self.set_neighbors(Topology::new(
            Shape::Rectangle,
            NeighborhoodKind::VonNeumann,
            EdgePolicy::None,
        ))
    }

    fn install(
        &mut self,
        edge: EdgePolicy,
        mut offsets_for: impl FnMut(usize, usize) -> Vec<(i32, i32)>,
    ) {
        let (rows, cols) = (self.rows, self.cols);
        for id in 0..self.cells.len() {
            let Position { row, col } = self.position_of(id);
            let mut neighbors = Vec::new();
            let mut tagged: [Vec<(i32, CellId)>; 8] = Default::default();
            for offset in offsets_for(row, col) {
                let Some((r, c)) = edge.resolve(row, col, rows, cols, offset) else {
                    continue;
                };
                let neighbor = r * cols + c;
                neighbors.push(neighbor);
                if let Some(direction) = Direction::from_offset(offset) {
                    let distance = offset.0.abs().max(offset.1.abs());
                    tagged[direction as usize].push((distance, neighbor));
                }
            }
            // nearest first within each direction
            let directional: [Vec<CellId>; 8] = tagged.map(|mut bucket| {
                bucket.sort_by_key(|&(distance, _)| distance);
                bucket.into_iter().map(|(_, id)| id).collect()
            });
            self.cells[id].set_neighbors(neighbors, directional);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: usize, cols: usize) -> Grid {
        let cells = (0..rows * cols).map(|_| Cell::new(0, 2).unwrap()).collect();
        Grid::new(cells, rows, cols).unwrap()
    }

    #[test]
    fn test_new_assigns_positions() {
        let grid = grid(2, 3);
        assert_eq!(grid.cell(1, 2).unwrap().position(), Position::new(1, 2));
        assert_eq!(grid.cell_id(1, 0).unwrap(), 3);
    }

    #[test]
    fn test_new_rejects_bad_dimensions() {
        assert_eq!(
            Grid::new(Vec::new(), 0, 3).unwrap_err(),
            LatticeError::EmptyGrid { rows: 0, cols: 3 }
        );
        let cells = vec![Cell::new(0, 2).unwrap()];
        assert!(matches!(
            Grid::new(cells, 2, 2),
            Err(LatticeError::CellCountMismatch { expected: 4, actual: 1, .. })
        ));
    }

    #[test]
    fn test_new_rejects_overflowing_dimensions() {
        let err = Grid::new(Vec::new(), usize::MAX, 2).unwrap_err();
        assert_eq!(
            err,
            LatticeError::GridTooLarge {
                rows: usize::MAX,
                cols: 2
            }
        );
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut grid = grid(2, 2);
        assert_eq!(grid.cell(2, 0).unwrap_err(), LatticeError::OutOfBounds(2, 0));
        assert!(grid.cell_mut(0, 5).is_err());
        assert!(grid.set_cell(3, 3, Cell::new(0, 2).unwrap()).is_err());
    }

    #[test]
    fn test_moore_corner_and_center() {
        let mut grid = grid(3, 3);
        grid.set_moore_neighbors().unwrap();
        assert_eq!(grid.neighbors(Position::new(0, 0)).unwrap().len(), 3);
        assert_eq!(grid.neighbors(Position::new(1, 1)).unwrap().len(), 8);
    }

    #[test]
    fn test_adjacent_neighbors() {
        let mut grid = grid(3, 3);
        grid.set_adjacent_neighbors().unwrap();
        let mut ids = grid.neighbors(Position::new(1, 1)).unwrap().to_vec();
        ids.sort();
        assert_eq!(ids, vec![1, 3, 5, 7]);
    }

    #[test]
    fn test_toroidal_corner_has_full_neighborhood() {
        let mut grid = grid(4, 4);
        grid.set_neighbors(Topology::new(
            Shape::Rectangle,
            NeighborhoodKind::Moore,
            EdgePolicy::Toroidal,
        ))
        .unwrap();
        let neighbors = grid.neighbors(Position::new(0, 0)).unwrap();
        assert_eq!(neighbors.len(), 8);
        assert!(neighbors.contains(&15));
    }

    #[test]
    fn test_rebuild_replaces_lists() {
        let mut grid = grid(3, 3);
        grid.set_moore_neighbors().unwrap();
        grid.set_adjacent_neighbors().unwrap();
        assert_eq!(grid.neighbors(Position::new(1, 1)).unwrap().len(), 4);
    }

    #[test]
    fn test_directional_tags() {
        let mut grid = grid(3, 3);
        grid.set_moore_neighbors().unwrap();
        let center = grid.cell(1, 1).unwrap();
        assert_eq!(center.neighbors_toward(Direction::N).unwrap(), &[1]);
        assert_eq!(center.neighbors_toward(Direction::SW).unwrap(), &[6]);
        let corner = grid.cell(0, 0).unwrap();
        assert!(corner.neighbors_toward(Direction::N).unwrap().is_empty());
    }

    #[test]
    fn test_tags_follow_offset_not_wrapped_position() {
        let mut grid = grid(3, 3);
        grid.set_neighbors(Topology::new(
            Shape::Rectangle,
            NeighborhoodKind::VonNeumann,
            EdgePolicy::Toroidal,
        ))
        .unwrap();
        // North of the top row wraps to the bottom row.
        assert_eq!(
            grid.cell(0, 1).unwrap().neighbors_toward(Direction::N).unwrap(),
            &[7]
        );
    }

    #[test]
    fn test_directional_buckets_nearest_first() {
        let mut grid = grid(5, 5);
        grid.set_neighbors(Topology::new(
            Shape::Hexagon,
            NeighborhoodKind::ExtendedMoore,
            EdgePolicy::None,
        ))
        .unwrap();
        let center = grid.cell(2, 2).unwrap();
        assert_eq!(center.neighbors_toward(Direction::N).unwrap(), &[7, 2]);
    }

    #[test]
    fn test_set_cell_inherits_neighbors() {
        let mut grid = grid(3, 3);
        grid.set_moore_neighbors().unwrap();
        grid.set_cell(1, 1, Cell::new(1, 2).unwrap()).unwrap();
        let cell = grid.cell(1, 1).unwrap();
        assert_eq!(cell.state(), 1);
        assert_eq!(cell.position(), Position::new(1, 1));
        assert_eq!(cell.neighbors().unwrap().len(), 8);
    }

    #[test]
    fn test_custom_offsets() {
        let mut grid = grid(3, 3);
        grid.set_neighbors_from_offsets(&[(0, 1)], EdgePolicy::None);
        assert_eq!(grid.neighbors(Position::new(0, 0)).unwrap(), &[1]);
        assert!(grid.neighbors(Position::new(0, 2)).unwrap().is_empty());
        assert_eq!(grid.topology(), None);
    }
}
