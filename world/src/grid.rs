//! Dense occupancy grid backing the lane layout.

use monster_dungeon_core::{CellCoord, OccupancyView, Occupant};

/// Row-major grid recording which entity claims each cell.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Option<Occupant>>,
}

impl OccupancyGrid {
    /// Creates an empty grid with the provided dimensions.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![None; capacity],
        }
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn is_valid_position(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Reports whether the cell is blocked; cells outside the grid always are.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.index(cell).map_or(true, |index| self.cells[index].is_some())
    }

    /// Entity claiming the cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<Occupant> {
        self.index(cell).and_then(|index| self.cells[index])
    }

    /// Overwrites the cell's claim. Cells outside the grid are ignored.
    pub fn set_occupied(&mut self, cell: CellCoord, occupant: Option<Occupant>) {
        if let Some(index) = self.index(cell) {
            self.cells[index] = occupant;
        }
    }

    /// Clears the cell only if `occupant` currently claims it.
    pub fn release(&mut self, cell: CellCoord, occupant: Occupant) {
        if self.occupant(cell) == Some(occupant) {
            self.set_occupied(cell, None);
        }
    }

    /// Claims the cell for `occupant` only if it is free.
    ///
    /// Returns whether the claim was recorded.
    pub fn claim(&mut self, cell: CellCoord, occupant: Occupant) -> bool {
        match self.index(cell) {
            Some(index) if self.cells[index].is_none() => {
                self.cells[index] = Some(occupant);
                true
            }
            _ => false,
        }
    }

    /// Moves the player's claim from `from` to `to`.
    ///
    /// Fails without touching the grid when `to` is outside the grid or
    /// already claimed.
    pub fn move_player(&mut self, from: CellCoord, to: CellCoord) -> bool {
        if self.is_occupied(to) {
            return false;
        }

        self.set_occupied(from, None);
        self.set_occupied(to, Some(Occupant::Player));
        true
    }

    /// Number of cells claimed by `occupant`.
    #[must_use]
    pub fn count(&self, occupant: Occupant) -> usize {
        self.cells
            .iter()
            .filter(|cell| **cell == Some(occupant))
            .count()
    }

    /// Clears every claim.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Provides the dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Captures a read-only view for systems and presentation layers.
    #[must_use]
    pub fn view(&self) -> OccupancyView<'_> {
        OccupancyView::new(&self.cells, self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
