//! Jagged row/column grid model.
//!
//! `GridManager` tracks only the shape of the grid (`row_cols`); it
//! does not own panes itself — the controller keeps panes in a flat
//! `Vec` indexed the same way `flat_index` computes.

#[derive(Debug, Clone, Default)]
pub struct GridManager {
    row_cols: Vec<u32>,
}

/// Pixel rectangle for one pane cell, produced by [`GridManager::compute_layout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneLayout {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub title_h: f32,
}

/// Layout inputs that are not window-size dependent.
#[derive(Debug, Clone, Copy)]
pub struct LayoutConfig {
    pub outer_padding: f32,
    pub gap: f32,
    pub title_bar_height: f32,
}

impl GridManager {
    pub fn new() -> Self {
        Self { row_cols: Vec::new() }
    }

    /// Construct a grid with `rows` rows of `cols` columns each
    /// (used at controller startup from config).
    pub fn with_shape(rows: u32, cols: u32) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            row_cols: vec![cols; rows as usize],
        }
    }

    pub fn num_rows(&self) -> usize {
        self.row_cols.len()
    }

    pub fn row_cols(&self) -> &[u32] {
        &self.row_cols
    }

    pub fn total_panes(&self) -> u32 {
        self.row_cols.iter().sum()
    }

    /// No-op if `r >= num_rows`; else `row_cols[r] += 1`.
    pub fn add_col_to_row(&mut self, r: usize) {
        if let Some(count) = self.row_cols.get_mut(r) {
            *count += 1;
        }
    }

    /// Returns `true` iff the row was erased (it had exactly one
    /// column). No-op (returns `false`) if `r` is out of range.
    pub fn remove_col_from_row(&mut self, r: usize) -> bool {
        match self.row_cols.get_mut(r) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => {
                self.row_cols.remove(r);
                true
            }
            None => false,
        }
    }

    /// Append a new row with one column.
    pub fn add_row(&mut self) {
        self.row_cols.push(1);
    }

    /// Linear scan mapping a flat pane index to `(row, col)`.
    pub fn pane_position(&self, i: u32) -> Option<(usize, usize)> {
        let mut remaining = i;
        for (row, &cols) in self.row_cols.iter().enumerate() {
            if remaining < cols {
                return Some((row, remaining as usize));
            }
            remaining -= cols;
        }
        None
    }

    /// Inverse of [`Self::pane_position`], bounds-checked on both axes.
    pub fn flat_index(&self, row: usize, col: usize) -> Option<u32> {
        let cols = *self.row_cols.get(row)? as usize;
        if col >= cols {
            return None;
        }
        let before: u32 = self.row_cols[..row].iter().sum();
        Some(before + col as u32)
    }

    /// Compute per-pane pixel rectangles for the given window size.
    pub fn compute_layout(
        &self,
        window_w: f32,
        window_h: f32,
        config: LayoutConfig,
        scale: f32,
    ) -> Vec<PaneLayout> {
        let outer = config.outer_padding * scale;
        let gap = config.gap * scale;
        let title_h = config.title_bar_height * scale;

        let n = self.row_cols.len().max(1) as f32;
        let total_w = window_w - 2.0 * outer;
        let total_h = window_h - 2.0 * outer;
        let pane_h = (total_h - (n - 1.0) * gap) / n;

        let mut layouts = Vec::new();
        let rows: &[u32] = if self.row_cols.is_empty() {
            &[0]
        } else {
            &self.row_cols
        };

        for (r, &row_cols) in rows.iter().enumerate() {
            let c = row_cols.max(1) as f32;
            let pane_w = (total_w - (c - 1.0) * gap) / c;
            for col in 0..row_cols.max(1) {
                let x = outer + (col as f32) * (pane_w + gap);
                let y = outer + (r as f32) * (pane_h + gap);
                layouts.push(PaneLayout {
                    x,
                    y,
                    w: pane_w,
                    h: pane_h,
                    title_h,
                });
            }
        }
        layouts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn flat_index_and_pane_position_are_inverses() {
        let mut grid = GridManager::with_shape(2, 3);
        grid.add_col_to_row(0);
        for row in 0..grid.num_rows() {
            for col in 0..grid.row_cols()[row] as usize {
                let flat = grid.flat_index(row, col).unwrap();
                assert_eq!(grid.pane_position(flat), Some((row, col)));
            }
        }
    }

    #[test]
    fn remove_last_col_erases_row() {
        let mut grid = GridManager::with_shape(1, 1);
        grid.add_row();
        assert_eq!(grid.num_rows(), 2);
        assert!(grid.remove_col_from_row(1));
        assert_eq!(grid.num_rows(), 1);
    }

    #[test]
    fn remove_col_decrements_without_erasing() {
        let mut grid = GridManager::with_shape(1, 2);
        assert!(!grid.remove_col_from_row(0));
        assert_eq!(grid.row_cols(), &[1]);
    }

    #[test]
    fn out_of_range_row_is_a_no_op() {
        let mut grid = GridManager::with_shape(1, 1);
        grid.add_col_to_row(5);
        assert_eq!(grid.row_cols(), &[1]);
        assert!(!grid.remove_col_from_row(5));
    }

    fn arb_ops() -> impl Strategy<Value = Vec<GridOp>> {
        prop::collection::vec(
            prop_oneof![
                Just(GridOp::AddRow),
                (0usize..6).prop_map(GridOp::AddCol),
                (0usize..6).prop_map(GridOp::RemoveCol),
            ],
            0..40,
        )
    }

    #[derive(Debug, Clone, Copy)]
    enum GridOp {
        AddRow,
        AddCol(usize),
        RemoveCol(usize),
    }

    proptest! {
        #[test]
        fn grid_consistency(ops in arb_ops()) {
            let mut grid = GridManager::with_shape(1, 1);
            for op in ops {
                match op {
                    GridOp::AddRow => grid.add_row(),
                    GridOp::AddCol(r) => grid.add_col_to_row(r),
                    GridOp::RemoveCol(r) => { grid.remove_col_from_row(r); }
                }
                let total = grid.total_panes();
                prop_assert_eq!(total, grid.row_cols().iter().sum::<u32>());
                for row in 0..grid.num_rows() {
                    for col in 0..grid.row_cols()[row] as usize {
                        let flat = grid.flat_index(row, col).unwrap();
                        prop_assert_eq!(grid.pane_position(flat), Some((row, col)));
                    }
                }
            }
        }

        #[test]
        fn layout_positivity(window_w in 64.0f32..4000.0, window_h in 64.0f32..4000.0, scale in 0.1f32..4.0, rows in 1u32..5, cols in 1u32..5) {
            let grid = GridManager::with_shape(rows, cols);
            let config = LayoutConfig { outer_padding: 4.0, gap: 2.0, title_bar_height: 20.0 };
            let layouts = grid.compute_layout(window_w, window_h, config, scale);
            prop_assert_eq!(layouts.len() as u32, rows * cols);
            for layout in layouts {
                prop_assert!(layout.x >= 0.0);
                prop_assert!(layout.y >= 0.0);
                prop_assert!(layout.w > 0.0);
                prop_assert!(layout.h > 0.0);
            }
        }
    }
}
