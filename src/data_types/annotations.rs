use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use eyre::{eyre, Report, WrapErr};
use serde::{Deserialize, Serialize};

/// Key of one grid cell in annotation membership. Equality is by `(row, col)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId {
    pub row: usize,
    pub col: usize,
}

impl CellId {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Key namespaced by chart identity, as `"{chart}-{row}-{col}"`.
    pub fn namespaced(&self, chart_id: &str) -> String {
        format!("{}-{}-{}", chart_id, self.row, self.col)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

impl FromStr for CellId {
    type Err = Report;

    /// Accepts `"row-col"` as well as namespaced `"chart-...-row-col"`; the
    /// last two dash-separated parts are the indices.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplit('-');
        let col = parts.next().ok_or_else(|| eyre!("empty cell id"))?;
        let row = parts
            .next()
            .ok_or_else(|| eyre!("cell id {:?} has no row part", s))?;
        let row = row
            .parse()
            .wrap_err_with(|| format!("invalid row in cell id {:?}", s))?;
        let col = col
            .parse()
            .wrap_err_with(|| format!("invalid column in cell id {:?}", s))?;
        Ok(Self { row, col })
    }
}

/// Inclusive cell-index rectangle of a grid selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_row: usize,
    pub max_row: usize,
    pub min_col: usize,
    pub max_col: usize,
}

impl Bounds {
    /// Normalising constructor from two opposite corners.
    pub fn from_corners(a: CellId, b: CellId) -> Self {
        Self {
            min_row: a.row.min(b.row),
            max_row: a.row.max(b.row),
            min_col: a.col.min(b.col),
            max_col: a.col.max(b.col),
        }
    }

    pub fn row_count(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    pub fn col_count(&self) -> usize {
        self.max_col - self.min_col + 1
    }

    pub fn contains(&self, cell: CellId) -> bool {
        (self.min_row..=self.max_row).contains(&cell.row)
            && (self.min_col..=self.max_col).contains(&cell.col)
    }

    /// Clamps all four indices into a `rows × cols` grid. `None` for an empty grid.
    pub fn clamped(&self, rows: usize, cols: usize) -> Option<Self> {
        if rows == 0 || cols == 0 {
            return None;
        }
        Some(Self {
            min_row: self.min_row.min(rows - 1),
            max_row: self.max_row.min(rows - 1),
            min_col: self.min_col.min(cols - 1),
            max_col: self.max_col.min(cols - 1),
        })
    }
}

/// Bounding rectangle of a set of cells, `None` when the set is empty.
pub fn cell_bounds<'a>(cells: impl IntoIterator<Item = &'a CellId>) -> Option<Bounds> {
    let mut iter = cells.into_iter();
    let first = *iter.next()?;
    Some(iter.fold(Bounds::from_corners(first, first), |b, c| Bounds {
        min_row: b.min_row.min(c.row),
        max_row: b.max_row.max(c.row),
        min_col: b.min_col.min(c.col),
        max_col: b.max_col.max(c.col),
    }))
}

/// Line-chart selection rectangle. Pixel units while dragging, domain units once persisted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionBounds {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl SelectionBounds {
    /// Copy with `min <= max` on both axes.
    pub fn normalized(&self) -> Self {
        Self {
            x_min: self.x_min.min(self.x_max),
            x_max: self.x_min.max(self.x_max),
            y_min: self.y_min.min(self.y_max),
            y_max: self.y_min.max(self.y_max),
        }
    }

    pub fn width(&self) -> f64 {
        (self.x_max - self.x_min).abs()
    }

    pub fn height(&self) -> f64 {
        (self.y_max - self.y_min).abs()
    }
}

/// Sorted, de-duplicated list form of a cell set, for persistence.
pub fn sorted_cells(set: &HashSet<CellId>) -> Vec<CellId> {
    let mut cells: Vec<CellId> = set.iter().copied().collect();
    cells.sort();
    cells
}
