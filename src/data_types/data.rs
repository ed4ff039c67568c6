use eyre::{bail, Result};
use serde::{Deserialize, Serialize};

use super::axis::Range;

/// Column label of a grid cell: a layer number or an orderable category.
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    Number(f64),
    Category(String),
}

impl From<f64> for AxisValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for AxisValue {
    fn from(value: &str) -> Self {
        Self::Category(value.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub x: AxisValue,
    /// Metric value (e.g. predicted-token probability).
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridRow {
    pub id: String,
    pub data: Vec<GridCell>,
}

/// Token position × layer grid. Row index is the row-domain coordinate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridDataset {
    pub rows: Vec<GridRow>,
}

impl GridDataset {
    /// Validates that every row has the same number of cells.
    pub fn new(rows: Vec<GridRow>) -> Result<Self> {
        if let Some(first) = rows.first() {
            let width = first.data.len();
            for (i, row) in rows.iter().enumerate() {
                if row.data.len() != width {
                    bail!(
                        "grid row {} ({}) has {} cells, expected {}",
                        i,
                        row.id,
                        row.data.len(),
                        width
                    );
                }
            }
        }
        Ok(Self { rows })
    }

    /// Builds a dataset from a dense value matrix, numbering columns from 0.
    pub fn from_values(values: Vec<Vec<f64>>) -> Result<Self> {
        let rows = values
            .into_iter()
            .enumerate()
            .map(|(i, row)| GridRow {
                id: i.to_string(),
                data: row
                    .into_iter()
                    .enumerate()
                    .map(|(j, y)| GridCell {
                        x: AxisValue::Number(j as f64),
                        y,
                        label: None,
                    })
                    .collect(),
            })
            .collect();
        Self::new(rows)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.rows.first().map(|r| r.data.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0 || self.col_count() == 0
    }

    /// Full row-index extent, `None` when there are no rows.
    pub fn row_extent(&self) -> Option<Range> {
        Range::of_len(self.row_count())
    }

    /// Full column-index extent, `None` when there are no columns.
    pub fn col_extent(&self) -> Option<Range> {
        Range::of_len(self.col_count())
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&GridCell> {
        self.rows.get(row).and_then(|r| r.data.get(col))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    pub id: String,
    pub data: Vec<LinePoint>,
}

impl LineSeries {
    pub fn new(id: impl Into<String>, points: &[(f64, f64)]) -> Self {
        Self {
            id: id.into(),
            data: points.iter().map(|&(x, y)| LinePoint { x, y }).collect(),
        }
    }

    /// Value at exactly `x`, if the series defines one.
    pub fn value_at(&self, x: f64) -> Option<f64> {
        self.data.iter().find(|p| p.x == x).map(|p| p.y)
    }
}

/// Layer × metric curves, one series per tracked token.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LineDataset {
    pub lines: Vec<LineSeries>,
}

impl LineDataset {
    pub fn new(lines: Vec<LineSeries>) -> Self {
        Self { lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.data.is_empty())
    }

    /// Every finite x present in any series, sorted and de-duplicated.
    pub fn unique_sorted_x(&self) -> Vec<f64> {
        let mut xs: Vec<f64> = self
            .lines
            .iter()
            .flat_map(|l| l.data.iter().map(|p| p.x))
            .filter(|x| x.is_finite())
            .collect();
        xs.sort_by(f64::total_cmp);
        xs.dedup();
        xs
    }

    /// `(x_extent, y_extent)` over all finite points, `None` when there are none.
    pub fn extent(&self) -> Option<(Range, Range)> {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;

        for p in self
            .lines
            .iter()
            .flat_map(|l| l.data.iter())
            .filter(|p| p.x.is_finite() && p.y.is_finite())
        {
            x_min = x_min.min(p.x);
            x_max = x_max.max(p.x);
            y_min = y_min.min(p.y);
            y_max = y_max.max(p.y);
        }

        if x_min == f64::INFINITY {
            return None;
        }
        Some((Range::new(x_min, x_max), Range::new(y_min, y_max)))
    }
}
