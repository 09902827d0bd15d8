//! Table placement: initial columnar bin packing and incremental extension.

use crate::geometry::Metrics;
use crate::graph::TableConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pixel position of a table's top-left corner. Persisted per table id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

pub type CoordinateMap = HashMap<String, Coordinate>;

/// First-run placement: pack tables into `ceil(sqrt(N))` columns,
/// approximating a square grid. Each table lands in the shortest column
/// seen so far.
pub fn initial_layout(tables: &[TableConfig], metrics: &Metrics) -> CoordinateMap {
    let columns = (tables.len() as f64).sqrt().ceil() as usize;
    let mut heights = vec![0.0f64; columns.max(1)];
    let mut coords = CoordinateMap::with_capacity(tables.len());

    for table in tables {
        let column = shortest_column(&heights);
        coords.insert(
            table.id.clone(),
            Coordinate {
                x: metrics.column_x(column),
                y: heights[column],
            },
        );
        heights[column] += metrics.slot_height(table.field_ids.len());
    }

    coords
}

/// Shortest-so-far column, ties toward the lowest index. An untouched
/// column wins immediately, so early tables fill empty columns
/// left-to-right before packing begins.
fn shortest_column(heights: &[f64]) -> usize {
    let mut best = 0;
    for (i, &h) in heights.iter().enumerate() {
        if h == 0.0 {
            return i;
        }
        if h < heights[best] {
            best = i;
        }
    }
    best
}

/// Incremental placement on a schema change: tables that already have a
/// coordinate keep it, newly discovered tables stack into a fresh column
/// to the right of everything placed so far.
///
/// When nothing is new the existing map is handed back untouched.
pub fn extend_layout(
    tables: &[TableConfig],
    existing: CoordinateMap,
    metrics: &Metrics,
) -> CoordinateMap {
    let new_tables: Vec<&TableConfig> = tables
        .iter()
        .filter(|t| !existing.contains_key(&t.id))
        .collect();
    if new_tables.is_empty() {
        return existing;
    }
    if existing.is_empty() {
        return initial_layout(tables, metrics);
    }

    let rightmost = existing.values().map(|c| c.x).fold(f64::MIN, f64::max);
    let topmost = existing.values().map(|c| c.y).fold(f64::MAX, f64::min);
    let x = rightmost + metrics.row_width + metrics.table_gutter;

    let mut coords = existing;
    let mut y = topmost;
    for table in new_tables {
        coords.insert(table.id.clone(), Coordinate { x, y });
        y += metrics.slot_height(table.field_ids.len());
    }

    coords
}
