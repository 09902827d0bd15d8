//! Connector curve routing between dependent field rows.

use crate::geometry::{self, Metrics};
use crate::graph::{Link, SchemaGraph};
use crate::layout::{Coordinate, CoordinateMap};
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// A link references a field that cannot be located within its declared
    /// table. Parser/host contract violation; do not draw a malformed curve.
    #[error("field {field_id} not found in table {table_id}")]
    FieldNotFound { field_id: String, table_id: String },
    #[error("unknown table {0}")]
    TableNotFound(String),
    #[error("table {0} has no assigned coordinate")]
    TableNotPlaced(String),
}

/// A routed cubic bezier: start, two control points, end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutedPath {
    pub start: (f64, f64),
    pub control1: (f64, f64),
    pub control2: (f64, f64),
    pub end: (f64, f64),
    /// True for the S-shaped opposite-edge route, false for the C-shaped
    /// loop-back.
    pub direct: bool,
}

impl RoutedPath {
    pub fn to_path_string(&self) -> String {
        geometry::link_path(self.start, self.control1, self.control2, self.end)
    }
}

/// Coordinate lookup with at most one live override, used while a drag is
/// in flight so rerouting sees the not-yet-committed position without
/// cloning the whole map.
#[derive(Clone, Copy)]
pub struct CoordinateView<'a> {
    base: &'a CoordinateMap,
    live: Option<(&'a str, Coordinate)>,
}

impl<'a> CoordinateView<'a> {
    pub fn new(base: &'a CoordinateMap) -> Self {
        Self { base, live: None }
    }

    pub fn with_override(base: &'a CoordinateMap, table_id: &'a str, position: Coordinate) -> Self {
        Self {
            base,
            live: Some((table_id, position)),
        }
    }

    fn get(&self, table_id: &str) -> Option<Coordinate> {
        match self.live {
            Some((id, position)) if id == table_id => Some(position),
            _ => self.base.get(table_id).copied(),
        }
    }
}

/// Route one link. The source is always a field row; a target whose id
/// equals its table id is a self-link and attaches to the header row.
pub fn route_link(
    link: &Link,
    graph: &SchemaGraph,
    coords: &CoordinateView,
    metrics: &Metrics,
) -> Result<RoutedPath, RouteError> {
    let (source_pos, source_y) = endpoint(graph, coords, metrics, &link.source_table_id, &link.source_id)?;
    let (target_pos, target_y) = endpoint(graph, coords, metrics, &link.target_table_id, &link.target_id)?;

    // Classify relative horizontal position: rows clearly left/right of
    // each other connect facing edges directly; overlapping rows both
    // exit to the right and loop back.
    let (source_x, target_x, direct) = if source_pos.x > target_pos.x + metrics.row_width {
        (source_pos.x, target_pos.x + metrics.row_width, true)
    } else if target_pos.x > source_pos.x + metrics.row_width {
        (source_pos.x + metrics.row_width, target_pos.x, true)
    } else {
        (
            source_pos.x + metrics.row_width,
            target_pos.x + metrics.row_width,
            false,
        )
    };

    Ok(calculate_link_path(
        (source_x, source_y),
        (target_x, target_y),
        direct,
        metrics,
    ))
}

/// Build the curve from resolved endpoints.
///
/// Direct: control points share one x, placed at the far endpoint and
/// pulled toward the leftmost one as the endpoints get vertically closer,
/// so nearly-level links stay flat and distant ones curve hard. Indirect:
/// both control points sit a fixed offset past the rightmost edge.
pub fn calculate_link_path(
    start: (f64, f64),
    end: (f64, f64),
    direct: bool,
    metrics: &Metrics,
) -> RoutedPath {
    if direct {
        let dy = (end.1 - start.1).abs();
        let scale = 0.5 + 0.5 * (dy.min(metrics.curve_distance_max) / metrics.curve_distance_max);
        let dx = (end.0 - start.0).abs();
        let far_x = start.0.max(end.0);
        let control_x = far_x - dx * (1.0 - scale);
        RoutedPath {
            start,
            control1: (control_x, start.1),
            control2: (control_x, end.1),
            end,
            direct,
        }
    } else {
        let control_x = start.0.max(end.0) + metrics.loop_offset;
        RoutedPath {
            start,
            control1: (control_x, start.1),
            control2: (control_x, end.1),
            end,
            direct,
        }
    }
}

/// Batch form: every link, keyed by link id.
pub fn route_all(
    graph: &SchemaGraph,
    coords: &CoordinateMap,
    metrics: &Metrics,
) -> Result<HashMap<String, RoutedPath>, RouteError> {
    let view = CoordinateView::new(coords);
    let mut paths = HashMap::with_capacity(graph.links.len());
    for link in &graph.links {
        paths.insert(link.id.clone(), route_link(link, graph, &view, metrics)?);
    }
    Ok(paths)
}

fn endpoint(
    graph: &SchemaGraph,
    coords: &CoordinateView,
    metrics: &Metrics,
    table_id: &str,
    node_id: &str,
) -> Result<(Coordinate, f64), RouteError> {
    let table = graph
        .table(table_id)
        .ok_or_else(|| RouteError::TableNotFound(table_id.to_string()))?;
    let row = table
        .row_of(node_id)
        .ok_or_else(|| RouteError::FieldNotFound {
            field_id: node_id.to_string(),
            table_id: table_id.to_string(),
        })?;
    let position = coords
        .get(table_id)
        .ok_or_else(|| RouteError::TableNotPlaced(table_id.to_string()))?;
    Ok((position, metrics.row_center_y(position.y, row)))
}
