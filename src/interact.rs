//! Drag gesture state machine: live repositioning of a single table.

use crate::geometry::Metrics;
use crate::graph::SchemaGraph;
use crate::layout::{Coordinate, CoordinateMap};
use crate::routing::{route_link, CoordinateView, RouteError, RoutedPath};
use crate::settings::{save_coordinates, SettingsStore};

/// Only one table can be in flight at a time; that alone rules out
/// overlapping drag commits.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        table_id: String,
        position: Coordinate,
    },
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pan/zoom stays suspended while this is true.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn dragged_table(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { table_id, .. } => Some(table_id),
            DragState::Idle => None,
        }
    }

    /// Press on a table's header row. Read-only users cannot reposition,
    /// so an unauthorized press is ignored with no state change.
    pub fn begin(
        &mut self,
        table_id: &str,
        coords: &CoordinateMap,
        store: &dyn SettingsStore,
    ) -> bool {
        if !store.has_write_permission() || self.is_dragging() {
            return false;
        }
        let Some(&position) = coords.get(table_id) else {
            return false;
        };
        self.state = DragState::Dragging {
            table_id: table_id.to_string(),
            position,
        };
        true
    }

    /// Advance the live position by a screen-space pointer delta and
    /// reroute only the links touching the dragged table, against the
    /// not-yet-committed position. Dividing by the zoom factor keeps the
    /// drag zoom-invariant. Synchronous; runs on every input event.
    pub fn pointer_move(
        &mut self,
        dx: f64,
        dy: f64,
        zoom: f64,
        graph: &SchemaGraph,
        coords: &CoordinateMap,
        metrics: &Metrics,
    ) -> Result<Vec<(String, RoutedPath)>, RouteError> {
        let DragState::Dragging { table_id, position } = &mut self.state else {
            return Ok(Vec::new());
        };
        position.x += dx / zoom;
        position.y += dy / zoom;

        let view = CoordinateView::with_override(coords, table_id, *position);
        let mut updated = Vec::new();
        for link_id in graph.reverse_index.links_for(table_id) {
            let Some(link) = graph.link(link_id) else {
                continue;
            };
            updated.push((link_id.clone(), route_link(link, graph, &view, metrics)?));
        }
        Ok(updated)
    }

    /// Release: merge the final position into the coordinate map, persist
    /// it best-effort, and return to Idle. The only exit from a drag.
    pub fn release(
        &mut self,
        coords: &mut CoordinateMap,
        store: &mut dyn SettingsStore,
    ) -> Option<(String, Coordinate)> {
        let DragState::Dragging { table_id, position } =
            std::mem::take(&mut self.state)
        else {
            return None;
        };
        coords.insert(table_id.clone(), position);
        save_coordinates(store, coords);
        Some((table_id, position))
    }
}
