//! Panel orchestration: owns the derived state and the render model.

use crate::geometry::{self, Metrics};
use crate::graph::{EnabledLinkTypes, LinkKind, NodeKind, SchemaGraph};
use crate::highlight::{self, HoverTarget};
use crate::interact::DragController;
use crate::layout::{extend_layout, initial_layout, Coordinate, CoordinateMap};
use crate::parser;
use crate::routing::{route_all, RoutedPath};
use crate::settings::{
    load_coordinates, load_enabled_link_types, save_coordinates, save_enabled_link_types,
    SettingsStore,
};
use crate::snapshot::TableSnapshot;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Declarative output for the renderer: positions and path strings only,
/// no pixels.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderModel {
    pub tables: Vec<TableView>,
    pub links: Vec<LinkView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub id: String,
    pub name: String,
    pub coordinate: Coordinate,
    pub rows: Vec<RowView>,
    pub body_path: String,
    pub header_path: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    pub id: String,
    pub label: String,
    pub is_header: bool,
    pub tooltip_label: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkView {
    pub id: String,
    pub kind: LinkKind,
    pub path: String,
    pub visible: bool,
    pub tooltip_label: String,
}

/// The embedded schema panel. Derived structures (graph, paths) are rebuilt
/// wholesale on every `refresh`; coordinates are the one thing with an
/// independent lifecycle, persisted and only ever extended.
pub struct SchemaPanel<S: SettingsStore> {
    store: S,
    metrics: Metrics,
    graph: SchemaGraph,
    coordinates: CoordinateMap,
    paths: HashMap<String, RoutedPath>,
    enabled: EnabledLinkTypes,
    drag: DragController,
}

impl<S: SettingsStore> SchemaPanel<S> {
    pub fn new(store: S) -> Self {
        let coordinates = load_coordinates(&store);
        let enabled = load_enabled_link_types(&store);
        Self {
            store,
            metrics: Metrics::default(),
            graph: SchemaGraph::default(),
            coordinates,
            paths: HashMap::new(),
            enabled,
            drag: DragController::new(),
        }
    }

    /// Full recomputation on a schema-change notification: parse, extend
    /// the layout, route every path, then swap all derived structures at
    /// once. A failure along the way degrades the panel to an empty state
    /// instead of leaving a partial update (or taking down the host).
    pub fn refresh(&mut self, snapshot: &[TableSnapshot]) {
        let graph = match parser::parse(snapshot) {
            Ok(graph) => graph,
            Err(err) => {
                log::error!("schema parse failed: {}", err);
                self.degrade();
                return;
            }
        };

        let known_before = self.coordinates.len();
        let coordinates = if self.coordinates.is_empty() {
            initial_layout(&graph.tables, &self.metrics)
        } else {
            extend_layout(
                &graph.tables,
                std::mem::take(&mut self.coordinates),
                &self.metrics,
            )
        };

        match route_all(&graph, &coordinates, &self.metrics) {
            Ok(paths) => {
                let placed_new_tables = coordinates.len() != known_before;
                self.graph = graph;
                self.coordinates = coordinates;
                self.paths = paths;
                if placed_new_tables {
                    save_coordinates(&mut self.store, &self.coordinates);
                }
            }
            Err(err) => {
                log::error!("path routing failed: {}", err);
                // Coordinates stay: they are persisted state, not derived.
                self.coordinates = coordinates;
                self.degrade();
            }
        }
    }

    fn degrade(&mut self) {
        self.graph = SchemaGraph::default();
        self.paths.clear();
    }

    pub fn render_model(&self) -> RenderModel {
        build_render_model(
            &self.graph,
            &self.coordinates,
            &self.paths,
            &self.enabled,
            &self.metrics,
        )
    }

    pub fn hover(&self, target: &HoverTarget) -> HashSet<String> {
        highlight::emphasis(target, &self.graph)
    }

    /// Pointer-down on a table header row.
    pub fn begin_drag(&mut self, table_id: &str) -> bool {
        self.drag.begin(table_id, &self.coordinates, &self.store)
    }

    /// Pointer-move while dragging. Returns the rerouted paths for the
    /// dragged table's links; these are transient overlays, the canonical
    /// paths are only rebuilt on the next `refresh`.
    pub fn drag_move(&mut self, dx: f64, dy: f64, zoom: f64) -> Vec<(String, RoutedPath)> {
        match self.drag.pointer_move(
            dx,
            dy,
            zoom,
            &self.graph,
            &self.coordinates,
            &self.metrics,
        ) {
            Ok(updated) => updated,
            Err(err) => {
                log::error!("rerouting during drag failed: {}", err);
                Vec::new()
            }
        }
    }

    /// Pointer-up: commit the dragged table's position.
    pub fn end_drag(&mut self) -> Option<(String, Coordinate)> {
        self.drag.release(&mut self.coordinates, &mut self.store)
    }

    /// Pan/zoom is suspended for the duration of a drag.
    pub fn pan_zoom_enabled(&self) -> bool {
        !self.drag.is_dragging()
    }

    pub fn link_type_enabled(&self, kind: LinkKind) -> bool {
        self.enabled.is_enabled(kind)
    }

    pub fn set_link_type_enabled(&mut self, kind: LinkKind, enabled: bool) {
        self.enabled.set(kind, enabled);
        save_enabled_link_types(&mut self.store, &self.enabled);
    }

    pub fn coordinates(&self) -> &CoordinateMap {
        &self.coordinates
    }
}

/// Assemble the render model from the derived structures. Shared by the
/// panel and the wasm boundary.
pub fn build_render_model(
    graph: &SchemaGraph,
    coords: &CoordinateMap,
    paths: &HashMap<String, RoutedPath>,
    enabled: &EnabledLinkTypes,
    metrics: &Metrics,
) -> RenderModel {
    let mut tables = Vec::with_capacity(graph.tables.len());
    for table in &graph.tables {
        let Some(&coordinate) = coords.get(&table.id) else {
            // Every parsed table gets a coordinate during refresh; a miss
            // here means the caller skipped layout.
            log::warn!("table {} has no coordinate, skipping", table.id);
            continue;
        };

        let mut rows = Vec::with_capacity(table.field_ids.len() + 1);
        rows.push(RowView {
            id: table.id.clone(),
            label: table.name.clone(),
            is_header: true,
            tooltip_label: "Table".to_string(),
        });
        for field_id in &table.field_ids {
            if let Some(node) = graph.node(field_id) {
                debug_assert_eq!(node.kind, NodeKind::Field);
                rows.push(RowView {
                    id: node.id.clone(),
                    label: node.name.clone(),
                    is_header: false,
                    tooltip_label: node.tooltip_label.clone(),
                });
            }
        }

        let height = metrics.table_height(table.field_ids.len());
        tables.push(TableView {
            id: table.id.clone(),
            name: table.name.clone(),
            coordinate,
            rows,
            body_path: geometry::table_body_path(
                coordinate.x,
                coordinate.y,
                metrics.row_width,
                height,
                metrics.corner_radius,
            ),
            header_path: geometry::table_header_path(
                coordinate.x,
                coordinate.y,
                metrics.row_width,
                metrics.row_height,
                metrics.corner_radius,
            ),
        });
    }

    let links = graph
        .links
        .iter()
        .filter_map(|link| {
            let path = paths.get(&link.id)?;
            Some(LinkView {
                id: link.id.clone(),
                kind: link.kind,
                path: path.to_path_string(),
                visible: enabled.is_enabled(link.kind),
                tooltip_label: link.tooltip_label.clone(),
            })
        })
        .collect();

    RenderModel { tables, links }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemoryStore;
    use crate::snapshot::{FieldKind, FieldSnapshot};

    fn linked(id: &str, table: &str, inverse: Option<&str>) -> FieldSnapshot {
        FieldSnapshot {
            id: id.to_string(),
            name: id.to_string(),
            kind: FieldKind::LinkedRecord {
                linked_table_id: table.to_string(),
                inverse_field_id: inverse.map(str::to_string),
            },
            is_valid: true,
        }
    }

    fn snapshot() -> Vec<TableSnapshot> {
        vec![
            TableSnapshot {
                id: "tblA".to_string(),
                name: "Projects".to_string(),
                fields: vec![linked("fldA1", "tblB", Some("fldB1"))],
            },
            TableSnapshot {
                id: "tblB".to_string(),
                name: "Tasks".to_string(),
                fields: vec![linked("fldB1", "tblA", Some("fldA1"))],
            },
        ]
    }

    #[test]
    fn test_refresh_builds_full_model() {
        let mut panel = SchemaPanel::new(MemoryStore::default());
        panel.refresh(&snapshot());
        let model = panel.render_model();

        assert_eq!(model.tables.len(), 2);
        assert_eq!(model.links.len(), 1);
        assert!(model.links[0].visible);
        assert!(model.links[0].path.starts_with("M "));

        let projects = &model.tables[0];
        assert_eq!(projects.rows.len(), 2);
        assert!(projects.rows[0].is_header);
        assert_eq!(projects.rows[1].id, "fldA1");
    }

    #[test]
    fn test_refresh_persists_initial_coordinates() {
        let mut panel = SchemaPanel::new(MemoryStore::default());
        panel.refresh(&snapshot());
        let persisted = crate::settings::load_coordinates(&panel.store);
        assert_eq!(persisted, *panel.coordinates());
        assert_eq!(persisted.len(), 2);
    }

    #[test]
    fn test_new_table_extends_without_moving_others() {
        let mut panel = SchemaPanel::new(MemoryStore::default());
        panel.refresh(&snapshot());
        let before = panel.coordinates().clone();

        let mut next = snapshot();
        next.push(TableSnapshot {
            id: "tblC".to_string(),
            name: "People".to_string(),
            fields: vec![],
        });
        panel.refresh(&next);

        for (id, coord) in &before {
            assert_eq!(panel.coordinates()[id], *coord);
        }
        assert!(panel.coordinates().contains_key("tblC"));
        assert_eq!(panel.render_model().tables.len(), 3);
    }

    #[test]
    fn test_toggling_link_type_flips_visibility_and_persists() {
        let mut panel = SchemaPanel::new(MemoryStore::default());
        panel.refresh(&snapshot());

        panel.set_link_type_enabled(LinkKind::LinkedRecord, false);
        let model = panel.render_model();
        assert!(!model.links[0].visible);

        // Visibility flags survive a panel rebuild over the same store.
        let enabled = crate::settings::load_enabled_link_types(&panel.store);
        assert!(!enabled.is_enabled(LinkKind::LinkedRecord));
        assert!(enabled.is_enabled(LinkKind::Formula));
    }

    #[test]
    fn test_parse_failure_degrades_to_empty_model() {
        let mut panel = SchemaPanel::new(MemoryStore::default());
        panel.refresh(&snapshot());
        assert_eq!(panel.render_model().tables.len(), 2);

        // Duplicate ids across tables: fatal parse error.
        let bad = vec![
            TableSnapshot {
                id: "tblX".to_string(),
                name: "X".to_string(),
                fields: vec![],
            },
            TableSnapshot {
                id: "tblX".to_string(),
                name: "X again".to_string(),
                fields: vec![],
            },
        ];
        panel.refresh(&bad);
        let model = panel.render_model();
        assert!(model.tables.is_empty());
        assert!(model.links.is_empty());
    }

    #[test]
    fn test_drag_round_trip_through_panel() {
        let mut panel = SchemaPanel::new(MemoryStore::default());
        panel.refresh(&snapshot());
        assert!(panel.pan_zoom_enabled());

        assert!(panel.begin_drag("tblA"));
        assert!(!panel.pan_zoom_enabled());

        let updated = panel.drag_move(10.0, 0.0, 1.0);
        assert_eq!(updated.len(), 1);

        let committed = panel.end_drag().unwrap();
        assert_eq!(committed.0, "tblA");
        assert!(panel.pan_zoom_enabled());
    }

    #[test]
    fn test_read_only_user_cannot_drag() {
        let mut panel = SchemaPanel::new(MemoryStore::read_only());
        panel.refresh(&snapshot());
        assert!(!panel.begin_drag("tblA"));
        assert!(panel.pan_zoom_enabled());
    }
}
