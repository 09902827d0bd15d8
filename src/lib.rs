pub mod geometry;
pub mod graph;
pub mod highlight;
pub mod interact;
pub mod layout;
pub mod panel;
pub mod parser;
pub mod routing;
pub mod settings;
pub mod snapshot;

use wasm_bindgen::prelude::*;

use geometry::Metrics;
use graph::{EnabledLinkTypes, LinkKind};
use layout::{extend_layout, initial_layout, CoordinateMap};
use snapshot::TableSnapshot;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Turn a schema snapshot (host JSON) into a render model (JSON).
/// `coordinates` carries previously persisted table positions; when
/// present the layout is extended around them instead of recomputed.
#[wasm_bindgen(js_name = "schemaToModel")]
pub fn schema_to_model(
    snapshot: &str,
    coordinates: Option<String>,
) -> Result<String, String> {
    let tables: Vec<TableSnapshot> =
        serde_json::from_str(snapshot).map_err(|e| e.to_string())?;
    let graph = parser::parse(&tables).map_err(|e| e.to_string())?;

    let metrics = Metrics::default();
    let existing: CoordinateMap = match coordinates {
        Some(json) => serde_json::from_str(&json).map_err(|e| e.to_string())?,
        None => CoordinateMap::new(),
    };
    let coords = if existing.is_empty() {
        initial_layout(&graph.tables, &metrics)
    } else {
        extend_layout(&graph.tables, existing, &metrics)
    };

    let paths = routing::route_all(&graph, &coords, &metrics).map_err(|e| e.to_string())?;
    let model = panel::build_render_model(
        &graph,
        &coords,
        &paths,
        &EnabledLinkTypes::default(),
        &metrics,
    );
    serde_json::to_string(&model).map_err(|e| e.to_string())
}

/// Link kind names for the host's visibility settings form.
#[wasm_bindgen(js_name = "linkKinds")]
pub fn link_kinds() -> js_sys::Array {
    LinkKind::ALL
        .iter()
        .map(|kind| JsValue::from_str(kind.label()))
        .collect()
}
