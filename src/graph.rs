use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Deterministic, order-sensitive link id. Dedup of bidirectional
/// relationships works by probing for the reversed id.
pub fn link_id(source_id: &str, target_id: &str) -> String {
    format!("{}->{}", source_id, target_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Table,
    Field,
}

/// A table header or a field row in the diagram.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    /// For a table node this is its own id.
    pub owner_table_id: String,
    pub tooltip_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkKind {
    LinkedRecord,
    Formula,
    Rollup,
    Count,
    Lookup,
}

impl LinkKind {
    pub const ALL: [LinkKind; 5] = [
        LinkKind::LinkedRecord,
        LinkKind::Formula,
        LinkKind::Rollup,
        LinkKind::Count,
        LinkKind::Lookup,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LinkKind::LinkedRecord => "Linked record",
            LinkKind::Formula => "Formula",
            LinkKind::Rollup => "Rollup",
            LinkKind::Count => "Count",
            LinkKind::Lookup => "Lookup",
        }
    }
}

/// A directed dependency edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: String,
    pub source_id: String,
    pub source_table_id: String,
    pub target_id: String,
    pub target_table_id: String,
    pub kind: LinkKind,
    pub tooltip_label: String,
}

/// Per-kind visibility flags, persisted. Everything starts visible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnabledLinkTypes {
    pub linked_record: bool,
    pub formula: bool,
    pub rollup: bool,
    pub count: bool,
    pub lookup: bool,
}

impl Default for EnabledLinkTypes {
    fn default() -> Self {
        Self {
            linked_record: true,
            formula: true,
            rollup: true,
            count: true,
            lookup: true,
        }
    }
}

impl EnabledLinkTypes {
    pub fn is_enabled(&self, kind: LinkKind) -> bool {
        match kind {
            LinkKind::LinkedRecord => self.linked_record,
            LinkKind::Formula => self.formula,
            LinkKind::Rollup => self.rollup,
            LinkKind::Count => self.count,
            LinkKind::Lookup => self.lookup,
        }
    }

    pub fn set(&mut self, kind: LinkKind, enabled: bool) {
        match kind {
            LinkKind::LinkedRecord => self.linked_record = enabled,
            LinkKind::Formula => self.formula = enabled,
            LinkKind::Rollup => self.rollup = enabled,
            LinkKind::Count => self.count = enabled,
            LinkKind::Lookup => self.lookup = enabled,
        }
    }
}

/// A table's header node id plus its field node ids in host order.
/// Field order determines vertical row position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    pub id: String,
    pub name: String,
    pub field_ids: Vec<String>,
}

impl TableConfig {
    /// Row index of a node within this table. Row 0 is the header,
    /// fields start at row 1.
    pub fn row_of(&self, node_id: &str) -> Option<usize> {
        if node_id == self.id {
            return Some(0);
        }
        self.field_ids
            .iter()
            .position(|id| id == node_id)
            .map(|i| i + 1)
    }
}

/// Node id -> links touching it (as source or target), in discovery order.
#[derive(Debug, Clone, Default)]
pub struct ReverseIndex {
    by_node: HashMap<String, Vec<String>>,
}

impl ReverseIndex {
    /// Idempotent per (node, link): re-registering an existing pair is a no-op.
    pub fn register(&mut self, node_id: &str, link_id: &str) {
        let entry = self.by_node.entry(node_id.to_string()).or_default();
        if !entry.iter().any(|id| id == link_id) {
            entry.push(link_id.to_string());
        }
    }

    pub fn links_for(&self, node_id: &str) -> &[String] {
        self.by_node.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Drop every registration of links rejected by the filter.
    pub fn retain_links<F: Fn(&str) -> bool>(&mut self, keep: F) {
        for entry in self.by_node.values_mut() {
            entry.retain(|id| keep(id));
        }
        self.by_node.retain(|_, entry| !entry.is_empty());
    }
}

/// Everything the parser derives from one snapshot. Rebuilt wholesale on
/// every schema change; never mutated incrementally.
#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub tables: Vec<TableConfig>,
    pub reverse_index: ReverseIndex,
}

impl SchemaGraph {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn link(&self, id: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.id == id)
    }

    pub fn table(&self, id: &str) -> Option<&TableConfig> {
        self.tables.iter().find(|t| t.id == id)
    }
}
