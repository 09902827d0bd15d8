use serde::{Deserialize, Serialize};

/// One table as reported by the host data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    pub id: String,
    pub name: String,
    pub fields: Vec<FieldSnapshot>,
}

/// One field within a table. `is_valid` is the host's configuration flag:
/// an invalid field still shows up as a row but contributes no links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSnapshot {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default = "default_true")]
    pub is_valid: bool,
}

fn default_true() -> bool {
    true
}

/// Field type plus the cross-reference options payload the host attaches to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FieldKind {
    /// Points at records of another table. `inverse_field_id` is the mirror
    /// field on the linked table; self-referencing links have no mirror.
    LinkedRecord {
        linked_table_id: String,
        #[serde(default)]
        inverse_field_id: Option<String>,
    },
    Formula {
        referenced_field_ids: Vec<String>,
    },
    Count {
        record_link_field_id: String,
    },
    Lookup {
        record_link_field_id: String,
        field_id_in_linked_table: String,
    },
    Rollup {
        record_link_field_id: String,
        field_id_in_linked_table: String,
        referenced_field_ids: Vec<String>,
    },
    Plain {
        type_name: String,
    },
}

impl FieldKind {
    /// Human-readable type description, used for row tooltips.
    pub fn display_type(&self) -> &str {
        match self {
            FieldKind::LinkedRecord { .. } => "Linked record",
            FieldKind::Formula { .. } => "Formula",
            FieldKind::Count { .. } => "Count",
            FieldKind::Lookup { .. } => "Lookup",
            FieldKind::Rollup { .. } => "Rollup",
            FieldKind::Plain { type_name } => type_name,
        }
    }
}
