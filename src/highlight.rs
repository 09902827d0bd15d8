//! Hover emphasis: map a hovered node or link to everything that lights up.

use crate::graph::SchemaGraph;
use std::collections::HashSet;

/// What the pointer is over. A pointer resting on both a node and a link
/// at once is ambiguous and treated as no hover.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HoverTarget {
    #[default]
    None,
    Node(String),
    Link(String),
    Ambiguous,
}

impl HoverTarget {
    /// Combine the renderer's hit-test results into a single target.
    pub fn from_hits(node_id: Option<&str>, link_id: Option<&str>) -> Self {
        match (node_id, link_id) {
            (None, None) => HoverTarget::None,
            (Some(node), None) => HoverTarget::Node(node.to_string()),
            (None, Some(link)) => HoverTarget::Link(link.to_string()),
            (Some(_), Some(_)) => HoverTarget::Ambiguous,
        }
    }
}

/// Ids to emphasize for the given hover target. Unknown ids and nodes with
/// no dependent links yield the empty set.
pub fn emphasis(target: &HoverTarget, graph: &SchemaGraph) -> HashSet<String> {
    let mut ids = HashSet::new();
    match target {
        HoverTarget::None | HoverTarget::Ambiguous => {}
        HoverTarget::Node(node_id) => {
            for link_id in graph.reverse_index.links_for(node_id) {
                if let Some(link) = graph.link(link_id) {
                    ids.insert(link.id.clone());
                    ids.insert(link.source_id.clone());
                    ids.insert(link.target_id.clone());
                }
            }
        }
        HoverTarget::Link(link_id) => {
            if let Some(link) = graph.link(link_id) {
                ids.insert(link.id.clone());
                ids.insert(link.source_id.clone());
                ids.insert(link.target_id.clone());
            }
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::snapshot::{FieldKind, FieldSnapshot, TableSnapshot};

    fn snapshot() -> Vec<TableSnapshot> {
        vec![TableSnapshot {
            id: "tblA".to_string(),
            name: "Tasks".to_string(),
            fields: vec![
                FieldSnapshot {
                    id: "fldA1".to_string(),
                    name: "Hours".to_string(),
                    kind: FieldKind::Plain {
                        type_name: "Number".to_string(),
                    },
                    is_valid: true,
                },
                FieldSnapshot {
                    id: "fldA2".to_string(),
                    name: "Cost".to_string(),
                    kind: FieldKind::Formula {
                        referenced_field_ids: vec!["fldA1".to_string()],
                    },
                    is_valid: true,
                },
                FieldSnapshot {
                    id: "fldA3".to_string(),
                    name: "Notes".to_string(),
                    kind: FieldKind::Plain {
                        type_name: "Text".to_string(),
                    },
                    is_valid: true,
                },
            ],
        }]
    }

    #[test]
    fn test_node_hover_emphasizes_links_and_endpoints() {
        let graph = parse(&snapshot()).unwrap();
        let ids = emphasis(&HoverTarget::Node("fldA2".to_string()), &graph);
        assert_eq!(ids.len(), 3);
        assert!(ids.contains("fldA2->fldA1"));
        assert!(ids.contains("fldA2"));
        assert!(ids.contains("fldA1"));
    }

    #[test]
    fn test_link_hover_emphasizes_itself_and_endpoints() {
        let graph = parse(&snapshot()).unwrap();
        let ids = emphasis(&HoverTarget::Link("fldA2->fldA1".to_string()), &graph);
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_node_without_links_yields_empty_set() {
        let graph = parse(&snapshot()).unwrap();
        let ids = emphasis(&HoverTarget::Node("fldA3".to_string()), &graph);
        assert!(ids.is_empty());
    }

    #[test]
    fn test_unknown_id_yields_empty_set() {
        let graph = parse(&snapshot()).unwrap();
        assert!(emphasis(&HoverTarget::Node("nope".to_string()), &graph).is_empty());
        assert!(emphasis(&HoverTarget::Link("nope".to_string()), &graph).is_empty());
    }

    #[test]
    fn test_ambiguous_hover_is_treated_as_no_hover() {
        let graph = parse(&snapshot()).unwrap();
        let target = HoverTarget::from_hits(Some("fldA2"), Some("fldA2->fldA1"));
        assert_eq!(target, HoverTarget::Ambiguous);
        assert!(emphasis(&target, &graph).is_empty());
        assert!(emphasis(&HoverTarget::None, &graph).is_empty());
    }
}
