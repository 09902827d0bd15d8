use crate::graph::{
    link_id, Link, LinkKind, Node, NodeKind, ReverseIndex, SchemaGraph, TableConfig,
};
use crate::snapshot::{FieldKind, FieldSnapshot, TableSnapshot};
use std::collections::HashSet;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// One id keying two accumulator slots would corrupt every id-keyed
    /// structure downstream; abort with no partial result.
    #[error("duplicate node id in snapshot: {0}")]
    DuplicateNodeId(String),
}

/// Transform a snapshot into nodes, links, table configs and the reverse
/// index. Pure function of its input: parsing the same snapshot twice
/// yields the same graph.
pub fn parse(snapshot: &[TableSnapshot]) -> Result<SchemaGraph, ParseError> {
    let mut builder = GraphBuilder::default();

    for table in snapshot {
        builder.add_table(table)?;
    }
    for table in snapshot {
        for field in &table.fields {
            if field.is_valid {
                builder.add_field_links(table, field);
            }
        }
    }

    builder.drop_stale_links();
    builder.aggregate_table_entries();

    Ok(builder.finish())
}

#[derive(Default)]
struct GraphBuilder {
    nodes: Vec<Node>,
    node_ids: HashSet<String>,
    links: Vec<Link>,
    link_ids: HashSet<String>,
    tables: Vec<TableConfig>,
    reverse_index: ReverseIndex,
}

impl GraphBuilder {
    fn add_table(&mut self, table: &TableSnapshot) -> Result<(), ParseError> {
        self.add_node(Node {
            id: table.id.clone(),
            name: table.name.clone(),
            kind: NodeKind::Table,
            owner_table_id: table.id.clone(),
            tooltip_label: "Table".to_string(),
        })?;

        for field in &table.fields {
            self.add_node(Node {
                id: field.id.clone(),
                name: field.name.clone(),
                kind: NodeKind::Field,
                owner_table_id: table.id.clone(),
                tooltip_label: field.kind.display_type().to_string(),
            })?;
        }

        self.tables.push(TableConfig {
            id: table.id.clone(),
            name: table.name.clone(),
            field_ids: table.fields.iter().map(|f| f.id.clone()).collect(),
        });
        Ok(())
    }

    fn add_node(&mut self, node: Node) -> Result<(), ParseError> {
        if !self.node_ids.insert(node.id.clone()) {
            return Err(ParseError::DuplicateNodeId(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    fn add_field_links(&mut self, table: &TableSnapshot, field: &FieldSnapshot) {
        match &field.kind {
            FieldKind::LinkedRecord {
                linked_table_id,
                inverse_field_id,
            } => match inverse_field_id {
                Some(inverse) => {
                    // If the mirror field already materialized this
                    // relationship, reuse its link instead of duplicating.
                    let mirror = link_id(inverse, &field.id);
                    if self.link_ids.contains(&mirror) {
                        self.reverse_index.register(&field.id, &mirror);
                    } else {
                        self.add_link(
                            field,
                            &table.id,
                            inverse,
                            linked_table_id,
                            LinkKind::LinkedRecord,
                        );
                    }
                }
                // No discrete inverse field exists, so the link points at
                // the linked table's header node.
                None => self.add_link(
                    field,
                    &table.id,
                    linked_table_id,
                    linked_table_id,
                    LinkKind::LinkedRecord,
                ),
            },
            FieldKind::Formula {
                referenced_field_ids,
            } => {
                for referenced in referenced_field_ids {
                    self.add_link(field, &table.id, referenced, &table.id, LinkKind::Formula);
                }
            }
            FieldKind::Count {
                record_link_field_id,
            } => {
                self.add_link(
                    field,
                    &table.id,
                    record_link_field_id,
                    &table.id,
                    LinkKind::Count,
                );
            }
            FieldKind::Lookup {
                record_link_field_id,
                field_id_in_linked_table,
            } => {
                self.add_traversal_links(
                    table,
                    field,
                    record_link_field_id,
                    field_id_in_linked_table,
                    LinkKind::Lookup,
                );
            }
            FieldKind::Rollup {
                record_link_field_id,
                field_id_in_linked_table,
                referenced_field_ids,
            } => {
                for referenced in referenced_field_ids {
                    self.add_link(field, &table.id, referenced, &table.id, LinkKind::Rollup);
                }
                self.add_traversal_links(
                    table,
                    field,
                    record_link_field_id,
                    field_id_in_linked_table,
                    LinkKind::Rollup,
                );
            }
            FieldKind::Plain { .. } => {}
        }
    }

    /// Lookup-style pair: one link to the local record-link field being
    /// traversed, one to the remote field being read. The remote table is
    /// only known through the local record-link field's configuration, so
    /// the second link is skipped when that field no longer exists.
    fn add_traversal_links(
        &mut self,
        table: &TableSnapshot,
        field: &FieldSnapshot,
        record_link_field_id: &str,
        remote_field_id: &str,
        kind: LinkKind,
    ) {
        self.add_link(field, &table.id, record_link_field_id, &table.id, kind);

        let remote_table_id = table.fields.iter().find_map(|f| {
            if f.id != record_link_field_id {
                return None;
            }
            match &f.kind {
                FieldKind::LinkedRecord {
                    linked_table_id, ..
                } => Some(linked_table_id.clone()),
                _ => None,
            }
        });
        if let Some(remote_table_id) = remote_table_id {
            self.add_link(field, &table.id, remote_field_id, &remote_table_id, kind);
        }
    }

    fn add_link(
        &mut self,
        source: &FieldSnapshot,
        source_table_id: &str,
        target_id: &str,
        target_table_id: &str,
        kind: LinkKind,
    ) {
        let id = link_id(&source.id, target_id);
        // A field referencing the same target twice still yields one link.
        if self.link_ids.insert(id.clone()) {
            self.links.push(Link {
                id: id.clone(),
                source_id: source.id.clone(),
                source_table_id: source_table_id.to_string(),
                target_id: target_id.to_string(),
                target_table_id: target_table_id.to_string(),
                kind,
                tooltip_label: kind.label().to_string(),
            });
        }
        self.reverse_index.register(&source.id, &id);
        self.reverse_index.register(target_id, &id);
    }

    /// Defensive filter: a link whose target was deleted in the host
    /// between snapshots must not survive into the final link set.
    fn drop_stale_links(&mut self) {
        let node_ids = &self.node_ids;
        let (kept, dropped): (Vec<Link>, Vec<Link>) = std::mem::take(&mut self.links)
            .into_iter()
            .partition(|link| {
                node_ids.contains(&link.target_id) && node_ids.contains(&link.target_table_id)
            });

        if !dropped.is_empty() {
            let stale: HashSet<&str> = dropped.iter().map(|l| l.id.as_str()).collect();
            for link in &dropped {
                log::debug!("dropping stale link {} ({:?})", link.id, link.kind);
            }
            self.reverse_index.retain_links(|id| !stale.contains(id));
            for link in &dropped {
                self.link_ids.remove(&link.id);
            }
        }
        self.links = kept;
    }

    /// Second pass: a table node's entry is the union of its fields'
    /// entries, in field order. Cross-table links are only fully known
    /// once every table has been parsed, hence the separate pass.
    fn aggregate_table_entries(&mut self) {
        for table in &self.tables {
            let field_links: Vec<String> = table
                .field_ids
                .iter()
                .flat_map(|fid| self.reverse_index.links_for(fid).iter().cloned())
                .collect();
            for link in &field_links {
                self.reverse_index.register(&table.id, link);
            }
        }
    }

    fn finish(self) -> SchemaGraph {
        SchemaGraph {
            nodes: self.nodes,
            links: self.links,
            tables: self.tables,
            reverse_index: self.reverse_index,
        }
    }
}
