//! Phase 4: entities, dispatched by `relkind`.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use super::id::Oid;
use super::resolver::{EntitySlot, Resolver};
use super::sequence::Sequence;
use super::table::Table;
use super::view::{MaterializedView, View};
use super::Graph;
use crate::collection::IndexedCollection;
use crate::comment::parse_comment_data;
use crate::kinds::EntityKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EntityRow {
    pub oid: Oid,
    pub schema_oid: Oid,
    /// `relkind` letter.
    pub kind: String,
    pub name: String,
    /// View query text for views and materialized views.
    pub definition: Option<String>,
    pub comment: Option<String>,
}

pub(crate) fn assemble(
    graph: &mut Graph,
    resolver: &mut Resolver,
    rows: &[EntityRow],
    token: &str,
) -> Result<()> {
    for row in rows {
        let kind = EntityKind::from_code(&row.kind)?;
        let schema_slot = resolver.schema(row.schema_oid).ok_or_else(|| {
            anyhow!(
                "entity {:?} (oid {}) references unknown schema oid {}",
                row.name,
                row.oid,
                row.schema_oid
            )
        })?;
        let schema_name = graph.schema_ref(schema_slot).name.clone();
        let comment_data = parse_comment_data(row.comment.as_deref(), token);
        let schema = graph.schema_mut(schema_slot);
        let pos = match kind {
            EntityKind::Table => schema.tables.push(Table::new(
                row.oid,
                row.schema_oid,
                schema_name,
                row.name.clone(),
                row.comment.clone(),
                comment_data,
            ))?,
            EntityKind::View => schema.views.push(View {
                oid: row.oid,
                schema_oid: row.schema_oid,
                schema_name,
                name: row.name.clone(),
                definition: row.definition.clone(),
                columns: IndexedCollection::new(),
                comment: row.comment.clone(),
                comment_data,
            })?,
            EntityKind::MaterializedView => schema.materialized_views.push(MaterializedView {
                oid: row.oid,
                schema_oid: row.schema_oid,
                schema_name,
                name: row.name.clone(),
                definition: row.definition.clone(),
                columns: IndexedCollection::new(),
                indexes: IndexedCollection::new(),
                constraints: IndexedCollection::new(),
                triggers: IndexedCollection::new(),
                comment: row.comment.clone(),
                comment_data,
            })?,
            EntityKind::Sequence => schema.sequences.push(Sequence {
                oid: row.oid,
                schema_oid: row.schema_oid,
                schema_name,
                name: row.name.clone(),
                comment: row.comment.clone(),
                comment_data,
            })?,
        };
        resolver.record_entity(row.oid, EntitySlot { schema: schema_slot, kind, pos });
    }
    Ok(())
}
