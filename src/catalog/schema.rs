//! Schemas (namespaces) and the collections they own.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::function::Function;
use super::id::Oid;
use super::pg_type::Type;
use super::resolver::{Resolver, SchemaSlot};
use super::sequence::Sequence;
use super::table::Table;
use super::view::{MaterializedView, View};
use super::{DbObject, Graph};
use crate::collection::{CollectionItem, IndexedCollection};
use crate::comment::parse_comment_data;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SchemaRow {
    pub oid: Oid,
    pub name: String,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub oid: Oid,
    pub name: String,
    pub comment: Option<String>,
    pub comment_data: Option<Value>,
    pub tables: IndexedCollection<Table>,
    pub views: IndexedCollection<View>,
    pub materialized_views: IndexedCollection<MaterializedView>,
    pub sequences: IndexedCollection<Sequence>,
    pub normal_functions: IndexedCollection<Function>,
    pub procedures: IndexedCollection<Function>,
    pub aggregate_functions: IndexedCollection<Function>,
    pub window_functions: IndexedCollection<Function>,
    /// All types in the schema, including the row types PostgreSQL creates
    /// for every table, view and sequence.
    pub types: IndexedCollection<Type>,
}

impl Schema {
    fn from_row(row: &SchemaRow, token: &str) -> Self {
        Self {
            oid: row.oid,
            name: row.name.clone(),
            comment: row.comment.clone(),
            comment_data: parse_comment_data(row.comment.as_deref(), token),
            tables: IndexedCollection::new(),
            views: IndexedCollection::new(),
            materialized_views: IndexedCollection::new(),
            sequences: IndexedCollection::new(),
            normal_functions: IndexedCollection::new(),
            procedures: IndexedCollection::new(),
            aggregate_functions: IndexedCollection::new(),
            window_functions: IndexedCollection::new(),
            types: IndexedCollection::new(),
        }
    }

    /// Types that are not backed by a table, view or sequence row type.
    pub fn types_excluding_entities(&self) -> impl Iterator<Item = &Type> {
        self.types.iter().filter(|t| !t.is_entity_backed())
    }

    /// All functions regardless of kind, in catalog order per kind.
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.normal_functions
            .iter()
            .chain(self.procedures.iter())
            .chain(self.aggregate_functions.iter())
            .chain(self.window_functions.iter())
    }

    /// Dotted-path lookup below the schema: `"account"` or `"account.id"`.
    ///
    /// The first segment is tried against tables, views, materialized views,
    /// sequences and types, in that order; the remainder names a column.
    pub fn get_maybe(&self, path: &str) -> Option<DbObject<'_>> {
        let (first, rest) = match path.split_once('.') {
            Some((first, rest)) => (first, Some(rest)),
            None => (path, None),
        };

        if let Some(table) = self.tables.get_maybe(first) {
            return match rest {
                None => Some(DbObject::Table(table)),
                Some(column) => table.columns.get_maybe(column).map(DbObject::Column),
            };
        }
        if let Some(view) = self.views.get_maybe(first) {
            return match rest {
                None => Some(DbObject::View(view)),
                Some(column) => view.columns.get_maybe(column).map(DbObject::Column),
            };
        }
        if let Some(view) = self.materialized_views.get_maybe(first) {
            return match rest {
                None => Some(DbObject::MaterializedView(view)),
                Some(column) => view.columns.get_maybe(column).map(DbObject::Column),
            };
        }
        if let Some(sequence) = self.sequences.get_maybe(first) {
            return match rest {
                None => Some(DbObject::Sequence(sequence)),
                Some(_) => None,
            };
        }
        if let Some(ty) = self.types.get_maybe(first) {
            return match rest {
                None => Some(DbObject::Type(ty)),
                Some(column) => ty.columns.get_maybe(column).map(DbObject::Column),
            };
        }
        None
    }
}

impl CollectionItem for Schema {
    fn item_name(&self) -> &str {
        &self.name
    }

    fn item_oid(&self) -> Option<Oid> {
        Some(self.oid)
    }
}

/// Phases 1 and 2: user schemas, then the system schemas (`pg_catalog`).
pub(crate) fn assemble(
    graph: &mut Graph,
    resolver: &mut Resolver,
    rows: &[SchemaRow],
    system: bool,
    token: &str,
) -> Result<()> {
    for row in rows {
        let schema = Schema::from_row(row, token);
        let collection = if system {
            &mut graph.system_schemas
        } else {
            &mut graph.schemas
        };
        let pos = collection.push(schema)?;
        resolver.record_schema(row.oid, SchemaSlot { system, pos });
    }
    Ok(())
}
