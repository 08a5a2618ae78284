//! Views and materialized views.

use serde_json::Value;

use super::column::Column;
use super::constraint::Constraint;
use super::id::Oid;
use super::index::Index;
use super::trigger::Trigger;
use crate::collection::{CollectionItem, IndexedCollection};

#[derive(Debug, Clone)]
pub struct View {
    pub oid: Oid,
    pub schema_oid: Oid,
    pub schema_name: String,
    pub name: String,
    /// Reformatted query text from `pg_get_viewdef`.
    pub definition: Option<String>,
    pub columns: IndexedCollection<Column>,
    pub comment: Option<String>,
    pub comment_data: Option<Value>,
}

impl View {
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.name)
    }
}

impl CollectionItem for View {
    fn item_name(&self) -> &str {
        &self.name
    }

    fn item_oid(&self) -> Option<Oid> {
        Some(self.oid)
    }
}

/// Materialized views own indexes and triggers like tables do; constraint
/// rows only ever target plain tables, so that collection stays empty.
#[derive(Debug, Clone)]
pub struct MaterializedView {
    pub oid: Oid,
    pub schema_oid: Oid,
    pub schema_name: String,
    pub name: String,
    pub definition: Option<String>,
    pub columns: IndexedCollection<Column>,
    pub indexes: IndexedCollection<Index>,
    pub constraints: IndexedCollection<Constraint>,
    pub triggers: IndexedCollection<Trigger>,
    pub comment: Option<String>,
    pub comment_data: Option<Value>,
}

impl MaterializedView {
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.name)
    }
}

impl CollectionItem for MaterializedView {
    fn item_name(&self) -> &str {
        &self.name
    }

    fn item_oid(&self) -> Option<Oid> {
        Some(self.oid)
    }
}
