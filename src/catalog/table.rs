//! Tables: the entity kind that owns indexes, constraints, triggers and
//! participates in relations.

use once_cell::sync::OnceCell;
use serde_json::Value;

use super::constraint::Constraint;
use super::column::Column;
use super::id::Oid;
use super::index::Index;
use super::trigger::Trigger;
use super::Db;
use crate::collection::{CollectionItem, IndexedCollection};
use crate::kinds::ConstraintKind;
use crate::relations::{ManyToMany, ManyToOne, OneToMany, TableRelations, build_table_relations};

#[derive(Debug, Clone)]
pub struct Table {
    pub oid: Oid,
    pub schema_oid: Oid,
    pub schema_name: String,
    pub name: String,
    pub columns: IndexedCollection<Column>,
    pub indexes: IndexedCollection<Index>,
    pub constraints: IndexedCollection<Constraint>,
    pub triggers: IndexedCollection<Trigger>,
    pub comment: Option<String>,
    pub comment_data: Option<Value>,
    pub(crate) relations: OnceCell<TableRelations>,
}

impl Table {
    pub(crate) fn new(
        oid: Oid,
        schema_oid: Oid,
        schema_name: String,
        name: String,
        comment: Option<String>,
        comment_data: Option<Value>,
    ) -> Self {
        Self {
            oid,
            schema_oid,
            schema_name,
            name,
            columns: IndexedCollection::new(),
            indexes: IndexedCollection::new(),
            constraints: IndexedCollection::new(),
            triggers: IndexedCollection::new(),
            comment,
            comment_data,
            relations: OnceCell::new(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.name)
    }

    pub fn primary_key(&self) -> Option<&Constraint> {
        self.constraints
            .iter()
            .find(|c| c.kind() == ConstraintKind::PrimaryKey)
    }

    /// Outgoing foreign key constraints, in catalog order.
    pub fn foreign_keys(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .iter()
            .filter(|c| c.kind() == ConstraintKind::ForeignKey)
    }

    /// Foreign keys on other tables that reference this table, across all
    /// loaded schemas.
    pub fn foreign_keys_to_this<'d>(&self, db: &'d Db) -> Vec<&'d Constraint> {
        db.fks_referencing(self.oid)
    }

    /// All relations of this table; computed on first access and memoized.
    pub fn relations<'d>(&'d self, db: &'d Db) -> &'d TableRelations {
        self.relations.get_or_init(|| build_table_relations(self, db))
    }

    /// One relation per outgoing foreign key.
    pub fn m2o<'d>(&'d self, db: &'d Db) -> &'d [ManyToOne] {
        &self.relations(db).m2o
    }

    /// One relation per foreign key referencing this table.
    pub fn o2m<'d>(&'d self, db: &'d Db) -> &'d [OneToMany] {
        &self.relations(db).o2m
    }

    /// Relations through join tables referencing this table.
    pub fn m2m<'d>(&'d self, db: &'d Db) -> &'d [ManyToMany] {
        &self.relations(db).m2m
    }
}

impl CollectionItem for Table {
    fn item_name(&self) -> &str {
        &self.name
    }

    fn item_oid(&self) -> Option<Oid> {
        Some(self.oid)
    }
}
