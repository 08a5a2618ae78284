//! The schema graph: `Db` at the root, schemas below it, entities and their
//! members below those.
//!
//! Assembly runs in a fixed phase order because later phases resolve
//! references that earlier phases make available: schemas before types,
//! types before entities (composite column parents), columns before indexes
//! (attribute-number resolution), indexes before constraints (PK/unique/FK
//! columns come from their index), entities and functions before triggers.

use std::collections::HashMap;

use anyhow::{Result, anyhow, bail};
use sqlx::PgPool;
use tracing::info;

pub mod column;
pub mod constraint;
pub mod entity;
pub mod function;
pub mod id;
pub mod index;
pub mod pg_type;
pub(crate) mod resolver;
pub mod schema;
pub mod sequence;
pub mod table;
pub mod trigger;
pub mod view;

pub use column::Column;
pub use constraint::{Constraint, ConstraintDetail, ForeignKey};
pub use function::{Function, FunctionArgument};
pub use index::{Index, IndexElement, IndexMethod};
pub use pg_type::{BuiltinAlias, Type, builtin_alias};
pub use schema::Schema;
pub use sequence::Sequence;
pub use table::Table;
pub use trigger::{Trigger, TriggerEvent, TriggerOrientation, TriggerTiming};
pub use view::{MaterializedView, View};

use crate::collection::IndexedCollection;
use crate::kinds::EntityKind;
use crate::options::Options;
use crate::relations::RelationNameFunctions;
use crate::snapshot::Snapshot;
use id::{ConstraintRef, Oid};
use resolver::{EntitySlot, FunctionSlot, IndexSlot, Resolver, SchemaSlot, TypeSlot};

/// Mutable graph under construction. Once every phase has run its contents
/// move into the `Db`, which exposes no mutators.
#[derive(Debug, Default, Clone)]
pub(crate) struct Graph {
    pub(crate) schemas: IndexedCollection<Schema>,
    pub(crate) system_schemas: IndexedCollection<Schema>,
    /// Referenced table oid → foreign keys pointing at it, in phase order.
    pub(crate) fks_to_table: HashMap<Oid, Vec<ConstraintRef>>,
}

impl Graph {
    pub(crate) fn schema_ref(&self, slot: SchemaSlot) -> &Schema {
        if slot.system {
            &self.system_schemas[slot.pos]
        } else {
            &self.schemas[slot.pos]
        }
    }

    pub(crate) fn schema_mut(&mut self, slot: SchemaSlot) -> &mut Schema {
        if slot.system {
            self.system_schemas.get_mut_at(slot.pos)
        } else {
            self.schemas.get_mut_at(slot.pos)
        }
    }

    pub(crate) fn type_ref(&self, slot: TypeSlot) -> &Type {
        &self.schema_ref(slot.schema).types[slot.pos]
    }

    pub(crate) fn type_mut(&mut self, slot: TypeSlot) -> &mut Type {
        self.schema_mut(slot.schema).types.get_mut_at(slot.pos)
    }

    pub(crate) fn table_ref(&self, slot: EntitySlot) -> Option<&Table> {
        match slot.kind {
            EntityKind::Table => Some(&self.schema_ref(slot.schema).tables[slot.pos]),
            _ => None,
        }
    }

    pub(crate) fn table_mut(&mut self, slot: EntitySlot) -> Option<&mut Table> {
        match slot.kind {
            EntityKind::Table => Some(self.schema_mut(slot.schema).tables.get_mut_at(slot.pos)),
            _ => None,
        }
    }

    pub(crate) fn function_ref(&self, slot: FunctionSlot) -> &Function {
        let schema = self.schema_ref(slot.schema);
        let collection = match slot.kind {
            crate::kinds::FunctionKind::NormalFunction => &schema.normal_functions,
            crate::kinds::FunctionKind::Procedure => &schema.procedures,
            crate::kinds::FunctionKind::AggregateFunction => &schema.aggregate_functions,
            crate::kinds::FunctionKind::WindowFunction => &schema.window_functions,
        };
        &collection[slot.pos]
    }

    pub(crate) fn index_ref(&self, slot: IndexSlot) -> Option<&Index> {
        let schema = self.schema_ref(slot.entity.schema);
        match slot.entity.kind {
            EntityKind::Table => Some(&schema.tables[slot.entity.pos].indexes[slot.pos]),
            EntityKind::MaterializedView => {
                Some(&schema.materialized_views[slot.entity.pos].indexes[slot.pos])
            }
            _ => None,
        }
    }

    pub(crate) fn entity_names(&self, slot: EntitySlot) -> (String, String) {
        let schema = self.schema_ref(slot.schema);
        match slot.kind {
            EntityKind::Table => {
                let t = &schema.tables[slot.pos];
                (t.schema_name.clone(), t.name.clone())
            }
            EntityKind::View => {
                let v = &schema.views[slot.pos];
                (v.schema_name.clone(), v.name.clone())
            }
            EntityKind::MaterializedView => {
                let v = &schema.materialized_views[slot.pos];
                (v.schema_name.clone(), v.name.clone())
            }
            EntityKind::Sequence => {
                let s = &schema.sequences[slot.pos];
                (s.schema_name.clone(), s.name.clone())
            }
        }
    }

    pub(crate) fn entity_columns(&self, slot: EntitySlot) -> Option<&IndexedCollection<Column>> {
        let schema = self.schema_ref(slot.schema);
        match slot.kind {
            EntityKind::Table => Some(&schema.tables[slot.pos].columns),
            EntityKind::View => Some(&schema.views[slot.pos].columns),
            EntityKind::MaterializedView => Some(&schema.materialized_views[slot.pos].columns),
            EntityKind::Sequence => None,
        }
    }

    pub(crate) fn push_column(&mut self, slot: EntitySlot, column: Column) -> Result<()> {
        let schema = self.schema_mut(slot.schema);
        match slot.kind {
            EntityKind::Table => schema.tables.get_mut_at(slot.pos).columns.push(column)?,
            EntityKind::View => schema.views.get_mut_at(slot.pos).columns.push(column)?,
            EntityKind::MaterializedView => schema
                .materialized_views
                .get_mut_at(slot.pos)
                .columns
                .push(column)?,
            EntityKind::Sequence => bail!("sequences have no column collection"),
        };
        Ok(())
    }

    pub(crate) fn push_index(&mut self, slot: EntitySlot, index: Index) -> Result<usize> {
        let name = index.name.clone();
        let schema = self.schema_mut(slot.schema);
        match slot.kind {
            EntityKind::Table => schema.tables.get_mut_at(slot.pos).indexes.push(index),
            EntityKind::MaterializedView => schema
                .materialized_views
                .get_mut_at(slot.pos)
                .indexes
                .push(index),
            _ => bail!("index {name:?} attached to an entity that cannot own indexes"),
        }
    }

    pub(crate) fn push_trigger(&mut self, slot: EntitySlot, trigger: Trigger) -> Result<()> {
        let name = trigger.name.clone();
        let schema = self.schema_mut(slot.schema);
        match slot.kind {
            EntityKind::Table => {
                schema.tables.get_mut_at(slot.pos).triggers.push(trigger)?;
            }
            EntityKind::MaterializedView => {
                schema
                    .materialized_views
                    .get_mut_at(slot.pos)
                    .triggers
                    .push(trigger)?;
            }
            _ => bail!("trigger {name:?} attached to an entity that cannot own triggers"),
        }
        Ok(())
    }
}

/// A reference to any object reachable through dotted-path lookup.
#[derive(Debug, Clone, Copy)]
pub enum DbObject<'a> {
    Schema(&'a Schema),
    Table(&'a Table),
    View(&'a View),
    MaterializedView(&'a MaterializedView),
    Sequence(&'a Sequence),
    Type(&'a Type),
    Column(&'a Column),
}

impl<'a> DbObject<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            DbObject::Schema(o) => &o.name,
            DbObject::Table(o) => &o.name,
            DbObject::View(o) => &o.name,
            DbObject::MaterializedView(o) => &o.name,
            DbObject::Sequence(o) => &o.name,
            DbObject::Type(o) => &o.name,
            DbObject::Column(o) => &o.name,
        }
    }

    pub fn as_schema(&self) -> Option<&'a Schema> {
        match *self {
            DbObject::Schema(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&'a Table> {
        match *self {
            DbObject::Table(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_column(&self) -> Option<&'a Column> {
        match *self {
            DbObject::Column(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&'a Type> {
        match *self {
            DbObject::Type(o) => Some(o),
            _ => None,
        }
    }
}

/// Root of the schema graph.
#[derive(Debug, Clone)]
pub struct Db {
    pub name: String,
    /// `server_version_num` of the introspected server, e.g. `140005`.
    pub server_version: i64,
    /// User schemas, filtered by the include/exclude patterns.
    pub schemas: IndexedCollection<Schema>,
    /// Always `pg_catalog`; owns the builtin types user objects reference.
    pub system_schemas: IndexedCollection<Schema>,
    pub(crate) naming: RelationNameFunctions,
    pub(crate) fks_to_table: HashMap<Oid, Vec<ConstraintRef>>,
    pub(crate) snapshot: Snapshot,
    pub(crate) pool: Option<PgPool>,
}

impl Db {
    /// Replays assembly over a snapshot, binding the naming strategy the
    /// snapshot's config names.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Db> {
        let naming = snapshot.config.relation_name_functions.clone();
        Self::from_snapshot_with(snapshot, naming)
    }

    /// Replays assembly with an explicitly injected naming strategy; this is
    /// how custom strategies survive deserialization.
    pub fn from_snapshot_with(snapshot: Snapshot, naming: RelationNameFunctions) -> Result<Db> {
        let token = snapshot.config.comment_data_token.clone();
        let rows = &snapshot.query_results;
        let mut graph = Graph::default();
        let mut res = Resolver::default();

        info!(user = rows.schemas.len(), "assembling schemas");
        schema::assemble(&mut graph, &mut res, &rows.schemas, false, &token)?;
        schema::assemble(&mut graph, &mut res, &rows.system_schemas, true, &token)?;
        info!(count = rows.types.len(), "assembling types");
        pg_type::assemble(&mut graph, &mut res, &rows.types, &token)?;
        info!(count = rows.entities.len(), "assembling entities");
        entity::assemble(&mut graph, &mut res, &rows.entities, &token)?;
        info!(count = rows.columns.len(), "assembling columns");
        column::assemble(&mut graph, &mut res, &rows.columns, &token)?;
        info!(count = rows.indexes.len(), "assembling indexes");
        index::assemble(&mut graph, &mut res, &rows.indexes, &token)?;
        info!(count = rows.constraints.len(), "assembling constraints");
        constraint::assemble(&mut graph, &mut res, &rows.constraints, &token)?;
        info!(count = rows.functions.len(), "assembling functions");
        function::assemble(&mut graph, &mut res, &rows.functions, &token)?;
        info!(count = rows.triggers.len(), "assembling triggers");
        trigger::assemble(&mut graph, &mut res, &rows.triggers, &token)?;

        Ok(Db {
            name: snapshot.name.clone(),
            server_version: snapshot.server_version,
            schemas: graph.schemas,
            system_schemas: graph.system_schemas,
            naming,
            fks_to_table: graph.fks_to_table,
            snapshot,
            pool: None,
        })
    }

    pub fn config(&self) -> &Options {
        &self.snapshot.config
    }

    pub fn naming(&self) -> &RelationNameFunctions {
        &self.naming
    }

    /// The snapshot this graph was assembled from.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// The connection pool kept alive by `keep_connection`, if any.
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// System schemas first, then user schemas, mirroring type resolution.
    pub fn all_schemas(&self) -> impl Iterator<Item = &Schema> {
        self.system_schemas.iter().chain(self.schemas.iter())
    }

    pub fn schema_by_oid(&self, oid: Oid) -> Option<&Schema> {
        self.system_schemas
            .get_maybe_oid(oid)
            .or_else(|| self.schemas.get_maybe_oid(oid))
    }

    pub fn table_by_oid(&self, oid: Oid) -> Option<&Table> {
        self.all_schemas().find_map(|s| s.tables.get_maybe_oid(oid))
    }

    pub fn type_by_oid(&self, oid: Oid) -> Option<&Type> {
        self.all_schemas().find_map(|s| s.types.get_maybe_oid(oid))
    }

    pub fn view_by_oid(&self, oid: Oid) -> Option<&View> {
        self.all_schemas().find_map(|s| s.views.get_maybe_oid(oid))
    }

    pub fn materialized_view_by_oid(&self, oid: Oid) -> Option<&MaterializedView> {
        self.all_schemas()
            .find_map(|s| s.materialized_views.get_maybe_oid(oid))
    }

    pub fn sequence_by_oid(&self, oid: Oid) -> Option<&Sequence> {
        self.all_schemas()
            .find_map(|s| s.sequences.get_maybe_oid(oid))
    }

    pub fn index_by_oid(&self, oid: Oid) -> Option<&Index> {
        self.all_schemas().find_map(|s| {
            s.tables
                .iter()
                .find_map(|t| t.indexes.get_maybe_oid(oid))
                .or_else(|| {
                    s.materialized_views
                        .iter()
                        .find_map(|m| m.indexes.get_maybe_oid(oid))
                })
        })
    }

    pub fn function_by_oid(&self, oid: Oid) -> Option<&Function> {
        self.all_schemas().find_map(|s| {
            s.normal_functions
                .get_maybe_oid(oid)
                .or_else(|| s.procedures.get_maybe_oid(oid))
                .or_else(|| s.aggregate_functions.get_maybe_oid(oid))
                .or_else(|| s.window_functions.get_maybe_oid(oid))
        })
    }

    pub(crate) fn constraint_by_ref(&self, reference: &ConstraintRef) -> Option<&Constraint> {
        self.table_by_oid(reference.table_oid)?
            .constraints
            .get_maybe(&reference.name)
    }

    /// Foreign keys across all loaded schemas whose referenced table has the
    /// given oid, in assembly order.
    pub(crate) fn fks_referencing(&self, table_oid: Oid) -> Vec<&Constraint> {
        self.fks_to_table
            .get(&table_oid)
            .map(|refs| {
                refs.iter()
                    .filter_map(|r| self.constraint_by_ref(r))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Dotted-path lookup: `"public"`, `"public.account"`,
    /// `"public.account.id"`. The first segment names a schema (user schemas
    /// win over system ones); the rest descends per [`Schema::get_maybe`].
    pub fn get(&self, path: &str) -> Result<DbObject<'_>> {
        self.get_maybe(path)
            .ok_or_else(|| anyhow!("no object at path {path:?}"))
    }

    pub fn get_maybe(&self, path: &str) -> Option<DbObject<'_>> {
        let (first, rest) = match path.split_once('.') {
            Some((first, rest)) => (first, Some(rest)),
            None => (path, None),
        };
        let schema = self
            .schemas
            .get_maybe(first)
            .or_else(|| self.system_schemas.get_maybe(first))?;
        match rest {
            None => Some(DbObject::Schema(schema)),
            Some(rest) => schema.get_maybe(rest),
        }
    }
}
