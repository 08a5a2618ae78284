//! OID reference resolution during assembly.
//!
//! Each phase records where it put every object; later phases resolve the
//! OIDs their rows carry into those slots. Lookups are pure reads; the
//! calling phase decides whether an absent slot is fatal or a soft skip.

use std::collections::HashMap;

use super::id::Oid;
use crate::kinds::{EntityKind, FunctionKind};

/// Position of a schema: which list (user or system) and where in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SchemaSlot {
    pub system: bool,
    pub pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TypeSlot {
    pub schema: SchemaSlot,
    pub pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EntitySlot {
    pub schema: SchemaSlot,
    pub kind: EntityKind,
    pub pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IndexSlot {
    pub entity: EntitySlot,
    pub pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FunctionSlot {
    pub schema: SchemaSlot,
    pub kind: FunctionKind,
    pub pos: usize,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct Resolver {
    schemas: HashMap<Oid, SchemaSlot>,
    types: HashMap<Oid, TypeSlot>,
    /// Composite types keyed by their backing `pg_class` oid.
    class_types: HashMap<Oid, TypeSlot>,
    entities: HashMap<Oid, EntitySlot>,
    indexes: HashMap<Oid, IndexSlot>,
    functions: HashMap<Oid, FunctionSlot>,
}

impl Resolver {
    pub fn record_schema(&mut self, oid: Oid, slot: SchemaSlot) {
        self.schemas.insert(oid, slot);
    }

    pub fn record_type(&mut self, oid: Oid, slot: TypeSlot) {
        self.types.insert(oid, slot);
    }

    pub fn record_class_type(&mut self, class_oid: Oid, slot: TypeSlot) {
        self.class_types.insert(class_oid, slot);
    }

    pub fn record_entity(&mut self, oid: Oid, slot: EntitySlot) {
        self.entities.insert(oid, slot);
    }

    pub fn record_index(&mut self, oid: Oid, slot: IndexSlot) {
        self.indexes.insert(oid, slot);
    }

    pub fn record_function(&mut self, oid: Oid, slot: FunctionSlot) {
        self.functions.insert(oid, slot);
    }

    pub fn schema(&self, oid: Oid) -> Option<SchemaSlot> {
        self.schemas.get(&oid).copied()
    }

    pub fn type_(&self, oid: Oid) -> Option<TypeSlot> {
        self.types.get(&oid).copied()
    }

    pub fn class_type(&self, class_oid: Oid) -> Option<TypeSlot> {
        self.class_types.get(&class_oid).copied()
    }

    pub fn entity(&self, oid: Oid) -> Option<EntitySlot> {
        self.entities.get(&oid).copied()
    }

    pub fn index(&self, oid: Oid) -> Option<IndexSlot> {
        self.indexes.get(&oid).copied()
    }

    pub fn function(&self, oid: Oid) -> Option<FunctionSlot> {
        self.functions.get(&oid).copied()
    }
}
