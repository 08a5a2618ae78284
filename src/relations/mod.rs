//! Relations derived from foreign key topology.
//!
//! Nothing here is catalog-backed: the engine walks a table's outgoing and
//! incoming foreign keys on first access and memoizes the result on the
//! table. Given identical snapshots and the same naming strategy the
//! produced names are byte-identical.

mod naming;

use std::collections::{BTreeSet, HashSet};

use tracing::warn;

pub use naming::{RelationKind, RelationNameContext, RelationNameFunctions};

use crate::catalog::constraint::{Constraint, ForeignKey};
use crate::catalog::id::{ConstraintRef, Oid};
use crate::catalog::table::Table;
use crate::catalog::Db;

/// `many` side → `one` side, one per outgoing foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManyToOne {
    pub name: String,
    pub source_table_oid: Oid,
    pub target_table_oid: Oid,
    pub foreign_key: ConstraintRef,
}

impl ManyToOne {
    pub fn source_table<'d>(&self, db: &'d Db) -> Option<&'d Table> {
        db.table_by_oid(self.source_table_oid)
    }

    pub fn target_table<'d>(&self, db: &'d Db) -> Option<&'d Table> {
        db.table_by_oid(self.target_table_oid)
    }

    pub fn foreign_key_constraint<'d>(&self, db: &'d Db) -> Option<&'d Constraint> {
        db.constraint_by_ref(&self.foreign_key)
    }
}

/// `one` side → `many` side, the inverse of an incoming foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneToMany {
    pub name: String,
    pub source_table_oid: Oid,
    pub target_table_oid: Oid,
    pub foreign_key: ConstraintRef,
}

impl OneToMany {
    pub fn source_table<'d>(&self, db: &'d Db) -> Option<&'d Table> {
        db.table_by_oid(self.source_table_oid)
    }

    pub fn target_table<'d>(&self, db: &'d Db) -> Option<&'d Table> {
        db.table_by_oid(self.target_table_oid)
    }

    pub fn foreign_key_constraint<'d>(&self, db: &'d Db) -> Option<&'d Constraint> {
        db.constraint_by_ref(&self.foreign_key)
    }
}

/// Relation through a join table to a far table (possibly the same table for
/// self-referencing joins).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManyToMany {
    pub name: String,
    pub source_table_oid: Oid,
    pub join_table_oid: Oid,
    pub target_table_oid: Oid,
    /// The join table's foreign key toward the far side.
    pub through_foreign_key_constraint: ConstraintRef,
    /// The join table's foreign key back toward the source.
    pub through_foreign_key_constraint_to_self: ConstraintRef,
}

impl ManyToMany {
    pub fn source_table<'d>(&self, db: &'d Db) -> Option<&'d Table> {
        db.table_by_oid(self.source_table_oid)
    }

    pub fn join_table<'d>(&self, db: &'d Db) -> Option<&'d Table> {
        db.table_by_oid(self.join_table_oid)
    }

    pub fn target_table<'d>(&self, db: &'d Db) -> Option<&'d Table> {
        db.table_by_oid(self.target_table_oid)
    }

    pub fn through_foreign_key<'d>(&self, db: &'d Db) -> Option<&'d Constraint> {
        db.constraint_by_ref(&self.through_foreign_key_constraint)
    }

    pub fn through_foreign_key_to_self<'d>(&self, db: &'d Db) -> Option<&'d Constraint> {
        db.constraint_by_ref(&self.through_foreign_key_constraint_to_self)
    }
}

/// All relations of one table, memoized on it after the first computation.
#[derive(Debug, Clone, Default)]
pub struct TableRelations {
    pub m2o: Vec<ManyToOne>,
    pub o2m: Vec<OneToMany>,
    pub m2m: Vec<ManyToMany>,
}

/// A table is a join table iff it has a primary key, exactly two outgoing
/// foreign keys, and the PK column set equals the union of the two keys'
/// column sets. The keys need not be disjoint, so self-joins qualify.
pub fn is_join_table(table: &Table) -> bool {
    let Some(pk) = table.primary_key() else {
        return false;
    };
    let fks: Vec<&ForeignKey> = table
        .foreign_keys()
        .filter_map(Constraint::as_foreign_key)
        .collect();
    let [first, second] = fks.as_slice() else {
        return false;
    };
    let union: BTreeSet<&str> = first
        .columns
        .iter()
        .chain(second.columns.iter())
        .map(String::as_str)
        .collect();
    let pk_columns: BTreeSet<&str> = pk.column_names().iter().map(String::as_str).collect();
    union == pk_columns
}

enum Pending {
    M2O(ManyToOne),
    O2M(OneToMany),
    M2M(ManyToMany),
}

/// Resolves name collisions within one table's relation set.
///
/// The first occurrence keeps its name; later occurrences get
/// `__<constraint-name>` appended, M2M relations additionally
/// `__<join-table-name>`. A residual collision appends an ordinal.
fn resolve_name(
    used: &mut HashSet<String>,
    base: String,
    constraint_name: &str,
    join_table_name: Option<&str>,
) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut candidate = match join_table_name {
        Some(join) => format!("{base}__{constraint_name}__{join}"),
        None => format!("{base}__{constraint_name}"),
    };
    let mut ordinal = 2;
    while !used.insert(candidate.clone()) {
        candidate = match join_table_name {
            Some(join) => format!("{base}__{constraint_name}__{join}_{ordinal}"),
            None => format!("{base}__{constraint_name}_{ordinal}"),
        };
        ordinal += 1;
    }
    candidate
}

/// Derives every relation of `table`. Iteration order is fixed: m2o in
/// constraint order, o2m in incoming-key order, m2m in incoming-key order
/// with the join table's keys in constraint order.
pub(crate) fn build_table_relations(table: &Table, db: &Db) -> TableRelations {
    let config = db.config();
    let separator = config.foreign_key_alias_separator.clone();
    let target_first = config.foreign_key_alias_target_first;
    let naming = db.naming();

    // (relation, base name, disambiguator parts)
    let mut pending: Vec<(Pending, String, String, Option<String>)> = Vec::new();

    for constraint in table.foreign_keys() {
        let Some(fk) = constraint.as_foreign_key() else {
            continue;
        };
        let Some(target) = db.table_by_oid(fk.referenced_table_oid) else {
            warn!(constraint = %constraint.name, "foreign key target missing from graph");
            continue;
        };
        let ctx = RelationNameContext {
            kind: RelationKind::ManyToOne,
            source_table: table,
            target_table: target,
            join_table: None,
            foreign_key: constraint,
            foreign_key_to_self: None,
            separator: &separator,
            target_first,
        };
        pending.push((
            Pending::M2O(ManyToOne {
                name: String::new(),
                source_table_oid: table.oid,
                target_table_oid: target.oid,
                foreign_key: ConstraintRef {
                    table_oid: table.oid,
                    name: constraint.name.clone(),
                },
            }),
            naming.name_for(&ctx),
            constraint.name.clone(),
            None,
        ));
    }

    for constraint in table.foreign_keys_to_this(db) {
        let Some(owner_oid) = constraint.table_oid else {
            continue;
        };
        let Some(owner) = db.table_by_oid(owner_oid) else {
            continue;
        };
        let ctx = RelationNameContext {
            kind: RelationKind::OneToMany,
            source_table: table,
            target_table: owner,
            join_table: None,
            foreign_key: constraint,
            foreign_key_to_self: None,
            separator: &separator,
            target_first,
        };
        pending.push((
            Pending::O2M(OneToMany {
                name: String::new(),
                source_table_oid: table.oid,
                target_table_oid: owner.oid,
                foreign_key: ConstraintRef {
                    table_oid: owner.oid,
                    name: constraint.name.clone(),
                },
            }),
            naming.name_for(&ctx),
            constraint.name.clone(),
            None,
        ));
    }

    for to_self in table.foreign_keys_to_this(db) {
        let Some(join_oid) = to_self.table_oid else {
            continue;
        };
        let Some(join) = db.table_by_oid(join_oid) else {
            continue;
        };
        if !is_join_table(join) {
            continue;
        }
        for through in join.foreign_keys() {
            if through.name == to_self.name {
                continue;
            }
            let Some(through_fk) = through.as_foreign_key() else {
                continue;
            };
            let Some(far) = db.table_by_oid(through_fk.referenced_table_oid) else {
                continue;
            };
            let ctx = RelationNameContext {
                kind: RelationKind::ManyToMany,
                source_table: table,
                target_table: far,
                join_table: Some(join),
                foreign_key: through,
                foreign_key_to_self: Some(to_self),
                separator: &separator,
                target_first,
            };
            pending.push((
                Pending::M2M(ManyToMany {
                    name: String::new(),
                    source_table_oid: table.oid,
                    join_table_oid: join.oid,
                    target_table_oid: far.oid,
                    through_foreign_key_constraint: ConstraintRef {
                        table_oid: join.oid,
                        name: through.name.clone(),
                    },
                    through_foreign_key_constraint_to_self: ConstraintRef {
                        table_oid: join.oid,
                        name: to_self.name.clone(),
                    },
                }),
                naming.name_for(&ctx),
                through.name.clone(),
                Some(join.name.clone()),
            ));
        }
    }

    let mut used = HashSet::new();
    let mut relations = TableRelations::default();
    for (slot, base, constraint_name, join_table_name) in pending {
        let name = resolve_name(&mut used, base, &constraint_name, join_table_name.as_deref());
        match slot {
            Pending::M2O(mut relation) => {
                relation.name = name;
                relations.m2o.push(relation);
            }
            Pending::O2M(mut relation) => {
                relation.name = name;
                relations.o2m.push(relation);
            }
            Pending::M2M(mut relation) => {
                relation.name = name;
                relations.m2m.push(relation);
            }
        }
    }
    relations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_suffix_rule() {
        let mut used = HashSet::new();
        assert_eq!(
            resolve_name(&mut used, "person".into(), "friendship_a_fkey", Some("friendship")),
            "person"
        );
        assert_eq!(
            resolve_name(&mut used, "person".into(), "friendship_b_fkey", Some("friendship")),
            "person__friendship_b_fkey__friendship"
        );
        // Same inputs once more fall back to the ordinal.
        assert_eq!(
            resolve_name(&mut used, "person".into(), "friendship_b_fkey", Some("friendship")),
            "person__friendship_b_fkey__friendship_2"
        );
    }

    #[test]
    fn non_m2m_suffix_has_no_join_component() {
        let mut used = HashSet::new();
        assert_eq!(resolve_name(&mut used, "order".into(), "fk_a", None), "order");
        assert_eq!(
            resolve_name(&mut used, "order".into(), "fk_b", None),
            "order__fk_b"
        );
    }
}
