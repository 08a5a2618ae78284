//! Constraints: primary key, unique, check, exclusion, foreign key.

use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::id::{ConstraintRef, Oid};
use super::index::Index;
use super::resolver::Resolver;
use super::table::Table;
use super::{Db, Graph};
use crate::collection::CollectionItem;
use crate::comment::parse_comment_data;
use crate::kinds::{ConstraintKind, EntityKind, FkAction, MatchType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConstraintRow {
    pub oid: Oid,
    /// `contype` letter.
    pub kind: String,
    pub name: String,
    /// Owning table (`conrelid`); absent for domain constraints.
    pub table_oid: Option<Oid>,
    /// Owning domain (`contypid`); absent for table constraints.
    pub domain_oid: Option<Oid>,
    /// Backing index for PK/unique/exclusion; referenced index for FKs.
    pub index_oid: Option<Oid>,
    /// `conkey`: attribute numbers of the constrained columns, in order.
    pub column_numbers: Option<Vec<i16>>,
    /// Check expression text.
    pub expression: Option<String>,
    pub on_update: Option<String>,
    pub on_delete: Option<String>,
    pub match_type: Option<String>,
    pub comment: Option<String>,
}

/// Foreign key payload.
///
/// Referenced columns are taken from the referenced index, so they line up
/// with the source columns position by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Source column names in `conkey` order.
    pub columns: Vec<String>,
    pub referenced_index_oid: Oid,
    pub referenced_table_oid: Oid,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub on_update: FkAction,
    pub on_delete: FkAction,
    pub match_type: MatchType,
}

impl ForeignKey {
    pub fn referenced_table<'d>(&self, db: &'d Db) -> Option<&'d Table> {
        db.table_by_oid(self.referenced_table_oid)
    }

    pub fn referenced_index<'d>(&self, db: &'d Db) -> Option<&'d Index> {
        db.index_by_oid(self.referenced_index_oid)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintDetail {
    PrimaryKey { index_oid: Oid, columns: Vec<String> },
    Unique { index_oid: Oid, columns: Vec<String> },
    Exclusion { index_oid: Oid, columns: Vec<String> },
    Check { expression: String },
    ForeignKey(ForeignKey),
}

#[derive(Debug, Clone)]
pub struct Constraint {
    pub oid: Oid,
    pub name: String,
    pub schema_name: String,
    /// Owning table; absent for domain constraints.
    pub table_oid: Option<Oid>,
    pub table_name: Option<String>,
    /// Owning domain type; absent for table constraints.
    pub domain_oid: Option<Oid>,
    pub detail: ConstraintDetail,
    pub comment: Option<String>,
    pub comment_data: Option<Value>,
}

impl Constraint {
    pub fn kind(&self) -> ConstraintKind {
        match self.detail {
            ConstraintDetail::PrimaryKey { .. } => ConstraintKind::PrimaryKey,
            ConstraintDetail::Unique { .. } => ConstraintKind::Unique,
            ConstraintDetail::Exclusion { .. } => ConstraintKind::Exclusion,
            ConstraintDetail::Check { .. } => ConstraintKind::Check,
            ConstraintDetail::ForeignKey(_) => ConstraintKind::ForeignKey,
        }
    }

    pub fn as_foreign_key(&self) -> Option<&ForeignKey> {
        match &self.detail {
            ConstraintDetail::ForeignKey(fk) => Some(fk),
            _ => None,
        }
    }

    /// Column names constrained by a PK/unique/exclusion constraint,
    /// borrowed from the backing index at assembly time.
    pub fn column_names(&self) -> &[String] {
        match &self.detail {
            ConstraintDetail::PrimaryKey { columns, .. }
            | ConstraintDetail::Unique { columns, .. }
            | ConstraintDetail::Exclusion { columns, .. } => columns,
            ConstraintDetail::ForeignKey(fk) => &fk.columns,
            ConstraintDetail::Check { .. } => &[],
        }
    }

    /// The backing index (PK/unique/exclusion) or referenced index (FK).
    pub fn index<'d>(&self, db: &'d Db) -> Option<&'d Index> {
        let oid = match &self.detail {
            ConstraintDetail::PrimaryKey { index_oid, .. }
            | ConstraintDetail::Unique { index_oid, .. }
            | ConstraintDetail::Exclusion { index_oid, .. } => *index_oid,
            ConstraintDetail::ForeignKey(fk) => fk.referenced_index_oid,
            ConstraintDetail::Check { .. } => return None,
        };
        db.index_by_oid(oid)
    }

    pub fn full_name(&self) -> String {
        match &self.table_name {
            Some(table) => format!("{}.{}.{}", self.schema_name, table, self.name),
            None => format!("{}.{}", self.schema_name, self.name),
        }
    }
}

impl CollectionItem for Constraint {
    fn item_name(&self) -> &str {
        &self.name
    }

    fn item_oid(&self) -> Option<Oid> {
        Some(self.oid)
    }
}

/// Looks up the backing index of a PK/unique/exclusion constraint and copies
/// its column names.
fn index_backed_detail(
    graph: &Graph,
    resolver: &Resolver,
    row: &ConstraintRow,
    kind: ConstraintKind,
) -> Result<ConstraintDetail> {
    let index_oid = row.index_oid.ok_or_else(|| {
        anyhow!("constraint {:?} (oid {}) has no backing index", row.name, row.oid)
    })?;
    let index_slot = resolver.index(index_oid).ok_or_else(|| {
        anyhow!(
            "constraint {:?} (oid {}) references unknown index oid {}",
            row.name,
            row.oid,
            index_oid
        )
    })?;
    let columns = graph
        .index_ref(index_slot)
        .map(Index::column_names)
        .unwrap_or_default();
    Ok(match kind {
        ConstraintKind::PrimaryKey => ConstraintDetail::PrimaryKey { index_oid, columns },
        ConstraintKind::Unique => ConstraintDetail::Unique { index_oid, columns },
        ConstraintKind::Exclusion => ConstraintDetail::Exclusion { index_oid, columns },
        _ => unreachable!("index_backed_detail called for {kind:?}"),
    })
}

/// Builds the FK payload, or `None` when the referenced index is outside the
/// loaded graph (the soft-skip case).
fn foreign_key_detail(
    graph: &Graph,
    resolver: &Resolver,
    row: &ConstraintRow,
    owning_table: &Table,
) -> Result<Option<ForeignKey>> {
    let Some(index_oid) = row.index_oid else {
        warn!(constraint = %row.name, "foreign key has no referenced index; skipping");
        return Ok(None);
    };
    let Some(index_slot) = resolver.index(index_oid) else {
        warn!(
            constraint = %row.name,
            index_oid = %index_oid,
            "foreign key references an index outside the loaded schemas; skipping"
        );
        return Ok(None);
    };
    if index_slot.entity.kind != EntityKind::Table {
        warn!(constraint = %row.name, "foreign key references a non-table entity; skipping");
        return Ok(None);
    }
    let Some(referenced) = graph.table_ref(index_slot.entity) else {
        warn!(constraint = %row.name, "foreign key references an unresolved table; skipping");
        return Ok(None);
    };
    let referenced_index = &referenced.indexes[index_slot.pos];

    let numbers = row.column_numbers.clone().unwrap_or_default();
    let mut columns = Vec::with_capacity(numbers.len());
    for number in &numbers {
        let column = owning_table.columns.get_maybe_ordinal(*number).ok_or_else(|| {
            anyhow!(
                "foreign key {:?} (oid {}) references missing column {} on {}",
                row.name,
                row.oid,
                number,
                owning_table.full_name()
            )
        })?;
        columns.push(column.name.clone());
    }

    Ok(Some(ForeignKey {
        columns,
        referenced_index_oid: index_oid,
        referenced_table_oid: referenced.oid,
        referenced_schema: referenced.schema_name.clone(),
        referenced_table: referenced.name.clone(),
        referenced_columns: referenced_index.column_names(),
        on_update: FkAction::from_code(row.on_update.as_deref().unwrap_or("a"))?,
        on_delete: FkAction::from_code(row.on_delete.as_deref().unwrap_or("a"))?,
        match_type: MatchType::from_code(row.match_type.as_deref().unwrap_or("s"))?,
    }))
}

/// Phase 7: constraints, dispatched by kind. Domain checks attach to their
/// domain type; everything else attaches to its table. Foreign keys are also
/// recorded in the reverse map that backs `foreign_keys_to_this`.
pub(crate) fn assemble(
    graph: &mut Graph,
    resolver: &mut Resolver,
    rows: &[ConstraintRow],
    token: &str,
) -> Result<()> {
    for row in rows {
        let kind = ConstraintKind::from_code(&row.kind)?;
        let comment_data = parse_comment_data(row.comment.as_deref(), token);

        // Domain check constraints have no owning table.
        if let Some(domain_oid) = row.domain_oid {
            let type_slot = resolver.type_(domain_oid).ok_or_else(|| {
                anyhow!(
                    "constraint {:?} (oid {}) references unknown domain oid {}",
                    row.name,
                    row.oid,
                    domain_oid
                )
            })?;
            let expression = row.expression.clone().ok_or_else(|| {
                anyhow!("domain constraint {:?} (oid {}) has no expression", row.name, row.oid)
            })?;
            let constraint = Constraint {
                oid: row.oid,
                name: row.name.clone(),
                schema_name: graph.type_ref(type_slot).schema_name.clone(),
                table_oid: None,
                table_name: None,
                domain_oid: Some(domain_oid),
                detail: ConstraintDetail::Check { expression },
                comment: row.comment.clone(),
                comment_data,
            };
            graph.type_mut(type_slot).check_constraints.push(constraint)?;
            continue;
        }

        let table_oid = row.table_oid.ok_or_else(|| {
            anyhow!("constraint {:?} (oid {}) has neither table nor domain", row.name, row.oid)
        })?;
        let entity_slot = resolver.entity(table_oid).ok_or_else(|| {
            anyhow!(
                "constraint {:?} (oid {}) references unknown table oid {}",
                row.name,
                row.oid,
                table_oid
            )
        })?;
        if entity_slot.kind != EntityKind::Table {
            bail!(
                "constraint {:?} (oid {}) attached to a non-table entity (oid {})",
                row.name,
                row.oid,
                table_oid
            );
        }

        let (detail, fk_target) = {
            let table = graph
                .table_ref(entity_slot)
                .ok_or_else(|| anyhow!("unresolved table oid {table_oid}"))?;
            match kind {
                ConstraintKind::PrimaryKey | ConstraintKind::Unique | ConstraintKind::Exclusion => {
                    (Some(index_backed_detail(graph, resolver, row, kind)?), None)
                }
                ConstraintKind::Check => {
                    let expression = row.expression.clone().ok_or_else(|| {
                        anyhow!("check constraint {:?} (oid {}) has no expression", row.name, row.oid)
                    })?;
                    (Some(ConstraintDetail::Check { expression }), None)
                }
                ConstraintKind::ForeignKey => match foreign_key_detail(graph, resolver, row, table)? {
                    Some(fk) => {
                        let target = fk.referenced_table_oid;
                        (Some(ConstraintDetail::ForeignKey(fk)), Some(target))
                    }
                    None => (None, None),
                },
            }
        };

        // A dropped foreign key leaves no trace in the graph.
        let Some(detail) = detail else { continue };

        let (schema_name, table_name) = graph.entity_names(entity_slot);
        let constraint = Constraint {
            oid: row.oid,
            name: row.name.clone(),
            schema_name,
            table_oid: Some(table_oid),
            table_name: Some(table_name),
            domain_oid: None,
            detail,
            comment: row.comment.clone(),
            comment_data,
        };
        graph
            .table_mut(entity_slot)
            .ok_or_else(|| anyhow!("unresolved table oid {table_oid}"))?
            .constraints
            .push(constraint)?;

        if let Some(referenced_table_oid) = fk_target {
            graph
                .fks_to_table
                .entry(referenced_table_oid)
                .or_default()
                .push(ConstraintRef { table_oid, name: row.name.clone() });
        }
    }
    Ok(())
}
