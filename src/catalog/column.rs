//! Columns of entities and composite types.

use anyhow::{Result, anyhow};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::id::Oid;
use super::pg_type::Type;
use super::resolver::Resolver;
use super::{Db, Graph};
use crate::collection::CollectionItem;
use crate::comment::parse_comment_data;
use crate::kinds::{ColumnParentKind, EntityKind, IdentityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ColumnRow {
    /// `attrelid`: owning entity, or the class backing a composite type.
    pub parent_oid: Oid,
    /// `relkind` of the parent.
    pub parent_kind: String,
    pub name: String,
    pub attribute_number: i16,
    /// Element type for array columns, the column type otherwise.
    pub type_oid: Oid,
    /// Raw `atttypmod`; decodes against the type's modifier flags.
    pub type_modifier: i32,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub array_dimension: i32,
    /// `attidentity` letter, absent for plain columns.
    pub identity: Option<String>,
    pub generated_expression: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    /// 1-based position within the parent; the stable column key.
    pub attribute_number: i16,
    pub parent_oid: Oid,
    pub parent_kind: ColumnParentKind,
    pub schema_name: String,
    pub parent_name: String,
    pub type_oid: Oid,
    /// Display name of the column's type (element type for arrays).
    pub type_name: String,
    pub not_null: bool,
    pub default: Option<String>,
    pub length: Option<i32>,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    /// 0 for scalar columns, the declared number of dimensions for arrays.
    pub array_dimension: i32,
    pub identity: Option<IdentityKind>,
    pub generated_expression: Option<String>,
    pub comment: Option<String>,
    pub comment_data: Option<Value>,
}

impl Column {
    pub fn full_name(&self) -> String {
        format!("{}.{}.{}", self.schema_name, self.parent_name, self.name)
    }

    /// The column's type object within the graph.
    pub fn sql_type<'d>(&self, db: &'d Db) -> Option<&'d Type> {
        db.type_by_oid(self.type_oid)
    }

    pub fn is_generated(&self) -> bool {
        self.generated_expression.is_some()
    }
}

impl CollectionItem for Column {
    fn item_name(&self) -> &str {
        &self.name
    }

    fn item_ordinal(&self) -> Option<i16> {
        Some(self.attribute_number)
    }
}

/// Decodes `atttypmod` according to the modifier behavior of the type.
///
/// Character types store length + 4; numeric packs precision and scale into
/// one word + 4; time types store the precision directly.
fn typmod_details(ty: &Type, type_modifier: i32) -> (Option<i32>, Option<i32>, Option<i32>) {
    if type_modifier < 0 {
        return (None, None, None);
    }
    if ty.has_length {
        return (Some(type_modifier - 4), None, None);
    }
    if ty.has_precision && ty.has_scale {
        let packed = type_modifier - 4;
        return (None, Some((packed >> 16) & 0xffff), Some(packed & 0xffff));
    }
    if ty.has_precision {
        return (None, Some(type_modifier), None);
    }
    (None, None, None)
}

fn build(
    row: &ColumnRow,
    parent_kind: ColumnParentKind,
    schema_name: String,
    parent_name: String,
    ty: &Type,
    token: &str,
) -> Result<Column> {
    let (length, precision, scale) = typmod_details(ty, row.type_modifier);
    let identity = row
        .identity
        .as_deref()
        .map(IdentityKind::from_code)
        .transpose()?;
    Ok(Column {
        name: row.name.clone(),
        attribute_number: row.attribute_number,
        parent_oid: row.parent_oid,
        parent_kind,
        schema_name,
        parent_name,
        type_oid: row.type_oid,
        type_name: ty.name.clone(),
        not_null: row.not_null,
        default: row.default_value.clone(),
        length,
        precision,
        scale,
        array_dimension: row.array_dimension,
        identity,
        generated_expression: row.generated_expression.clone(),
        comment: row.comment.clone(),
        comment_data: parse_comment_data(row.comment.as_deref(), token),
    })
}

/// Phase 5: columns, grouped by parent. The parent is a composite type when
/// the backing class is kind `c`, an entity otherwise. Rows arrive sorted by
/// parent, so each group resolves its parent once.
pub(crate) fn assemble(
    graph: &mut Graph,
    resolver: &mut Resolver,
    rows: &[ColumnRow],
    token: &str,
) -> Result<()> {
    for (parent_oid, group) in &rows.iter().chunk_by(|row| row.parent_oid) {
        let group: Vec<&ColumnRow> = group.collect();
        let parent_kind = ColumnParentKind::from_code(&group[0].parent_kind)?;

        match parent_kind {
            ColumnParentKind::CompositeType => {
                let parent_slot = resolver.class_type(parent_oid).ok_or_else(|| {
                    anyhow!("columns reference unknown composite class oid {parent_oid}")
                })?;
                for row in group {
                    let type_slot = resolve_type(resolver, row)?;
                    let column = {
                        let parent = graph.type_ref(parent_slot);
                        let ty = graph.type_ref(type_slot);
                        build(row, parent_kind, parent.schema_name.clone(), parent.name.clone(), ty, token)?
                    };
                    graph.type_mut(parent_slot).columns.push(column)?;
                }
            }
            _ => {
                let entity_slot = resolver.entity(parent_oid).ok_or_else(|| {
                    anyhow!("columns reference unknown entity oid {parent_oid}")
                })?;
                if entity_slot.kind == EntityKind::Sequence {
                    // Sequence pseudo-columns carry no schema information.
                    debug!(oid = %parent_oid, "skipping sequence columns");
                    continue;
                }
                let (schema_name, parent_name) = graph.entity_names(entity_slot);
                for row in group {
                    let type_slot = resolve_type(resolver, row)?;
                    let column = {
                        let ty = graph.type_ref(type_slot);
                        build(row, parent_kind, schema_name.clone(), parent_name.clone(), ty, token)?
                    };
                    graph.push_column(entity_slot, column)?;
                }
            }
        }
    }
    Ok(())
}

fn resolve_type(resolver: &Resolver, row: &ColumnRow) -> Result<crate::catalog::resolver::TypeSlot> {
    resolver.type_(row.type_oid).ok_or_else(|| {
        anyhow!(
            "column {:?} references unknown type oid {}",
            row.name,
            row.type_oid
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::pg_type::builtin_alias;
    use rstest::rstest;

    fn base_type(internal: &str) -> Type {
        let alias = builtin_alias(internal);
        Type {
            oid: Oid(100),
            class_oid: None,
            schema_oid: Oid(11),
            schema_name: "pg_catalog".to_string(),
            name: alias.map(|a| a.name.to_string()).unwrap_or_else(|| internal.to_string()),
            internal_name: alias.map(|_| internal.to_string()),
            short_name: alias.and_then(|a| a.short_name.map(str::to_string)),
            kind: crate::kinds::TypeKind::BaseType,
            has_length: alias.is_some_and(|a| a.has_length),
            has_precision: alias.is_some_and(|a| a.has_precision),
            has_scale: alias.is_some_and(|a| a.has_scale),
            sql_type: None,
            values: Vec::new(),
            relation_kind: None,
            columns: crate::collection::IndexedCollection::new(),
            check_constraints: crate::collection::IndexedCollection::new(),
            comment: None,
            comment_data: None,
        }
    }

    #[rstest]
    #[case("varchar", 68, (Some(64), None, None))]
    #[case("bpchar", 14, (Some(10), None, None))]
    #[case("text", 100, (None, None, None))]
    fn length_from_typmod(
        #[case] internal: &str,
        #[case] typmod: i32,
        #[case] expected: (Option<i32>, Option<i32>, Option<i32>),
    ) {
        assert_eq!(typmod_details(&base_type(internal), typmod), expected);
    }

    #[test]
    fn numeric_packs_precision_and_scale() {
        // numeric(10, 2): ((10 << 16) | 2) + 4
        let typmod = ((10 << 16) | 2) + 4;
        assert_eq!(
            typmod_details(&base_type("numeric"), typmod),
            (None, Some(10), Some(2))
        );
    }

    #[test]
    fn time_precision_is_direct() {
        assert_eq!(
            typmod_details(&base_type("timestamptz"), 3),
            (None, Some(3), None)
        );
    }

    #[test]
    fn no_modifier_means_no_details() {
        assert_eq!(typmod_details(&base_type("varchar"), -1), (None, None, None));
    }
}
