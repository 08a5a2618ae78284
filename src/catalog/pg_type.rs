//! PostgreSQL types: base, enum, composite, domain, range, multirange, pseudo.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::column::Column;
use super::constraint::Constraint;
use super::id::Oid;
use super::resolver::{Resolver, TypeSlot};
use super::Graph;
use crate::collection::{CollectionItem, IndexedCollection};
use crate::comment::parse_comment_data;
use crate::kinds::TypeKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TypeRow {
    pub oid: Oid,
    /// `pg_class` entry backing a composite type (`typrelid`), if any.
    pub class_oid: Option<Oid>,
    pub schema_oid: Oid,
    pub name: String,
    /// `typtype` letter.
    pub kind: String,
    /// Formatted base type for domains.
    pub sql_type: Option<String>,
    /// Enum labels in `enumsortorder` order.
    pub values: Option<Vec<String>>,
    /// `relkind` of the backing class, when `class_oid` is set.
    pub relation_kind: Option<String>,
    pub comment: Option<String>,
}

/// SQL-standard spelling and modifier behavior of a builtin base type.
///
/// The catalogs know `varchar`; consumers expect `character varying`. The
/// modifier flags also drive how a column's `atttypmod` decodes into
/// length/precision/scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinAlias {
    pub name: &'static str,
    pub short_name: Option<&'static str>,
    pub has_length: bool,
    pub has_precision: bool,
    pub has_scale: bool,
}

const fn alias(
    name: &'static str,
    short_name: Option<&'static str>,
    has_length: bool,
    has_precision: bool,
    has_scale: bool,
) -> BuiltinAlias {
    BuiltinAlias { name, short_name, has_length, has_precision, has_scale }
}

/// Alias table for the builtin names PostgreSQL stores internally.
pub fn builtin_alias(internal_name: &str) -> Option<BuiltinAlias> {
    Some(match internal_name {
        "int2" => alias("smallint", None, false, false, false),
        "int4" => alias("integer", Some("int"), false, false, false),
        "int8" => alias("bigint", None, false, false, false),
        "bool" => alias("boolean", None, false, false, false),
        "float4" => alias("real", None, false, false, false),
        "float8" => alias("double precision", None, false, false, false),
        "varchar" => alias("character varying", Some("varchar"), true, false, false),
        "bpchar" => alias("character", Some("char"), true, false, false),
        "numeric" => alias("numeric", Some("decimal"), false, true, true),
        "bit" => alias("bit", None, true, false, false),
        "varbit" => alias("bit varying", Some("varbit"), true, false, false),
        "timestamp" => alias("timestamp without time zone", Some("timestamp"), false, true, false),
        "timestamptz" => alias("timestamp with time zone", Some("timestamptz"), false, true, false),
        "time" => alias("time without time zone", Some("time"), false, true, false),
        "timetz" => alias("time with time zone", Some("timetz"), false, true, false),
        "interval" => alias("interval", None, false, true, false),
        _ => return None,
    })
}

#[derive(Debug, Clone)]
pub struct Type {
    pub oid: Oid,
    /// Backing `pg_class` entry for composite types.
    pub class_oid: Option<Oid>,
    pub schema_oid: Oid,
    pub schema_name: String,
    /// Display name; for aliased base types the SQL-standard spelling.
    pub name: String,
    /// Catalog `typname` when an alias replaced it as the display name.
    pub internal_name: Option<String>,
    pub short_name: Option<String>,
    pub kind: TypeKind,
    pub has_length: bool,
    pub has_precision: bool,
    pub has_scale: bool,
    /// Underlying type of a domain, formatted with modifiers.
    pub sql_type: Option<String>,
    /// Enum labels in sort order.
    pub values: Vec<String>,
    /// `relkind` of the backing class, when there is one.
    pub(crate) relation_kind: Option<String>,
    /// Attributes of a standalone composite type.
    pub columns: IndexedCollection<Column>,
    /// Check constraints attached to a domain.
    pub check_constraints: IndexedCollection<Constraint>,
    pub comment: Option<String>,
    pub comment_data: Option<Value>,
}

impl Type {
    fn from_row(row: &TypeRow, schema_name: String, token: &str) -> Result<Self> {
        let kind = TypeKind::from_code(&row.kind)?;
        let alias = match kind {
            TypeKind::BaseType => builtin_alias(&row.name),
            _ => None,
        };
        let (name, internal_name, short_name) = match alias {
            Some(alias) => (
                alias.name.to_string(),
                Some(row.name.clone()),
                alias.short_name.map(str::to_string),
            ),
            None => (row.name.clone(), None, None),
        };
        Ok(Self {
            oid: row.oid,
            class_oid: row.class_oid,
            schema_oid: row.schema_oid,
            schema_name,
            name,
            internal_name,
            short_name,
            kind,
            has_length: alias.is_some_and(|a| a.has_length),
            has_precision: alias.is_some_and(|a| a.has_precision),
            has_scale: alias.is_some_and(|a| a.has_scale),
            sql_type: row.sql_type.clone(),
            values: row.values.clone().unwrap_or_default(),
            relation_kind: row.relation_kind.clone(),
            columns: IndexedCollection::new(),
            check_constraints: IndexedCollection::new(),
            comment: row.comment.clone(),
            comment_data: parse_comment_data(row.comment.as_deref(), token),
        })
    }

    /// Whether this is the row type of a table, view, materialized view or
    /// sequence rather than a standalone type.
    pub fn is_entity_backed(&self) -> bool {
        matches!(self.relation_kind.as_deref(), Some("r" | "p" | "v" | "m" | "S"))
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.name)
    }
}

impl CollectionItem for Type {
    fn item_name(&self) -> &str {
        &self.name
    }

    fn item_oid(&self) -> Option<Oid> {
        Some(self.oid)
    }
}

/// Phase 3: types. Schema references resolve against the system schemas
/// first because user objects routinely use `pg_catalog` types.
pub(crate) fn assemble(
    graph: &mut Graph,
    resolver: &mut Resolver,
    rows: &[TypeRow],
    token: &str,
) -> Result<()> {
    for row in rows {
        let slot = resolver.schema(row.schema_oid).ok_or_else(|| {
            anyhow!(
                "type {:?} (oid {}) references unknown schema oid {}",
                row.name,
                row.oid,
                row.schema_oid
            )
        })?;
        let schema_name = graph.schema_ref(slot).name.clone();
        let ty = Type::from_row(row, schema_name, token)?;
        let class_oid = ty.class_oid;
        let pos = graph.schema_mut(slot).types.push(ty)?;
        let type_slot = TypeSlot { schema: slot, pos };
        resolver.record_type(row.oid, type_slot);
        if let Some(class_oid) = class_oid {
            resolver.record_class_type(class_oid, type_slot);
        }
    }
    Ok(())
}
