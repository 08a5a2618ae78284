//! Indexes, including the expression entries of functional indexes.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::id::Oid;
use super::resolver::{IndexSlot, Resolver};
use super::{Db, Graph};
use crate::collection::{CollectionItem, IndexedCollection};
use crate::comment::parse_comment_data;
use crate::catalog::column::Column;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct IndexRow {
    pub oid: Oid,
    pub table_oid: Oid,
    pub name: String,
    /// Access method name from `pg_am`.
    pub method: String,
    pub is_unique: bool,
    pub is_primary: bool,
    /// Predicate of a partial index.
    pub partial_expression: Option<String>,
    /// `indkey` positions for the key columns; `0` marks an expression.
    pub column_positions: Vec<i16>,
    /// Expression texts, consumed in order for each `0` position.
    pub expressions: Vec<String>,
    pub comment: Option<String>,
}

/// Index access method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexMethod {
    Btree,
    Hash,
    Gist,
    Gin,
    Spgist,
    Brin,
    /// Extension-provided access methods.
    Custom(String),
}

impl IndexMethod {
    fn from_name(name: &str) -> Self {
        match name {
            "btree" => IndexMethod::Btree,
            "hash" => IndexMethod::Hash,
            "gist" => IndexMethod::Gist,
            "gin" => IndexMethod::Gin,
            "spgist" => IndexMethod::Spgist,
            "brin" => IndexMethod::Brin,
            other => IndexMethod::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for IndexMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexMethod::Btree => write!(f, "btree"),
            IndexMethod::Hash => write!(f, "hash"),
            IndexMethod::Gist => write!(f, "gist"),
            IndexMethod::Gin => write!(f, "gin"),
            IndexMethod::Spgist => write!(f, "spgist"),
            IndexMethod::Brin => write!(f, "brin"),
            IndexMethod::Custom(s) => write!(f, "{}", s),
        }
    }
}

/// One ordered entry of an index: either a column of the parent entity or an
/// opaque expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexElement {
    Column { name: String, attribute_number: i16 },
    Expression(String),
}

#[derive(Debug, Clone)]
pub struct Index {
    pub oid: Oid,
    pub table_oid: Oid,
    pub schema_name: String,
    pub table_name: String,
    pub name: String,
    pub method: IndexMethod,
    pub is_unique: bool,
    pub is_primary: bool,
    pub partial_expression: Option<String>,
    pub columns_and_expressions: Vec<IndexElement>,
    pub comment: Option<String>,
    pub comment_data: Option<Value>,
}

impl Index {
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.name)
    }

    pub fn is_partial(&self) -> bool {
        self.partial_expression.is_some()
    }

    /// Names of the plain column entries, skipping expressions.
    pub fn column_names(&self) -> Vec<String> {
        self.columns_and_expressions
            .iter()
            .filter_map(|element| match element {
                IndexElement::Column { name, .. } => Some(name.clone()),
                IndexElement::Expression(_) => None,
            })
            .collect()
    }

    /// Column objects on the parent entity, resolved through the graph.
    pub fn columns<'d>(&self, db: &'d Db) -> Vec<&'d Column> {
        let columns = db
            .table_by_oid(self.table_oid)
            .map(|t| &t.columns)
            .or_else(|| db.materialized_view_by_oid(self.table_oid).map(|m| &m.columns));
        let Some(columns) = columns else {
            return Vec::new();
        };
        self.columns_and_expressions
            .iter()
            .filter_map(|element| match element {
                IndexElement::Column { attribute_number, .. } => {
                    columns.get_maybe_ordinal(*attribute_number)
                }
                IndexElement::Expression(_) => None,
            })
            .collect()
    }
}

impl CollectionItem for Index {
    fn item_name(&self) -> &str {
        &self.name
    }

    fn item_oid(&self) -> Option<Oid> {
        Some(self.oid)
    }
}

fn build_elements(
    row: &IndexRow,
    columns: &IndexedCollection<Column>,
) -> Result<Vec<IndexElement>> {
    let mut expressions = row.expressions.iter();
    let mut elements = Vec::with_capacity(row.column_positions.len());
    for &position in &row.column_positions {
        if position > 0 {
            let column = columns.get_maybe_ordinal(position).ok_or_else(|| {
                anyhow!(
                    "index {:?} (oid {}) references missing column {} on entity oid {}",
                    row.name,
                    row.oid,
                    position,
                    row.table_oid
                )
            })?;
            elements.push(IndexElement::Column {
                name: column.name.clone(),
                attribute_number: position,
            });
        } else {
            let expression = expressions.next().ok_or_else(|| {
                anyhow!(
                    "index {:?} (oid {}) has more expression positions than expressions",
                    row.name,
                    row.oid
                )
            })?;
            elements.push(IndexElement::Expression(expression.clone()));
        }
    }
    Ok(elements)
}

/// Phase 6: indexes, attached to tables and materialized views.
pub(crate) fn assemble(
    graph: &mut Graph,
    resolver: &mut Resolver,
    rows: &[IndexRow],
    token: &str,
) -> Result<()> {
    for row in rows {
        let entity_slot = resolver.entity(row.table_oid).ok_or_else(|| {
            anyhow!(
                "index {:?} (oid {}) references unknown entity oid {}",
                row.name,
                row.oid,
                row.table_oid
            )
        })?;
        let elements = {
            let columns = graph.entity_columns(entity_slot).ok_or_else(|| {
                anyhow!(
                    "index {:?} (oid {}) attached to an entity without columns (oid {})",
                    row.name,
                    row.oid,
                    row.table_oid
                )
            })?;
            build_elements(row, columns)?
        };
        let (schema_name, table_name) = graph.entity_names(entity_slot);
        let index = Index {
            oid: row.oid,
            table_oid: row.table_oid,
            schema_name,
            table_name,
            name: row.name.clone(),
            method: IndexMethod::from_name(&row.method),
            is_unique: row.is_unique,
            is_primary: row.is_primary,
            partial_expression: row.partial_expression.clone(),
            columns_and_expressions: elements,
            comment: row.comment.clone(),
            comment_data: parse_comment_data(row.comment.as_deref(), token),
        };
        let pos = graph.push_index(entity_slot, index)?;
        resolver.record_index(row.oid, IndexSlot { entity: entity_slot, pos });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_round_trip() {
        assert_eq!(IndexMethod::from_name("btree"), IndexMethod::Btree);
        assert_eq!(IndexMethod::from_name("gin").to_string(), "gin");
        assert_eq!(
            IndexMethod::from_name("bloom"),
            IndexMethod::Custom("bloom".to_string())
        );
    }
}
