//! Functions, procedures, aggregates and window functions.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::id::Oid;
use super::resolver::{FunctionSlot, Resolver};
use super::Graph;
use crate::collection::CollectionItem;
use crate::comment::parse_comment_data;
use crate::kinds::{ArgumentMode, FunctionKind, Volatility};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FunctionRow {
    pub oid: Oid,
    pub schema_oid: Oid,
    /// `prokind` letter.
    pub kind: String,
    pub name: String,
    /// `pg_get_function_identity_arguments` text; disambiguates overloads.
    pub identity_arguments: String,
    /// Formatted type of every argument, in declaration order.
    pub argument_types: Option<Vec<String>>,
    pub argument_names: Option<Vec<String>>,
    /// `proargmodes` letters; absent when every argument is IN.
    pub argument_modes: Option<Vec<String>>,
    pub return_type: String,
    pub returns_set: bool,
    pub language: String,
    /// `provolatile` letter.
    pub volatility: String,
    pub is_strict: bool,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionArgument {
    pub name: Option<String>,
    pub data_type: String,
    pub mode: ArgumentMode,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub oid: Oid,
    pub schema_oid: Oid,
    pub schema_name: String,
    pub name: String,
    pub kind: FunctionKind,
    /// `name(identity arguments)`; the collection key, so overloads coexist.
    pub signature: String,
    pub arguments: Vec<FunctionArgument>,
    pub return_type: String,
    pub returns_set: bool,
    pub language: String,
    pub volatility: Volatility,
    pub is_strict: bool,
    pub comment: Option<String>,
    pub comment_data: Option<Value>,
}

impl Function {
    fn from_row(row: &FunctionRow, schema_name: String, token: &str) -> Result<Self> {
        let types = row.argument_types.clone().unwrap_or_default();
        let mut arguments = Vec::with_capacity(types.len());
        for (position, data_type) in types.into_iter().enumerate() {
            let name = row
                .argument_names
                .as_ref()
                .and_then(|names| names.get(position))
                .filter(|name| !name.is_empty())
                .cloned();
            let mode = match row.argument_modes.as_ref().and_then(|modes| modes.get(position)) {
                Some(code) => ArgumentMode::from_code(code)?,
                None => ArgumentMode::In,
            };
            arguments.push(FunctionArgument { name, data_type, mode });
        }
        Ok(Self {
            oid: row.oid,
            schema_oid: row.schema_oid,
            schema_name,
            name: row.name.clone(),
            kind: FunctionKind::from_code(&row.kind)?,
            signature: format!("{}({})", row.name, row.identity_arguments),
            arguments,
            return_type: row.return_type.clone(),
            returns_set: row.returns_set,
            language: row.language.clone(),
            volatility: Volatility::from_code(&row.volatility)?,
            is_strict: row.is_strict,
            comment: row.comment.clone(),
            comment_data: parse_comment_data(row.comment.as_deref(), token),
        })
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.signature)
    }
}

impl CollectionItem for Function {
    fn item_name(&self) -> &str {
        &self.signature
    }

    fn item_oid(&self) -> Option<Oid> {
        Some(self.oid)
    }
}

/// Phase 8: functions, dispatched by kind into the four per-schema
/// collections.
pub(crate) fn assemble(
    graph: &mut Graph,
    resolver: &mut Resolver,
    rows: &[FunctionRow],
    token: &str,
) -> Result<()> {
    for row in rows {
        let slot = resolver.schema(row.schema_oid).ok_or_else(|| {
            anyhow!(
                "function {:?} (oid {}) references unknown schema oid {}",
                row.name,
                row.oid,
                row.schema_oid
            )
        })?;
        let schema_name = graph.schema_ref(slot).name.clone();
        let function = Function::from_row(row, schema_name, token)?;
        let kind = function.kind;
        let schema = graph.schema_mut(slot);
        let collection = match kind {
            FunctionKind::NormalFunction => &mut schema.normal_functions,
            FunctionKind::Procedure => &mut schema.procedures,
            FunctionKind::AggregateFunction => &mut schema.aggregate_functions,
            FunctionKind::WindowFunction => &mut schema.window_functions,
        };
        let pos = collection.push(function)?;
        resolver.record_function(row.oid, FunctionSlot { schema: slot, kind, pos });
    }
    Ok(())
}
