//! Snapshot serialization.
//!
//! A snapshot holds the raw per-phase row sets plus the build configuration.
//! Assembly is pure over `(query_results, config, naming)`, so replaying the
//! snapshot reconstructs an identical graph; the graph itself is never
//! serialized.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::Db;
use crate::catalog::column::ColumnRow;
use crate::catalog::constraint::ConstraintRow;
use crate::catalog::entity::EntityRow;
use crate::catalog::function::FunctionRow;
use crate::catalog::index::IndexRow;
use crate::catalog::pg_type::TypeRow;
use crate::catalog::schema::SchemaRow;
use crate::catalog::trigger::TriggerRow;
use crate::options::Options;
use crate::relations::RelationNameFunctions;

/// Row sets of the nine catalog queries, in assembly phase order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResults {
    pub schemas: Vec<SchemaRow>,
    pub system_schemas: Vec<SchemaRow>,
    pub types: Vec<TypeRow>,
    pub entities: Vec<EntityRow>,
    pub columns: Vec<ColumnRow>,
    pub indexes: Vec<IndexRow>,
    pub constraints: Vec<ConstraintRow>,
    pub functions: Vec<FunctionRow>,
    pub triggers: Vec<TriggerRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    /// `server_version_num` of the source server.
    pub server_version: i64,
    pub config: Options,
    pub query_results: QueryResults,
}

impl Db {
    /// Dumps the snapshot this graph was built from as JSON.
    pub fn serialize(&self) -> Result<String> {
        serde_json::to_string(self.snapshot()).context("failed to serialize snapshot")
    }
}

/// Rebuilds a `Db` from a serialized snapshot.
///
/// The naming strategy is re-bound by its tag; a snapshot built with a custom
/// strategy falls back to the default and should be rebuilt through
/// [`deserialize_with`].
pub fn deserialize(json: &str) -> Result<Db> {
    let snapshot: Snapshot = serde_json::from_str(json).context("failed to parse snapshot")?;
    if tagged_custom(json) {
        warn!(
            "snapshot was built with a custom relation naming strategy; falling back to \
             the default, use deserialize_with to re-inject it"
        );
    }
    Db::from_snapshot(snapshot)
}

/// Rebuilds a `Db` from a serialized snapshot with an explicitly injected
/// naming strategy.
pub fn deserialize_with(json: &str, naming: RelationNameFunctions) -> Result<Db> {
    let snapshot: Snapshot = serde_json::from_str(json).context("failed to parse snapshot")?;
    Db::from_snapshot_with(snapshot, naming)
}

fn tagged_custom(json: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(json)
        .ok()
        .and_then(|value| {
            value
                .get("config")?
                .get("relation_name_functions")
                .cloned()
        })
        .is_some_and(|tag| tag == "custom")
}
