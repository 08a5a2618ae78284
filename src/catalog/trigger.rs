//! Triggers.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::function::Function;
use super::id::Oid;
use super::resolver::Resolver;
use super::{Db, Graph};
use crate::collection::CollectionItem;
use crate::comment::parse_comment_data;

// TRIGGER_TYPE_* bits of pg_trigger.tgtype.
const TRIGGER_TYPE_ROW: i16 = 1 << 0;
const TRIGGER_TYPE_BEFORE: i16 = 1 << 1;
const TRIGGER_TYPE_INSERT: i16 = 1 << 2;
const TRIGGER_TYPE_DELETE: i16 = 1 << 3;
const TRIGGER_TYPE_UPDATE: i16 = 1 << 4;
const TRIGGER_TYPE_TRUNCATE: i16 = 1 << 5;
const TRIGGER_TYPE_INSTEAD: i16 = 1 << 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TriggerRow {
    pub oid: Oid,
    pub table_oid: Oid,
    pub function_oid: Oid,
    pub name: String,
    /// Raw `tgtype` bitmask.
    pub type_flags: i16,
    /// Authoritative definition from `pg_get_triggerdef`.
    pub definition: String,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerTiming {
    Before,
    After,
    InsteadOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
    Truncate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOrientation {
    Row,
    Statement,
}

#[derive(Debug, Clone)]
pub struct Trigger {
    pub oid: Oid,
    pub table_oid: Oid,
    pub schema_name: String,
    pub table_name: String,
    pub name: String,
    pub function_oid: Oid,
    pub function_schema: String,
    pub function_name: String,
    pub timing: TriggerTiming,
    pub events: Vec<TriggerEvent>,
    pub orientation: TriggerOrientation,
    pub definition: String,
    pub comment: Option<String>,
    pub comment_data: Option<Value>,
}

impl Trigger {
    pub fn full_name(&self) -> String {
        format!("{}.{}.{}", self.schema_name, self.table_name, self.name)
    }

    /// The trigger function within the graph.
    pub fn function<'d>(&self, db: &'d Db) -> Option<&'d Function> {
        db.function_by_oid(self.function_oid)
    }
}

impl CollectionItem for Trigger {
    fn item_name(&self) -> &str {
        &self.name
    }

    fn item_oid(&self) -> Option<Oid> {
        Some(self.oid)
    }
}

fn decode_timing(flags: i16) -> TriggerTiming {
    if flags & TRIGGER_TYPE_INSTEAD != 0 {
        TriggerTiming::InsteadOf
    } else if flags & TRIGGER_TYPE_BEFORE != 0 {
        TriggerTiming::Before
    } else {
        TriggerTiming::After
    }
}

fn decode_events(flags: i16) -> Vec<TriggerEvent> {
    let mut events = Vec::new();
    if flags & TRIGGER_TYPE_INSERT != 0 {
        events.push(TriggerEvent::Insert);
    }
    if flags & TRIGGER_TYPE_UPDATE != 0 {
        events.push(TriggerEvent::Update);
    }
    if flags & TRIGGER_TYPE_DELETE != 0 {
        events.push(TriggerEvent::Delete);
    }
    if flags & TRIGGER_TYPE_TRUNCATE != 0 {
        events.push(TriggerEvent::Truncate);
    }
    events
}

fn decode_orientation(flags: i16) -> TriggerOrientation {
    if flags & TRIGGER_TYPE_ROW != 0 {
        TriggerOrientation::Row
    } else {
        TriggerOrientation::Statement
    }
}

/// Phase 9: triggers. A missing parent entity is a broken graph; a missing
/// function only drops the trigger.
pub(crate) fn assemble(
    graph: &mut Graph,
    resolver: &mut Resolver,
    rows: &[TriggerRow],
    token: &str,
) -> Result<()> {
    for row in rows {
        let entity_slot = resolver.entity(row.table_oid).ok_or_else(|| {
            anyhow!(
                "trigger {:?} (oid {}) references unknown entity oid {}",
                row.name,
                row.oid,
                row.table_oid
            )
        })?;
        let Some(function_slot) = resolver.function(row.function_oid) else {
            warn!(
                trigger = %row.name,
                function_oid = %row.function_oid,
                "trigger references a function outside the loaded schemas; skipping"
            );
            continue;
        };
        let (function_schema, function_name) = {
            let function = graph.function_ref(function_slot);
            (function.schema_name.clone(), function.name.clone())
        };
        let (schema_name, table_name) = graph.entity_names(entity_slot);
        let trigger = Trigger {
            oid: row.oid,
            table_oid: row.table_oid,
            schema_name,
            table_name,
            name: row.name.clone(),
            function_oid: row.function_oid,
            function_schema,
            function_name,
            timing: decode_timing(row.type_flags),
            events: decode_events(row.type_flags),
            orientation: decode_orientation(row.type_flags),
            definition: row.definition.clone(),
            comment: row.comment.clone(),
            comment_data: parse_comment_data(row.comment.as_deref(), token),
        };
        graph.push_trigger(entity_slot, trigger)?;
    }
    Ok(())
}
