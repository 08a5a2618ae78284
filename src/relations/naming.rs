//! Relation naming strategies.
//!
//! A strategy is a pure function from a relation's structural context to a
//! name. Built-ins are selected by tag; a custom function can be injected
//! directly. Serialization only preserves the tag, so custom strategies must
//! be re-injected after deserialization.

use std::sync::Arc;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::catalog::constraint::{Constraint, ConstraintDetail};
use crate::catalog::table::Table;

/// Which shape of relation a name is being produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    ManyToOne,
    OneToMany,
    ManyToMany,
}

/// Everything a naming function may look at.
///
/// For M2O the foreign key is the relation's own; for O2M it is the incoming
/// one; for M2M it is the join table's foreign key toward the far side, with
/// the near-side one in `foreign_key_to_self`.
pub struct RelationNameContext<'a> {
    pub kind: RelationKind,
    pub source_table: &'a Table,
    pub target_table: &'a Table,
    pub join_table: Option<&'a Table>,
    pub foreign_key: &'a Constraint,
    pub foreign_key_to_self: Option<&'a Constraint>,
    /// Separator splitting alias pairs embedded in constraint names.
    pub separator: &'a str,
    /// Alias pairs name the target side first.
    pub target_first: bool,
}

impl<'a> RelationNameContext<'a> {
    /// Alias pair embedded in the foreign key's name, as
    /// `(source_alias, target_alias)` from the key's own perspective.
    /// `order,items` names the owning side `order` and the referenced side
    /// `items`; `target_first` swaps the reading.
    pub fn fk_aliases(&self) -> Option<(&'a str, &'a str)> {
        let mut parts = self.foreign_key.name.splitn(3, self.separator);
        let first = parts.next()?.trim();
        let second = parts.next()?.trim();
        if parts.next().is_some() || first.is_empty() || second.is_empty() {
            return None;
        }
        if self.target_first {
            Some((second, first))
        } else {
            Some((first, second))
        }
    }
}

type NamingFn = dyn Fn(&RelationNameContext<'_>) -> String + Send + Sync;

/// Naming strategy selected by tag or injected directly.
#[derive(Clone)]
pub enum RelationNameFunctions {
    /// Bare target-side names; collisions handled by the engine's suffix
    /// rule. The default.
    Short,
    /// Like `Short`, but a single-column key such as `owner_id` names its
    /// M2O relation `owner` instead of the target table's name.
    Optimal,
    Custom(Arc<NamingFn>),
}

impl RelationNameFunctions {
    pub fn tag(&self) -> &'static str {
        match self {
            RelationNameFunctions::Short => "short",
            RelationNameFunctions::Optimal => "optimal",
            RelationNameFunctions::Custom(_) => "custom",
        }
    }

    pub(crate) fn name_for(&self, ctx: &RelationNameContext<'_>) -> String {
        match self {
            RelationNameFunctions::Short => short(ctx),
            RelationNameFunctions::Optimal => optimal(ctx),
            RelationNameFunctions::Custom(f) => f(ctx),
        }
    }
}

impl std::fmt::Debug for RelationNameFunctions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationNameFunctions::Custom(_) => f.write_str("Custom(..)"),
            other => f.write_str(other.tag()),
        }
    }
}

impl Serialize for RelationNameFunctions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for RelationNameFunctions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        match tag.as_str() {
            "short" => Ok(RelationNameFunctions::Short),
            // Custom functions cannot be reconstructed from a snapshot; the
            // caller re-injects one or falls back to the default.
            "custom" => Ok(RelationNameFunctions::Short),
            "optimal" => Ok(RelationNameFunctions::Optimal),
            other => Err(D::Error::custom(format!(
                "unknown relation naming strategy {other:?}"
            ))),
        }
    }
}

/// The relation's name points at the far side: the referenced table for M2O,
/// the owning table for O2M, the far table for M2M. An embedded alias wins
/// over the table name.
fn short(ctx: &RelationNameContext<'_>) -> String {
    let aliases = ctx.fk_aliases();
    let alias = match ctx.kind {
        // The referenced side of the key.
        RelationKind::ManyToOne | RelationKind::ManyToMany => aliases.map(|(_, target)| target),
        // The owning side of the incoming key.
        RelationKind::OneToMany => aliases.map(|(source, _)| source),
    };
    alias
        .map(str::to_string)
        .unwrap_or_else(|| ctx.target_table.name.clone())
}

fn optimal(ctx: &RelationNameContext<'_>) -> String {
    if ctx.kind == RelationKind::ManyToOne
        && ctx.fk_aliases().is_none()
        && let ConstraintDetail::ForeignKey(fk) = &ctx.foreign_key.detail
        && let [column] = fk.columns.as_slice()
        && let Some(stem) = column.strip_suffix("_id")
        && !stem.is_empty()
    {
        return stem.to_string();
    }
    short(ctx)
}
