use serde::{Deserialize, Serialize};

/// PostgreSQL object identifier.
///
/// Catalog queries cast every `oid` output to `int8`, so the wire type is a
/// signed 64-bit integer even though the server value never exceeds 32 bits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct Oid(pub i64);

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Oid {
    fn from(value: i64) -> Self {
        Oid(value)
    }
}

/// Locates a constraint through its owning table.
///
/// Constraint names are unique per table, so the pair is a stable address even
/// though constraints have no database-wide collection of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintRef {
    pub table_oid: Oid,
    pub name: String,
}
