//! One-letter discriminators used by the PostgreSQL catalogs.
//!
//! Every letter-to-variant mapping in the crate lives here so the catalog
//! modules cannot drift apart on what `'r'` or `'f'` means.

use anyhow::{Result, bail};

/// `pg_class.relkind` for the entities the graph models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// `r` (ordinary) and `p` (partitioned) tables.
    Table,
    /// `v`
    View,
    /// `m`
    MaterializedView,
    /// `S`
    Sequence,
}

impl EntityKind {
    pub fn from_code(code: &str) -> Result<Self> {
        Ok(match code {
            "r" | "p" => EntityKind::Table,
            "v" => EntityKind::View,
            "m" => EntityKind::MaterializedView,
            "S" => EntityKind::Sequence,
            other => bail!("unknown relkind {other:?}"),
        })
    }
}

/// Parent of a column as recorded by the parent's `relkind`.
///
/// Columns hang off entities and off standalone composite types (`c`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnParentKind {
    Table,
    View,
    MaterializedView,
    Sequence,
    CompositeType,
}

impl ColumnParentKind {
    pub fn from_code(code: &str) -> Result<Self> {
        Ok(match code {
            "r" | "p" => ColumnParentKind::Table,
            "v" => ColumnParentKind::View,
            "m" => ColumnParentKind::MaterializedView,
            "S" => ColumnParentKind::Sequence,
            "c" => ColumnParentKind::CompositeType,
            other => bail!("unknown column parent relkind {other:?}"),
        })
    }
}

/// `pg_type.typtype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// `b`
    BaseType,
    /// `c`
    CompositeType,
    /// `d`
    Domain,
    /// `e`
    EnumType,
    /// `m`
    MultiRangeType,
    /// `p`
    PseudoType,
    /// `r`
    RangeType,
}

impl TypeKind {
    pub fn from_code(code: &str) -> Result<Self> {
        Ok(match code {
            "b" => TypeKind::BaseType,
            "c" => TypeKind::CompositeType,
            "d" => TypeKind::Domain,
            "e" => TypeKind::EnumType,
            "m" => TypeKind::MultiRangeType,
            "p" => TypeKind::PseudoType,
            "r" => TypeKind::RangeType,
            other => bail!("unknown typtype {other:?}"),
        })
    }
}

/// `pg_proc.prokind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// `f`
    NormalFunction,
    /// `p`
    Procedure,
    /// `a`
    AggregateFunction,
    /// `w`
    WindowFunction,
}

impl FunctionKind {
    pub fn from_code(code: &str) -> Result<Self> {
        Ok(match code {
            "f" => FunctionKind::NormalFunction,
            "p" => FunctionKind::Procedure,
            "a" => FunctionKind::AggregateFunction,
            "w" => FunctionKind::WindowFunction,
            other => bail!("unknown prokind {other:?}"),
        })
    }
}

/// `pg_constraint.contype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// `p`
    PrimaryKey,
    /// `u`
    Unique,
    /// `c`
    Check,
    /// `x`
    Exclusion,
    /// `f`
    ForeignKey,
}

impl ConstraintKind {
    pub fn from_code(code: &str) -> Result<Self> {
        Ok(match code {
            "p" => ConstraintKind::PrimaryKey,
            "u" => ConstraintKind::Unique,
            "c" => ConstraintKind::Check,
            "x" => ConstraintKind::Exclusion,
            "f" => ConstraintKind::ForeignKey,
            other => bail!("unknown contype {other:?}"),
        })
    }
}

/// `pg_constraint.confupdtype` / `confdeltype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FkAction {
    /// `a`
    NoAction,
    /// `r`
    Restrict,
    /// `c`
    Cascade,
    /// `n`
    SetNull,
    /// `d`
    SetDefault,
}

impl FkAction {
    pub fn from_code(code: &str) -> Result<Self> {
        Ok(match code {
            "a" => FkAction::NoAction,
            "r" => FkAction::Restrict,
            "c" => FkAction::Cascade,
            "n" => FkAction::SetNull,
            "d" => FkAction::SetDefault,
            other => bail!("unknown foreign key action {other:?}"),
        })
    }
}

impl std::fmt::Display for FkAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FkAction::NoAction => "NO ACTION",
            FkAction::Restrict => "RESTRICT",
            FkAction::Cascade => "CASCADE",
            FkAction::SetNull => "SET NULL",
            FkAction::SetDefault => "SET DEFAULT",
        })
    }
}

/// `pg_constraint.confmatchtype`. Pre-9.3 catalogs report `u` for the
/// unspecified default, which reads as SIMPLE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchType {
    /// `f`
    Full,
    /// `p`
    Partial,
    /// `s` (or legacy `u`)
    Simple,
}

impl MatchType {
    pub fn from_code(code: &str) -> Result<Self> {
        Ok(match code {
            "f" => MatchType::Full,
            "p" => MatchType::Partial,
            "s" | "u" => MatchType::Simple,
            other => bail!("unknown foreign key match type {other:?}"),
        })
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MatchType::Full => "FULL",
            MatchType::Partial => "PARTIAL",
            MatchType::Simple => "SIMPLE",
        })
    }
}

/// `pg_proc.provolatile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Volatility {
    /// `i`
    Immutable,
    /// `s`
    Stable,
    /// `v`
    Volatile,
}

impl Volatility {
    pub fn from_code(code: &str) -> Result<Self> {
        Ok(match code {
            "i" => Volatility::Immutable,
            "s" => Volatility::Stable,
            "v" => Volatility::Volatile,
            other => bail!("unknown volatility {other:?}"),
        })
    }
}

/// `pg_attribute.attidentity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityKind {
    /// `a`: GENERATED ALWAYS AS IDENTITY
    Always,
    /// `d`: GENERATED BY DEFAULT AS IDENTITY
    ByDefault,
}

impl IdentityKind {
    pub fn from_code(code: &str) -> Result<Self> {
        Ok(match code {
            "a" => IdentityKind::Always,
            "d" => IdentityKind::ByDefault,
            other => bail!("unknown identity kind {other:?}"),
        })
    }
}

/// `pg_proc.proargmodes` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentMode {
    /// `i`
    In,
    /// `o`
    Out,
    /// `b`
    InOut,
    /// `v`
    Variadic,
    /// `t`
    Table,
}

impl ArgumentMode {
    pub fn from_code(code: &str) -> Result<Self> {
        Ok(match code {
            "i" => ArgumentMode::In,
            "o" => ArgumentMode::Out,
            "b" => ArgumentMode::InOut,
            "v" => ArgumentMode::Variadic,
            "t" => ArgumentMode::Table,
            other => bail!("unknown argument mode {other:?}"),
        })
    }
}
