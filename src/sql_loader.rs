//! Versioned catalog query resources.
//!
//! The SQL text is opaque to the rest of the crate: queries are embedded
//! under `sql/<major>/<name>.sql` and selected by the nearest directory at or
//! below the server's major version. The table is process-wide and
//! immutable.

use anyhow::{Result, bail};

/// Logical query names, in assembly phase order after schema discovery.
pub(crate) const QUERY_NAMES: [&str; 7] = [
    "type",
    "entity",
    "column",
    "index",
    "constraint",
    "function",
    "trigger",
];

/// Oldest supported server, as `server_version_num`.
pub(crate) const MIN_SERVER_VERSION: i64 = 110000;

/// `(minimum server_version_num, query name, sql)`.
static RESOURCES: &[(i64, &str, &str)] = &[
    (110000, "type", include_str!("../sql/11/type.sql")),
    (110000, "entity", include_str!("../sql/11/entity.sql")),
    (110000, "column", include_str!("../sql/11/column.sql")),
    (110000, "index", include_str!("../sql/11/index.sql")),
    (110000, "constraint", include_str!("../sql/11/constraint.sql")),
    (110000, "function", include_str!("../sql/11/function.sql")),
    (110000, "trigger", include_str!("../sql/11/trigger.sql")),
    // Server 12 adds generated columns.
    (120000, "column", include_str!("../sql/12/column.sql")),
];

/// The catalog query for `name` on a server reporting `server_version_num`,
/// falling back to the nearest lower version tier.
pub(crate) fn catalog_sql(server_version_num: i64, name: &str) -> Result<&'static str> {
    let best = RESOURCES
        .iter()
        .filter(|(min, n, _)| *n == name && *min <= server_version_num)
        .max_by_key(|(min, _, _)| *min);
    match best {
        Some((_, _, sql)) => Ok(sql),
        None => bail!(
            "no catalog query {name:?} for server version {server_version_num} \
             (minimum supported is {MIN_SERVER_VERSION})"
        ),
    }
}
