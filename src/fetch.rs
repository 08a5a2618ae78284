//! Catalog query execution.
//!
//! Discovery (server version, database name, schema lists) runs first; the
//! seven versioned catalog queries follow, sequentially, on one connection so
//! every row set observes the same snapshot and search_path.

use anyhow::{Context, Result, bail};
use sqlx::PgPool;
use tracing::info;

use crate::catalog::column::ColumnRow;
use crate::catalog::constraint::ConstraintRow;
use crate::catalog::entity::EntityRow;
use crate::catalog::function::FunctionRow;
use crate::catalog::index::IndexRow;
use crate::catalog::pg_type::TypeRow;
use crate::catalog::schema::SchemaRow;
use crate::catalog::trigger::TriggerRow;
use crate::options::Options;
use crate::snapshot::{QueryResults, Snapshot};
use crate::sql_loader::{MIN_SERVER_VERSION, catalog_sql};

const USER_SCHEMAS_SQL: &str = "\
SELECT n.oid::int8 AS oid, n.nspname AS name, d.description AS comment
FROM pg_namespace n
LEFT JOIN pg_description d ON d.objoid = n.oid AND d.objsubid = 0
WHERE n.nspname LIKE ANY($1)
  AND NOT (n.nspname LIKE ANY($2))
  AND n.nspname <> 'pg_catalog'
ORDER BY n.nspname";

const SYSTEM_SCHEMAS_SQL: &str = "\
SELECT n.oid::int8 AS oid, n.nspname AS name, d.description AS comment
FROM pg_namespace n
LEFT JOIN pg_description d ON d.objoid = n.oid AND d.objsubid = 0
WHERE n.nspname = 'pg_catalog'
ORDER BY n.nspname";

pub(crate) async fn fetch_snapshot(pool: &PgPool, options: &Options) -> Result<Snapshot> {
    let mut conn = pool.acquire().await.context("failed to acquire connection")?;

    // Consistent search_path so reformatted expressions render the same way
    // across all queries.
    sqlx::query("SET search_path = public, pg_catalog")
        .execute(&mut *conn)
        .await?;

    let (server_version, database_name): (i64, String) = sqlx::query_as(
        "SELECT current_setting('server_version_num')::int8, current_database()",
    )
    .fetch_one(&mut *conn)
    .await
    .context("failed to read server version")?;
    if server_version < MIN_SERVER_VERSION {
        bail!(
            "server version {server_version} is not supported (minimum is {MIN_SERVER_VERSION})"
        );
    }
    info!(server_version, database = %database_name, "discovering schemas");

    let include = options.schema_include_patterns();
    let exclude = options.schema_exclude_patterns();
    let schemas: Vec<SchemaRow> = sqlx::query_as(USER_SCHEMAS_SQL)
        .bind(&include)
        .bind(&exclude)
        .fetch_all(&mut *conn)
        .await
        .context("failed to discover schemas")?;
    let system_schemas: Vec<SchemaRow> = sqlx::query_as(SYSTEM_SCHEMAS_SQL)
        .fetch_all(&mut *conn)
        .await?;

    let user_oids: Vec<i64> = schemas.iter().map(|s| s.oid.0).collect();
    // Types resolve against the system schemas too: user columns reference
    // pg_catalog types.
    let mut all_oids = user_oids.clone();
    all_oids.extend(system_schemas.iter().map(|s| s.oid.0));
    info!(user = schemas.len(), system = system_schemas.len(), "discovered schemas");

    let types: Vec<TypeRow> = sqlx::query_as(catalog_sql(server_version, "type")?)
        .bind(&all_oids)
        .fetch_all(&mut *conn)
        .await
        .context("type query failed")?;
    let entities: Vec<EntityRow> = sqlx::query_as(catalog_sql(server_version, "entity")?)
        .bind(&user_oids)
        .fetch_all(&mut *conn)
        .await
        .context("entity query failed")?;
    let columns: Vec<ColumnRow> = sqlx::query_as(catalog_sql(server_version, "column")?)
        .bind(&user_oids)
        .fetch_all(&mut *conn)
        .await
        .context("column query failed")?;
    let indexes: Vec<IndexRow> = sqlx::query_as(catalog_sql(server_version, "index")?)
        .bind(&user_oids)
        .fetch_all(&mut *conn)
        .await
        .context("index query failed")?;
    let constraints: Vec<ConstraintRow> = sqlx::query_as(catalog_sql(server_version, "constraint")?)
        .bind(&user_oids)
        .fetch_all(&mut *conn)
        .await
        .context("constraint query failed")?;
    let functions: Vec<FunctionRow> = sqlx::query_as(catalog_sql(server_version, "function")?)
        .bind(&user_oids)
        .fetch_all(&mut *conn)
        .await
        .context("function query failed")?;
    let triggers: Vec<TriggerRow> = sqlx::query_as(catalog_sql(server_version, "trigger")?)
        .bind(&user_oids)
        .fetch_all(&mut *conn)
        .await
        .context("trigger query failed")?;

    Ok(Snapshot {
        name: options.name.clone().unwrap_or(database_name),
        server_version,
        config: options.clone(),
        query_results: QueryResults {
            schemas,
            system_schemas,
            types,
            entities,
            columns,
            indexes,
            constraints,
            functions,
            triggers,
        },
    })
}
