//! Build configuration.

use serde::{Deserialize, Serialize};

use crate::relations::RelationNameFunctions;

/// Options accepted by [`pg_structure`](crate::pg_structure).
///
/// The whole record travels inside a serialized snapshot so a deserialized
/// `Db` replays assembly under the same configuration. Custom relation naming
/// functions are the one exception: only their tag survives serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Prefix for connection environment variables (`DB` reads `DB_HOST`,
    /// `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_DATABASE`,
    /// `DB_CONNECTION_STRING`).
    pub env_prefix: String,
    /// Name of the built `Db`; defaults to `current_database()`.
    pub name: Option<String>,
    /// Token marking a JSON metadata block inside object comments.
    pub comment_data_token: String,
    /// SQL `LIKE` patterns for schemas to load. `None` loads everything that
    /// is not excluded.
    pub include_schemas: Option<Vec<String>>,
    /// SQL `NOT LIKE` patterns for schemas to skip.
    pub exclude_schemas: Option<Vec<String>>,
    /// Let `pg_%` and `information_schema` join the include list.
    pub include_system_schemas: bool,
    /// Separator splitting alias pairs embedded in foreign key names.
    pub foreign_key_alias_separator: String,
    /// Aliases embedded in foreign key names name the target side first.
    pub foreign_key_alias_target_first: bool,
    /// Relation naming strategy.
    pub relation_name_functions: RelationNameFunctions,
    /// Keep the crate-created connection pool alive on the returned `Db`.
    pub keep_connection: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            env_prefix: "DB".to_string(),
            name: None,
            comment_data_token: "pg-structure".to_string(),
            include_schemas: None,
            exclude_schemas: None,
            include_system_schemas: false,
            foreign_key_alias_separator: ",".to_string(),
            foreign_key_alias_target_first: false,
            relation_name_functions: RelationNameFunctions::Short,
            keep_connection: false,
        }
    }
}

impl Options {
    /// Patterns fed to `nspname LIKE ANY(...)` during schema discovery.
    pub(crate) fn schema_include_patterns(&self) -> Vec<String> {
        let mut include = self
            .include_schemas
            .clone()
            .unwrap_or_else(|| vec!["%".to_string()]);
        if self.include_system_schemas {
            include.push("pg_%".to_string());
            include.push("information_schema".to_string());
        }
        include
    }

    /// Patterns fed to `nspname NOT LIKE ANY(...)`. Toast and per-backend
    /// temp schemas are always out; the system namespaces stay out unless
    /// requested. `pg_catalog` itself is filtered separately because it is
    /// owned by the system schema list.
    pub(crate) fn schema_exclude_patterns(&self) -> Vec<String> {
        let mut exclude = vec![
            "pg_toast".to_string(),
            "pg_temp_%".to_string(),
            "pg_toast_temp_%".to_string(),
        ];
        if !self.include_system_schemas {
            exclude.push("pg_%".to_string());
            exclude.push("information_schema".to_string());
        }
        exclude.extend(self.exclude_schemas.clone().unwrap_or_default());
        exclude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = Options::default();
        assert_eq!(options.env_prefix, "DB");
        assert_eq!(options.comment_data_token, "pg-structure");
        assert_eq!(options.foreign_key_alias_separator, ",");
        assert!(!options.foreign_key_alias_target_first);
        assert!(!options.include_system_schemas);
        assert!(!options.keep_connection);
    }

    #[test]
    fn default_patterns_exclude_system_schemas() {
        let options = Options::default();
        assert_eq!(options.schema_include_patterns(), ["%"]);
        let exclude = options.schema_exclude_patterns();
        assert!(exclude.contains(&"pg_%".to_string()));
        assert!(exclude.contains(&"information_schema".to_string()));
        assert!(exclude.contains(&"pg_toast".to_string()));
    }

    #[test]
    fn include_system_schemas_joins_include_list() {
        let options = Options {
            include_system_schemas: true,
            ..Default::default()
        };
        let include = options.schema_include_patterns();
        assert!(include.contains(&"pg_%".to_string()));
        assert!(include.contains(&"information_schema".to_string()));
        let exclude = options.schema_exclude_patterns();
        assert!(!exclude.contains(&"pg_%".to_string()));
        // Toast and temp schemas stay excluded no matter what.
        assert!(exclude.contains(&"pg_toast".to_string()));
        assert!(exclude.contains(&"pg_temp_%".to_string()));
    }

    #[test]
    fn user_patterns_pass_through() {
        let options = Options {
            include_schemas: Some(vec!["pub%".to_string()]),
            exclude_schemas: Some(vec!["pub_test".to_string()]),
            ..Default::default()
        };
        assert_eq!(options.schema_include_patterns(), ["pub%"]);
        assert!(options
            .schema_exclude_patterns()
            .contains(&"pub_test".to_string()));
    }

    #[test]
    fn options_round_trip_through_json() {
        let options = Options {
            name: Some("snapshot".to_string()),
            include_schemas: Some(vec!["public".to_string()]),
            ..Default::default()
        };
        let json = serde_json::to_string(&options).unwrap();
        let back: Options = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name.as_deref(), Some("snapshot"));
        assert_eq!(back.include_schemas, Some(vec!["public".to_string()]));
        assert_eq!(back.relation_name_functions.tag(), "short");
    }
}
