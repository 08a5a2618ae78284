//! Sequences.

use serde_json::Value;

use super::id::Oid;
use crate::collection::CollectionItem;

#[derive(Debug, Clone)]
pub struct Sequence {
    pub oid: Oid,
    pub schema_oid: Oid,
    pub schema_name: String,
    pub name: String,
    pub comment: Option<String>,
    pub comment_data: Option<Value>,
}

impl Sequence {
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.name)
    }
}

impl CollectionItem for Sequence {
    fn item_name(&self) -> &str {
        &self.name
    }

    fn item_oid(&self) -> Option<Oid> {
        Some(self.oid)
    }
}
