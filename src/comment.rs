//! Structured metadata embedded in object comments.
//!
//! A comment may carry a JSON block after a configurable token, e.g.
//! `COMMENT ON TABLE account IS 'User accounts. [pg] {"hidden": true}'` with
//! token `[pg]`. The block is parsed on assembly and exposed next to the raw
//! comment. Anything that fails to parse yields no data, never an error.

use serde_json::Value;

pub(crate) fn parse_comment_data(comment: Option<&str>, token: &str) -> Option<Value> {
    let comment = comment?;
    if token.is_empty() {
        return None;
    }
    let start = comment.find(token)? + token.len();
    let tail = comment[start..].trim_start();
    // Streaming parse so trailing prose after the JSON block is tolerated.
    let mut stream = serde_json::Deserializer::from_str(tail).into_iter::<Value>();
    match stream.next() {
        Some(Ok(value)) => Some(value),
        _ => None,
    }
}
