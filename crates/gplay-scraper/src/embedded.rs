//! Extraction of the JSON data blobs Play Store pages embed in `<script>`
//! tags.
//!
//! ## Observed shapes
//!
//! Older pages:
//! ```text
//! AF_initDataCallback({key: 'ds:3', isError: false, hash: '7', data:function(){return [[...]]}});
//! ```
//! Newer pages:
//! ```text
//! AF_initDataCallback({key: 'ds:3', hash: '7', data:[[...]], sideChannel: {}});
//! ```
//! Either way the payload is a single JSON array starting right after
//! `data:` (optionally behind `function(){return`). We decode it with a
//! streaming deserializer so whatever trails the array is never inspected.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::ScraperError;

const CALLBACK_MARKER: &str = "AF_initDataCallback(";

static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*\{\s*key:\s*['"]([^'"]+)['"]"#).expect("valid key regex"));
static DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"data:\s*(?:function\s*\(\s*\)\s*\{\s*return\s*)?\[").expect("valid data regex")
});

/// Decodes every `AF_initDataCallback` block in `html`, keyed by its
/// `ds:N` key.
///
/// Blocks without a recognisable key or `data:` array are skipped; they
/// carry nothing the extractors use.
///
/// # Errors
///
/// Returns [`ScraperError::Deserialize`] when a keyed block's array is not
/// valid JSON. That means the page is truncated or the format changed.
pub fn extract_embedded_documents(html: &str) -> Result<HashMap<String, Value>, ScraperError> {
    let mut documents = HashMap::new();

    for (start, _) in html.match_indices(CALLBACK_MARKER) {
        let block = &html[start + CALLBACK_MARKER.len()..];
        let Some(key) = KEY_RE
            .captures(block)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_owned())
        else {
            continue;
        };

        // Bound the data search to this block so a keyless neighbour is
        // never read as ours.
        let block_end = block.find(CALLBACK_MARKER).unwrap_or(block.len());
        let Some(data) = DATA_RE.find(&block[..block_end]) else {
            tracing::debug!(key = %key, "embedded block has no data array");
            continue;
        };

        // `data.end()` sits one past the opening bracket.
        let json_start = data.end() - 1;
        let value = serde_json::Deserializer::from_str(&block[json_start..])
            .into_iter::<Value>()
            .next()
            .transpose()
            .map_err(|source| ScraperError::Deserialize {
                context: format!("embedded document {key}"),
                source,
            })?;

        if let Some(value) = value {
            documents.insert(key, value);
        }
    }

    Ok(documents)
}

/// Convenience wrapper returning a single document.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] when `key` is not on the page, or
/// propagates decoding errors from [`extract_embedded_documents`].
pub fn extract_embedded_document(html: &str, key: &str) -> Result<Value, ScraperError> {
    extract_embedded_documents(html)?
        .remove(key)
        .ok_or_else(|| ScraperError::parse("embedded document", format!("no '{key}' block")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extracts_function_wrapped_data() {
        let html = r"<script>AF_initDataCallback({key: 'ds:3', isError: false, hash: '7', data:function(){return [[1,[2,3]]]}});</script>";
        let docs = extract_embedded_documents(html).unwrap();
        assert_eq!(docs["ds:3"], json!([[1, [2, 3]]]));
    }

    #[test]
    fn extracts_inline_data_with_side_channel() {
        let html = r"<script>AF_initDataCallback({key: 'ds:5', hash: '2', data:[null,'x'], sideChannel: {}});</script>";
        // Single-quoted strings are not JSON.
        assert!(extract_embedded_documents(html).is_err());

        let html = r#"<script>AF_initDataCallback({key: 'ds:5', hash: '2', data:[null,"x"], sideChannel: {}});</script>"#;
        let docs = extract_embedded_documents(html).unwrap();
        assert_eq!(docs["ds:5"], json!([null, "x"]));
    }

    #[test]
    fn extracts_multiple_blocks() {
        let html = concat!(
            r"<script>AF_initDataCallback({key: 'ds:1', data:[1]});</script>",
            r"<script>AF_initDataCallback({key: 'ds:3', data:function(){return [3]}});</script>",
        );
        let docs = extract_embedded_documents(html).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs["ds:1"], json!([1]));
        assert_eq!(docs["ds:3"], json!([3]));
    }

    #[test]
    fn brackets_inside_strings_do_not_end_the_array() {
        let html = r#"AF_initDataCallback({key: 'ds:3', data:["a]b", ["]"]]});"#;
        let docs = extract_embedded_documents(html).unwrap();
        assert_eq!(docs["ds:3"], json!(["a]b", ["]"]]));
    }

    #[test]
    fn skips_blocks_without_key() {
        let html = r"AF_initDataCallback({isError: false, data:[1]});";
        assert!(extract_embedded_documents(html).unwrap().is_empty());
    }

    #[test]
    fn keyless_block_does_not_lend_data_to_previous_key() {
        let html = concat!(
            r"AF_initDataCallback({key: 'ds:2', hash: '1'});",
            r"AF_initDataCallback({data:[9]});",
        );
        assert!(extract_embedded_documents(html).unwrap().is_empty());
    }

    #[test]
    fn truncated_array_is_deserialize_error() {
        let html = r"AF_initDataCallback({key: 'ds:3', data:[[1,2";
        let err = extract_embedded_documents(html).unwrap_err();
        assert!(matches!(err, ScraperError::Deserialize { .. }), "got: {err:?}");
    }

    #[test]
    fn missing_key_is_parse_error() {
        let err = extract_embedded_document("<html></html>", "ds:3").unwrap_err();
        assert!(matches!(err, ScraperError::Parse { .. }), "got: {err:?}");
    }
}
