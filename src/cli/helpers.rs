//! Shared helper functions for CLI commands
//!
//! Session loading from flags plus configuration, and rendering of
//! path-keyed maps in the selected output format.

use miette::{IntoDiagnostic, Result};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::args::{FormSourceArgs, OutputFormat};
use crate::core::config::Config;
use crate::core::provider::{EmptyPrefill, FilePrefillProvider, FileSchemaProvider};
use crate::core::session::FormSession;
use crate::schema::node::SchemaNode;
use crate::schema::path::leaves;

/// Widest cell printed in terminal tables
const MAX_CELL: usize = 60;

/// Schema path from the flag, else from configuration
pub fn schema_path(source: &FormSourceArgs, config: &Config) -> Result<PathBuf> {
    source
        .schema
        .clone()
        .or_else(|| config.schema.clone())
        .ok_or_else(|| {
            miette::miette!(
                help = "Pass --schema <FILE>, set SCHEMAFORM_SCHEMA, or add `schema:` to .schemaform.yaml",
                "No schema document given"
            )
        })
}

/// Load a session from the schema and prefill named by flags or configuration
pub fn load_session(source: &FormSourceArgs, config: &Config) -> Result<FormSession> {
    let path = schema_path(source, config)?;
    let strict = !source.lenient && config.strict_schema();
    let schema_provider = FileSchemaProvider::new(path).with_strict(strict);

    let mut session = FormSession::new();
    match source.prefill.as_deref().or(config.prefill.as_deref()) {
        Some(locator) => {
            tracing::debug!(schema = %schema_provider.path().display(), %locator, "loading form");
            session.load(&schema_provider, &FilePrefillProvider::new(), locator)?;
        }
        None => {
            tracing::debug!(schema = %schema_provider.path().display(), "loading form without prefill");
            session.load(&schema_provider, &EmptyPrefill, "")?;
        }
    }
    Ok(session)
}

/// Entries of `map` in the schema's document order; keys the schema does not
/// name are appended in key order
pub fn document_order<T, F>(schema: &SchemaNode, map: &BTreeMap<String, T>, to_json: F) -> Vec<(String, JsonValue)>
where
    F: Fn(&T) -> JsonValue,
{
    let mut rows: Vec<(String, JsonValue)> = leaves(schema)
        .into_iter()
        .filter_map(|leaf| map.get(&leaf.path).map(|v| (leaf.path, to_json(v))))
        .collect();
    for (key, value) in map {
        if !rows.iter().any(|(path, _)| path == key) {
            rows.push((key.clone(), to_json(value)));
        }
    }
    rows
}

/// Render path/value rows in `format`
pub fn render_rows(rows: &[(String, JsonValue)], headers: [&str; 2], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let map: Map<String, JsonValue> = rows.iter().cloned().collect();
            let mut out = serde_json::to_string_pretty(&JsonValue::Object(map)).into_diagnostic()?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Yaml => {
            let map: Map<String, JsonValue> = rows.iter().cloned().collect();
            serde_yml::to_string(&JsonValue::Object(map)).into_diagnostic()
        }
        OutputFormat::Tsv => Ok(format_tsv(rows)),
        OutputFormat::Auto if console::user_attended() => Ok(format_table(rows, headers)),
        OutputFormat::Auto => Ok(format_tsv(rows)),
    }
}

fn format_tsv(rows: &[(String, JsonValue)]) -> String {
    rows.iter()
        .map(|(path, value)| format!("{}\t{}\n", path, escape_tsv(&cell_text(value))))
        .collect()
}

fn format_table(rows: &[(String, JsonValue)], headers: [&str; 2]) -> String {
    let mut builder = Builder::default();
    builder.push_record(headers);
    for (path, value) in rows {
        builder.push_record([path.clone(), truncate_str(&cell_text(value), MAX_CELL)]);
    }
    let mut out = builder.build().with(Style::rounded()).to_string();
    out.push('\n');
    out
}

/// Plain text for a JSON value: strings unquoted, null empty, lists joined
pub fn cell_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(items) => items.iter().map(cell_text).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape tabs and newlines so a value stays on one TSV line
pub fn escape_tsv(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\t', "\\t")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::node::ObjectNode;
    use serde_json::json;

    fn schema() -> SchemaNode {
        ObjectNode::new()
            .property("title", SchemaNode::string())
            .property("openings", SchemaNode::integer())
            .property("skills", SchemaNode::string_list())
            .into()
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("a longer sentence", 10), "a longe...");
        assert_eq!(truncate_str("çççççç", 5), "çç...");
    }

    #[test]
    fn test_escape_tsv() {
        assert_eq!(escape_tsv("a\tb\nc"), "a\\tb\\nc");
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&JsonValue::Null), "");
        assert_eq!(cell_text(&json!("x")), "x");
        assert_eq!(cell_text(&json!(["a", "b"])), "a, b");
        assert_eq!(cell_text(&json!(2.5)), "2.5");
    }

    #[test]
    fn test_document_order() {
        let mut map = BTreeMap::new();
        map.insert("skills".to_string(), "rust");
        map.insert("title".to_string(), "Engineer");
        map.insert("zzz".to_string(), "stray");

        let rows = document_order(&schema(), &map, |v| json!(v));
        let keys: Vec<&str> = rows.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["title", "skills", "zzz"]);
    }

    #[test]
    fn test_render_rows_formats() {
        let rows = vec![
            ("title".to_string(), json!("Engineer")),
            ("openings".to_string(), JsonValue::Null),
        ];
        assert_eq!(
            render_rows(&rows, ["FIELD", "VALUE"], OutputFormat::Tsv).unwrap(),
            "title\tEngineer\nopenings\t\n"
        );

        let json_out = render_rows(&rows, ["FIELD", "VALUE"], OutputFormat::Json).unwrap();
        let parsed: JsonValue = serde_json::from_str(&json_out).unwrap();
        assert_eq!(parsed, json!({"title": "Engineer", "openings": null}));

        let yaml_out = render_rows(&rows, ["FIELD", "VALUE"], OutputFormat::Yaml).unwrap();
        assert!(yaml_out.contains("title: Engineer"));
    }

    #[test]
    fn test_schema_path_requires_source() {
        let err = schema_path(&FormSourceArgs::default(), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("No schema document"));

        let config = Config {
            schema: Some("form.json".into()),
            ..Default::default()
        };
        assert_eq!(
            schema_path(&FormSourceArgs::default(), &config).unwrap(),
            PathBuf::from("form.json")
        );
    }
}
