//! Render API results as JSON, aligned tables or `key: value` text

use serde_json::{Map, Value};
use unicode_width::UnicodeWidthStr;

use crate::errors::Result;

/// Columns that lead a table when present, in this order
const LEADING_COLUMNS: [&str; 7] = [
    "id",
    "name",
    "description",
    "content",
    "status",
    "created_at",
    "updated_at",
];

const MISSING: &str = "N/A";
const NO_ITEMS: &str = "No items found.";
const NO_DATA: &str = "No data available.";

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON, exactly as returned by the API
    Json,
    /// Aligned columns
    Table,
    /// `key: value` lines, one block per record
    #[default]
    Plain,
}

/// Render a list or a single record
pub fn format_output(data: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputFormat::Table => Ok(match data {
            Value::Array(items) => format_list_table(items),
            Value::Object(map) => format_record_table(map),
            other => cell_text(other),
        }),
        OutputFormat::Plain => Ok(match data {
            Value::Array(items) => format_list_plain(items)?,
            Value::Object(map) => format_record_plain(map)?,
            other => cell_text(other),
        }),
    }
}

/// Scalars as bare text; containers as compact JSON
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => MISSING.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(text));
    format!("{}{}", text, " ".repeat(fill))
}

/// Union of keys across records: well-known columns first, then the rest in
/// the order they were first seen
fn column_order(items: &[Value]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for item in items {
        match item {
            Value::Object(map) => {
                for key in map.keys() {
                    if !seen.iter().any(|k| k == key) {
                        seen.push(key.clone());
                    }
                }
            }
            _ => {
                if !seen.iter().any(|k| k == "value") {
                    seen.push("value".to_string());
                }
            }
        }
    }

    let mut columns: Vec<String> = LEADING_COLUMNS
        .iter()
        .filter(|key| seen.iter().any(|k| k == *key))
        .map(|key| key.to_string())
        .collect();
    columns.extend(
        seen.into_iter()
            .filter(|key| !LEADING_COLUMNS.contains(&key.as_str())),
    );
    columns
}

fn cell<'a>(item: &'a Value, column: &str) -> Option<&'a Value> {
    match item {
        Value::Object(map) => map.get(column),
        scalar if column == "value" => Some(scalar),
        _ => None,
    }
}

fn format_list_table(items: &[Value]) -> String {
    if items.is_empty() {
        return NO_ITEMS.to_string();
    }

    let columns = column_order(items);
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            columns
                .iter()
                .map(|column| match cell(item, column) {
                    Some(value) => cell_text(value),
                    None => MISSING.to_string(),
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            rows.iter()
                .map(|row| display_width(&row[i]))
                .chain(std::iter::once(display_width(column)))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let render = |cells: &[String]| -> String {
        let last = cells.len().saturating_sub(1);
        cells
            .iter()
            .enumerate()
            .map(|(i, text)| {
                if i == last {
                    text.clone()
                } else {
                    pad(text, widths[i])
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let header = render(columns.as_slice());
    let mut lines = vec![header.clone(), "-".repeat(display_width(&header))];
    lines.extend(rows.iter().map(|row| render(row.as_slice())));
    lines.join("\n")
}

fn format_record_table(map: &Map<String, Value>) -> String {
    if map.is_empty() {
        return NO_DATA.to_string();
    }

    let key_width = map.keys().map(|k| display_width(k)).max().unwrap_or(0);
    let mut lines = Vec::new();
    for (key, value) in map {
        match value {
            Value::Object(_) | Value::Array(_) => {
                let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
                let mut parts = pretty.lines();
                if let Some(first) = parts.next() {
                    lines.push(format!("{}  {}", pad(key, key_width), first));
                }
                for rest in parts {
                    lines.push(format!("{}{}", " ".repeat(key_width + 2), rest));
                }
            }
            other => lines.push(format!("{}  {}", pad(key, key_width), cell_text(other))),
        }
    }
    lines.join("\n")
}

/// `key: value` lines for one record; nested values as indented JSON
fn plain_lines(map: &Map<String, Value>, lines: &mut Vec<String>) -> Result<()> {
    for (key, value) in map {
        match value {
            Value::Null => lines.push(format!("{}: ", key)),
            Value::Object(_) | Value::Array(_) => {
                let pretty = serde_json::to_string_pretty(value)?;
                let mut parts = pretty.lines();
                if let Some(first) = parts.next() {
                    lines.push(format!("{}: {}", key, first));
                }
                lines.extend(parts.map(|rest| format!("  {}", rest)));
            }
            other => lines.push(format!("{}: {}", key, cell_text(other))),
        }
    }
    Ok(())
}

fn format_list_plain(items: &[Value]) -> Result<String> {
    if items.is_empty() {
        return Ok(NO_ITEMS.to_string());
    }

    let mut lines = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            lines.push(String::new());
        }
        match item {
            Value::Object(map) => plain_lines(map, &mut lines)?,
            other => lines.push(cell_text(other)),
        }
    }
    Ok(lines.join("\n"))
}

fn format_record_plain(map: &Map<String, Value>) -> Result<String> {
    if map.is_empty() {
        return Ok(NO_DATA.to_string());
    }
    let mut lines = Vec::new();
    plain_lines(map, &mut lines)?;
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_is_pretty_and_unfiltered() {
        let data = json!({"id": 1, "nested": {"a": null}});
        let out = format_output(&data, OutputFormat::Json).unwrap();
        assert!(out.contains("\n  \"id\": 1"));
        assert_eq!(serde_json::from_str::<Value>(&out).unwrap(), data);
    }

    #[test]
    fn test_column_order_prefers_known_keys() {
        let items = vec![json!({"zeta": 1, "name": "n", "id": 2}), json!({"alpha": 3})];
        assert_eq!(column_order(&items), vec!["id", "name", "zeta", "alpha"]);
    }

    #[test]
    fn test_table_missing_and_null_cells() {
        let items = json!([{"id": 1, "name": null}, {"id": 2, "name": "B", "extra": "x"}]);
        let out = format_output(&items, OutputFormat::Table).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "id | name | extra");
        assert!(lines[1].chars().all(|c| c == '-'));
        assert_eq!(lines[2], "1  | N/A  | N/A");
        assert_eq!(lines[3], "2  | B    | x");
    }

    #[test]
    fn test_table_aligns_wide_characters() {
        let items = json!([{"id": 1, "name": "日本", "status": "ok"}, {"id": 2, "name": "ab", "status": "ok"}]);
        let out = format_output(&items, OutputFormat::Table).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[2], "1  | 日本 | ok");
        assert_eq!(lines[3], "2  | ab   | ok");
    }

    #[test]
    fn test_record_table() {
        let out = format_output(&json!({"id": 5, "name": "Proj", "dock": [1]}), OutputFormat::Table)
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "id    5");
        assert_eq!(lines[1], "name  Proj");
        assert_eq!(lines[2], "dock  [");
    }

    #[test]
    fn test_plain_keeps_insertion_order() {
        let out = format_output(&json!([{"name": "A", "id": 1}]), OutputFormat::Plain).unwrap();
        assert_eq!(out, "name: A\nid: 1");
    }

    #[test]
    fn test_plain_nested_and_null() {
        let out = format_output(&json!({"id": 1, "bucket": {"id": 2}, "parent": null}), OutputFormat::Plain)
            .unwrap();
        assert_eq!(out, "id: 1\nbucket: {\n    \"id\": 2\n  }\nparent: ");
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(format_output(&json!([]), OutputFormat::Table).unwrap(), NO_ITEMS);
        assert_eq!(format_output(&json!([]), OutputFormat::Plain).unwrap(), NO_ITEMS);
        assert_eq!(format_output(&json!({}), OutputFormat::Plain).unwrap(), NO_DATA);
    }
}
