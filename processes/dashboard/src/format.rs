//! Text formatting for message, rate and transform displays

use roswatch_common::{RateSnapshot, Transform};
use serde_json::Value;

/// Pretty-print a message as display lines.
///
/// Objects get one group per top-level field with the first line of each
/// group prefixed by `key: `. Other values are printed whole.
pub fn message_lines(value: &Value) -> Vec<String> {
    let Value::Object(fields) = value else {
        return pretty_lines(value);
    };

    let mut lines = Vec::new();
    for (key, field) in fields {
        for (i, line) in pretty_lines(field).into_iter().enumerate() {
            if i == 0 {
                lines.push(format!("{key}: {line}"));
            } else {
                lines.push(line);
            }
        }
    }
    lines
}

fn pretty_lines(value: &Value) -> Vec<String> {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|_| value.to_string())
        .lines()
        .map(str::to_string)
        .collect()
}

/// The topic view's status line
pub fn info_line(topic: &str, type_name: Option<&str>, rates: &RateSnapshot) -> String {
    format!(
        "Topic: {}  Type: {}  {} Hz  {} KB/s",
        topic,
        type_name.unwrap_or("-"),
        format_rate(rates.hz),
        format_rate(rates.bandwidth_kbps)
    )
}

/// At most three decimals, trailing zeros dropped
pub fn format_rate(value: f64) -> String {
    let fixed = format!("{:.3}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

pub fn transform_lines(transform: &Transform) -> Vec<String> {
    let [x, y, z] = transform.translation;
    let [qx, qy, qz, qw] = transform.rotation;
    vec![
        "translation:".to_string(),
        format!("  x: {x:.6}"),
        format!("  y: {y:.6}"),
        format!("  z: {z:.6}"),
        "rotation:".to_string(),
        format!("  x: {qx:.6}"),
        format!("  y: {qy:.6}"),
        format!("  z: {qz:.6}"),
        format!("  w: {qw:.6}"),
    ]
}

/// Large counts with K/M suffixes
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}
