use serde::Serialize;
use std::fmt::Write;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print rows under `headers`, columns padded to their widest cell.
pub fn print_table<const N: usize>(headers: [&str; N], rows: &[[String; N]]) {
    print!("{}", render_table(headers, rows));
}

fn render_table<const N: usize>(headers: [&str; N], rows: &[[String; N]]) -> String {
    let widths: [usize; N] = std::array::from_fn(|col| {
        rows.iter()
            .map(|row| row[col].chars().count())
            .fold(headers[col].chars().count(), usize::max)
    });

    let mut out = String::new();
    let mut line = |cells: [&str; N]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:width$}"))
            .collect();
        let _ = writeln!(out, "{}", padded.join("  ").trim_end());
    };

    line(headers);
    let rules = widths.map(|w| "-".repeat(w));
    line(std::array::from_fn(|col| rules[col].as_str()));
    for row in rows {
        line(std::array::from_fn(|col| row[col].as_str()));
    }
    out
}
