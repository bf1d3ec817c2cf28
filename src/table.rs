use std::fmt::Write as _;

/// Renders an elastic-width text table: header row, dashed rule, then one
/// line per row with two-space gutters. Column widths grow to the widest
/// cell, with a three-character floor so the rule stays legible.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|header| cell_width(header))
        .collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell_width(cell));
        }
    }
    for width in &mut widths {
        *width = (*width).max(3);
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let rule = widths
        .iter()
        .map(|width| "-".repeat(*width))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (idx, width) in widths.iter().enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        let cell = cells.get(idx).map(|cell| sanitize(cell)).unwrap_or_default();
        let padding = width.saturating_sub(cell_width(&cell));
        line.push_str(&cell);
        line.push_str(&" ".repeat(padding));
    }
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn cell_width(value: &str) -> usize {
    value.chars().filter(|ch| !ch.is_control()).count()
}

fn sanitize(value: &str) -> String {
    value
        .chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    #[test]
    fn render_table_aligns_columns_to_widest_cell() {
        let rendered = render_table(
            &strings(&["city", "customers"]),
            &[strings(&["sydney", "12"]), strings(&["mel", "3"])],
        );
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "city    customers");
        assert_eq!(lines[1], "------  ---------");
        assert_eq!(lines[2], "sydney  12");
        assert_eq!(lines[3], "mel     3");
    }

    #[test]
    fn render_table_sanitizes_control_characters() {
        let rendered = render_table(
            &strings(&["category"]),
            &[strings(&["a\tb\nc"])],
        );
        assert!(rendered.contains("a b c"));
    }

    #[test]
    fn render_table_pads_missing_cells() {
        let rendered = render_table(
            &strings(&["a", "b"]),
            &[vec!["only".to_string()]],
        );
        assert!(rendered.lines().nth(2).unwrap().starts_with("only"));
    }
}
