//! Fixed-width text tables for the per-folder summaries.

use crate::error::ReportError;
use crate::model::{Cell, TableStyle};
use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::Path;

pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub style: TableStyle,
}

impl Table {
    pub fn new(header: Vec<String>, rows: Vec<Vec<Cell>>, style: TableStyle) -> Self {
        Self {
            header,
            rows,
            style,
        }
    }

    /// Render every line of the table. Rows longer or shorter than the header
    /// are rendered as they are.
    pub fn get_string(&self) -> String {
        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(Cell::to_string).collect())
            .collect();

        let ncols = body
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0);
        let mut widths = vec![0usize; ncols];
        for line in std::iter::once(&self.header).chain(body.iter()) {
            for (i, cell) in line.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut lines = vec![render_line(&self.header, &widths, self.style)];
        if self.style == TableStyle::Markdown {
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w + 2)).collect();
            lines.push(format!("|{}|", rule.join("|")));
        }
        lines.extend(body.iter().map(|row| render_line(row, &widths, self.style)));
        lines.join("\n")
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get_string())
    }
}

fn render_line(cells: &[String], widths: &[usize], style: TableStyle) -> String {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, &width)| {
            let text = cells.get(i).map(String::as_str).unwrap_or("");
            match style {
                TableStyle::MsWordFriendly => format!(" {} ", center(text, width)),
                TableStyle::Markdown => format!(" {text:<width$} "),
            }
        })
        .collect();
    format!("|{}|", padded.join("|"))
}

/// Center `text` in `width` columns. An odd leftover space goes right of
/// odd-length text and left of even-length text.
fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let excess = width.saturating_sub(len);
    let (left, right) = if excess % 2 == 1 && len % 2 == 0 {
        (excess / 2 + 1, excess / 2)
    } else {
        (excess / 2, excess - excess / 2)
    };
    format!("{}{text}{}", " ".repeat(left), " ".repeat(right))
}

/// Options for [`make_table`].
#[derive(Debug, Clone, Default)]
pub struct TableOptions<'a> {
    /// Echo the rendered table to stdout.
    pub print_table: bool,
    pub save: bool,
    /// Destination file, required when `save` is set.
    pub name: Option<&'a Path>,
}

/// Build a table and optionally persist and echo it.
pub fn make_table(
    header: &[String],
    rows: Vec<Vec<Cell>>,
    style: TableStyle,
    opts: &TableOptions<'_>,
) -> Result<Table> {
    let name = match (opts.save, opts.name) {
        (true, None) => return Err(ReportError::MissingOutputName { what: "table" }.into()),
        (true, Some(name)) => Some(name),
        (false, _) => None,
    };

    let table = Table::new(header.to_vec(), rows, style);
    if let Some(name) = name {
        save_table(&table, name)?;
    }
    if opts.print_table {
        println!("{table}");
    }
    Ok(table)
}

pub fn save_table(table: &Table, path: &Path) -> Result<()> {
    fs::write(path, table.get_string()).with_context(|| format!("write table {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        vec!["Version".into(), "Processes".into(), "Elapsed".into()]
    }

    fn rows() -> Vec<Vec<Cell>> {
        vec![
            vec![Cell::Text("Serial".into()), Cell::Int(1), Cell::Float(10.0)],
            vec![Cell::Text("Parallel".into()), Cell::Int(2), Cell::Float(4.25)],
        ]
    }

    #[test]
    fn msword_friendly_layout() {
        let table = Table::new(header(), rows(), TableStyle::MsWordFriendly);
        let expected = [
            "| Version  | Processes | Elapsed |",
            "|  Serial  |     1     |   10.0  |",
            "| Parallel |     2     |   4.25  |",
        ]
        .join("\n");
        assert_eq!(table.get_string(), expected);
    }

    #[test]
    fn odd_padding_side_follows_text_parity() {
        assert_eq!(center("abc", 6), " abc  ");
        assert_eq!(center("ab", 5), "  ab ");
        assert_eq!(center("ab", 6), "  ab  ");
        assert_eq!(center("toolong", 3), "toolong");
    }

    #[test]
    fn markdown_layout_has_rule() {
        let table = Table::new(header(), rows(), TableStyle::Markdown);
        let text = table.get_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "|----------|-----------|---------|");
        assert_eq!(lines[2], "| Serial   | 1         | 10.0    |");
    }

    #[test]
    fn ragged_rows_do_not_panic() {
        let rows = vec![
            vec![Cell::Int(1)],
            vec![Cell::Int(1), Cell::Int(2), Cell::Int(3), Cell::Int(4)],
        ];
        let text = Table::new(header(), rows, TableStyle::MsWordFriendly).get_string();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn saving_without_a_name_fails() {
        for rows in [rows(), Vec::new()] {
            let opts = TableOptions {
                save: true,
                ..TableOptions::default()
            };
            let err = make_table(&header(), rows, TableStyle::MsWordFriendly, &opts)
                .err()
                .unwrap();
            assert!(matches!(
                err.downcast_ref::<ReportError>(),
                Some(ReportError::MissingOutputName { what: "table" })
            ));
        }
    }

    #[test]
    fn saves_to_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("psize-10-O0-table.csv");
        let opts = TableOptions {
            save: true,
            name: Some(path.as_path()),
            ..TableOptions::default()
        };
        let table = make_table(&header(), rows(), TableStyle::MsWordFriendly, &opts).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), table.get_string());

        let unsaved = make_table(
            &header(),
            rows(),
            TableStyle::MsWordFriendly,
            &TableOptions::default(),
        );
        assert!(unsaved.is_ok());
    }
}
