//! Minimal CSV codec for collection tables.
//!
//! The dialect:
//!
//! - `,` separates fields, `\n` separates rows, `\r` outside quotes is ignored
//! - a field wrapped in `"` may hold separators and newlines; `""` inside it
//!   is a literal quote
//! - on decode, headers and cells are trimmed and rows with only blank cells
//!   are dropped
//! - on encode, a field holding `,`, `"`, `\n`, or `\r` is quoted, and rows
//!   are joined by `\n` with no trailing newline

use evac_core::Table;

use crate::error::PersistError;

/// Encodes `table` as CSV text.
///
/// # Examples
///
/// ```
/// use evac_core::Table;
/// use evac_persist::csv;
///
/// let mut table = Table::new(vec!["shelterId".into(), "name".into()]);
/// table.push_row(vec!["S001".into(), "Hall, East".into()]);
/// assert_eq!(csv::encode(&table), "shelterId,name\nS001,\"Hall, East\"");
/// ```
#[must_use]
pub fn encode(table: &Table) -> String {
    let mut out = String::new();
    write_row(&mut out, &table.headers);
    for row in &table.rows {
        out.push('\n');
        write_row(&mut out, row);
    }
    out
}

fn write_row(out: &mut String, cells: &[String]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if cell.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
}

/// Decodes CSV text into a table. The first row is the header.
///
/// Empty input decodes to a table with no headers and no rows.
///
/// # Errors
///
/// Returns [`PersistError::Csv`] if a quoted field is never closed.
///
/// # Examples
///
/// ```
/// use evac_persist::csv;
///
/// let table = csv::decode(" citizenId , name\r\nC001, \"Aom \"\"A\"\"\"\n,\n").unwrap();
/// assert_eq!(table.headers, vec!["citizenId", "name"]);
/// assert_eq!(table.rows, vec![vec!["C001", "Aom \"A\""]]);
/// ```
pub fn decode(text: &str) -> Result<Table, PersistError> {
    let mut rows = parse_rows(text)?.into_iter();

    let Some(headers) = rows.next() else {
        return Ok(Table::default());
    };
    let mut table = Table::new(headers.iter().map(|h| h.trim().to_owned()).collect());
    for row in rows {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        table.push_row(row.iter().map(|cell| cell.trim().to_owned()).collect());
    }
    Ok(table)
}

/// Splits `text` into raw, untrimmed rows of fields.
fn parse_rows(text: &str) -> Result<Vec<Vec<String>>, PersistError> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut quote_opened_on = 0;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => {
                    if c == '\n' {
                        line += 1;
                    }
                    field.push(c);
                }
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                quote_opened_on = line;
            }
            ',' => row.push(std::mem::take(&mut field)),
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                line += 1;
            }
            '\r' => {}
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(PersistError::Csv {
            line: quote_opened_on,
            reason: "unterminated quoted field",
        });
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    Ok(rows)
}
