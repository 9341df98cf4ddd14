//! Streamed serialization of query results.
//!
//! The wire format is line-oriented text: one escaped column-header line,
//! then one escaped line per row, fields joined by `;`. Escaping runs in
//! two passes — a generic percent-encoding pass for bytes unsafe in the
//! line format, then a rewrite of every remaining literal `&` to `%26` so
//! the delimiter stream never contains an unescaped ampersand. The double
//! escaping (`%26` in the data becomes `%2526`) is intentional.

use std::io::{self, Write};

/// Field delimiter within a line.
pub const FIELD_DELIMITER: char = ';';

/// Bytes that survive the first escaping pass unencoded.
///
/// `&` is deliberately allowed here; the second pass owns it.
fn is_plain(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'$' | b'-'
                | b'_'
                | b'.'
                | b'+'
                | b'!'
                | b'*'
                | b'\''
                | b'('
                | b')'
                | b','
                | b':'
                | b'@'
                | b'&'
                | b'='
                | b'/'
                | b'~'
        )
}

/// First pass: percent-encode everything unsafe for the line format —
/// spaces, control characters, `%`, the `;` delimiter, and all non-ASCII
/// bytes.
pub fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for &byte in raw.as_bytes() {
        if is_plain(byte) {
            out.push(byte as char);
        } else {
            out.push('%');
            out.push(hex_digit(byte >> 4));
            out.push(hex_digit(byte & 0x0f));
        }
    }
    out
}

/// Second pass: rewrite every literal `&` as `%26`.
pub fn escape_amp(text: &str) -> String {
    text.replace('&', "%26")
}

/// Escape one column name or field value for the wire.
pub fn escape_field(raw: &str) -> String {
    escape_amp(&escape_text(raw))
}

fn hex_digit(nibble: u8) -> char {
    char::from_digit(u32::from(nibble), 16)
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('0')
}

/// Incremental writer for the result stream.
///
/// The executor pulls it forward one row at a time. The column header is
/// emitted exactly once, lazily, when the first row is actually written —
/// statements that yield no rows contribute neither header nor lines.
pub struct RowWriter<W: Write> {
    out: W,
    pending_columns: Vec<String>,
    header_written: bool,
    rows_written: usize,
}

impl<W: Write> RowWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            pending_columns: Vec::new(),
            header_written: false,
            rows_written: 0,
        }
    }

    /// Record the column names of the statement about to produce rows.
    ///
    /// Only the columns in effect when the first row arrives ever reach the
    /// wire; later statements share the single header slot.
    pub fn begin_statement(&mut self, columns: &[String]) {
        if !self.header_written {
            self.pending_columns = columns.to_vec();
        }
    }

    /// Write one row, emitting the header line first if none has been.
    ///
    /// `None` fields serialize as empty strings.
    pub fn write_row(&mut self, fields: &[Option<String>]) -> io::Result<()> {
        if !self.header_written {
            let names = std::mem::take(&mut self.pending_columns);
            self.write_line(names.iter().map(|name| escape_field(name)))?;
            self.header_written = true;
        }
        self.write_line(
            fields
                .iter()
                .map(|field| escape_field(field.as_deref().unwrap_or(""))),
        )?;
        self.rows_written += 1;
        Ok(())
    }

    /// Number of data rows written so far (the header line is not counted).
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    fn write_line(&mut self, fields: impl Iterator<Item = String>) -> io::Result<()> {
        let mut first = true;
        for field in fields {
            if !first {
                write!(self.out, "{FIELD_DELIMITER}")?;
            }
            self.out.write_all(field.as_bytes())?;
            first = false;
        }
        writeln!(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(escape_field("pets_1.db"), "pets_1.db");
    }

    #[test]
    fn test_space_control_and_delimiter_escaped() {
        assert_eq!(escape_field("a b"), "a%20b");
        assert_eq!(escape_field("x;y"), "x%3By");
        assert_eq!(escape_field("line\nbreak"), "line%0Abreak");
    }

    #[test]
    fn test_ampersand_never_survives() {
        assert_eq!(escape_field("Tom & Jerry"), "Tom%20%26%20Jerry");
        assert!(!escape_field("a&b&c").contains('&'));
    }

    #[test]
    fn test_pre_escaped_data_double_escapes() {
        // a literal "%26" in the data is distinguishable from an escaped `&`
        assert_eq!(escape_field("%26"), "%2526");
    }

    #[test]
    fn test_non_ascii_bytes_escaped() {
        assert_eq!(escape_field("é"), "%C3%A9");
    }

    fn row(fields: &[&str]) -> Vec<Option<String>> {
        fields.iter().map(|f| Some(f.to_string())).collect()
    }

    #[test]
    fn test_header_written_once_before_first_row() {
        let mut buf = Vec::new();
        let mut writer = RowWriter::new(&mut buf);
        writer.begin_statement(&["id".to_string(), "name".to_string()]);
        writer.write_row(&row(&["1", "rex"])).unwrap();
        writer.write_row(&row(&["2", "tom"])).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "id;name\n1;rex\n2;tom\n");
    }

    #[test]
    fn test_zero_row_statement_emits_nothing() {
        let mut buf = Vec::new();
        let mut writer = RowWriter::new(&mut buf);
        writer.begin_statement(&["unused".to_string()]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_header_comes_from_first_row_producing_statement() {
        let mut buf = Vec::new();
        let mut writer = RowWriter::new(&mut buf);
        writer.begin_statement(&["empty".to_string()]);
        // no rows from the first statement
        writer.begin_statement(&["name".to_string()]);
        writer.write_row(&row(&["rex"])).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "name\nrex\n");
    }

    #[test]
    fn test_null_serializes_empty() {
        let mut buf = Vec::new();
        let mut writer = RowWriter::new(&mut buf);
        writer.begin_statement(&["a".to_string(), "b".to_string()]);
        writer
            .write_row(&[None, Some("x".to_string())])
            .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a;b\n;x\n");
    }
}
