//! Delimited extract reader
//!
//! Streams one tabular extract as raw byte records and decodes every field
//! with the encoding configured for that source. Encodings are never
//! assumed uniform across sources: the identifier and sales extracts are
//! usually Latin-1 while the approval extracts are UTF-8.

use crate::config::schema::SourceConfig;
use crate::domain::{FormularyError, Result};
use csv::{ByteRecord, ReaderBuilder, Trim};
use encoding_rs::Encoding;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

/// How an extract is encoded on disk
#[derive(Debug, Clone, Copy)]
pub struct ExtractFormat {
    /// Character encoding of every field
    pub encoding: &'static Encoding,
    /// Single-byte field delimiter
    pub delimiter: u8,
}

impl ExtractFormat {
    /// Resolves the encoding label and delimiter of a configured source
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let encoding = Encoding::for_label(config.encoding.trim().as_bytes()).ok_or_else(|| {
            FormularyError::Configuration(format!("Unknown encoding label '{}'", config.encoding))
        })?;
        let delimiter = delimiter_byte(&config.delimiter)?;
        Ok(Self {
            encoding,
            delimiter,
        })
    }
}

impl Default for ExtractFormat {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
            delimiter: b',',
        }
    }
}

/// Converts a configured delimiter into a single ASCII byte
pub fn delimiter_byte(delimiter: &str) -> Result<u8> {
    let value = if delimiter == "\\t" { "\t" } else { delimiter };
    match value.as_bytes() {
        [b] if b.is_ascii() && *b != b'"' && *b != b'\n' && *b != b'\r' => Ok(*b),
        _ => Err(FormularyError::Configuration(format!(
            "Delimiter must be a single ASCII character other than a quote or newline, got '{delimiter}'"
        ))),
    }
}

/// One decoded row of an extract
#[derive(Debug, Clone)]
pub struct SourceRow {
    columns: Arc<HashMap<String, usize>>,
    fields: Vec<String>,
}

impl SourceRow {
    /// Raw text of a column; `None` when the extract has no such column or
    /// the record is shorter than the header.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .get(column)
            .and_then(|idx| self.fields.get(*idx))
            .map(String::as_str)
    }
}

/// Streaming reader over one extract
pub struct ExtractReader {
    name: String,
    reader: csv::Reader<Box<dyn Read + Send>>,
    format: ExtractFormat,
    headers: Vec<String>,
    columns: Arc<HashMap<String, usize>>,
    record: ByteRecord,
    rows_read: usize,
}

impl ExtractReader {
    /// Opens an extract file and decodes its header
    ///
    /// # Errors
    ///
    /// Returns `SourceRead` if the file is missing, unreadable, or its header
    /// cannot be decoded with the configured encoding.
    pub fn open(name: &str, path: impl AsRef<Path>, format: ExtractFormat) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            FormularyError::SourceRead(format!(
                "Cannot open {name} extract {}: {e}",
                path.display()
            ))
        })?;
        Self::from_reader(name, BufReader::new(file), format)
    }

    /// Wraps an already-open byte stream
    pub fn from_reader(
        name: &str,
        reader: impl Read + Send + 'static,
        format: ExtractFormat,
    ) -> Result<Self> {
        let boxed: Box<dyn Read + Send> = Box::new(reader);
        let mut reader = ReaderBuilder::new()
            .delimiter(format.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(Trim::None)
            .from_reader(boxed);

        let header_record = reader.byte_headers().map_err(|e| {
            FormularyError::SourceRead(format!("Cannot read {name} extract header: {e}"))
        })?;

        let mut headers = Vec::with_capacity(header_record.len());
        for (idx, field) in header_record.iter().enumerate() {
            let decoded = decode_field(field, format.encoding).ok_or_else(|| {
                FormularyError::SourceRead(format!(
                    "{name} extract header is not valid {}",
                    format.encoding.name()
                ))
            })?;
            let decoded = if idx == 0 {
                decoded.trim_start_matches('\u{feff}').trim().to_string()
            } else {
                decoded.trim().to_string()
            };
            headers.push(decoded);
        }

        let mut columns = HashMap::with_capacity(headers.len());
        for (idx, header) in headers.iter().enumerate() {
            // first occurrence wins for repeated headers
            columns.entry(header.clone()).or_insert(idx);
        }

        tracing::debug!(
            source = name,
            encoding = format.encoding.name(),
            columns = headers.len(),
            "Opened extract"
        );

        Ok(Self {
            name: name.to_string(),
            reader,
            format,
            headers,
            columns: Arc::new(columns),
            record: ByteRecord::new(),
            rows_read: 0,
        })
    }

    /// Source name used in logs and errors
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decoded header names
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Expected columns that the header does not contain
    pub fn missing_columns<'a>(&self, expected: &[&'a str]) -> Vec<&'a str> {
        expected
            .iter()
            .copied()
            .filter(|column| !self.columns.contains_key(*column))
            .collect()
    }

    /// Logs a warning for every expected column the header lacks.
    /// Missing columns read as null rather than failing the load.
    pub fn warn_missing_columns(&self, expected: &[&str]) {
        let missing = self.missing_columns(expected);
        if !missing.is_empty() {
            tracing::warn!(
                source = %self.name,
                missing = ?missing,
                "Extract is missing expected columns; they will load as null"
            );
        }
    }

    /// Number of data rows read so far
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Reads and decodes the next data row
    ///
    /// # Errors
    ///
    /// Returns `SourceRead` on malformed records or bytes that are invalid
    /// in the configured encoding.
    pub fn next_row(&mut self) -> Result<Option<SourceRow>> {
        let has_record = self.reader.read_byte_record(&mut self.record).map_err(|e| {
            FormularyError::SourceRead(format!(
                "Malformed record in {} extract after {} rows: {e}",
                self.name, self.rows_read
            ))
        })?;
        if !has_record {
            return Ok(None);
        }

        let line = self.record.position().map(|p| p.line()).unwrap_or(0);
        let mut fields = Vec::with_capacity(self.record.len());
        for field in self.record.iter() {
            let decoded = decode_field(field, self.format.encoding).ok_or_else(|| {
                FormularyError::SourceRead(format!(
                    "{} extract line {line} is not valid {}",
                    self.name,
                    self.format.encoding.name()
                ))
            })?;
            fields.push(decoded);
        }

        self.rows_read += 1;
        Ok(Some(SourceRow {
            columns: Arc::clone(&self.columns),
            fields,
        }))
    }

    /// Decodes every remaining row without keeping any, returning the
    /// number of data rows in the extract
    ///
    /// # Errors
    ///
    /// Returns the first `SourceRead` error in the extract.
    pub fn check_decodes(&mut self) -> Result<usize> {
        while self.next_row()?.is_some() {}
        Ok(self.rows_read)
    }
}

fn decode_field(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(data: &'static [u8], format: ExtractFormat) -> ExtractReader {
        ExtractReader::from_reader("test", Cursor::new(data), format).unwrap()
    }

    #[test]
    fn test_reads_rows_by_header_name() {
        let mut r = reader(
            b"Appl_No,Ingredient\nN001,ASPIRIN\nN002,\n",
            ExtractFormat::default(),
        );
        assert_eq!(r.headers(), &["Appl_No".to_string(), "Ingredient".to_string()]);

        let first = r.next_row().unwrap().unwrap();
        assert_eq!(first.get("Appl_No"), Some("N001"));
        assert_eq!(first.get("Ingredient"), Some("ASPIRIN"));
        assert_eq!(first.get("Missing"), None);

        let second = r.next_row().unwrap().unwrap();
        assert_eq!(second.get("Ingredient"), Some(""));
        assert!(r.next_row().unwrap().is_none());
        assert_eq!(r.rows_read(), 2);
    }

    #[test]
    fn test_short_record_reads_absent() {
        let mut r = reader(b"A,B,C\n1,2\n", ExtractFormat::default());
        let row = r.next_row().unwrap().unwrap();
        assert_eq!(row.get("B"), Some("2"));
        assert_eq!(row.get("C"), None);
    }

    #[test]
    fn test_strips_bom_and_header_whitespace() {
        let mut r = reader(
            b"\xef\xbb\xbfLabeler Code , Product Code\n123,45\n",
            ExtractFormat::default(),
        );
        assert_eq!(r.headers()[0], "Labeler Code");
        let row = r.next_row().unwrap().unwrap();
        assert_eq!(row.get("Product Code"), Some("45"));
    }

    #[test]
    fn test_latin1_decoding() {
        let format = ExtractFormat {
            encoding: Encoding::for_label(b"latin1").unwrap(),
            delimiter: b',',
        };
        let mut r = reader(b"Manufacturer\nNestl\xe9\n", format);
        let row = r.next_row().unwrap().unwrap();
        assert_eq!(row.get("Manufacturer"), Some("Nestlé"));
    }

    #[test]
    fn test_invalid_utf8_is_source_error() {
        let mut r = reader(b"Manufacturer\nNestl\xe9\n", ExtractFormat::default());
        let err = r.next_row().unwrap_err();
        assert!(matches!(err, FormularyError::SourceRead(_)));
    }

    #[test]
    fn test_check_decodes_reaches_late_bad_byte() {
        let mut r = reader(
            b"Ingredient\nASPIRIN\nIBUPROFEN\nASPIR\xedN\n",
            ExtractFormat::default(),
        );
        let err = r.check_decodes().unwrap_err();
        assert!(err.to_string().contains("line 4"));

        let mut r = reader(b"Ingredient\nASPIRIN\nIBUPROFEN\n", ExtractFormat::default());
        assert_eq!(r.check_decodes().unwrap(), 2);
    }

    #[test]
    fn test_missing_columns() {
        let r = reader(b"Appl_No,Dosage\n", ExtractFormat::default());
        assert_eq!(
            r.missing_columns(&["Appl_No", "Ingredient", "Dosage"]),
            vec!["Ingredient"]
        );
    }

    #[test]
    fn test_open_missing_file() {
        let err = ExtractReader::open(
            "products",
            "/nonexistent/products.csv",
            ExtractFormat::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, FormularyError::SourceRead(_)));
        assert!(err.to_string().contains("products"));
    }

    #[test]
    fn test_delimiter_byte() {
        assert_eq!(delimiter_byte(",").unwrap(), b',');
        assert_eq!(delimiter_byte("|").unwrap(), b'|');
        assert_eq!(delimiter_byte("\\t").unwrap(), b'\t');
        assert!(delimiter_byte("").is_err());
        assert!(delimiter_byte(";;").is_err());
        assert!(delimiter_byte("\"").is_err());
    }

    #[test]
    fn test_tab_delimited() {
        let format = ExtractFormat {
            encoding: encoding_rs::UTF_8,
            delimiter: b'\t',
        };
        let mut r = reader(b"A\tB\nx\ty\n", format);
        let row = r.next_row().unwrap().unwrap();
        assert_eq!(row.get("B"), Some("y"));
    }
}
