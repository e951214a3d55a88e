//! Delimited text to [`TabularPayload`], with encoding and delimiter auto-detection.
//!
//! The first line is the header; every following line becomes one row.
//! Blank lines are kept as one-cell rows so that row positions match the
//! file, and are skipped later by the reshaper.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;
use tracing::debug;

use crate::error::{CsvError, CsvResult};
use crate::models::{Row, TabularPayload};

/// Delimiter candidates, in tie-break order.
const DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed payload
    pub payload: TabularPayload,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

impl ParseResult {
    pub fn headers(&self) -> &[String] {
        self.payload.columns.as_deref().unwrap_or_default()
    }

    pub fn row_count(&self) -> usize {
        self.payload.data.as_ref().map_or(0, Vec::len)
    }

    /// The payload as it should be stored: blank labels dropped.
    pub fn into_stored_payload(self) -> TabularPayload {
        let mut payload = self.payload;
        payload.clean_column_mapping();
        payload
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
///
/// Unknown encodings fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(label) => label.decode(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    // a UTF-8 byte order mark would otherwise end up in the first column name
    match decoded.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best_sep = DELIMITERS[0];
    let mut best_count = 0;

    for &sep in &DELIMITERS {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

fn reader_builder(delimiter: char) -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All);
    builder
}

/// Split one line into cells, honouring quotes.
fn split_cells(builder: &ReaderBuilder, line: &str, line_number: usize) -> CsvResult<Row> {
    let mut record = StringRecord::new();
    builder
        .from_reader(line.as_bytes())
        .read_record(&mut record)
        .map_err(|source| CsvError::Format {
            line: line_number,
            source,
        })?;

    Ok(record.iter().map(str::to_string).collect())
}

/// Parse delimited text with an explicit delimiter.
///
/// Each line is one record; a quoted cell may contain the delimiter but not
/// a line break.
///
/// # Example
/// ```
/// use dataset_series::parser::parse_str;
///
/// let payload = parse_str("time,value\n0,1\n\n1,2", ',').unwrap();
///
/// assert_eq!(payload.columns.as_deref().unwrap(), ["time", "value"]);
/// assert_eq!(payload.data.as_ref().unwrap().len(), 3);
/// ```
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<TabularPayload> {
    let builder = reader_builder(delimiter);
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = normalized.lines();

    let header_line = lines.next().ok_or(CsvError::EmptyFile)?;
    let headers = split_cells(&builder, header_line, 1)?;
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let rows: Vec<Row> = lines
        .enumerate()
        .map(|(i, line)| {
            if line.trim().is_empty() {
                Ok(vec![String::new()])
            } else {
                split_cells(&builder, line, i + 2)
            }
        })
        .collect::<CsvResult<_>>()?;

    debug!(columns = headers.len(), rows = rows.len(), "parsed delimited text");
    Ok(TabularPayload::from_rows(headers, rows))
}

/// Parse bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);

    parse_with_metadata(&content, delimiter, encoding)
}

/// Parse bytes with auto-detected encoding and a caller-chosen delimiter.
pub fn parse_bytes_with_delimiter(bytes: &[u8], delimiter: char) -> CsvResult<ParseResult> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    parse_with_metadata(&content, delimiter, encoding)
}

/// Parse a file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let result = parse_file_auto("/path/to/file.csv")?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// println!("Rows: {}", result.row_count());
/// ```
pub fn parse_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

fn parse_with_metadata(content: &str, delimiter: char, encoding: String) -> CsvResult<ParseResult> {
    Ok(ParseResult {
        payload: parse_str(content, delimiter)?,
        encoding,
        delimiter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn rows(payload: &TabularPayload) -> &Vec<Row> {
        payload.data.as_ref().unwrap()
    }

    #[test]
    fn test_simple_csv() {
        let payload = parse_str("time,a,b\n0,1,2\n1,3,4", ',').unwrap();

        assert_eq!(payload.columns.as_deref().unwrap(), ["time", "a", "b"]);
        assert_eq!(payload.index_column.as_deref(), Some("time"));
        assert_eq!(rows(&payload).len(), 2);
        assert_eq!(rows(&payload)[1], vec!["1", "3", "4"]);
        assert_eq!(payload.column_mapping.get("a"), Some(&Some(String::new())));
    }

    #[test]
    fn test_blank_lines_become_markers() {
        let payload = parse_str("t;v\r\n1;2\r\n\r\n3;4\r\n", ';').unwrap();

        assert_eq!(rows(&payload).len(), 3);
        assert_eq!(rows(&payload)[1], vec![String::new()]);
    }

    #[test]
    fn test_carriage_return_only() {
        let payload = parse_str("t,v\r1,2\r3,4", ',').unwrap();
        assert_eq!(rows(&payload).len(), 2);
    }

    #[test]
    fn test_quoted_values() {
        let payload = parse_str("\"time\",\"value\"\n\"0\",\" 5 \"", ',').unwrap();

        assert_eq!(payload.columns.as_deref().unwrap(), ["time", "value"]);
        assert_eq!(rows(&payload)[0], vec!["0", "5"]);
    }

    #[test]
    fn test_quoted_delimiter_stays_in_cell() {
        let payload = parse_str("t,label,v\n0,\"a, b\",5\n", ',').unwrap();

        assert_eq!(rows(&payload)[0], vec!["0", "a, b", "5"]);
        assert!(payload.check_shape().is_ok());

        let reshaped = crate::reshape::reshape(&payload, &Default::default())
            .unwrap()
            .unwrap();
        assert_eq!(
            reshaped.series[1].values(),
            vec![crate::models::SeriesValue::Number(5.0)]
        );
    }

    #[test]
    fn test_escaped_quotes() {
        let payload = parse_str("t;note\n0;\"say \"\"hi\"\"; twice\"", ';').unwrap();
        assert_eq!(rows(&payload)[0], vec!["0", "say \"hi\"; twice"]);
    }

    #[test]
    fn test_stored_payload_drops_blank_labels() {
        let result = parse_bytes_auto(b"t,a\n0,1").unwrap();
        assert_eq!(result.payload.column_mapping.len(), 2);

        let stored = result.into_stored_payload();
        assert!(stored.column_mapping.is_empty());
        assert_eq!(stored.label_for("a"), "a");
    }

    #[test]
    fn test_missing_values_kept_as_empty() {
        let payload = parse_str("a,b,c\n1,,3", ',').unwrap();
        assert_eq!(rows(&payload)[0], vec!["1", "", "3"]);
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_str("", ','), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_bytes_auto(b""), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_str(" , \n1,2", ','), Err(CsvError::NoHeaders)));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_auto_parse() {
        let result = parse_bytes_auto(b"time;value\n0;30\n1;25").unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.row_count(), 2);
        assert_eq!(result.headers(), ["time", "value"]);
    }

    #[test]
    fn test_explicit_delimiter() {
        let result = parse_bytes_with_delimiter(b"a;b,c\n1;2,3", ',').unwrap();
        assert_eq!(result.headers(), ["a;b", "c"]);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_bom_stripped() {
        let decoded = decode_content(b"\xEF\xBB\xBFtime,v", "utf-8");
        assert_eq!(decoded, "time,v");
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "t,v\n0,1\n").unwrap();

        let result = parse_file_auto(file.path()).unwrap();
        assert_eq!(result.delimiter, ',');
        assert_eq!(result.row_count(), 1);
    }
}
