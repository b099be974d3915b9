/*!
 * Reading uploaded tables into rows of text.
 *
 * The first record is the header and is ignored; the text of each later
 * record is its first column. Encoding and delimiter are detected from the
 * content.
 */

use encoding_rs::{Encoding, WINDOWS_1252};
use log::debug;

use crate::errors::InputStructureError;
use crate::pipeline::TextInput;

/// Delimiters recognised in the header line
const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// ASCII unit separator, used to read a single-column table as whole lines
const UNIT_SEPARATOR: u8 = 0x1f;

/// Detect the character encoding of raw bytes
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes with the named encoding, falling back to Windows-1252
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let encoding = Encoding::for_label(encoding.as_bytes()).unwrap_or(WINDOWS_1252);
    let (content, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!("Decoding table as {} replaced invalid sequences", encoding.name());
    }
    content.into_owned()
}

/// Find the delimiter used by the header line
///
/// Returns `None` when the header contains no known delimiter, which means the
/// table has a single column.
pub fn detect_delimiter(content: &str) -> Option<u8> {
    let header = content.lines().next().unwrap_or("");

    DELIMITERS
        .iter()
        .map(|&sep| (sep, header.bytes().filter(|&b| b == sep).count()))
        .filter(|&(_, count)| count > 0)
        .max_by_key(|&(_, count)| count)
        .map(|(sep, _)| sep)
}

/// Parse an uploaded table into the texts of its first column
pub fn parse_table(bytes: &[u8]) -> Result<Vec<TextInput>, InputStructureError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(InputStructureError::Empty);
    }

    let encoding = detect_encoding(bytes);
    let decoded = decode_content(bytes, &encoding);
    let content = decoded.trim_start_matches('\u{feff}');
    let delimiter = detect_delimiter(content);

    debug!(
        "Reading table: encoding {}, delimiter {:?}",
        encoding,
        delimiter.map(char::from)
    );

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter.unwrap_or(UNIT_SEPARATOR))
        // A single column is read line by line, quotes included
        .quoting(delimiter.is_some())
        .from_reader(content.as_bytes());

    let header = reader.headers().map_err(malformed)?;
    if header.iter().all(|column| column.trim().is_empty()) {
        return Err(InputStructureError::NoHeader);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(malformed)?;
        rows.push(TextInput::new(record.get(0).unwrap_or_default()));
    }

    debug!("Read {} rows from table", rows.len());
    Ok(rows)
}

fn malformed(error: csv::Error) -> InputStructureError {
    InputStructureError::Malformed {
        line: error.position().map(|p| p.line()).unwrap_or(0),
        message: error.to_string(),
    }
}
