//! Shared fixtures for integration tests
//!
//! Builds KorEXO exports shaped like the ones the sonde software writes:
//! a preamble, the metadata rows and a CSV body, stored as UTF-16LE with a
//! byte-order mark unless a test asks for UTF-8.

#![allow(dead_code)]

use std::io::Write;
use tempfile::NamedTempFile;

pub const PARAMS: [&str; 5] = ["Cond µS/cm", "Depth m", "Temp °C", "pH", "Turbidity FNU"];

/// Export text with the given date header unit and body rows
pub fn export_text(date_unit: &str, rows: &[&str]) -> String {
    let mut text = String::new();
    text.push_str("KOR EXPORT FILE\n");
    text.push_str("FILE CREATED:,11/12/2019 10:40:12 AM\n");
    text.push_str("TIME OFFSET (hh:mm:ss):,+00:00:00\n");
    text.push_str("\n");
    text.push_str(",,,SENSOR SERIAL NUMBER:,19A101234,19A101235,19A101236,19A101237,19A101238\n");
    text.push_str(",,,MEAN VALUE:,452.1,1.25,12.875,7.41,1.34\n");
    text.push_str(",,,STANDARD DEVIATION:,3.2,0.74,0.22,0.02,0.11\n");
    text.push_str(&format!(
        "Date ({}),Time (HH:mm:ss),Time (Fract. Sec),Site Name,{}\n",
        date_unit,
        PARAMS.join(",")
    ));
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

/// A depth cast logged on 11/12/2019, with one repeated depth
pub fn cast_rows() -> Vec<&'static str> {
    vec![
        "11/12/2019,10:23:45,0,Bore 1,450.0,0.50,13.1,7.40,1.2",
        "11/12/2019,10:23:46,0,Bore 1,451.0,1.00,13.0,7.41,1.3",
        "11/12/2019,10:23:47,0,Bore 1,453.0,1.00,12.8,7.41,1.3",
        "11/12/2019,10:23:48,0,Bore 1,454.0,1.50,12.7,7.42,1.4",
        "11/12/2019,10:23:49,0,Bore 1,456.0,2.00,12.6,7.43,1.5",
    ]
}

pub fn encode_utf16le(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

pub fn write_bytes(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

/// The standard MM/DD/YYYY cast as a UTF-16 file
pub fn utf16_cast() -> NamedTempFile {
    write_bytes(&encode_utf16le(&export_text("MM/DD/YYYY", &cast_rows())))
}

/// The same cast stored as UTF-8
pub fn utf8_cast() -> NamedTempFile {
    write_bytes(export_text("MM/DD/YYYY", &cast_rows()).as_bytes())
}
