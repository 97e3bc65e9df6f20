//! Text decoding and loading of the CSV body.
//!
//! The export is decoded in one go with the caller's encoding, then the
//! lines from the data header onwards are handed to the polars CSV reader.

use crate::constants::MISSING_TOKEN;
use crate::error::{KorexoError, Result};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use polars::prelude::*;
use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Decode raw bytes with a WHATWG encoding label.
///
/// The generic `utf-16` label follows the byte-order mark and refuses input
/// without one; `utf-16le` and `utf-16be` decode unmarked input. A BOM for
/// the requested encoding is stripped. Malformed input is an error, never
/// replacement characters.
pub fn decode_text(bytes: &[u8], label: &str, path: &Path) -> Result<String> {
    let (encoding, body) = if is_generic_utf16(label) {
        match Encoding::for_bom(bytes) {
            Some((found, bom_len)) if found == UTF_16LE || found == UTF_16BE => {
                (found, &bytes[bom_len..])
            }
            _ => {
                return Err(decode_error(
                    path,
                    label,
                    "missing UTF-16 byte order mark (use utf-16le or utf-16be for unmarked input)",
                ));
            }
        }
    } else {
        let requested = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
            KorexoError::UnknownEncoding {
                label: label.to_string(),
            }
        })?;
        match Encoding::for_bom(bytes) {
            Some((found, bom_len)) if found == requested => (requested, &bytes[bom_len..]),
            _ => (requested, bytes),
        }
    };

    let text = encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(Cow::into_owned)
        .ok_or_else(|| {
            decode_error(
                path,
                label,
                format!("malformed {} byte sequence", encoding.name()),
            )
        })?;

    debug!(
        "Decoded {} bytes from {} as {}",
        bytes.len(),
        path.display(),
        encoding.name()
    );
    Ok(text)
}

fn is_generic_utf16(label: &str) -> bool {
    let label = label.trim();
    label.eq_ignore_ascii_case("utf-16") || label.eq_ignore_ascii_case("utf16")
}

fn decode_error(path: &Path, label: &str, reason: impl Into<String>) -> KorexoError {
    KorexoError::Decode {
        path: path.to_path_buf(),
        encoding: label.to_string(),
        reason: reason.into(),
    }
}

/// Load the data body as a table keyed by the literal header labels.
///
/// `header_line_no` is 1-based; every line before it is preamble.
pub fn load_table(text: &str, header_line_no: usize, path: &Path) -> Result<DataFrame> {
    let body = text
        .lines()
        .skip(header_line_no.saturating_sub(1))
        .collect::<Vec<_>>()
        .join("\n");

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .map_parse_options(|opts| {
            opts.with_null_values(Some(NullValues::AllColumnsSingle(MISSING_TOKEN.into())))
        })
        .into_reader_with_file_handle(Cursor::new(body.into_bytes()))
        .finish()
        .map_err(|e| KorexoError::malformed(path, format!("could not read data body: {}", e)))?;

    debug!(
        "Loaded data body from {}: {} rows x {} columns",
        path.display(),
        df.height(),
        df.width()
    );
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le_with_bom(text: &str) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes
    }

    fn utf16be_with_bom(text: &str) -> Vec<u8> {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        bytes
    }

    #[test]
    fn test_decode_utf16_follows_bom() {
        let path = Path::new("profile.csv");
        let text = "Cond µS/cm,Temp °C";

        assert_eq!(decode_text(&utf16le_with_bom(text), "utf-16", path).unwrap(), text);
        assert_eq!(decode_text(&utf16be_with_bom(text), "UTF-16", path).unwrap(), text);
    }

    #[test]
    fn test_decode_unmarked_utf16_needs_explicit_byte_order() {
        let path = Path::new("profile.csv");
        let text = "Depth m,Temp °C";
        let le: Vec<u8> = utf16le_with_bom(text)[2..].to_vec();
        let be: Vec<u8> = utf16be_with_bom(text)[2..].to_vec();

        assert_eq!(decode_text(&le, "utf-16le", path).unwrap(), text);
        assert_eq!(decode_text(&be, "utf-16be", path).unwrap(), text);

        match decode_text(&le, "utf-16", path) {
            Err(KorexoError::Decode { encoding, reason, .. }) => {
                assert_eq!(encoding, "utf-16");
                assert!(reason.contains("utf-16le"), "{}", reason);
            }
            other => panic!("Expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_utf8_as_utf16_fails() {
        let err = decode_text("Date (MM/DD/YYYY)\n".as_bytes(), "utf-16", Path::new("a.csv"))
            .unwrap_err();
        assert!(matches!(err, KorexoError::Decode { .. }));
    }

    #[test]
    fn test_decode_utf8_strips_bom() {
        let bytes = "\u{feff}Temp °C".as_bytes();
        assert_eq!(
            decode_text(bytes, "utf-8", Path::new("a.csv")).unwrap(),
            "Temp °C"
        );
    }

    #[test]
    fn test_decode_rejects_malformed_utf8() {
        let err = decode_text(&[0x41, 0xFF, 0xFE, 0x42], "utf-8", Path::new("a.csv")).unwrap_err();
        assert!(matches!(err, KorexoError::Decode { .. }));
    }

    #[test]
    fn test_decode_unknown_label() {
        let err = decode_text(b"abc", "klingon-8", Path::new("a.csv")).unwrap_err();
        assert!(matches!(err, KorexoError::UnknownEncoding { .. }));
    }

    #[test]
    fn test_load_table_skips_preamble() {
        let text = "KOR EXPORT FILE\n\
            ,,,MEAN VALUE:,1.5\n\
            Date (MM/DD/YYYY),Time (HH:mm:ss),Time (Fract. Sec),Site Name,Cond µS/cm\n\
            11/12/2019,10:23:45,0,Bore 1,456.7\n\
            11/12/2019,10:23:46,0,Bore 1,NA\n";

        let df = load_table(text, 3, Path::new("profile.csv")).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 5);
        assert_eq!(df.get_column_names()[4].as_str(), "Cond µS/cm");

        let cond = df.column("Cond µS/cm").unwrap();
        assert_eq!(cond.dtype(), &DataType::Float64);
        assert_eq!(cond.null_count(), 1);
    }
}
