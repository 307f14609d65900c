//! CSV decoding for the accident and black-spot exports.

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use serde::de::DeserializeOwned;

use crate::records::{AccidentRecord, BlackSpotRow, BlackSpotSegment};

/// Resolves an encoding label such as `"cp949"` or `"utf-8"`.
///
/// `cp949`/`ms949` are not WHATWG labels but are what Korean exports are
/// usually tagged with; both decode as EUC-KR, which covers the code page.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    match label.trim().to_ascii_lowercase().as_str() {
        "cp949" | "ms949" => Ok(encoding_rs::EUC_KR),
        other => Encoding::for_label(other.as_bytes())
            .ok_or_else(|| anyhow::anyhow!("Unknown encoding label '{label}'")),
    }
}

/// Decodes raw file bytes into text.
///
/// # Errors
///
/// Returns an error if the label is unknown or the bytes contain sequences
/// that are malformed for the encoding.
///
/// The configured encoding is authoritative: a leading BOM of that same
/// encoding is stripped, any other BOM is decoded as ordinary bytes.
pub fn decode_text(bytes: &[u8], encoding: &str) -> Result<String> {
    let encoding = resolve_encoding(encoding)?;
    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        anyhow::bail!("Input is not valid {}", encoding.name());
    }
    Ok(text.into_owned())
}

fn parse_rows<T: DeserializeOwned>(text: &str) -> Result<Vec<T>> {
    let mut rdr = csv::Reader::from_reader(text.as_bytes());
    let mut rows = Vec::new();

    for result in rdr.deserialize() {
        let line = rows.len() + 2;
        let row: T = result.with_context(|| format!("Malformed row at line {line}"))?;
        rows.push(row);
    }

    Ok(rows)
}

/// Parses the accident export.
pub fn parse_accidents(bytes: &[u8], encoding: &str) -> Result<Vec<AccidentRecord>> {
    let text = decode_text(bytes, encoding)?;
    parse_rows(&text)
}

/// Parses a black-spot export, converting each WKT geometry.
pub fn parse_black_spots(bytes: &[u8], encoding: &str) -> Result<Vec<BlackSpotSegment>> {
    let text = decode_text(bytes, encoding)?;
    parse_rows::<BlackSpotRow>(&text)?
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            BlackSpotSegment::try_from(row).with_context(|| format!("Bad segment at line {}", i + 2))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_encoding_aliases() {
        assert_eq!(resolve_encoding("cp949").unwrap(), encoding_rs::EUC_KR);
        assert_eq!(resolve_encoding("CP949").unwrap(), encoding_rs::EUC_KR);
        assert_eq!(resolve_encoding("utf-8").unwrap(), encoding_rs::UTF_8);
        assert!(resolve_encoding("klingon").is_err());
    }

    #[test]
    fn test_decode_cp949() {
        let (bytes, _, _) = encoding_rs::EUC_KR.encode("계절,사망자수");
        let text = decode_text(&bytes, "cp949").unwrap();
        assert_eq!(text, "계절,사망자수");
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let invalid_bytes = vec![0xFF, 0xFE, 0xC3, 0x28];
        let err = decode_text(&invalid_bytes, "utf-8").unwrap_err();
        assert_eq!(err.to_string(), "Input is not valid UTF-8");
    }

    #[test]
    fn test_decode_ignores_foreign_bom() {
        let (cp949, _, _) = encoding_rs::EUC_KR.encode("계절");
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend_from_slice(&cp949);

        let err = decode_text(&bytes, "cp949").unwrap_err();
        assert_eq!(err.to_string(), "Input is not valid EUC-KR");

        // cp949 bytes behind a UTF-8 BOM are still checked as UTF-8
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(&cp949);
        assert!(decode_text(&bytes, "utf-8").is_err());
    }

    #[test]
    fn test_decode_strips_own_bom() {
        let bytes = b"\xEF\xBB\xBFgeometry,black-spot";
        assert_eq!(decode_text(bytes, "utf-8").unwrap(), "geometry,black-spot");
    }

    #[test]
    fn test_parse_accidents() {
        let csv = "발생년월일시,계절,교통량,사망자수,사상자수\n\
                   2021010108,겨울,1000,1,3\n\
                   2021070114,여름,,0,2\n";
        let records = parse_accidents(csv.as_bytes(), "utf-8").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].season, "겨울");
        assert_eq!(records[0].traffic_volume, Some(1000.0));
        assert_eq!(records[1].traffic_volume, None);
        assert_eq!(records[1].casualties, Some(2));
        assert_eq!(records[1].longitude, None);
    }

    #[test]
    fn test_parse_accidents_bad_date() {
        let csv = "발생년월일시,계절,사망자수\n2021-01-01,겨울,1\n";
        let err = parse_accidents(csv.as_bytes(), "utf-8").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_accidents_missing_column() {
        let csv = "발생년월일시,사망자수\n2021010108,1\n";
        assert!(parse_accidents(csv.as_bytes(), "utf-8").is_err());
    }

    #[test]
    fn test_parse_black_spots() {
        let csv = "geometry,black-spot,Start or End,VDS_CD\n\
                   \"LINESTRING (127 37, 127.5 37.5)\",4.2,E,A1\n\
                   \"LINESTRING (128 36, 128.5 36.5)\",1.0,,A2\n";
        let segments = parse_black_spots(csv.as_bytes(), "utf-8").unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].marker.as_deref(), Some("E"));
        assert_eq!(segments[1].marker, None);
        assert_eq!(segments[1].name, "A2");
    }
}
