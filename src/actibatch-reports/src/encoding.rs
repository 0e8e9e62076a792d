use std::fs;
use std::path::Path;

use crate::{ReportError, Result};

const BOM_UTF8: [u8; 3] = [0xEF, 0xBB, 0xBF];
const BOM_UTF16_LE: [u8; 2] = [0xFF, 0xFE];
const BOM_UTF16_BE: [u8; 2] = [0xFE, 0xFF];

/// Reads a device export as text. Exports arrive as UTF-8 with or without a
/// BOM, UTF-16 in either byte order, or a legacy single-byte encoding.
pub fn read_export(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|error| ReportError::Io(path.to_path_buf(), error))?;
    decode(&bytes, path)
}

fn decode(bytes: &[u8], path: &Path) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(&BOM_UTF8) {
        return match std::str::from_utf8(rest) {
            Ok(text) => Ok(text.to_string()),
            Err(_) => Err(ReportError::UnsupportedEncoding(path.to_path_buf())),
        };
    }
    if let Some(rest) = bytes.strip_prefix(&BOM_UTF16_LE) {
        return decode_utf16(rest, u16::from_le_bytes, path);
    }
    if let Some(rest) = bytes.strip_prefix(&BOM_UTF16_BE) {
        return decode_utf16(rest, u16::from_be_bytes, path);
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.to_string()),
        // Latin-1: every byte is its own code point
        Err(_) => Ok(bytes.iter().map(|&byte| byte as char).collect()),
    }
}

fn decode_utf16(bytes: &[u8], read: fn([u8; 2]) -> u16, path: &Path) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(ReportError::UnsupportedEncoding(path.to_path_buf()));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| read([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units)
        .map_err(|_| ReportError::UnsupportedEncoding(path.to_path_buf()))
}
