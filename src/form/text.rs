//! PDF text string encoding (ISO 32000-1:2008, Section 7.9.2.2).

use lopdf::{Object, StringFormat};

/// Decode a PDF text string that may be UTF-16BE (with BOM) or PDFDocEncoding.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    // Authoring tools sometimes emit raw UTF-8 without a marker
    if !bytes.is_ascii() {
        if let Ok(s) = std::str::from_utf8(bytes) {
            return s.to_string();
        }
    }
    bytes.iter().filter_map(|&b| pdfdoc_char(b)).collect()
}

/// Encode a string as a PDF text string object.
///
/// ASCII stays a literal string; anything else (umlauts included) is written as
/// UTF-16BE with BOM, which every conforming reader accepts.
pub fn encode_text_string(s: &str) -> Object {
    if s.is_ascii() {
        return Object::String(s.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// PDFDocEncoding, Appendix D.2, Table D.2.
fn pdfdoc_char(code: u8) -> Option<char> {
    let c = match code {
        0x00..=0x7F => code as char,
        0x80 => '•',
        0x81 => '†',
        0x82 => '‡',
        0x83 => '…',
        0x84 => '—',
        0x85 => '–',
        0x86 => 'ƒ',
        0x87 => '⁄',
        0x88 => '‹',
        0x89 => '›',
        0x8A => '−',
        0x8B => '‰',
        0x8C => '„',
        0x8D => '\u{201C}',
        0x8E => '\u{201D}',
        0x8F => '\u{2018}',
        0x90 => '\u{2019}',
        0x91 => '‚',
        0x92 => '™',
        0x93 => 'ﬁ',
        0x94 => 'ﬂ',
        0x95 => 'Ł',
        0x96 => 'Œ',
        0x97 => 'Š',
        0x98 => 'Ÿ',
        0x99 => 'Ž',
        0x9A => 'ı',
        0x9B => 'ł',
        0x9C => 'œ',
        0x9D => 'š',
        0x9E => 'ž',
        0x9F => return None,
        0xA0..=0xFF => code as char,
    };
    Some(c)
}
