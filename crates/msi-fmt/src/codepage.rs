//! Codepage identifiers for string-pool text.

use encoding_rs::Encoding;

use crate::PoolError;

/// An ANSI or UTF-8 codepage, as carried in the string-pool header.
///
/// Identifier 0 (the "neutral" codepage) decodes as Windows-1252, which
/// is what authoring tools assume in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePage {
    id: u32,
    encoding: &'static Encoding,
}

impl CodePage {
    /// Resolves a numeric codepage identifier.
    pub fn from_id(id: u32) -> Result<CodePage, PoolError> {
        let encoding = match id {
            0 | 1252 => encoding_rs::WINDOWS_1252,
            874 => encoding_rs::WINDOWS_874,
            932 => encoding_rs::SHIFT_JIS,
            936 => encoding_rs::GBK,
            949 => encoding_rs::EUC_KR,
            950 => encoding_rs::BIG5,
            1250 => encoding_rs::WINDOWS_1250,
            1251 => encoding_rs::WINDOWS_1251,
            1253 => encoding_rs::WINDOWS_1253,
            1254 => encoding_rs::WINDOWS_1254,
            1255 => encoding_rs::WINDOWS_1255,
            1256 => encoding_rs::WINDOWS_1256,
            1257 => encoding_rs::WINDOWS_1257,
            1258 => encoding_rs::WINDOWS_1258,
            65001 => encoding_rs::UTF_8,
            _ => return Err(PoolError::InvalidCodepage(id)),
        };
        Ok(CodePage { id, encoding })
    }

    /// The numeric identifier as stored on disk.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The WHATWG name of the backing encoding.
    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Decodes pool bytes, substituting U+FFFD for malformed sequences.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let (text, _, _) = self.encoding.decode(bytes);
        text.into_owned()
    }
}

impl Default for CodePage {
    fn default() -> Self {
        CodePage::from_id(1252).expect("default codepage is supported")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_maps_to_windows_1252() {
        let cp = CodePage::from_id(0).unwrap();
        assert_eq!(cp.encoding_name(), "windows-1252");
        assert_eq!(cp.decode(b"caf\xe9"), "café");
    }

    #[test]
    fn utf8_decodes_multibyte() {
        let cp = CodePage::from_id(65001).unwrap();
        assert_eq!(cp.id(), 65001);
        assert_eq!(cp.decode("данные".as_bytes()), "данные");
    }

    #[test]
    fn unknown_codepage_is_an_error() {
        assert!(matches!(
            CodePage::from_id(12000),
            Err(PoolError::InvalidCodepage(12000))
        ));
    }
}
