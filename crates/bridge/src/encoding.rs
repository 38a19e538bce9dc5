//! Per-channel text decoding
//!
//! Workers are asked to speak UTF-8, but stderr in particular may arrive in
//! a legacy code page (GBK on Chinese-locale Windows hosts). Decoding is
//! always lossy: malformed sequences become U+FFFD instead of failing.

use crawlgate_core::{Error, Result};
use encoding_rs::{Encoding, GBK, UTF_8};
use std::fmt;

/// Text encoding applied to one worker channel.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ChannelEncoding(&'static Encoding);

impl ChannelEncoding {
    pub fn utf8() -> Self {
        ChannelEncoding(UTF_8)
    }

    pub fn gbk() -> Self {
        ChannelEncoding(GBK)
    }

    /// Resolve a WHATWG encoding label (`utf-8`, `gbk`, `gb2312`, ...).
    /// Windows code page names `cp936` and `cp65001` are accepted as aliases.
    pub fn from_label(label: &str) -> Result<Self> {
        let normalized = label.trim().to_ascii_lowercase();
        let resolved = match normalized.as_str() {
            "cp936" | "ms936" | "windows-936" => Some(GBK),
            "cp65001" => Some(UTF_8),
            other => Encoding::for_label(other.as_bytes()),
        };
        resolved
            .map(ChannelEncoding)
            .ok_or_else(|| Error::invalid_input("encoding", format!("unknown encoding label '{label}'")))
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Decode bytes, replacing malformed sequences
    pub fn decode(&self, bytes: &[u8]) -> String {
        let (text, had_errors) = self.0.decode_without_bom_handling(bytes);
        if had_errors {
            tracing::debug!(
                encoding = self.name(),
                bytes = bytes.len(),
                "worker output contained malformed sequences"
            );
        }
        text.into_owned()
    }
}

impl Default for ChannelEncoding {
    fn default() -> Self {
        Self::utf8()
    }
}

impl fmt::Debug for ChannelEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ChannelEncoding").field(&self.name()).finish()
    }
}

impl std::str::FromStr for ChannelEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gbk_stderr_decodes() {
        let encoding = ChannelEncoding::from_label("cp936").unwrap();
        assert_eq!(encoding, ChannelEncoding::gbk());
        assert_eq!(encoding.decode(&[0xD6, 0xD0, 0xCE, 0xC4]), "中文");
    }

    #[test]
    fn test_invalid_utf8_degrades_instead_of_failing() {
        let text = ChannelEncoding::utf8().decode(&[b'o', b'k', 0xFF, b'!']);
        assert_eq!(text, "ok\u{FFFD}!");
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        assert_eq!(ChannelEncoding::from_label(" UTF-8 ").unwrap(), ChannelEncoding::utf8());
        assert_eq!(ChannelEncoding::from_label("GB2312").unwrap(), ChannelEncoding::gbk());
    }

    #[test]
    fn test_unknown_label_is_an_error() {
        let err = ChannelEncoding::from_label("klingon").unwrap_err();
        assert!(err.to_string().contains("unknown encoding label 'klingon'"));
    }
}
