//! Binder-facing record types
//!
//! Format-agnostic records the binder reports back to the orchestrator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kind of book a binder decided it is unpacking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookKind {
    /// Comic book archive (cbz, cbr, cbt)
    Comic,
    Epub,
    Html,
    #[default]
    Unknown,
}

impl BookKind {
    /// Detect kind from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "cbz" | "cbr" | "cbt" | "cb7" => Some(Self::Comic),
            "epub" => Some(Self::Epub),
            "htm" | "html" => Some(Self::Html),
            _ => None,
        }
    }

    /// Detect kind from a MIME type
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/vnd.comicbook+zip"
            | "application/vnd.comicbook-rar"
            | "application/x-cbz"
            | "application/x-cbr" => Some(Self::Comic),
            "application/epub+zip" => Some(Self::Epub),
            "text/html" => Some(Self::Html),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comic => "comic",
            Self::Epub => "epub",
            Self::Html => "html",
            Self::Unknown => "unknown",
        }
    }
}

/// Book metadata record
///
/// Replaced wholesale when a binder extracts an embedded record (for
/// comics, typically ComicInfo.xml). Fields without a dedicated slot land
/// in `extras`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookMetadata {
    /// Kind the record is typed by
    pub kind: BookKind,
    /// Title
    pub title: Option<String>,
    /// Series name
    pub series: Option<String>,
    /// Issue within the series
    pub issue: Option<String>,
    /// Volume
    pub volume: Option<String>,
    /// Publication year
    pub year: Option<i32>,
    /// Writers, pencillers, editors
    pub creators: Vec<Creator>,
    /// Subject tags
    pub tags: Vec<String>,
    /// Format-specific fields with no dedicated slot
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl BookMetadata {
    /// Create an empty record typed by the given kind
    pub fn empty(kind: BookKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }
}

/// Book creator (writer, penciller, editor, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    /// Creator name
    pub name: String,
    /// Role (writer, penciller, colorist, ...)
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(BookKind::from_extension("cbz"), Some(BookKind::Comic));
        assert_eq!(BookKind::from_extension("CBR"), Some(BookKind::Comic));
        assert_eq!(BookKind::from_extension("epub"), Some(BookKind::Epub));
        assert_eq!(BookKind::from_extension("pdf"), None);
    }

    #[test]
    fn test_kind_from_mime() {
        assert_eq!(
            BookKind::from_mime("application/vnd.comicbook+zip"),
            Some(BookKind::Comic)
        );
        assert_eq!(BookKind::from_mime("application/epub+zip"), Some(BookKind::Epub));
        assert_eq!(BookKind::from_mime("image/png"), None);
    }

    #[test]
    fn test_empty_metadata_is_typed() {
        let metadata = BookMetadata::empty(BookKind::Comic);
        assert_eq!(metadata.kind, BookKind::Comic);
        assert!(metadata.title.is_none());
        assert!(metadata.creators.is_empty());
        assert!(metadata.extras.is_empty());
    }
}
