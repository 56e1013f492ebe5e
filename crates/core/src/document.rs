//! Serde model of the OCR JSON documents consumed by the engine.
//!
//! The shape follows the Document AI style output the OCR step produces:
//! one global `text` buffer, and per page a list of token (or line) records
//! whose text is addressed by byte offsets into that buffer and whose
//! position is a polygon of normalized vertices.
//!
//! Every field is optional on the wire. Missing pieces are modelled as
//! `None`/empty here and the extractor decides what can still be placed.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::LayoutError;

/// A whole OCR document: the shared text buffer and its pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Document {
    /// Parse a document from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a document from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, LayoutError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// One page geometry record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<Dimension>,
    #[serde(default)]
    pub tokens: Vec<TokenRecord>,
    #[serde(default)]
    pub lines: Vec<TokenRecord>,
}

impl Page {
    /// Page width and height in pixels, if both are usable.
    pub fn pixel_size(&self) -> Option<(f32, f32)> {
        self.dimension
            .as_ref()
            .filter(|d| d.width > 0.0 && d.height > 0.0)
            .map(|d| (d.width, d.height))
    }
}

/// Nominal page size as reported by the OCR step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A token or line record: text anchor plus bounding polygon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_anchor: Option<TextAnchor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_poly: Option<BoundingPoly>,
}

/// References into the document text buffer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnchor {
    #[serde(default)]
    pub text_segments: Vec<TextSegment>,
}

/// Half-open `[start_index, end_index)` byte range.
///
/// Indices arrive either as JSON numbers or as decimal strings (int64
/// encoding); an omitted index means `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSegment {
    #[serde(default, deserialize_with = "deserialize_index")]
    pub start_index: usize,
    #[serde(default, deserialize_with = "deserialize_index")]
    pub end_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingPoly {
    /// Ordered top-left, top-right, bottom-right, bottom-left.
    #[serde(default)]
    pub normalized_vertices: Vec<NormalizedVertex>,
}

/// A vertex in `[0, 1]` page-relative coordinates. Omitted axes are `0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedVertex {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

// ---------------------------------------------------------------------------
// Index deserialization
// ---------------------------------------------------------------------------

fn deserialize_index<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    struct IndexVisitor;

    impl Visitor<'_> for IndexVisitor {
        type Value = usize;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative integer or a decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<usize, E> {
            usize::try_from(v).map_err(|_| E::custom(format!("index {v} out of range")))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<usize, E> {
            usize::try_from(v).map_err(|_| E::custom(format!("negative index {v}")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<usize, E> {
            v.trim()
                .parse::<usize>()
                .map_err(|_| E::custom(format!("invalid index string '{v}'")))
        }

        fn visit_unit<E: de::Error>(self) -> Result<usize, E> {
            Ok(0)
        }
    }

    deserializer.deserialize_any(IndexVisitor)
}
