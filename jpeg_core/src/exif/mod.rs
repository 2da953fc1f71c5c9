//! EXIF metadata extraction.
//!
//! A forward-only scanner walks the JPEG container looking for the APP1
//! segment carrying the `Exif\0\0` signature; the embedded TIFF structure is
//! then decoded into typed tags. The output is purely informational: it is
//! surfaced to the user but never consumed by the optimizer itself.

mod scanner;
mod tags;
mod tiff;

pub(crate) use scanner::locate_exif_segment;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::errors::ExifResult;

/// Unsigned EXIF rational: numerator/denominator pair, both 32-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rational {
    pub numerator: u32,
    pub denominator: u32,
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Signed EXIF rational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignedRational {
    pub numerator: i32,
    pub denominator: i32,
}

impl fmt::Display for SignedRational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Decoded value of an IFD entry. Formats the decoder does not interpret
/// (byte arrays, floats, multi-element integer arrays) have no value; the
/// tag itself is still retained.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExifValue {
    Text(String),
    UInt(u32),
    Rational(Rational),
    SignedRational(SignedRational),
}

impl fmt::Display for ExifValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExifValue::Text(s) => write!(f, "{}", s),
            ExifValue::UInt(v) => write!(f, "{}", v),
            ExifValue::Rational(r) => write!(f, "{}", r),
            ExifValue::SignedRational(r) => write!(f, "{}", r),
        }
    }
}

/// A single decoded EXIF tag. Known ids carry a symbolic name and a short
/// description from the static tag table; unknown ids are retained keyed
/// only by their numeric value.
#[derive(Debug, Clone, Serialize)]
pub struct ExifTag {
    pub id: u16,
    pub name: Option<&'static str>,
    pub description: Option<&'static str>,
    pub value: Option<ExifValue>,
}

impl ExifTag {
    pub(crate) fn new(id: u16, value: Option<ExifValue>) -> Self {
        let (name, description) = match tags::lookup(id) {
            Some((name, description)) => (Some(name), Some(description)),
            None => (None, None),
        };
        ExifTag {
            id,
            name,
            description,
            value,
        }
    }

    /// Title in the form `0x8769 ExifOffset` or `0xC0DE Unknown`.
    pub fn full_title(&self) -> String {
        match self.name {
            Some(name) => format!("0x{:04X} {}", self.id, name),
            None => format!("0x{:04X} Unknown", self.id),
        }
    }
}

/// All tags decoded from one file, keyed by numeric tag id.
#[derive(Debug, Default)]
pub struct ExifData {
    tags: HashMap<u16, ExifTag>,
    /// Offset of the thumbnail directory declared after IFD0, when present.
    /// Recorded but never followed.
    ifd1_offset: Option<u32>,
}

impl ExifData {
    pub fn get(&self, id: u16) -> Option<&ExifTag> {
        self.tags.get(&id)
    }

    /// Looks a tag up by its symbolic name from the static table.
    pub fn get_by_name(&self, name: &str) -> Option<&ExifTag> {
        let id = tags::id_for_name(name)?;
        self.tags.get(&id)
    }

    /// Tags sorted by numeric id, for stable display.
    pub fn sorted_tags(&self) -> Vec<&ExifTag> {
        let mut all: Vec<&ExifTag> = self.tags.values().collect();
        all.sort_by_key(|t| t.id);
        all
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn ifd1_offset(&self) -> Option<u32> {
        self.ifd1_offset
    }

    pub(crate) fn insert(&mut self, id: u16, value: Option<ExifValue>) {
        self.tags.insert(id, ExifTag::new(id, value));
    }

    pub(crate) fn set_ifd1_offset(&mut self, offset: Option<u32>) {
        self.ifd1_offset = offset;
    }
}

/// Decodes the EXIF metadata of an in-memory JPEG.
pub fn read_exif(data: &[u8]) -> ExifResult<ExifData> {
    scanner::scan(data)
}

/// Decodes the EXIF metadata of a JPEG file.
pub fn read_exif_file(path: &Path) -> ExifResult<ExifData> {
    let data = std::fs::read(path)?;
    read_exif(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rational_display() {
        let r = Rational {
            numerator: 3127,
            denominator: 10000,
        };
        assert_eq!(r.to_string(), "3127/10000");

        let s = SignedRational {
            numerator: -1,
            denominator: 3,
        };
        assert_eq!(s.to_string(), "-1/3");
    }

    #[test]
    fn test_known_tag_title() {
        let tag = ExifTag::new(0x010F, Some(ExifValue::Text("ACME".into())));
        assert_eq!(tag.full_title(), "0x010F Make");
        assert!(tag.description.is_some());
    }

    #[test]
    fn test_unknown_tag_title() {
        let tag = ExifTag::new(0xC0DE, None);
        assert_eq!(tag.full_title(), "0xC0DE Unknown");
        assert!(tag.name.is_none());
        assert!(tag.description.is_none());
    }

    #[test]
    fn test_lookup_by_name() {
        let mut data = ExifData::default();
        data.insert(0x0110, Some(ExifValue::Text("Model X".into())));
        assert!(data.get_by_name("Model").is_some());
        assert!(data.get_by_name("NoSuchTag").is_none());
    }
}
