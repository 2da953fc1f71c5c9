//! JPEG marker classification.
//!
//! Every JPEG segment starts with a two-byte marker `FF xx`. Most segments
//! carry a big-endian length word that counts itself; a handful (SOI, EOI,
//! RSTn, TEM) are standalone markers with no payload.

/// Classification of a two-byte JPEG marker pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentMarker {
    /// Start of image.
    Soi,
    /// End of image.
    Eoi,
    /// Application segment APPn (0xFFE0..=0xFFEF); carries n. APP1
    /// conventionally holds the EXIF payload.
    App(u8),
    /// Quantization table definition.
    Dqt,
    /// Huffman table definition.
    Dht,
    /// Restart interval definition.
    Dri,
    /// Start of frame SOFn; 0xC0 is baseline DCT, 0xC2 progressive DCT.
    Sof(u8),
    /// Start of scan; entropy-coded data follows the header.
    Sos,
    /// Comment.
    Com,
    /// Restart marker RST0..=RST7; standalone.
    Rst(u8),
    /// Temporary private marker; standalone.
    Tem,
    /// Arithmetic coding conditioning.
    Dac,
    /// Number-of-lines definition.
    Dnl,
    /// Hierarchical progression definition.
    Dhp,
    /// Expand reference components.
    Exp,
    Jpg0,
    Jpg13,
}

impl SegmentMarker {
    /// Classifies a marker pair, or `None` when the bytes are not a marker
    /// this walker recognizes.
    pub fn classify(b0: u8, b1: u8) -> Option<SegmentMarker> {
        if b0 != 0xFF {
            return None;
        }
        match b1 {
            0xD8 => Some(SegmentMarker::Soi),
            0xD9 => Some(SegmentMarker::Eoi),
            0xDA => Some(SegmentMarker::Sos),
            0xDB => Some(SegmentMarker::Dqt),
            0xC4 => Some(SegmentMarker::Dht),
            0xCC => Some(SegmentMarker::Dac),
            0xDC => Some(SegmentMarker::Dnl),
            0xDD => Some(SegmentMarker::Dri),
            0xDE => Some(SegmentMarker::Dhp),
            0xDF => Some(SegmentMarker::Exp),
            0xFE => Some(SegmentMarker::Com),
            0xF0 => Some(SegmentMarker::Jpg0),
            0xFD => Some(SegmentMarker::Jpg13),
            0x01 => Some(SegmentMarker::Tem),
            0xD0..=0xD7 => Some(SegmentMarker::Rst(b1 - 0xD0)),
            0xE0..=0xEF => Some(SegmentMarker::App(b1 - 0xE0)),
            // DHT (0xC4) and DAC (0xCC) sit inside the SOF range and are
            // matched above.
            0xC0..=0xCF => Some(SegmentMarker::Sof(b1 - 0xC0)),
            _ => None,
        }
    }

    /// Standalone markers carry no length word and no payload.
    pub fn is_standalone(&self) -> bool {
        matches!(
            self,
            SegmentMarker::Soi | SegmentMarker::Eoi | SegmentMarker::Rst(_) | SegmentMarker::Tem
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_core_markers() {
        assert_eq!(SegmentMarker::classify(0xFF, 0xD8), Some(SegmentMarker::Soi));
        assert_eq!(SegmentMarker::classify(0xFF, 0xD9), Some(SegmentMarker::Eoi));
        assert_eq!(SegmentMarker::classify(0xFF, 0xDA), Some(SegmentMarker::Sos));
        assert_eq!(SegmentMarker::classify(0xFF, 0xDB), Some(SegmentMarker::Dqt));
        assert_eq!(SegmentMarker::classify(0xFF, 0xC4), Some(SegmentMarker::Dht));
        assert_eq!(SegmentMarker::classify(0xFF, 0xFE), Some(SegmentMarker::Com));
    }

    #[test]
    fn test_classify_app_range() {
        assert_eq!(SegmentMarker::classify(0xFF, 0xE0), Some(SegmentMarker::App(0)));
        assert_eq!(SegmentMarker::classify(0xFF, 0xE1), Some(SegmentMarker::App(1)));
        assert_eq!(SegmentMarker::classify(0xFF, 0xEF), Some(SegmentMarker::App(15)));
    }

    #[test]
    fn test_classify_sof_excludes_huffman_and_arithmetic() {
        assert_eq!(SegmentMarker::classify(0xFF, 0xC0), Some(SegmentMarker::Sof(0)));
        assert_eq!(SegmentMarker::classify(0xFF, 0xC2), Some(SegmentMarker::Sof(2)));
        assert_ne!(SegmentMarker::classify(0xFF, 0xC4), Some(SegmentMarker::Sof(4)));
        assert_ne!(SegmentMarker::classify(0xFF, 0xCC), Some(SegmentMarker::Sof(12)));
    }

    #[test]
    fn test_classify_restart_range() {
        for n in 0..8u8 {
            assert_eq!(
                SegmentMarker::classify(0xFF, 0xD0 + n),
                Some(SegmentMarker::Rst(n))
            );
        }
    }

    #[test]
    fn test_classify_rejects_non_marker_bytes() {
        assert_eq!(SegmentMarker::classify(0x00, 0xD8), None);
        assert_eq!(SegmentMarker::classify(0xFF, 0x00), None);
        assert_eq!(SegmentMarker::classify(0x12, 0x34), None);
    }

    #[test]
    fn test_standalone_markers() {
        assert!(SegmentMarker::Soi.is_standalone());
        assert!(SegmentMarker::Eoi.is_standalone());
        assert!(SegmentMarker::Rst(3).is_standalone());
        assert!(SegmentMarker::Tem.is_standalone());
        assert!(!SegmentMarker::App(1).is_standalone());
        assert!(!SegmentMarker::Sos.is_standalone());
    }
}
