//! Type-safe wrappers for the core value domains.

pub mod quality;

pub use quality::{Quality, QualityError, QUALITY_MAX, QUALITY_MIN};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_valid_range_roundtrips(value in 0i64..=100) {
            let quality = Quality::new(value).unwrap();
            prop_assert_eq!(i64::from(quality.value()), value);
        }

        #[test]
        fn prop_out_of_range_rejected(value in 101i64..=10_000) {
            prop_assert!(Quality::new(value).is_err());
            prop_assert!(Quality::new(-value).is_err());
        }

        #[test]
        fn prop_trailer_byte_has_high_bit_clear(value in 0i64..=100) {
            let quality = Quality::new(value).unwrap();
            prop_assert_eq!(quality.trailer_byte() & 0x80, 0);
            prop_assert_eq!(quality.trailer_byte(), quality.value() & 0x7F);
        }
    }
}
