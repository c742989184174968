//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;
    use uguid::Guid;

    use crate::core::types::{DatumType, PcdType, Usage};

    /// Generate a valid C identifier such as `PcdMaximumUnicodeStringLength`
    pub fn c_name() -> impl Strategy<Value = String> {
        "[A-Za-z_][A-Za-z0-9_]{0,40}"
    }

    /// Generate an arbitrary GUID
    pub fn guid() -> impl Strategy<Value = Guid> {
        any::<[u8; 16]>().prop_map(Guid::from_bytes)
    }

    /// Generate a module or package version string
    pub fn version() -> impl Strategy<Value = String> {
        (0u32..10, 0u32..100).prop_map(|(major, minor)| format!("{major}.{minor}"))
    }

    /// Generate any usage except `Unknown`
    pub fn valid_usage() -> impl Strategy<Value = Usage> {
        prop::sample::select(Usage::VALID.to_vec())
    }

    /// Generate any item type except `Unknown`
    pub fn valid_pcd_type() -> impl Strategy<Value = PcdType> {
        prop::sample::select(PcdType::VALID.to_vec())
    }

    /// Generate any datum type except `Unknown`
    pub fn valid_datum_type() -> impl Strategy<Value = DatumType> {
        prop::sample::select(DatumType::VALID.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use crate::config::defaults::MIN_PROPTEST_ITERATIONS;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(MIN_PROPTEST_ITERATIONS))]

        #[test]
        fn test_c_name_generator(name in c_name()) {
            prop_assert!(!name.is_empty());
            prop_assert!(!name.starts_with(|c: char| c.is_ascii_digit()));
            prop_assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        }

        #[test]
        fn test_version_generator(version in version()) {
            let parts: Vec<&str> = version.split('.').collect();
            prop_assert_eq!(parts.len(), 2);
            for part in parts {
                prop_assert!(part.parse::<u32>().is_ok());
            }
        }

        #[test]
        fn test_valid_generators_never_yield_unknown(
            usage in valid_usage(),
            pcd in valid_pcd_type(),
            datum in valid_datum_type(),
        ) {
            prop_assert!(usage.is_valid());
            prop_assert!(pcd.is_valid());
            prop_assert!(datum.is_valid());
        }
    }
}
