//! Property-based tests for store path functions.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{join, normalize, relative_to, segments};
    use proptest::prelude::*;

    // ============================================================================
    // normalize property tests
    // ============================================================================

    proptest! {
        /// Property: normalize always yields an absolute path
        #[test]
        fn normalize_is_absolute(input in ".*") {
            let result = normalize(&input);
            prop_assert!(result.starts_with('/'));
        }

        /// Property: only the root keeps a trailing slash
        #[test]
        fn normalize_has_no_trailing_slash(input in "[a-z/]*") {
            let result = normalize(&input);
            prop_assert!(result == "/" || !result.ends_with('/'),
                "normalize('{}') = '{}'", input, result);
        }

        /// Property: normalize never produces empty segments
        #[test]
        fn normalize_has_no_double_slashes(input in "[a-z/]*") {
            let result = normalize(&input);
            prop_assert!(!result.contains("//"));
        }

        /// Property: normalize is idempotent
        #[test]
        fn normalize_is_idempotent(input in "[a-zA-Z0-9_./-]*") {
            let once = normalize(&input);
            let twice = normalize(&once);
            prop_assert_eq!(once, twice);
        }
    }

    // ============================================================================
    // join / relative_to property tests
    // ============================================================================

    proptest! {
        /// Property: joining a segment onto a normalized path stays normalized
        #[test]
        fn join_preserves_normalization(base in "[a-z/]*", child in "[a-z0-9]+") {
            let base = normalize(&base);
            let joined = join(&base, &child);
            prop_assert_eq!(normalize(&joined), joined.clone());
            prop_assert_eq!(segments(&joined).last().copied(), Some(child.as_str()));
        }

        /// Property: relative_to undoes join
        #[test]
        fn relative_to_inverts_join(base in "[a-z/]*", child in "[a-z0-9]+") {
            let base = normalize(&base);
            let joined = join(&base, &child);
            prop_assert_eq!(relative_to(&base, &joined), Some(child.as_str()));
        }
    }
}
