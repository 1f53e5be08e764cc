//! Property-based tests: identifier conversion is deterministic and stable.

use ferry_gen::{to_pascal_case, to_snake_case};
use proptest::prelude::*;

proptest! {
    #[test]
    fn snake_case_is_deterministic(name in "[A-Za-z_][A-Za-z0-9_]{0,24}") {
        prop_assert_eq!(to_snake_case(&name), to_snake_case(&name));
    }

    #[test]
    fn snake_case_is_idempotent(name in "[A-Za-z_][A-Za-z0-9_]{0,24}") {
        let once = to_snake_case(&name);
        prop_assert_eq!(to_snake_case(&once), once.clone());
    }

    #[test]
    fn snake_case_output_is_a_valid_identifier(name in "[A-Za-z][A-Za-z0-9_]{0,24}") {
        let converted = to_snake_case(&name);
        prop_assert!(!converted.is_empty());
        prop_assert!(converted.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        prop_assert!(!converted.starts_with(|c: char| c.is_ascii_digit()));
    }

    #[test]
    fn pascal_case_has_no_separators(name in "[a-z][a-z0-9_]{0,24}") {
        prop_assert!(!to_pascal_case(&name).contains('_'));
    }
}
