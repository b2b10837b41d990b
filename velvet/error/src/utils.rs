use std::fmt::Display;

use itertools::Itertools;

pub fn display_expected_of_any<T: Display>(collection: &[T]) -> String {
    display_expected_of(collection, "one of")
}

/// Displays a string which says that the elements of `collection`
/// were expected.
pub fn display_expected_of<T: Display>(collection: &[T], expected_of: &str) -> String {
    match collection {
        [] => "nothing".to_string(),
        [single] => format!("{single}"),
        many => format!("{} ({})", expected_of, many.iter().join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::display_expected_of_any;

    #[test]
    fn expected_lists() {
        assert_eq!(display_expected_of_any::<&str>(&[]), "nothing");
        assert_eq!(display_expected_of_any(&["Semicolon"]), "Semicolon");
        assert_eq!(
            display_expected_of_any(&["Comma", "ParenthesisClose"]),
            "one of (Comma, ParenthesisClose)"
        );
    }
}
