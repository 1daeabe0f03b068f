use crate::pattern::PatternParseError;

/// Defect in the declared options or patterns. Raised by
/// [`Spec::build`](super::Spec::build); never produced by user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecError {
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: PatternParseError,
    },
    #[error("invalid option name '{name}' in '{names}'")]
    InvalidOptionName { names: String, name: String },
    #[error("invalid value placeholder for option '{option}': {source}")]
    InvalidOptionValue {
        option: String,
        #[source]
        source: PatternParseError,
    },
    #[error("option '{0}' is declared more than once")]
    DuplicateOption(String),
    #[error("pattern '{pattern}' has {found} value slots but {expected} types were given")]
    SlotCountMismatch {
        pattern: String,
        expected: usize,
        found: usize,
    },
    #[error("patterns '{first}' and '{second}' both match '{example}'")]
    AmbiguousPatterns {
        first: String,
        second: String,
        example: String,
    },
    #[error("pattern '{pattern}' matches '{example}' in more than one way")]
    AmbiguousPattern { pattern: String, example: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        SpecError::Pattern {
            pattern: "[<a>".into(),
            source: PatternParseError::UnclosedSquareBracket(0),
        },
        "invalid pattern '[<a>': unclosed square bracket at position 0"
    )]
    #[case(
        SpecError::InvalidOptionName { names: "-x|-".into(), name: "-".into() },
        "invalid option name '-' in '-x|-'"
    )]
    #[case(
        SpecError::DuplicateOption("--width".into()),
        "option '--width' is declared more than once"
    )]
    #[case(
        SpecError::SlotCountMismatch { pattern: "<a> <b>".into(), expected: 1, found: 2 },
        "pattern '<a> <b>' has 2 value slots but 1 types were given"
    )]
    #[case(
        SpecError::AmbiguousPatterns {
            first: "-x <v>".into(),
            second: "-x <v> [<w>]".into(),
            example: "-x <v>".into(),
        },
        "patterns '-x <v>' and '-x <v> [<w>]' both match '-x <v>'"
    )]
    #[case(
        SpecError::AmbiguousPattern { pattern: "[<a>] [<b>]".into(), example: "<a>".into() },
        "pattern '[<a>] [<b>]' matches '<a>' in more than one way"
    )]
    fn spec_error_display(#[case] error: SpecError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn pattern_error_has_source() {
        let error = SpecError::Pattern {
            pattern: "()".into(),
            source: PatternParseError::EmptyGroup(0),
        };
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn spec_error_into_anyhow_keeps_chain() {
        let error = SpecError::InvalidOptionValue {
            option: "-x".into(),
            source: PatternParseError::EmptySlotName(0),
        };
        let anyhow_err: anyhow::Error = error.into();
        let chain: Vec<String> = anyhow_err.chain().map(|e| e.to_string()).collect();
        assert_eq!(
            chain,
            vec![
                "invalid value placeholder for option '-x': empty value slot name at position 0",
                "empty value slot name at position 0",
            ]
        );
    }
}
