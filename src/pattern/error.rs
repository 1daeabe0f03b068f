#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternParseError {
    #[error("unclosed angle bracket at position {0}")]
    UnclosedBracket(usize),
    #[error("unclosed square bracket at position {0}")]
    UnclosedSquareBracket(usize),
    #[error("unclosed parenthesis at position {0}")]
    UnclosedParen(usize),
    #[error("unclosed quote starting at position {0}")]
    UnclosedQuote(usize),
    #[error("unexpected '{token}' at position {pos}")]
    UnexpectedToken { token: String, pos: usize },
    #[error("empty group at position {0}")]
    EmptyGroup(usize),
    #[error("empty alternative at position {0}")]
    EmptyAlternation(usize),
    #[error("'...' at position {0} does not follow a repeatable element")]
    DanglingEllipsis(usize),
    #[error("empty value slot name at position {0}")]
    EmptySlotName(usize),
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("unknown value type '{ty}' for slot <{slot}>")]
    UnknownValueType { slot: String, ty: String },
    #[error("repeated group at position {pos} contains {count} value slots (at most one allowed)")]
    RepeatedSlots { pos: usize, count: usize },
}
