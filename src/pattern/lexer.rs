use super::PatternParseError;

/// Raw token produced by the pattern lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexToken {
    /// A bare word: a keyword, or an option reference when it starts with `-`
    Word(String),
    /// A quoted word; always a keyword, even when it starts with `-`
    Quoted(String),
    /// Angle-bracket value slot (e.g. "<file>", "<count:int>"), content only
    Slot(String),
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `|`
    Pipe,
    /// `...`
    Ellipsis,
}

impl LexToken {
    /// Source-like rendering used in error messages.
    pub fn display(&self) -> String {
        match self {
            Self::Word(w) => w.clone(),
            Self::Quoted(w) => format!("'{w}'"),
            Self::Slot(s) => format!("<{s}>"),
            Self::OpenBracket => "[".to_string(),
            Self::CloseBracket => "]".to_string(),
            Self::OpenParen => "(".to_string(),
            Self::CloseParen => ")".to_string(),
            Self::Pipe => "|".to_string(),
            Self::Ellipsis => "...".to_string(),
        }
    }
}

/// A token with the byte offset where it starts in the pattern string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: LexToken,
    pub pos: usize,
}

const ELLIPSIS: &str = "...";

/// Tokenize a pattern string into a sequence of [`Spanned`] tokens.
///
/// Grouping characters are not balanced here; the parser reports
/// unclosed groups with the position of the opening token.
pub fn tokenize(pattern: &str) -> Result<Vec<Spanned>, PatternParseError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(ch) = pattern[pos..].chars().next() {
        let start = pos;
        match ch {
            c if c.is_whitespace() => {
                pos += c.len_utf8();
            }

            '"' | '\'' => {
                let body = &pattern[pos + 1..];
                let Some(close) = body.find(ch) else {
                    return Err(PatternParseError::UnclosedQuote(start));
                };
                tokens.push(Spanned {
                    token: LexToken::Quoted(body[..close].to_string()),
                    pos: start,
                });
                pos += 1 + close + 1;
            }

            '<' => {
                let body = &pattern[pos + 1..];
                let Some(close) = body.find('>') else {
                    return Err(PatternParseError::UnclosedBracket(start));
                };
                tokens.push(Spanned {
                    token: LexToken::Slot(body[..close].to_string()),
                    pos: start,
                });
                pos += 1 + close + 1;
            }

            '[' | ']' | '(' | ')' | '|' => {
                let token = match ch {
                    '[' => LexToken::OpenBracket,
                    ']' => LexToken::CloseBracket,
                    '(' => LexToken::OpenParen,
                    ')' => LexToken::CloseParen,
                    _ => LexToken::Pipe,
                };
                tokens.push(Spanned { token, pos: start });
                pos += 1;
            }

            '.' if pattern[pos..].starts_with(ELLIPSIS) => {
                tokens.push(Spanned {
                    token: LexToken::Ellipsis,
                    pos: start,
                });
                pos += ELLIPSIS.len();
            }

            '>' => {
                return Err(PatternParseError::UnexpectedToken {
                    token: ">".to_string(),
                    pos: start,
                });
            }

            _ => {
                let len = word_len(&pattern[pos..]);
                tokens.push(Spanned {
                    token: LexToken::Word(pattern[pos..pos + len].to_string()),
                    pos: start,
                });
                pos += len;
            }
        }
    }

    Ok(tokens)
}

/// Byte length of the word at the start of `rest`. A word ends at
/// whitespace, a grouping character, a slot, a quote or a trailing `...`.
fn word_len(rest: &str) -> usize {
    let mut len = 0;
    for (i, c) in rest.char_indices() {
        if is_word_boundary(c) || (c == '.' && i > 0 && rest[i..].starts_with(ELLIPSIS)) {
            break;
        }
        len = i + c.len_utf8();
    }
    len
}

fn is_word_boundary(c: char) -> bool {
    c.is_whitespace() || matches!(c, '[' | ']' | '(' | ')' | '|' | '<' | '>' | '"' | '\'')
}
