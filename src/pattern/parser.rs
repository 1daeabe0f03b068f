//! Recursive-descent parser from lexer tokens to a [`PatternNode`] tree.
//!
//! Grammar:
//!
//! ```text
//! pattern     = [ alternation ]
//! alternation = sequence { "|" sequence }
//! sequence    = term { term }
//! term        = atom [ "..." ]
//! atom        = word | quoted | "<slot>" | "[" alternation "]" | "(" alternation ")"
//! ```
//!
//! Bare words starting with `-` (other than `-` itself) are option
//! references and must resolve through the [`SymbolTable`]; other words
//! are interned as keywords.

use super::lexer::{LexToken, Spanned, tokenize};
use super::{PatternNode, PatternParseError, PatternSymbol, SlotInfo, ValueType};

/// Tables a pattern resolves its words against.
pub trait SymbolTable {
    /// Index of the declared option with this exact name (`-x`, `--long`).
    fn option_index(&self, name: &str) -> Option<usize>;
    /// Index of the keyword, adding it to the table if new.
    fn intern_keyword(&mut self, word: &str) -> usize;
}

/// Result of parsing one pattern string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPattern {
    pub root: PatternNode,
    /// Value slots in left-to-right order; `SlotId`s index this list.
    pub slots: Vec<SlotInfo>,
}

/// Parse a pattern string, resolving options and keywords through `table`.
pub fn parse(pattern: &str, table: &mut dyn SymbolTable) -> Result<ParsedPattern, PatternParseError> {
    let tokens = tokenize(pattern)?;
    let mut parser = Parser {
        tokens: &tokens,
        cursor: 0,
        table,
        slots: Vec::new(),
        end_pos: pattern.len(),
    };

    let root = if tokens.is_empty() {
        PatternNode::Sequence(Vec::new())
    } else {
        parser.alternation(0)?
    };

    if let Some(extra) = parser.peek() {
        return Err(PatternParseError::UnexpectedToken {
            token: extra.token.display(),
            pos: extra.pos,
        });
    }

    Ok(ParsedPattern {
        root,
        slots: parser.slots,
    })
}

/// Parse slot content (`name` or `name:type`) as written between `<` and `>`.
/// `pos` is reported in errors.
pub fn parse_slot(content: &str, pos: usize) -> Result<(String, ValueType), PatternParseError> {
    let (name, annotation) = match content.split_once(':') {
        Some((name, ty)) => (name.trim(), Some(ty.trim())),
        None => (content.trim(), None),
    };
    if name.is_empty() {
        return Err(PatternParseError::EmptySlotName(pos));
    }
    let ty = match annotation {
        Some(ty) => ValueType::from_annotation(ty).ok_or_else(|| {
            PatternParseError::UnknownValueType {
                slot: name.to_string(),
                ty: ty.to_string(),
            }
        })?,
        None => ValueType::Str,
    };
    Ok((name.to_string(), ty))
}

struct Parser<'t, 'r> {
    tokens: &'t [Spanned],
    cursor: usize,
    table: &'r mut dyn SymbolTable,
    slots: Vec<SlotInfo>,
    end_pos: usize,
}

impl Parser<'_, '_> {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.cursor)
    }

    fn peek_token(&self) -> Option<&LexToken> {
        self.peek().map(|s| &s.token)
    }

    fn current_pos(&self) -> usize {
        self.peek().map_or(self.end_pos, |s| s.pos)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    /// `alternation = sequence { "|" sequence }`
    fn alternation(&mut self, start: usize) -> Result<PatternNode, PatternParseError> {
        let mut branches = vec![self.sequence(start)?];
        while let Some(LexToken::Pipe) = self.peek_token() {
            let pipe = self.current_pos();
            self.advance();
            branches.push(self.sequence(pipe)?);
        }
        if branches.len() == 1 {
            Ok(branches.remove(0))
        } else {
            Ok(PatternNode::Alternation(branches))
        }
    }

    /// `sequence = term { term }`; `start` is where an empty sequence is reported.
    fn sequence(&mut self, start: usize) -> Result<PatternNode, PatternParseError> {
        let mut terms = Vec::new();
        while let Some(token) = self.peek_token() {
            if matches!(
                token,
                LexToken::Pipe | LexToken::CloseBracket | LexToken::CloseParen
            ) {
                break;
            }
            terms.push(self.term()?);
        }
        match terms.len() {
            0 => Err(PatternParseError::EmptyAlternation(start)),
            1 => Ok(terms.remove(0)),
            _ => Ok(PatternNode::Sequence(terms)),
        }
    }

    /// `term = atom [ "..." ]`
    fn term(&mut self) -> Result<PatternNode, PatternParseError> {
        let pos = self.current_pos();
        let first_slot = self.slots.len();
        let atom = self.atom()?;

        if let Some(LexToken::Ellipsis) = self.peek_token() {
            self.advance();
            let count = self.slots.len() - first_slot;
            if count > 1 {
                return Err(PatternParseError::RepeatedSlots { pos, count });
            }
            for slot in &mut self.slots[first_slot..] {
                slot.repeated = true;
            }
            return Ok(PatternNode::Repeat(Box::new(atom)));
        }
        Ok(atom)
    }

    fn atom(&mut self) -> Result<PatternNode, PatternParseError> {
        let Some(Spanned { token, pos }) = self.advance() else {
            return Err(PatternParseError::EmptyAlternation(self.end_pos));
        };

        match token {
            LexToken::Word(word) => self.word(&word),
            LexToken::Quoted(word) => Ok(PatternNode::Symbol {
                symbol: PatternSymbol::Keyword(self.table.intern_keyword(&word)),
                slot: None,
            }),
            LexToken::Slot(content) => {
                let (name, ty) = parse_slot(&content, pos)?;
                let id = self.slots.len();
                self.slots.push(SlotInfo {
                    name,
                    ty,
                    repeated: false,
                });
                Ok(PatternNode::Symbol {
                    symbol: PatternSymbol::Value,
                    slot: Some(id),
                })
            }
            LexToken::OpenBracket => {
                let inner = self.group(pos, &LexToken::CloseBracket)?;
                Ok(PatternNode::Optional(Box::new(inner)))
            }
            LexToken::OpenParen => self.group(pos, &LexToken::CloseParen),
            LexToken::Ellipsis => Err(PatternParseError::DanglingEllipsis(pos)),
            other => Err(PatternParseError::UnexpectedToken {
                token: other.display(),
                pos,
            }),
        }
    }

    /// Body of a bracketed group up to and including `close`.
    fn group(&mut self, open: usize, close: &LexToken) -> Result<PatternNode, PatternParseError> {
        match self.peek_token() {
            Some(token) if token == close => return Err(PatternParseError::EmptyGroup(open)),
            None => return Err(Self::unclosed(open, close)),
            Some(_) => {}
        }
        let inner = self.alternation(open)?;
        match self.advance() {
            Some(Spanned { token, .. }) if &token == close => Ok(inner),
            Some(Spanned { token, pos }) => Err(PatternParseError::UnexpectedToken {
                token: token.display(),
                pos,
            }),
            None => Err(Self::unclosed(open, close)),
        }
    }

    fn unclosed(open: usize, close: &LexToken) -> PatternParseError {
        if *close == LexToken::CloseBracket {
            PatternParseError::UnclosedSquareBracket(open)
        } else {
            PatternParseError::UnclosedParen(open)
        }
    }

    fn word(&mut self, word: &str) -> Result<PatternNode, PatternParseError> {
        let symbol = if is_option_ref(word) {
            let index = self
                .table
                .option_index(word)
                .ok_or_else(|| PatternParseError::UnknownOption(word.to_string()))?;
            PatternSymbol::Option(index)
        } else {
            PatternSymbol::Keyword(self.table.intern_keyword(word))
        };
        Ok(PatternNode::Symbol { symbol, slot: None })
    }
}

/// `-x` and `--long` reference options; a lone `-` is an ordinary word.
fn is_option_ref(word: &str) -> bool {
    word.len() > 1 && word.starts_with('-')
}
