//! Pattern symbols and the tree produced by parsing a pattern string.
//!
//! A pattern such as `(-m | --move) <file>...` is tokenized by [`lexer`]
//! and turned into a [`PatternNode`] tree by [`parser`]. Leaves are
//! [`PatternSymbol`]s whose keyword and option indexes point into tables
//! owned by the [`Spec`](crate::spec::Spec) that parsed them.

mod error;
pub mod lexer;
pub mod parser;

use serde::Deserialize;

pub use error::*;
pub use parser::{ParsedPattern, SymbolTable, parse, parse_slot};

/// Index of a value slot within its pattern, in left-to-right order.
pub type SlotId = usize;

/// Vocabulary of a pattern: what a single input token must be to advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PatternSymbol {
    /// A literal word, by index into the keyword table.
    Keyword(usize),
    /// A declared option, by index into the option table.
    Option(usize),
    /// Any positional argument.
    Value,
}

/// Type a value slot's text is converted to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum ValueType {
    #[default]
    Str,
    Int,
    Float,
    Bool,
    /// One of a fixed set of words (`<mode:fast|slow>`).
    Choice(Vec<String>),
}

impl ValueType {
    /// Resolve a slot type annotation such as `int` or `fast|slow`.
    pub fn from_annotation(annotation: &str) -> Option<Self> {
        match annotation {
            "str" | "string" => Some(Self::Str),
            "int" | "integer" => Some(Self::Int),
            "float" | "number" => Some(Self::Float),
            "bool" | "boolean" => Some(Self::Bool),
            s if s.contains('|') => {
                let choices: Vec<String> = s.split('|').map(|c| c.trim().to_string()).collect();
                if choices.iter().any(|c| c.is_empty()) {
                    None
                } else {
                    Some(Self::Choice(choices))
                }
            }
            _ => None,
        }
    }

    /// Human-readable description used in conversion error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Str => "a string".to_string(),
            Self::Int => "an integer".to_string(),
            Self::Float => "a number".to_string(),
            Self::Bool => "a boolean".to_string(),
            Self::Choice(choices) => format!("one of {}", choices.join(", ")),
        }
    }
}

impl TryFrom<String> for ValueType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_annotation(value.trim()).ok_or_else(|| format!("unknown value type '{value}'"))
    }
}

/// A value slot declared in a pattern or as an option's argument.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotInfo {
    pub name: String,
    pub ty: ValueType,
    /// Set when the slot sits under a `...` repetition and binds a list.
    pub repeated: bool,
}

/// Structured form of a pattern string.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternNode {
    Symbol {
        symbol: PatternSymbol,
        slot: Option<SlotId>,
    },
    /// Juxtaposition; the empty sequence matches nothing and consumes nothing.
    Sequence(Vec<PatternNode>),
    /// `a | b`
    Alternation(Vec<PatternNode>),
    /// `[a]`
    Optional(Box<PatternNode>),
    /// `a...`, one or more.
    Repeat(Box<PatternNode>),
}

impl PatternNode {
    /// Visit every symbol leaf, left to right.
    pub fn for_each_symbol(&self, f: &mut impl FnMut(PatternSymbol, Option<SlotId>)) {
        match self {
            Self::Symbol { symbol, slot } => f(*symbol, *slot),
            Self::Sequence(nodes) | Self::Alternation(nodes) => {
                for node in nodes {
                    node.for_each_symbol(f);
                }
            }
            Self::Optional(inner) | Self::Repeat(inner) => inner.for_each_symbol(f),
        }
    }

    /// Number of value slots in this subtree.
    pub fn slot_count(&self) -> usize {
        let mut count = 0;
        self.for_each_symbol(&mut |_, slot| {
            if slot.is_some() {
                count += 1;
            }
        });
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("str", Some(ValueType::Str))]
    #[case("string", Some(ValueType::Str))]
    #[case("int", Some(ValueType::Int))]
    #[case("number", Some(ValueType::Float))]
    #[case("bool", Some(ValueType::Bool))]
    #[case("fast|slow", Some(ValueType::Choice(vec!["fast".into(), "slow".into()])))]
    #[case("fast||slow", None)]
    #[case("u128", None)]
    fn value_type_from_annotation(#[case] input: &str, #[case] expected: Option<ValueType>) {
        assert_eq!(ValueType::from_annotation(input), expected);
    }

    #[test]
    fn value_type_deserializes_from_string() {
        let ty: ValueType = serde_json::from_str("\"int\"").unwrap();
        assert_eq!(ty, ValueType::Int);
        let err = serde_json::from_str::<ValueType>("\"complex\"").unwrap_err();
        assert!(err.to_string().contains("unknown value type 'complex'"));
    }

    #[test]
    fn slot_count_walks_nested_groups() {
        let node = PatternNode::Sequence(vec![
            PatternNode::Symbol {
                symbol: PatternSymbol::Keyword(0),
                slot: None,
            },
            PatternNode::Optional(Box::new(PatternNode::Alternation(vec![
                PatternNode::Symbol {
                    symbol: PatternSymbol::Value,
                    slot: Some(0),
                },
                PatternNode::Repeat(Box::new(PatternNode::Symbol {
                    symbol: PatternSymbol::Value,
                    slot: Some(1),
                })),
            ]))),
        ]);
        assert_eq!(node.slot_count(), 2);
    }
}
