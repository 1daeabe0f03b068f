//! Declarations, their compiled form, and argument processing.
//!
//! A [`Spec`] collects option and pattern declarations and compiles them
//! on first use. [`Spec::parse`] turns an argument vector into a
//! [`ParseOutcome`]; a [`Processor`] additionally runs the bound actions
//! and reports errors.

pub mod decode;
mod error;
mod handler;
mod option;
mod processor;
mod value;

use std::sync::OnceLock;

use log::debug;

pub use error::*;
pub use handler::*;
pub use option::{OptionArg, OptionTable, ResolvedOption, parse_option_names};
pub use processor::*;
pub use value::*;

use crate::config::Config;
use crate::nfa::ambiguity::{Ambiguity, find_ambiguity};
use crate::nfa::{MatchOutcome, Matcher, Nfa, PatternMatch};
use crate::pattern::{self, ParsedPattern, PatternNode, PatternSymbol, ValueType};
use decode::OptionOccurrence;
use option::Tables;

/// Actions are `Send + Sync`: one built [`Spec`] may serve processors on
/// several threads.
pub type OptionAction<'a> = Box<dyn Fn(Option<&Value>, &mut Control) + Send + Sync + 'a>;
pub type PatternAction<'a> = Box<dyn Fn(&Bindings, &mut Control) + Send + Sync + 'a>;

/// An option such as `-w|--width` with an optional `<w:int>` value.
pub struct OptionDecl<'a> {
    names: String,
    value: Option<String>,
    value_type: Option<ValueType>,
    short_circuit: bool,
    further_args_are_values: bool,
    description: Option<String>,
    action: Option<OptionAction<'a>>,
}

impl<'a> OptionDecl<'a> {
    pub fn new(names: impl Into<String>) -> Self {
        Self {
            names: names.into(),
            value: None,
            value_type: None,
            short_circuit: false,
            further_args_are_values: false,
            description: None,
            action: None,
        }
    }

    /// Value placeholder, `<name>` or `<name:type>`.
    pub fn value(mut self, placeholder: impl Into<String>) -> Self {
        self.value = Some(placeholder.into());
        self
    }

    /// Overrides the placeholder's annotation; implies a value.
    pub fn value_type(mut self, ty: ValueType) -> Self {
        self.value_type = Some(ty);
        self
    }

    /// When present, only this option's action runs and processing stops.
    pub fn short_circuit(mut self) -> Self {
        self.short_circuit = true;
        self
    }

    /// Every argument after this option is positional.
    pub fn further_args_are_values(mut self) -> Self {
        self.further_args_are_values = true;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn action(
        mut self,
        action: impl Fn(Option<&Value>, &mut Control) + Send + Sync + 'a,
    ) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    pub fn get_names(&self) -> &str {
        &self.names
    }

    pub fn get_placeholder(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_short_circuit(&self) -> bool {
        self.short_circuit
    }
}

impl std::fmt::Debug for OptionDecl<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionDecl")
            .field("names", &self.names)
            .field("value", &self.value)
            .field("value_type", &self.value_type)
            .field("short_circuit", &self.short_circuit)
            .field("further_args_are_values", &self.further_args_are_values)
            .field("has_action", &self.action.is_some())
            .finish()
    }
}

/// A command pattern such as `copy <src> <dst>`.
pub struct PatternDecl<'a> {
    pattern: String,
    types: Option<Vec<ValueType>>,
    description: Option<String>,
    action: Option<PatternAction<'a>>,
}

impl<'a> PatternDecl<'a> {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            types: None,
            description: None,
            action: None,
        }
    }

    /// Types for the pattern's value slots, left to right. Must name
    /// every slot; replaces `<name:type>` annotations.
    pub fn types(mut self, types: impl IntoIterator<Item = ValueType>) -> Self {
        self.types = Some(types.into_iter().collect());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn action(
        mut self,
        action: impl Fn(&Bindings, &mut Control) + Send + Sync + 'a,
    ) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    pub fn get_pattern(&self) -> &str {
        &self.pattern
    }

    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl std::fmt::Debug for PatternDecl<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternDecl")
            .field("pattern", &self.pattern)
            .field("types", &self.types)
            .field("has_action", &self.action.is_some())
            .finish()
    }
}

/// Tables and automaton derived from a [`Spec`]'s declarations.
#[derive(Debug)]
pub struct Compiled {
    options: OptionTable,
    keywords: Vec<String>,
    patterns: Vec<ParsedPattern>,
    /// No pattern was declared; pattern 0 is the implicit empty one.
    implicit: bool,
    nfa: Nfa,
}

impl Compiled {
    pub fn options(&self) -> &OptionTable {
        &self.options
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn patterns(&self) -> &[ParsedPattern] {
        &self.patterns
    }

    pub fn nfa(&self) -> &Nfa {
        &self.nfa
    }

    /// Text for a symbol in diagnostics and graphs.
    pub fn symbol_label(&self, symbol: PatternSymbol) -> String {
        match symbol {
            PatternSymbol::Keyword(k) => self.keywords[k].clone(),
            PatternSymbol::Option(o) => self.options.get(o).display_name().to_string(),
            PatternSymbol::Value => "<value>".to_string(),
        }
    }

    /// The automaton in Graphviz dot form; value edges show their slot index.
    pub fn to_dot(&self) -> String {
        self.nfa.to_dot(|symbol, slot| match (symbol, slot) {
            (PatternSymbol::Value, Some(slot)) => format!("<value #{slot}>"),
            _ => self.symbol_label(symbol),
        })
    }

    fn render_witness(&self, witness: &[PatternSymbol]) -> String {
        witness
            .iter()
            .map(|s| self.symbol_label(*s))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of [`Spec::parse`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(Parsed),
    /// A short-circuit option occurred; nothing else was examined.
    ShortCircuit(ParsedOption),
    /// Errors in argument order.
    Failed(Vec<ErrorEntry>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    /// Declaration index of the matched pattern; `None` when no pattern
    /// is declared and the implicit empty one matched.
    pub pattern: Option<usize>,
    pub bindings: Bindings,
    /// Option occurrences in argument order.
    pub options: Vec<ParsedOption>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOption {
    /// Declaration index.
    pub option: usize,
    /// As spelled on the command line.
    pub name: String,
    pub arg_index: usize,
    pub value: Option<Value>,
}

/// Option and pattern declarations plus processing policy.
///
/// Declarations are compiled on first use and the result is cached;
/// adding a declaration discards the cache.
#[derive(Default)]
pub struct Spec<'a> {
    options: Vec<OptionDecl<'a>>,
    patterns: Vec<PatternDecl<'a>>,
    config: Config,
    compiled: OnceLock<Compiled>,
}

impl<'a> Spec<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self.compiled = OnceLock::new();
        self
    }

    pub fn opt(&mut self, decl: OptionDecl<'a>) -> &mut Self {
        self.options.push(decl);
        self.compiled = OnceLock::new();
        self
    }

    pub fn pat(&mut self, decl: PatternDecl<'a>) -> &mut Self {
        self.patterns.push(decl);
        self.compiled = OnceLock::new();
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn options(&self) -> &[OptionDecl<'a>] {
        &self.options
    }

    pub fn patterns(&self) -> &[PatternDecl<'a>] {
        &self.patterns
    }

    /// Compile the declarations, or return the cached result.
    pub fn build(&self) -> Result<&Compiled, SpecError> {
        if let Some(compiled) = self.compiled.get() {
            return Ok(compiled);
        }
        let compiled = self.compile()?;
        Ok(self.compiled.get_or_init(|| compiled))
    }

    fn compile(&self) -> Result<Compiled, SpecError> {
        let mut options = OptionTable::default();
        for decl in &self.options {
            options.push(
                &decl.names,
                decl.value.as_deref(),
                decl.value_type.as_ref(),
                decl.short_circuit,
                decl.further_args_are_values,
            )?;
        }

        let mut tables = Tables::new(&options);
        let mut patterns = Vec::with_capacity(self.patterns.len().max(1));
        for decl in &self.patterns {
            let mut parsed =
                pattern::parse(&decl.pattern, &mut tables).map_err(|source| SpecError::Pattern {
                    pattern: decl.pattern.clone(),
                    source,
                })?;
            if let Some(types) = &decl.types {
                if types.len() != parsed.slots.len() {
                    return Err(SpecError::SlotCountMismatch {
                        pattern: decl.pattern.clone(),
                        expected: types.len(),
                        found: parsed.slots.len(),
                    });
                }
                for (slot, ty) in parsed.slots.iter_mut().zip(types) {
                    slot.ty = ty.clone();
                }
            }
            patterns.push(parsed);
        }
        let keywords = tables.keywords;

        let implicit = patterns.is_empty();
        if implicit {
            patterns.push(ParsedPattern {
                root: PatternNode::Sequence(Vec::new()),
                slots: Vec::new(),
            });
        }

        let mut bound = Vec::new();
        for parsed in &patterns {
            parsed.root.for_each_symbol(&mut |symbol, _| {
                if let PatternSymbol::Option(i) = symbol {
                    bound.push(i);
                }
            });
        }
        for i in bound {
            options.mark_pattern_bound(i);
        }

        let nfa = crate::nfa::build(patterns.iter().enumerate().map(|(i, p)| (i, &p.root)));
        let compiled = Compiled {
            options,
            keywords,
            patterns,
            implicit,
            nfa,
        };

        if let Some(ambiguity) = find_ambiguity(&compiled.nfa, self.config.ambiguity_policy()) {
            return Err(self.ambiguity_error(&compiled, ambiguity));
        }

        debug!(
            "compiled {} patterns, {} options, {} keywords into {} states",
            compiled.patterns.len(),
            compiled.options.len(),
            compiled.keywords.len(),
            compiled.nfa.len()
        );
        Ok(compiled)
    }

    fn pattern_text(&self, id: usize) -> String {
        self.patterns
            .get(id)
            .map_or_else(String::new, |d| d.pattern.clone())
    }

    fn ambiguity_error(&self, compiled: &Compiled, ambiguity: Ambiguity) -> SpecError {
        match ambiguity {
            Ambiguity::Cross {
                first,
                second,
                witness,
            } => SpecError::AmbiguousPatterns {
                first: self.pattern_text(first),
                second: self.pattern_text(second),
                example: compiled.render_witness(&witness),
            },
            Ambiguity::Internal { pattern, witness } => SpecError::AmbiguousPattern {
                pattern: self.pattern_text(pattern),
                example: compiled.render_witness(&witness),
            },
        }
    }

    /// Message for a match the policy could not settle. `build` rejects
    /// such declarations up front, so a built spec does not produce one.
    fn ambiguity_message(&self, candidates: &[PatternMatch], internal: bool) -> String {
        let mut names: Vec<String> = candidates
            .iter()
            .map(|c| format!("'{}'", self.pattern_text(c.pattern)))
            .collect();
        names.dedup();
        if internal && names.len() == 1 {
            format!("arguments match pattern {} in more than one way", names[0])
        } else {
            format!("arguments match more than one pattern: {}", names.join(", "))
        }
    }

    /// Decode, match and convert `args` without running any action.
    pub fn parse<I, S>(&self, args: I) -> Result<ParseOutcome, SpecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let compiled = self.build()?;
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut errors = ErrorAccumulator::new();
        let decoded = decode::decode(&args, &compiled.options, &mut errors);

        if let Some(occurrence) = decoded
            .occurrences
            .iter()
            .find(|o| compiled.options.get(o.option).short_circuit)
        {
            debug!("short-circuit option at argument {}", occurrence.arg_index);
            let mut short = ErrorAccumulator::new();
            return Ok(
                match convert_option(compiled, &args, occurrence, &mut short) {
                    Some(option) => ParseOutcome::ShortCircuit(option),
                    None => ParseOutcome::Failed(short.into_sorted()),
                },
            );
        }

        let options: Vec<ParsedOption> = decoded
            .occurrences
            .iter()
            .filter_map(|o| convert_option(compiled, &args, o, &mut errors))
            .collect();

        let outcome = Matcher::new(&compiled.nfa, &compiled.keywords)
            .run(&decoded.tokens, args.len())
            .resolve(self.config.ambiguity_policy());

        let parsed = match outcome {
            MatchOutcome::Matched(m) => {
                let slots = &compiled.patterns[m.pattern].slots;
                let mut bindings = Bindings::for_slots(slots);
                for (slot, token) in m.bindings {
                    let token = &decoded.tokens[token];
                    match convert(&token.text, &slots[slot].ty) {
                        Ok(value) => bindings.bind(slot, value),
                        Err(e) => errors.push(
                            token.arg_index,
                            ErrorCode::BadPatternArg,
                            format!(
                                "invalid value '{}' for <{}>: expected {}",
                                e.text, slots[slot].name, e.expected
                            ),
                        ),
                    }
                }
                Some(Parsed {
                    pattern: (!compiled.implicit).then_some(m.pattern),
                    bindings,
                    options,
                })
            }
            MatchOutcome::NoMatch { arg_index } => {
                let message = match args.get(arg_index) {
                    Some(arg) => format!("unexpected argument '{arg}'"),
                    None => "missing arguments".to_string(),
                };
                errors.push(arg_index, ErrorCode::NoPatternMatch, message);
                None
            }
            MatchOutcome::Ambiguous {
                candidates,
                internal,
            } => {
                let arg_index = decoded.tokens.first().map_or(0, |t| t.arg_index);
                let message = self.ambiguity_message(&candidates, internal);
                errors.push(arg_index, ErrorCode::NoPatternMatch, message);
                None
            }
        };

        match parsed {
            Some(parsed) if errors.is_empty() => Ok(ParseOutcome::Parsed(parsed)),
            _ => Ok(ParseOutcome::Failed(errors.into_sorted())),
        }
    }
}

impl std::fmt::Debug for Spec<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spec")
            .field("options", &self.options)
            .field("patterns", &self.patterns)
            .field("config", &self.config)
            .field("built", &self.compiled.get().is_some())
            .finish()
    }
}

fn convert_option(
    compiled: &Compiled,
    args: &[String],
    occurrence: &OptionOccurrence,
    errors: &mut ErrorAccumulator,
) -> Option<ParsedOption> {
    let name = occurrence.spelling(args);
    let resolved = compiled.options.get(occurrence.option);
    let value = match (occurrence.value(args), &resolved.value) {
        (Some(text), Some(arg)) => match convert(text, &arg.ty) {
            Ok(value) => Some(value),
            Err(e) => {
                errors.push(
                    occurrence.value_index(),
                    ErrorCode::BadOptionArg,
                    format!(
                        "invalid value '{}' for option '{name}': expected {}",
                        e.text, e.expected
                    ),
                );
                return None;
            }
        },
        _ => None,
    };
    Some(ParsedOption {
        option: occurrence.option,
        name,
        arg_index: occurrence.arg_index,
        value,
    })
}
