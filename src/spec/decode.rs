//! Splits the raw argument vector into option occurrences and the token
//! stream the matcher consumes.

use log::trace;

use super::handler::{ErrorAccumulator, ErrorCode};
use super::option::OptionTable;
use crate::nfa::{InputToken, TokenKind};

/// One option found in the arguments, located by byte offsets into
/// `args[arg_index]`.
///
/// `lead_end` ends the leading dashes and `name_begin..name_end` spans the
/// name without them; for the `q` of `-vq` that is `lead_end = 1`,
/// `name_begin = 2`. When `has_value` is set and `value_begin > 0` the
/// value is the rest of the same argument, otherwise it is the whole of
/// argument `value_arg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionOccurrence {
    pub arg_index: usize,
    pub option: usize,
    pub has_value: bool,
    pub lead_end: usize,
    pub name_begin: usize,
    pub name_end: usize,
    pub value_begin: usize,
    pub value_arg: Option<usize>,
}

impl OptionOccurrence {
    /// The option as spelled, dashes included (`-q` for the `q` of `-vq`).
    pub fn spelling(&self, args: &[String]) -> String {
        let arg = &args[self.arg_index];
        format!(
            "{}{}",
            &arg[..self.lead_end],
            &arg[self.name_begin..self.name_end]
        )
    }

    pub fn value<'s>(&self, args: &'s [String]) -> Option<&'s str> {
        if !self.has_value {
            return None;
        }
        if self.value_begin > 0 {
            return Some(&args[self.arg_index][self.value_begin..]);
        }
        self.value_arg.map(|i| args[i].as_str())
    }

    /// Argument holding the value, for error reporting.
    pub fn value_index(&self) -> usize {
        self.value_arg.unwrap_or(self.arg_index)
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Decoded {
    pub tokens: Vec<InputToken>,
    pub occurrences: Vec<OptionOccurrence>,
}

/// Decode `args` against `table`. Malformed options are reported to
/// `errors` as [`ErrorCode::BadOption`] and dropped.
pub fn decode(args: &[String], table: &OptionTable, errors: &mut ErrorAccumulator) -> Decoded {
    Decoder {
        args,
        table,
        errors,
        decoded: Decoded::default(),
        values_only: false,
    }
    .run()
}

struct Decoder<'a, 'e> {
    args: &'a [String],
    table: &'a OptionTable,
    errors: &'e mut ErrorAccumulator,
    decoded: Decoded,
    values_only: bool,
}

impl Decoder<'_, '_> {
    fn run(mut self) -> Decoded {
        let args = self.args;
        let mut index = 0;
        while index < args.len() {
            let arg = &args[index];
            if self.values_only {
                self.positional(index, true);
            } else if arg == "--" {
                trace!("'--' at argument {index}, remaining arguments are values");
                self.values_only = true;
            } else if arg == "-" || !arg.starts_with('-') {
                self.positional(index, false);
            } else if arg.starts_with("--") {
                index += self.long(index);
            } else {
                index += self.short_cluster(index);
            }
            index += 1;
        }
        self.decoded
    }

    fn positional(&mut self, index: usize, forced: bool) {
        self.decoded.tokens.push(InputToken {
            arg_index: index,
            text: self.args[index].clone(),
            kind: TokenKind::Positional { forced },
        });
    }

    /// Decode `--name`, `--name=value` or `--name value`. Returns the
    /// number of following arguments consumed.
    fn long(&mut self, index: usize) -> usize {
        let args = self.args;
        let arg = &args[index];
        let (name_end, inline) = match arg.find('=') {
            Some(eq) => (eq, Some(eq + 1)),
            None => (arg.len(), None),
        };
        let name = &arg[..name_end];
        let Some(option) = self.table.lookup(name) else {
            self.errors
                .push(index, ErrorCode::BadOption, format!("unknown option '{name}'"));
            return 0;
        };

        let mut occurrence = OptionOccurrence {
            arg_index: index,
            option,
            has_value: false,
            lead_end: 2,
            name_begin: 2,
            name_end,
            value_begin: 0,
            value_arg: None,
        };
        let mut consumed = 0;
        match (self.table.get(option).takes_value(), inline) {
            (true, Some(value_begin)) => {
                occurrence.has_value = true;
                occurrence.value_begin = value_begin;
            }
            (true, None) => {
                if !self.take_next(index, &mut occurrence, name) {
                    return 0;
                }
                consumed = 1;
            }
            (false, Some(_)) => {
                self.errors.push(
                    index,
                    ErrorCode::BadOption,
                    format!("option '{name}' does not take a value"),
                );
                return 0;
            }
            (false, None) => {}
        }
        self.record(occurrence);
        consumed
    }

    /// Decode `-x`, `-xVALUE`, `-x VALUE` or a cluster such as `-vq`.
    /// The first option taking a value ends the cluster. Returns the
    /// number of following arguments consumed.
    fn short_cluster(&mut self, index: usize) -> usize {
        let args = self.args;
        let arg = &args[index];
        let mut pos = 1;
        while let Some(c) = arg[pos..].chars().next() {
            let name_end = pos + c.len_utf8();
            let name = format!("-{c}");
            let Some(option) = self.table.lookup(&name) else {
                self.errors
                    .push(index, ErrorCode::BadOption, format!("unknown option '{name}'"));
                return 0;
            };

            let mut occurrence = OptionOccurrence {
                arg_index: index,
                option,
                has_value: false,
                lead_end: 1,
                name_begin: pos,
                name_end,
                value_begin: 0,
                value_arg: None,
            };
            if !self.table.get(option).takes_value() {
                self.record(occurrence);
                pos = name_end;
                continue;
            }
            if name_end < arg.len() {
                occurrence.has_value = true;
                occurrence.value_begin = name_end;
                self.record(occurrence);
                return 0;
            }
            if !self.take_next(index, &mut occurrence, &name) {
                return 0;
            }
            self.record(occurrence);
            return 1;
        }
        0
    }

    fn take_next(&mut self, index: usize, occurrence: &mut OptionOccurrence, name: &str) -> bool {
        if index + 1 < self.args.len() {
            occurrence.has_value = true;
            occurrence.value_arg = Some(index + 1);
            true
        } else {
            self.errors.push(
                index,
                ErrorCode::BadOption,
                format!("option '{name}' requires a value"),
            );
            false
        }
    }

    fn record(&mut self, occurrence: OptionOccurrence) {
        let option = self.table.get(occurrence.option);
        if option.pattern_bound {
            self.decoded.tokens.push(InputToken {
                arg_index: occurrence.arg_index,
                text: occurrence.spelling(self.args),
                kind: TokenKind::Option(occurrence.option),
            });
        }
        if option.further_args_are_values {
            self.values_only = true;
        }
        self.decoded.occurrences.push(occurrence);
    }
}
