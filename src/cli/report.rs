use std::fmt::Write as _;

use serde::Serialize;

use crate::spec::{Bindings, ErrorEntry, ParseOutcome, Spec, Value};

/// What `argpat check` prints for one argument vector.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Report {
    Matched {
        /// `None` when no pattern is declared.
        pattern: Option<String>,
        bindings: Bindings,
        options: Vec<OptionReport>,
    },
    ShortCircuit {
        option: OptionReport,
    },
    Failed {
        errors: Vec<ErrorEntry>,
    },
}

#[derive(Debug, Serialize)]
pub struct OptionReport {
    pub name: String,
    pub arg_index: usize,
    pub value: Option<Value>,
}

impl Report {
    pub fn new(spec: &Spec<'_>, outcome: ParseOutcome) -> Self {
        match outcome {
            ParseOutcome::Parsed(parsed) => Self::Matched {
                pattern: parsed
                    .pattern
                    .map(|p| spec.patterns()[p].get_pattern().to_string()),
                bindings: parsed.bindings,
                options: parsed
                    .options
                    .into_iter()
                    .map(|o| OptionReport {
                        name: o.name,
                        arg_index: o.arg_index,
                        value: o.value,
                    })
                    .collect(),
            },
            ParseOutcome::ShortCircuit(o) => Self::ShortCircuit {
                option: OptionReport {
                    name: o.name,
                    arg_index: o.arg_index,
                    value: o.value,
                },
            },
            ParseOutcome::Failed(errors) => Self::Failed { errors },
        }
    }

    pub fn exit_status(&self, failure_status: i32) -> i32 {
        match self {
            Self::Failed { .. } => failure_status,
            _ => crate::spec::EXIT_SUCCESS,
        }
    }

    /// Human-readable form; failures are reported through an error
    /// handler instead.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        match self {
            Self::Matched {
                pattern,
                bindings,
                options,
            } => {
                match pattern {
                    Some(pattern) => {
                        let _ = writeln!(out, "matched: {pattern}");
                    }
                    None => out.push_str("matched (no patterns declared)\n"),
                }
                for (name, value) in bindings.iter() {
                    match value {
                        Some(value) => {
                            let _ = writeln!(out, "  <{name}> = {value}");
                        }
                        None => {
                            let _ = writeln!(out, "  <{name}> unset");
                        }
                    }
                }
                for option in options {
                    render_option(&mut out, option);
                }
            }
            Self::ShortCircuit { option } => {
                out.push_str("short-circuit\n");
                render_option(&mut out, option);
            }
            Self::Failed { errors } => {
                for error in errors {
                    let _ = writeln!(
                        out,
                        "{} at argument {}: {}",
                        error.code, error.arg_index, error.message
                    );
                }
            }
        }
        out
    }
}

fn render_option(out: &mut String, option: &OptionReport) {
    match &option.value {
        Some(value) => {
            let _ = writeln!(out, "  {} = {value}", option.name);
        }
        None => {
            let _ = writeln!(out, "  {}", option.name);
        }
    }
}
