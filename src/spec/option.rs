//! Resolved option table shared by pattern parsing and argument decoding.

use std::collections::HashMap;

use super::SpecError;
use crate::pattern::{SymbolTable, ValueType, parse_slot};

/// Argument an option takes, e.g. `<width:int>`.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionArg {
    pub name: String,
    pub ty: ValueType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOption {
    /// Names as declared, e.g. `["-w", "--width"]`.
    pub names: Vec<String>,
    pub value: Option<OptionArg>,
    pub short_circuit: bool,
    pub further_args_are_values: bool,
    /// Referenced by at least one pattern, so its occurrences are matched
    /// by the automaton rather than accepted anywhere.
    pub pattern_bound: bool,
}

impl ResolvedOption {
    pub fn takes_value(&self) -> bool {
        self.value.is_some()
    }

    /// Long name if there is one, else the first name.
    pub fn display_name(&self) -> &str {
        self.names
            .iter()
            .find(|n| n.starts_with("--"))
            .or_else(|| self.names.first())
            .map_or("", String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionTable {
    options: Vec<ResolvedOption>,
    by_name: HashMap<String, usize>,
}

impl OptionTable {
    pub fn get(&self, index: usize) -> &ResolvedOption {
        &self.options[index]
    }

    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedOption> {
        self.options.iter()
    }

    pub(crate) fn mark_pattern_bound(&mut self, index: usize) {
        self.options[index].pattern_bound = true;
    }

    /// Resolve one declaration and append it; its index is the current length.
    pub(crate) fn push(
        &mut self,
        names: &str,
        placeholder: Option<&str>,
        value_type: Option<&ValueType>,
        short_circuit: bool,
        further_args_are_values: bool,
    ) -> Result<usize, SpecError> {
        let parsed = parse_option_names(names)?;
        let index = self.options.len();
        for name in &parsed {
            if self.by_name.insert(name.clone(), index).is_some() {
                return Err(SpecError::DuplicateOption(name.clone()));
            }
        }

        let value = match (placeholder, value_type) {
            (Some(placeholder), ty) => {
                let content = placeholder
                    .trim()
                    .strip_prefix('<')
                    .and_then(|p| p.strip_suffix('>'))
                    .unwrap_or(placeholder.trim());
                let (name, annotated) =
                    parse_slot(content, 0).map_err(|source| SpecError::InvalidOptionValue {
                        option: parsed[0].clone(),
                        source,
                    })?;
                Some(OptionArg {
                    name,
                    ty: ty.cloned().unwrap_or(annotated),
                })
            }
            (None, Some(ty)) => Some(OptionArg {
                name: "value".to_string(),
                ty: ty.clone(),
            }),
            (None, None) => None,
        };

        self.options.push(ResolvedOption {
            names: parsed,
            value,
            short_circuit,
            further_args_are_values,
            pattern_bound: false,
        });
        Ok(index)
    }
}

/// Split a names declaration such as `-w|--width`, `(-w | --width)` or
/// `-w, --width` into validated option names.
pub fn parse_option_names(names: &str) -> Result<Vec<String>, SpecError> {
    let invalid = |name: &str| SpecError::InvalidOptionName {
        names: names.to_string(),
        name: name.to_string(),
    };

    let trimmed = names.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(trimmed);

    let parsed: Vec<String> = inner
        .split(['|', ','])
        .map(|n| n.trim().to_string())
        .collect();

    for name in &parsed {
        if !is_valid_option_name(name) {
            return Err(invalid(name));
        }
    }
    Ok(parsed)
}

fn is_valid_option_name(name: &str) -> bool {
    let forbidden = |c: char| c.is_whitespace() || c == '=';
    if let Some(long) = name.strip_prefix("--") {
        return !long.is_empty() && !long.starts_with('-') && !long.contains(forbidden);
    }
    match name.strip_prefix('-') {
        Some(short) => {
            let mut chars = short.chars();
            matches!((chars.next(), chars.next()), (Some(c), None) if c != '-' && !forbidden(c))
        }
        None => false,
    }
}

/// [`SymbolTable`] view used while parsing patterns.
pub(crate) struct Tables<'t> {
    pub options: &'t OptionTable,
    pub keywords: Vec<String>,
    keyword_index: HashMap<String, usize>,
}

impl<'t> Tables<'t> {
    pub fn new(options: &'t OptionTable) -> Self {
        Self {
            options,
            keywords: Vec::new(),
            keyword_index: HashMap::new(),
        }
    }
}

impl SymbolTable for Tables<'_> {
    fn option_index(&self, name: &str) -> Option<usize> {
        self.options.lookup(name)
    }

    fn intern_keyword(&mut self, word: &str) -> usize {
        if let Some(&index) = self.keyword_index.get(word) {
            return index;
        }
        let index = self.keywords.len();
        self.keywords.push(word.to_string());
        self.keyword_index.insert(word.to_string(), index);
        index
    }
}
