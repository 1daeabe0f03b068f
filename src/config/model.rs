use std::collections::HashSet;

use serde::Deserialize;

use crate::nfa::AmbiguityPolicy;
use crate::pattern::{ValueType, parse_slot};
use crate::spec::{DEFAULT_MAX_LOGGED_ERRORS, EXIT_FAILURE, OptionDecl, PatternDecl, Spec};

/// Processing policy shared by every invocation of a [`Spec`].
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// First-declared pattern wins when several accept the input.
    pub allow_cross_pattern_ambiguity: bool,
    /// Greedy leftmost binding wins when one pattern accepts the input
    /// in more than one way.
    pub allow_pattern_internal_positional_ambiguity: bool,
    pub max_logged_errors: usize,
    pub failure_exit_status: i32,
    /// Prefix for reported errors; defaults to the executable name.
    pub program_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allow_cross_pattern_ambiguity: false,
            allow_pattern_internal_positional_ambiguity: false,
            max_logged_errors: DEFAULT_MAX_LOGGED_ERRORS,
            failure_exit_status: EXIT_FAILURE,
            program_name: None,
        }
    }
}

impl Config {
    pub fn ambiguity_policy(&self) -> AmbiguityPolicy {
        AmbiguityPolicy {
            allow_cross_pattern: self.allow_cross_pattern_ambiguity,
            allow_internal: self.allow_pattern_internal_positional_ambiguity,
        }
    }

    pub fn program_name(&self) -> String {
        self.program_name.clone().unwrap_or_else(|| {
            std::env::args()
                .next()
                .as_deref()
                .map(std::path::Path::new)
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
        })
    }
}

/// Declarations read from a YAML file.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct SpecFile {
    pub config: Config,
    pub options: Vec<OptionEntry>,
    pub patterns: Vec<PatternEntry>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OptionEntry {
    pub names: String,
    /// Placeholder such as `<width:int>`.
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub value_type: Option<ValueType>,
    #[serde(default)]
    pub short_circuit: bool,
    #[serde(default)]
    pub further_args_are_values: bool,
    pub description: Option<String>,
}

/// A pattern given either as a bare string or with its slot types.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum PatternEntry {
    Plain(String),
    Detailed {
        pattern: String,
        types: Option<Vec<ValueType>>,
        description: Option<String>,
    },
}

impl PatternEntry {
    pub fn pattern(&self) -> &str {
        match self {
            Self::Plain(pattern) | Self::Detailed { pattern, .. } => pattern,
        }
    }
}

impl SpecFile {
    /// Check option declarations for problems the YAML structure cannot
    /// express, reporting all of them at once. Pattern syntax is checked
    /// when the resulting [`Spec`] is built.
    pub fn validate(&self) -> Result<(), crate::config::ConfigError> {
        let mut errors = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for (i, option) in self.options.iter().enumerate() {
            match crate::spec::parse_option_names(&option.names) {
                Ok(names) => {
                    for name in names {
                        if !seen.insert(name.clone()) {
                            errors.push(format!("options[{i}]: '{name}' is already declared"));
                        }
                    }
                }
                Err(e) => errors.push(format!("options[{i}]: {e}")),
            }

            if let Some(value) = &option.value {
                let content = value
                    .trim()
                    .strip_prefix('<')
                    .and_then(|v| v.strip_suffix('>'));
                match content {
                    Some(content) => {
                        if let Err(e) = parse_slot(content, 0) {
                            errors.push(format!("options[{i}]: value: {e}"));
                        }
                    }
                    None => errors.push(format!(
                        "options[{i}]: value must be written as '<name>' or '<name:type>'"
                    )),
                }
            }

            if option.short_circuit && option.further_args_are_values {
                errors.push(format!(
                    "options[{i}]: 'short_circuit' and 'further_args_are_values' cannot be combined"
                ));
            }
        }

        if self.config.max_logged_errors == 0 {
            errors.push("config: 'max_logged_errors' must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(crate::config::ConfigError::Validation(errors))
        }
    }

    /// Declarations without actions, for checking arguments against them.
    pub fn to_spec(&self) -> Spec<'static> {
        let mut spec = Spec::new().with_config(self.config.clone());
        for option in &self.options {
            let mut decl = OptionDecl::new(&option.names);
            if let Some(value) = &option.value {
                decl = decl.value(value);
            }
            if let Some(ty) = &option.value_type {
                decl = decl.value_type(ty.clone());
            }
            if let Some(description) = &option.description {
                decl = decl.description(description);
            }
            if option.short_circuit {
                decl = decl.short_circuit();
            }
            if option.further_args_are_values {
                decl = decl.further_args_are_values();
            }
            spec.opt(decl);
        }
        for entry in &self.patterns {
            let decl = match entry {
                PatternEntry::Plain(pattern) => PatternDecl::new(pattern),
                PatternEntry::Detailed {
                    pattern,
                    types,
                    description,
                } => {
                    let mut decl = PatternDecl::new(pattern);
                    if let Some(types) = types {
                        decl = decl.types(types.iter().cloned());
                    }
                    if let Some(description) = description {
                        decl = decl.description(description);
                    }
                    decl
                }
            };
            spec.pat(decl);
        }
        spec
    }

    /// [`to_spec`](Self::to_spec), then build it so defective patterns
    /// surface as [`ConfigError::Spec`](crate::config::ConfigError::Spec).
    pub fn compile(&self) -> Result<Spec<'static>, crate::config::ConfigError> {
        let spec = self.to_spec();
        spec.build()?;
        Ok(spec)
    }
}

pub fn parse_spec_file(yaml: &str) -> Result<SpecFile, crate::config::ConfigError> {
    let file: SpecFile = serde_saphyr::from_str(yaml)?;
    Ok(file)
}
