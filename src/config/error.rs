use std::path::PathBuf;

use crate::spec::SpecError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_saphyr::Error),
    #[error("validation errors:\n{}", .0.iter().map(|e| format!("  - {e}")).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
    #[error("no argpat.yml or argpat.yaml in {}", .0.display())]
    NotFound(PathBuf),
    #[error("spec error: {0}")]
    Spec(#[from] SpecError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternParseError;

    #[test]
    fn config_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let config_err: ConfigError = io_err.into();
        assert_eq!(config_err.to_string(), "io error: file not found");
    }

    #[test]
    fn config_error_validation_single() {
        let error = ConfigError::Validation(vec!["options[0]: bad name".to_string()]);
        assert_eq!(error.to_string(), "validation errors:\n  - options[0]: bad name");
    }

    #[test]
    fn config_error_validation_multiple() {
        let error = ConfigError::Validation(vec![
            "options[0]: bad name".to_string(),
            "options[2]: '-v' is already declared".to_string(),
        ]);
        assert_eq!(
            error.to_string(),
            "validation errors:\n  - options[0]: bad name\n  - options[2]: '-v' is already declared"
        );
    }

    #[test]
    fn config_error_from_yaml_error() {
        let result: Result<String, serde_saphyr::Error> = serde_saphyr::from_str("[invalid");
        let config_err: ConfigError = result.unwrap_err().into();
        assert!(config_err.to_string().starts_with("yaml parse error:"));
        assert!(std::error::Error::source(&config_err).is_some());
    }

    #[test]
    fn config_error_not_found() {
        let error = ConfigError::NotFound(PathBuf::from("/work"));
        assert_eq!(error.to_string(), "no argpat.yml or argpat.yaml in /work");
    }

    #[test]
    fn anyhow_error_chain_config_to_spec() {
        let spec_err = SpecError::Pattern {
            pattern: "(".into(),
            source: PatternParseError::UnclosedParen(0),
        };
        let anyhow_err: anyhow::Error = ConfigError::from(spec_err).into();
        let chain: Vec<String> = anyhow_err.chain().map(|e| e.to_string()).collect();
        assert_eq!(
            chain,
            vec![
                "spec error: invalid pattern '(': unclosed parenthesis at position 0",
                "invalid pattern '(': unclosed parenthesis at position 0",
                "unclosed parenthesis at position 0",
            ]
        );
    }
}
