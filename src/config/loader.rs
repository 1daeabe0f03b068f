use std::path::{Path, PathBuf};

use super::{ConfigError, SpecFile, parse_spec_file};

/// Trait for locating and reading declaration files.
pub trait SpecLoader {
    fn load(&self, cwd: &Path) -> Result<SpecFile, ConfigError>;
}

/// Default implementation that reads from the filesystem.
#[derive(Debug, Default)]
pub struct DefaultSpecLoader {
    explicit_path: Option<PathBuf>,
}

impl DefaultSpecLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path` instead of searching the working directory.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            explicit_path: Some(path),
        }
    }

    /// `argpat.yml` is preferred; `argpat.yaml` is a fallback.
    fn local_spec_path(cwd: &Path) -> Option<PathBuf> {
        let yml = cwd.join("argpat.yml");
        if yml.exists() {
            return Some(yml);
        }
        let yaml = cwd.join("argpat.yaml");
        if yaml.exists() {
            return Some(yaml);
        }
        None
    }

    fn read_and_parse(path: &Path) -> Result<SpecFile, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        parse_spec_file(&yaml)
    }
}

impl SpecLoader for DefaultSpecLoader {
    fn load(&self, cwd: &Path) -> Result<SpecFile, ConfigError> {
        let path = match &self.explicit_path {
            Some(path) => path.clone(),
            None => Self::local_spec_path(cwd)
                .ok_or_else(|| ConfigError::NotFound(cwd.to_path_buf()))?,
        };
        log::debug!("loading declarations from {}", path.display());
        let file = Self::read_and_parse(&path)?;
        file.validate()?;
        Ok(file)
    }
}
