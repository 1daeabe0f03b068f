mod cli_commands;
mod spec_file_processing;

use std::path::{Path, PathBuf};

use indoc::indoc;
use rstest::fixture;
use tempfile::TempDir;

const TOOL_SPEC: &str = indoc! {r#"
    config:
      program_name: tool
    options:
      - names: "-v|--verbose"
        description: verbose output
      - names: "-w|--width"
        value: "<cols:int>"
      - names: "-h|--help"
        short_circuit: true
      - names: "-m|--move"
    patterns:
      - pattern: "copy <src> <dst>"
        description: copy one file
      - "(-m | --move) <file>..."
"#};

struct SpecDir {
    dir: TempDir,
}

impl SpecDir {
    fn write(&self, name: &str, yaml: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, yaml).unwrap();
        path
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[fixture]
fn spec_dir() -> SpecDir {
    SpecDir {
        dir: TempDir::new().unwrap(),
    }
}
