//! Command line interface.

use crate::affected::{BuildOptions, ParsePolicy, TestFileConvention};
use crate::analysis::{AnalysisError, AnalysisOptions};
use crate::report::OutputFormat;
use clap::{ArgAction, ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "impact_detector",
    version,
    about = "Detects tests affected by a specific commit",
    after_help = r#"Examples:
  impact_detector --repo . --commit HEAD
  impact_detector --repo ../web --commit 3f2c9e1 --format json
  impact_detector --repo . --changes changes.json --test-suffix .spec --test-suffix .e2e
"#
)]
#[command(group(ArgGroup::new("source").required(true).args(["commit", "changes"])))]
pub struct Args {
    /// Path to the target repository.
    #[arg(long)]
    pub repo: PathBuf,
    /// Commit to analyze.
    #[arg(long)]
    pub commit: Option<String>,
    /// JSON change list to analyze instead of a commit.
    #[arg(long, value_name = "FILE")]
    pub changes: Option<PathBuf>,
    /// Stem suffix marking test files; repeat to add more (default: .spec, .test).
    #[arg(long = "test-suffix", value_name = "SUFFIX")]
    pub test_suffixes: Vec<String>,
    /// Directory whose files are all tests; repeat to add more (default: __tests__).
    #[arg(long = "test-dir", value_name = "DIR", conflicts_with = "no_test_dirs")]
    pub test_dirs: Vec<String>,
    /// Do not treat any directory as a test directory.
    #[arg(long)]
    pub no_test_dirs: bool,
    /// tsconfig used for path aliases (default: <repo>/tsconfig.json when present).
    #[arg(long)]
    pub tsconfig: Option<PathBuf>,
    /// What to do with files that fail to parse.
    #[arg(long, value_enum, default_value_t = ParsePolicy::Warn)]
    pub on_parse_error: ParsePolicy,
    /// Skip files excluded by .gitignore (scanned by default).
    #[arg(long)]
    pub respect_gitignore: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Write the reverse dependency graph as JSON to this file.
    #[arg(long, value_name = "FILE")]
    pub dump_graph: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Translate command line flags into analysis options.
    ///
    /// # Errors
    /// Returns `AnalysisError::Config` for empty suffixes or directory names.
    pub fn analysis_options(&self) -> Result<AnalysisOptions, AnalysisError> {
        if self.test_suffixes.iter().any(String::is_empty) {
            return Err(AnalysisError::Config("--test-suffix must not be empty".into()));
        }
        if self.test_dirs.iter().any(|d| d.is_empty() || d.contains(['/', '\\'])) {
            return Err(AnalysisError::Config("--test-dir takes a single directory name".into()));
        }

        let mut convention = TestFileConvention::default();
        if !self.test_suffixes.is_empty() {
            convention.suffixes.clone_from(&self.test_suffixes);
        }
        if self.no_test_dirs {
            convention.directories.clear();
        } else if !self.test_dirs.is_empty() {
            convention.directories.clone_from(&self.test_dirs);
        }

        Ok(AnalysisOptions {
            build: BuildOptions {
                tsconfig: self.tsconfig.clone(),
                parse_policy: self.on_parse_error,
                respect_gitignore: self.respect_gitignore,
            },
            convention,
        })
    }
}
