use clap::{Parser, Subcommand};
use redact_core::{RedactionLevel, RedactionScope};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "redact")]
#[command(about = "Redact personal information from documents and images", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (default: the per-user config directory)
    #[arg(long, global = true, env = "REDACT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Also append log lines to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Redact a single file
    File {
        /// File to redact
        input: PathBuf,

        /// Where to write the redacted copy
        #[arg(short, long)]
        output: PathBuf,

        /// Redaction level 1-3 (default from settings)
        #[arg(long)]
        level: Option<RedactionLevel>,

        /// Recognition scope: per-unit or whole-document
        #[arg(long)]
        scope: Option<RedactionScope>,
    },

    /// Redact every supported file in a directory into <DIR>/redacted_files
    Batch {
        /// Directory to process (not recursive)
        dir: PathBuf,

        /// Redaction level 1-3 (default from settings)
        #[arg(long)]
        level: Option<RedactionLevel>,
    },

    /// Print redacted text without writing anything (text and docx only)
    Preview {
        /// File to preview
        input: PathBuf,

        /// Redaction level 1-3 (default from settings)
        #[arg(long)]
        level: Option<RedactionLevel>,
    },

    /// Manage custom patterns
    #[command(subcommand)]
    Patterns(PatternCommands),

    /// Inspect settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug, Subcommand)]
pub enum PatternCommands {
    /// List built-in and custom patterns
    List,

    /// Add or replace a custom pattern
    Add {
        /// Pattern name
        name: String,

        /// Regular expression
        regex: String,
    },

    /// Remove a custom pattern
    Remove {
        /// Pattern name
        name: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the settings file location
    Path,

    /// Print the effective settings
    Show,
}

impl Cli {
    /// Scope requested on the command line, if any.
    #[must_use]
    pub fn scope_override(&self) -> Option<RedactionScope> {
        match &self.command {
            Commands::File { scope, .. } => *scope,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_file_command() {
        let cli = Cli::parse_from([
            "redact",
            "file",
            "in.docx",
            "-o",
            "out.docx",
            "--level",
            "3",
            "--scope",
            "whole-document",
        ]);
        assert_eq!(cli.scope_override(), Some(RedactionScope::WholeDocument));
        match cli.command {
            Commands::File { input, output, level, .. } => {
                assert_eq!(input, PathBuf::from("in.docx"));
                assert_eq!(output, PathBuf::from("out.docx"));
                assert_eq!(level, Some(RedactionLevel::Advanced));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_level_by_name() {
        let cli = Cli::parse_from(["redact", "batch", "docs", "--level", "intermediate"]);
        assert!(matches!(
            cli.command,
            Commands::Batch { level: Some(RedactionLevel::Intermediate), .. }
        ));
    }

    #[test]
    fn test_rejects_unknown_level() {
        assert!(Cli::try_parse_from(["redact", "preview", "a.txt", "--level", "7"]).is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["redact", "patterns", "list", "--config", "/tmp/r.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/r.toml")));
        assert!(matches!(cli.command, Commands::Patterns(PatternCommands::List)));
    }
}
