//! CLI argument definitions using clap
//!
//! Commands:
//! - tabload drivers
//! - tabload init
//! - tabload tables
//! - tabload history [--entity <name>]
//! - tabload schemas
//! - tabload export-schemas --dir <path>
//! - tabload describe --source <file>
//! - tabload validate --entity <name> --source <file>
//! - tabload check-links --parent <name> --parent-source <file> --child <name> --child-source <file> --link <field> [--exact]
//! - tabload load --entity <name> --source <file> [--accept-findings]
//! - tabload verify --entity <name> --source <file>
//!
//! `--catalog`, `--schema-dir` and `--delimiter` apply to every command.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::schema::Dataset;

/// tabload - validate delimited files against declared schemas and load them
#[derive(Parser, Debug)]
#[command(name = "tabload")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Built-in schema catalog
    #[arg(long, global = true, default_value = "bakery")]
    pub catalog: Dataset,

    /// Directory of JSON schema files, used instead of the catalog
    #[arg(long, global = true)]
    pub schema_dir: Option<PathBuf>,

    /// Field delimiter of source files
    #[arg(long, global = true, default_value_t = ',')]
    pub delimiter: char,

    #[command(subcommand)]
    pub command: Command,
}

/// One source file and the entity it holds
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Entity name
    #[arg(long)]
    pub entity: String,

    /// Path to the delimited source file
    #[arg(long)]
    pub source: PathBuf,

    /// Column rename, overriding catalog defaults (repeatable)
    #[arg(long = "map", value_name = "SOURCE=FIELD", value_parser = parse_mapping)]
    pub map: Vec<(String, String)>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available store drivers
    Drivers,

    /// Create the tables of every registered entity
    Init,

    /// List tables in the configured store
    Tables,

    /// List committed batches
    History {
        /// Only batches of this entity
        #[arg(long)]
        entity: Option<String>,
    },

    /// Print the registered schema entries
    Schemas,

    /// Write the registered schema entries as JSON files
    ExportSchemas {
        /// Target directory
        #[arg(long)]
        dir: PathBuf,
    },

    /// Profile a source file: columns, inferred types, null counts
    Describe {
        /// Path to the delimited source file
        #[arg(long)]
        source: PathBuf,
    },

    /// Validate a source file against an entity's schema
    Validate {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Check a child's link column against a parent's key
    CheckLinks {
        /// Parent entity
        #[arg(long)]
        parent: String,

        /// Parent source file
        #[arg(long)]
        parent_source: PathBuf,

        /// Child entity
        #[arg(long)]
        child: String,

        /// Child source file
        #[arg(long)]
        child_source: PathBuf,

        /// Link field of the child entity
        #[arg(long)]
        link: String,

        /// Require the value sets to be equal, not just a subset
        #[arg(long)]
        exact: bool,
    },

    /// Validate and commit a source file
    Load {
        #[command(flatten)]
        source: SourceArgs,

        /// Commit even when validation reports findings
        #[arg(long)]
        accept_findings: bool,
    },

    /// Compare committed records with a source file
    Verify {
        #[command(flatten)]
        source: SourceArgs,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

/// Parses `SOURCE=FIELD`.
fn parse_mapping(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((from, to)) if !from.trim().is_empty() && !to.trim().is_empty() => {
            Ok((from.trim().to_string(), to.trim().to_string()))
        }
        _ => Err(format!("expected SOURCE=FIELD, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mapping() {
        assert_eq!(
            parse_mapping("RecieptNumber=receipt_number").unwrap(),
            ("RecieptNumber".to_string(), "receipt_number".to_string())
        );
        assert!(parse_mapping("receipt_number").is_err());
        assert!(parse_mapping("=x").is_err());
    }

    #[test]
    fn test_load_command() {
        let cli = Cli::try_parse_from([
            "tabload",
            "load",
            "--entity",
            "receipts",
            "--source",
            "receipts.csv",
            "--map",
            "Date=date",
            "--accept-findings",
        ])
        .unwrap();

        assert_eq!(cli.catalog, Dataset::Bakery);
        match cli.command {
            Command::Load {
                source,
                accept_findings,
            } => {
                assert_eq!(source.entity, "receipts");
                assert_eq!(source.map, vec![("Date".to_string(), "date".to_string())]);
                assert!(accept_findings);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_catalog_after_subcommand() {
        let cli = Cli::try_parse_from(["tabload", "schemas", "--catalog", "students"]).unwrap();
        assert_eq!(cli.catalog, Dataset::Students);
    }

    #[test]
    fn test_unknown_catalog_rejected() {
        assert!(Cli::try_parse_from(["tabload", "--catalog", "zoo", "schemas"]).is_err());
    }
}
