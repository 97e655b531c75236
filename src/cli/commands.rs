//! CLI command implementations
//!
//! Each command builds its response payload; `run_command` writes it. A
//! command that completes but reports a negative outcome (findings,
//! inconsistency, rolled-back commit, diverging store) returns `false`.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{json, Value};
use tracing::info;

use crate::config::driver_from_env;
use crate::consistency::Policy;
use crate::observability::Event;
use crate::pipeline::{self, AcceptPolicy, EntitySource, LinkRequest, LoadRequest};
use crate::schema::SchemaRegistry;
use crate::source::{self, SourceOptions};
use crate::store::{available_drivers, driver_available};

use super::args::{Cli, Command, SourceArgs};
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Response payload and whether the outcome was positive
type Outcome = (Value, bool);

/// Parses arguments, loads `.env` and runs the command.
pub fn run() -> CliResult<bool> {
    dotenv::dotenv().ok();
    run_command(Cli::parse_args())
}

/// Runs a parsed command and writes its response to stdout.
pub fn run_command(cli: Cli) -> CliResult<bool> {
    let (data, success) = execute(&cli)?;
    write_response(data)?;
    Ok(success)
}

/// Runs a parsed command and returns its response payload.
pub fn execute(cli: &Cli) -> CliResult<Outcome> {
    let options = source_options(cli.delimiter)?;

    match &cli.command {
        Command::Drivers => Ok((drivers(), true)),
        Command::Init => init(cli),
        Command::Tables => tables(),
        Command::History { entity } => history(entity.as_deref()),
        Command::Schemas => schemas(cli),
        Command::ExportSchemas { dir } => export_schemas(cli, dir),
        Command::Describe { source } => describe(source, &options),
        Command::Validate { source } => validate(cli, source, &options),
        Command::CheckLinks {
            parent,
            parent_source,
            child,
            child_source,
            link,
            exact,
        } => {
            let registry = registry(cli)?;
            let policy = if *exact { Policy::Equal } else { Policy::Subset };
            let request = LinkRequest {
                parent: EntitySource::new(parent, parent_source)
                    .with_column_map(default_map(cli, parent)),
                child: EntitySource::new(child, child_source).with_column_map(default_map(cli, child)),
                link_field: link.clone(),
                policy,
                options,
            };
            let report = pipeline::check_links(&registry, &request)?;
            Ok((serde_json::to_value(&report)?, report.consistent))
        }
        Command::Load {
            source,
            accept_findings,
        } => load(cli, source, *accept_findings, options),
        Command::Verify { source } => verify(cli, source, &options),
    }
}

fn source_options(delimiter: char) -> CliResult<SourceOptions> {
    if !delimiter.is_ascii() {
        return Err(CliError::invalid_argument(format!(
            "delimiter '{}' is not a single-byte character",
            delimiter
        )));
    }
    Ok(SourceOptions {
        delimiter: delimiter as u8,
    })
}

/// Registry from `--schema-dir` if given, else from the catalog.
fn registry(cli: &Cli) -> CliResult<SchemaRegistry> {
    match &cli.schema_dir {
        Some(dir) => {
            let mut registry = SchemaRegistry::new();
            let count = registry.load_dir(dir)?;
            info!(event = %Event::SchemasLoaded, dir = %dir.display(), count, "schemas loaded");
            Ok(registry)
        }
        None => {
            let registry = cli.catalog.registry()?;
            info!(
                event = %Event::SchemasLoaded,
                catalog = %cli.catalog,
                count = registry.len(),
                "schemas loaded"
            );
            Ok(registry)
        }
    }
}

/// Catalog column defaults; schema directories carry none.
fn default_map(cli: &Cli, entity: &str) -> BTreeMap<String, String> {
    match cli.schema_dir {
        Some(_) => BTreeMap::new(),
        None => cli.catalog.column_map(entity),
    }
}

fn entity_source(cli: &Cli, args: &SourceArgs) -> EntitySource {
    let mut map = default_map(cli, &args.entity);
    // An explicit mapping replaces any default targeting the same field.
    for (from, to) in &args.map {
        map.retain(|_, field| field != to);
        map.insert(from.clone(), to.clone());
    }
    EntitySource::new(&args.entity, &args.source).with_column_map(map)
}

fn drivers() -> Value {
    let configured = driver_from_env();

    json!({
        "available": available_drivers(),
        "configured": configured,
        "usable": driver_available(&configured),
    })
}

fn init(cli: &Cli) -> CliResult<Outcome> {
    let registry = registry(cli)?;
    let store = pipeline::open_store()?;
    store.create_tables(&registry)?;

    Ok((
        json!({
            "location": store.location(),
            "tables": store.table_names()?,
        }),
        true,
    ))
}

fn tables() -> CliResult<Outcome> {
    let store = pipeline::open_store()?;
    let mut tables = Vec::new();
    for name in store.table_names()? {
        let rows = store.count(&name)?;
        tables.push(json!({ "name": name, "rows": rows }));
    }

    Ok((json!({ "location": store.location(), "tables": tables }), true))
}

fn history(entity: Option<&str>) -> CliResult<Outcome> {
    let store = pipeline::open_store()?;
    let batches = store.history(entity)?;
    Ok((json!({ "batches": batches }), true))
}

fn schemas(cli: &Cli) -> CliResult<Outcome> {
    let registry = registry(cli)?;
    let entities: Vec<_> = registry.entities().collect();
    Ok((json!({ "schemas": entities }), true))
}

fn export_schemas(cli: &Cli, dir: &Path) -> CliResult<Outcome> {
    let registry = registry(cli)?;
    let mut written = Vec::new();
    for schema in registry.entities() {
        let path = registry.save_schema(dir, schema)?;
        written.push(path.display().to_string());
    }
    Ok((json!({ "written": written }), true))
}

fn describe(path: &Path, options: &SourceOptions) -> CliResult<Outcome> {
    let rows = source::load_with(path, options)?;
    Ok((
        json!({
            "source": rows.name(),
            "rows": rows.len(),
            "columns": rows.describe(),
        }),
        true,
    ))
}

fn validate(cli: &Cli, args: &SourceArgs, options: &SourceOptions) -> CliResult<Outcome> {
    let registry = registry(cli)?;
    let report = pipeline::validate_source(&registry, &entity_source(cli, args), options)?;
    let clean = report.is_clean();

    let mut data = serde_json::to_value(&report)?;
    data["summary"] = Value::String(report.to_string());
    Ok((data, clean))
}

fn load(
    cli: &Cli,
    args: &SourceArgs,
    accept_findings: bool,
    options: SourceOptions,
) -> CliResult<Outcome> {
    let registry = registry(cli)?;
    let mut store = pipeline::open_store()?;

    let policy = if accept_findings {
        AcceptPolicy::AcceptFindings
    } else {
        AcceptPolicy::RequireClean
    };
    let request = LoadRequest::new(entity_source(cli, args))
        .with_options(options)
        .with_policy(policy);

    let outcome = pipeline::run(&mut store, &registry, &request)?;
    Ok((serde_json::to_value(&outcome)?, outcome.is_success()))
}

fn verify(cli: &Cli, args: &SourceArgs, options: &SourceOptions) -> CliResult<Outcome> {
    let registry = registry(cli)?;
    let store = pipeline::open_store()?;
    let report = pipeline::verify(&store, &registry, &entity_source(cli, args), options)?;
    let matches = report.matches;
    Ok((serde_json::to_value(&report)?, matches))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tabload").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_explicit_map_replaces_default_for_field() {
        let cli = parse(&[
            "validate",
            "--entity",
            "receipts",
            "--source",
            "r.csv",
            "--map",
            "ReceiptNumber=receipt_number",
        ]);
        let Command::Validate { source } = &cli.command else {
            panic!("expected validate");
        };

        let map = entity_source(&cli, source).column_map;
        assert_eq!(map.get("ReceiptNumber").map(String::as_str), Some("receipt_number"));
        assert!(!map.contains_key("RecieptNumber"));
        assert_eq!(map.get("Date").map(String::as_str), Some("date"));
    }

    #[test]
    fn test_validate_reports_findings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("customers.csv");
        fs::write(&path, "Id,LastName,FirstName\n1,LOGAN,JULIET\nx,ARZT,TERRELL\n").unwrap();

        let cli = parse(&[
            "validate",
            "--entity",
            "customers",
            "--source",
            path.to_str().unwrap(),
        ]);
        let (data, clean) = execute(&cli).unwrap();
        assert!(!clean);
        assert_eq!(data["type_mismatches"][0]["field"], "id");
    }

    #[test]
    fn test_describe_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("goods.csv");
        fs::write(&path, "Id;Price\n45-CO;4.0\n46-CH;\n").unwrap();

        let cli = parse(&["describe", "--source", path.to_str().unwrap(), "--delimiter", ";"]);
        let (data, _) = execute(&cli).unwrap();
        assert_eq!(data["rows"], 2);
        assert_eq!(data["columns"][1]["name"], "Price");
        assert_eq!(data["columns"][1]["nulls"], 1);
    }

    #[test]
    fn test_export_then_load_schema_dir() {
        let dir = TempDir::new().unwrap();
        let cli = parse(&["export-schemas", "--dir", dir.path().to_str().unwrap()]);
        let (data, _) = execute(&cli).unwrap();
        assert_eq!(data["written"].as_array().unwrap().len(), 4);

        let cli = parse(&["schemas", "--schema-dir", dir.path().to_str().unwrap()]);
        let (data, _) = execute(&cli).unwrap();
        assert_eq!(data["schemas"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let err = source_options('§').unwrap_err();
        assert_eq!(err.code(), "TABLOAD_CLI_INVALID_ARGUMENT");
    }
}
