use anyhow::{Context, Result};
use clap::Parser;
use class_scanner::classpath::FsClasspath;
use class_scanner::cli::{Cli, Commands, OutputFormat};
use class_scanner::config::{resolve_classpath, resolve_resolver};
use class_scanner::entry::{find_entry_packages, find_entry_units, recover_entry_units};
use class_scanner::logging::init_logging;
use class_scanner::unit::package_of;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let classpath = FsClasspath::new(resolve_classpath(&cli)?);
    let resolver = resolve_resolver(&cli);
    let start = Instant::now();

    let (query, names) = match cli.command.clone() {
        Commands::Units { packages } => {
            let names = resolver
                .find_unit_names(&classpath, &packages)
                .context("Unit discovery failed")?;
            (format!("units {}", packages.join(" ")), names)
        }
        Commands::AllUnits { unfiltered } => {
            let names = if unfiltered {
                resolver.find_all_unit_names_unfiltered(&classpath)
            } else {
                resolver.find_all_unit_names(&classpath)
            }
            .context("Unit discovery failed")?;
            ("all-units".to_string(), names)
        }
        Commands::Resources { package } => {
            let names = resolver
                .find_resource_names(&classpath, package.as_deref())
                .context("Resource discovery failed")?;
            let scope = package.unwrap_or_default();
            (format!("resources {scope}").trim_end().to_string(), names)
        }
        Commands::Annotated { annotation } => {
            let names = resolver
                .find_annotated_units(&classpath, &annotation)
                .context("Annotated unit discovery failed")?
                .into_iter()
                .map(|unit| unit.name)
                .collect();
            (format!("annotated {annotation}"), names)
        }
        Commands::EntryPoints {
            packages,
            descriptors_only,
        } => {
            let names = match (packages, descriptors_only) {
                (true, false) => find_entry_packages(&resolver, &classpath),
                (false, false) => find_entry_units(&resolver, &classpath),
                (true, true) => recover_entry_units(&resolver, &classpath).map(|units| {
                    units
                        .iter()
                        .map(|u| package_of(u).to_string())
                        .collect::<HashSet<_>>()
                }),
                (false, true) => recover_entry_units(&resolver, &classpath),
            }
            .context("Entry point discovery failed")?;
            ("entry-points".to_string(), names)
        }
    };

    let result = ScanResult::new(query, names, start.elapsed().as_millis() as u64);
    write_output(&result, cli.format)
}

#[derive(Debug, Serialize)]
struct ScanResult {
    query: String,
    count: usize,
    duration_ms: u64,
    names: Vec<String>,
}

impl ScanResult {
    fn new(query: String, names: HashSet<String>, duration_ms: u64) -> Self {
        let mut names: Vec<String> = names.into_iter().collect();
        names.sort();
        Self {
            query,
            count: names.len(),
            duration_ms,
            names,
        }
    }
}

fn write_output(result: &ScanResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Text => {
            for name in &result.names {
                println!("{name}");
            }
        }
    }
    Ok(())
}
