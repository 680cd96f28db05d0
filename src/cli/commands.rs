//! Command dispatch and handlers

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::LoadWarning;
use crate::application::{ExportFormat, StructureExporter};
use crate::cli::args::{Cli, Commands, ConfigCommands, FormatArg};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, project_config_path, Settings};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::tree_traits::TreeDisplay;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = resolve_project_dir(cli)?;

    let Some(command) = &cli.command else {
        Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e))?;
        return Ok(());
    };

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => cmd_config(command, &project_dir),
        _ => {
            let container = create_container(&project_dir)?;
            match command {
                Commands::Generate {
                    source,
                    output,
                    item,
                } => cmd_generate(
                    &container,
                    &project_dir,
                    source.as_deref(),
                    output.as_deref(),
                    item.as_deref(),
                ),
                Commands::Search { query, source } => {
                    cmd_search(&container, &project_dir, source.as_deref(), query)
                }
                Commands::Tree { source } => cmd_tree(&container, &project_dir, source.as_deref()),
                Commands::Summary { source } => {
                    cmd_summary(&container, &project_dir, source.as_deref())
                }
                Commands::Validate { source } => {
                    cmd_validate(&container, &project_dir, source.as_deref())
                }
                Commands::Export {
                    source,
                    output,
                    format,
                    timestamp,
                } => cmd_export(
                    &container,
                    &project_dir,
                    source.as_deref(),
                    output.as_deref(),
                    *format,
                    *timestamp,
                ),
                Commands::Completion { .. } | Commands::Config { .. } => Ok(()),
            }
        }
    }
}

fn resolve_project_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.project_dir {
        Some(dir) if !dir.is_dir() => Err(CliError::InvalidArgs(format!(
            "project directory does not exist: {}",
            dir.display()
        ))),
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().map_err(|e| InfraError::io("current directory", e).into()),
    }
}

fn create_container(project_dir: &Path) -> CliResult<ServiceContainer> {
    let settings = Settings::load(Some(project_dir))?;
    debug!("settings: {:?}", settings);
    Ok(ServiceContainer::new(settings))
}

/// Explicit arguments are used as given; configured paths are relative to the project directory.
fn source_path(container: &ServiceContainer, project_dir: &Path, arg: Option<&Path>) -> PathBuf {
    arg.map(Path::to_path_buf)
        .unwrap_or_else(|| project_dir.join(&container.settings.source))
}

fn print_warnings(warnings: &[LoadWarning]) {
    for warning in warnings {
        output::warning(warning);
    }
}

#[instrument(skip(container))]
fn cmd_generate(
    container: &ServiceContainer,
    project_dir: &Path,
    source: Option<&Path>,
    out: Option<&Path>,
    item: Option<&str>,
) -> CliResult<()> {
    let source = source_path(container, project_dir, source);
    let out_dir = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| project_dir.join(&container.settings.output_dir));

    let service = container.site_service();
    match item {
        Some(id) => {
            let report = service.generate_item(&source, &out_dir, id)?;
            print_warnings(&report.warnings);
            for path in &report.written {
                output::action("Regenerated", &path.display());
            }
        }
        None => {
            let report = service.generate(&source, &out_dir)?;
            print_warnings(&report.warnings);
            output::success(&format!(
                "Generated {} pages in {}",
                report.written.len(),
                out_dir.display()
            ));
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_search(
    container: &ServiceContainer,
    project_dir: &Path,
    source: Option<&Path>,
    query: &str,
) -> CliResult<()> {
    let service = container.site_service();
    let loaded = service.load_tree(&source_path(container, project_dir, source))?;
    print_warnings(&loaded.warnings);

    let hits = service.search(&loaded.tree, query)?;
    if hits.is_empty() {
        output::warning(&format!("no matches for '{}'", query));
        return Ok(());
    }
    for hit in hits {
        output::info(&format!(
            "{}  [{}: {}]",
            hit.full_path,
            hit.matched_field,
            hit.node.id()
        ));
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_tree(container: &ServiceContainer, project_dir: &Path, source: Option<&Path>) -> CliResult<()> {
    let loaded = container
        .site_service()
        .load_tree(&source_path(container, project_dir, source))?;
    print_warnings(&loaded.warnings);
    output::info(&loaded.tree.to_tree_string());
    Ok(())
}

#[instrument(skip(container))]
fn cmd_summary(
    container: &ServiceContainer,
    project_dir: &Path,
    source: Option<&Path>,
) -> CliResult<()> {
    let service = container.site_service();
    let loaded = service.load_tree(&source_path(container, project_dir, source))?;
    print_warnings(&loaded.warnings);

    let summary = service.summary(&loaded.tree);
    output::header("Summary");
    output::detail(&format!("total nodes: {}", summary.total));
    for (level, count) in &summary.per_level {
        output::detail(&format!("level {}: {}", level, count));
    }
    output::detail(&format!("depth: {}", summary.depth));
    output::detail(&format!("leaves: {}", summary.leaves));
    output::detail(&format!("placeholders: {}", summary.placeholders));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_validate(
    container: &ServiceContainer,
    project_dir: &Path,
    source: Option<&Path>,
) -> CliResult<()> {
    let service = container.site_service();
    let loaded = service.load_tree(&source_path(container, project_dir, source))?;
    print_warnings(&loaded.warnings);

    let issues = service.validate(&loaded.tree);
    if issues.is_empty() {
        output::success("No issues found");
    } else {
        output::header(&format!("{} issues", issues.len()));
        for issue in &issues {
            output::failure(issue);
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_export(
    container: &ServiceContainer,
    project_dir: &Path,
    source: Option<&Path>,
    out: Option<&Path>,
    format: Option<FormatArg>,
    timestamp: bool,
) -> CliResult<()> {
    let loaded = container
        .site_service()
        .load_tree(&source_path(container, project_dir, source))?;
    print_warnings(&loaded.warnings);

    let mut exporter = StructureExporter::new();
    if timestamp {
        exporter = exporter.with_timestamp(Utc::now());
    }
    let format = format
        .map(ExportFormat::from)
        .or_else(|| out.map(ExportFormat::from_path))
        .unwrap_or_default();
    let document = exporter.export_document(&loaded.tree, format)?;

    match out {
        Some(path) => {
            container
                .fs
                .ensure_parent(path)
                .and_then(|_| container.fs.write(path, &document))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Exported", &path.display());
        }
        None => output::info(&document),
    }
    Ok(())
}

fn cmd_config(command: &ConfigCommands, project_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(project_dir))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::detail(&format!("global: {}", path.display())),
                None => output::detail("global: (no config directory)"),
            }
            output::detail(&format!(
                "local:  {}",
                project_config_path(project_dir).display()
            ));
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
