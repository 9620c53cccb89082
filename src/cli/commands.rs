//! Command dispatch: wires CLI arguments to application services.

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::rigs::super_copy;
use crate::application::services::GenerationReport;
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, OutputFormat, Settings};
use crate::infrastructure::di::ServiceContainer;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Generate {
            metarig,
            output,
            format,
        }) => cmd_generate(metarig, output.as_deref(), *format),
        Some(Commands::Sample { output }) => cmd_sample(output.as_deref()),
        Some(Commands::Params { metarig, bone }) => {
            cmd_params(metarig.as_deref(), bone.as_deref())
        }
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show { dir } => cmd_config_show(dir.as_deref()),
            ConfigCommands::Path => cmd_config_path(),
        },
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::InvalidArgs(
            "no command given, see --help".to_string(),
        )),
    }
}

/// Container with settings loaded for the metarig's directory.
fn container_for(metarig: Option<&Path>) -> CliResult<ServiceContainer> {
    let dir = metarig.and_then(Path::parent).filter(|d| !d.as_os_str().is_empty());
    let settings = Settings::load(dir)?;
    Ok(ServiceContainer::new(settings))
}

#[instrument(level = "debug")]
fn cmd_generate(
    metarig: &Path,
    out: Option<&Path>,
    format: Option<OutputFormat>,
) -> CliResult<()> {
    let container = container_for(Some(metarig))?;
    let metarigs = container.metarig_service();

    let armature = metarigs.load(metarig)?;
    let report = container.generate_service().generate(&armature)?;

    if let Some(path) = out {
        metarigs.save(&report.armature, path)?;
        output::success(&format!("wrote {}", path.display()));
    }

    let format = format.unwrap_or(container.settings.output);
    debug!("format={}", format);
    match format {
        OutputFormat::Json if out.is_none() => {
            output::info(&metarigs.to_json(&report.armature)?);
        }
        OutputFormat::Json => {}
        OutputFormat::Tree => print_report(&report),
    }
    Ok(())
}

fn print_report(report: &GenerationReport) {
    output::header("Rigs");
    for rig in &report.rigs {
        output::detail(&format!("{} on {}", rig.rig_type, rig.base_bone));
    }
    output::action("Created", &report.created_bones.join(", "));
    if !report.widgets.is_empty() {
        output::action("Widgets", &report.widgets.join(", "));
    }
    output::info(&report.armature.to_tree_with("armature", output::bone_label));
}

#[instrument(level = "debug")]
fn cmd_sample(out: Option<&Path>) -> CliResult<()> {
    let container = container_for(None)?;
    let metarigs = container.metarig_service();
    let sample = metarigs.sample()?;

    match out {
        Some(path) => {
            metarigs.save(&sample, path)?;
            output::success(&format!("wrote {}", path.display()));
        }
        None => output::info(&metarigs.to_json(&sample)?),
    }
    Ok(())
}

#[instrument(level = "debug")]
fn cmd_params(metarig: Option<&Path>, bone: Option<&str>) -> CliResult<()> {
    let container = container_for(metarig)?;
    let params = match (metarig, bone) {
        (Some(path), Some(bone)) => {
            let armature = container.metarig_service().load(path)?;
            let assignment = armature
                .bone(bone)
                .map_err(ApplicationError::from)?
                .rig
                .clone()
                .ok_or_else(|| CliError::InvalidArgs(format!("bone '{}' has no rig", bone)))?;
            if assignment.rig_type != super_copy::RIG_TYPE {
                return Err(ApplicationError::UnknownRigType {
                    bone: bone.to_string(),
                    rig_type: assignment.rig_type,
                }
                .into());
            }
            container
                .generate_service()
                .super_copy_params(bone, &assignment.params)?
        }
        _ => container.settings.super_copy.clone(),
    };

    output::header(super_copy::RIG_TYPE);
    for item in super_copy::parameters_ui(&params) {
        output::detail(&output::ui_item(&item));
    }
    Ok(())
}

fn cmd_config_show(dir: Option<&Path>) -> CliResult<()> {
    let settings = Settings::load(dir)?;
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_config_path() -> CliResult<()> {
    match global_config_path() {
        Some(path) => {
            let status = if path.exists() { "exists" } else { "not found" };
            output::action("global", &format!("{} ({})", path.display(), status));
        }
        None => output::action("global", "unavailable"),
    }
    output::action("local", &local_config_path(Path::new("<metarig dir>")).display());
    output::action("env", "RIGSMITH_* (nested keys with __)");
    Ok(())
}
