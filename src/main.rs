//! Binary entry point for the `mcddump` command-line tool.
//!
//! Exposes the bulk measurement-description dumps (one base variant, one
//! project, or a folder of projects) and the single-response decode. Strict
//! single-target invocations exit non-zero on any load failure; the batch
//! commands record per-target failures and keep going.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use mcddb::keyfile::FlatKeyfileDriver;
use mcddb::project::{self, MwbLookupError, MwbRequest, Project};
use mcddb::translate::Translations;

#[derive(Parser)]
#[command(name = "mcddump", version, about = "Dump and decode MCD project measurements")]
struct Cli {
    /// Tab-separated translation table (text_id<TAB>text) for long names.
    #[arg(long, global = true)]
    translations: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Dump measurement descriptions for one base variant of a project.
    BaseVariant {
        /// Project folder containing .db and .key files.
        project_dir: PathBuf,
        /// Filename of the base variant (.bv.db), with or without extension.
        base_variant: String,
        /// Output folder; a per-project subfolder is created inside it.
        out_dir: PathBuf,
    },
    /// Dump measurement descriptions for every base variant of a project.
    Project {
        project_dir: PathBuf,
        out_dir: PathBuf,
    },
    /// Dump measurement descriptions for every project in a folder.
    Projects {
        projects_dir: PathBuf,
        out_dir: PathBuf,
    },
    /// Decode one captured read-data-by-identifier response.
    Parse {
        project_dir: PathBuf,
        /// Filename of the base variant (.bv.db), with or without extension.
        base_variant: String,
        /// Name of the ECU variant to decode against.
        ecu_variant: String,
        /// Data identifier as two hex bytes (e.g. F190).
        did: String,
        /// Response payload in hex, without the service and DID header.
        response: String,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let translations = match &cli.translations {
        Some(path) => Translations::load(path)
            .with_context(|| format!("loading translations from {}", path.display()))?,
        None => Translations::empty(),
    };

    match cli.command {
        Command::BaseVariant {
            project_dir,
            base_variant,
            out_dir,
        } => {
            if !project_dir.is_dir() {
                bail!("project must be a folder");
            }
            let project = Project::open(&project_dir)
                .with_context(|| format!("opening project {}", project_dir.display()))?;
            let resolver = project.resolver(Box::new(FlatKeyfileDriver));
            let protocol_layers = project::protocol_layer_data_list(&resolver)
                .context("loading protocol layer data")?;

            let project_out_dir = out_dir.join(project.name());
            std::fs::create_dir_all(&project_out_dir)?;
            project::dump_base_variant(
                &resolver,
                &protocol_layers,
                &base_variant,
                &project_out_dir,
                true,
            )
            .with_context(|| format!("dumping base variant {base_variant}"))?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Project {
            project_dir,
            out_dir,
        } => {
            if !project_dir.is_dir() {
                bail!("project must be a folder");
            }
            let project = Project::open(&project_dir)
                .with_context(|| format!("opening project {}", project_dir.display()))?;
            let failures = project::dump_project(&project, &out_dir, false)?;
            for (pool_id, error) in &failures {
                eprintln!("{pool_id}: {error}");
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Projects {
            projects_dir,
            out_dir,
        } => {
            if !projects_dir.is_dir() {
                bail!("must provide the folder containing all projects");
            }
            std::fs::create_dir_all(&out_dir)?;
            let failures = project::dump_projects(&projects_dir, &out_dir)?;
            for (name, error) in &failures {
                eprintln!("{name}: {error}");
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Parse {
            project_dir,
            base_variant,
            ecu_variant,
            did,
            response,
        } => {
            if !project_dir.is_dir() {
                bail!("project must be a folder");
            }
            let did = u32::from_str_radix(did.trim_start_matches("0x"), 16)
                .context("DID must be given in hex")?;
            let response = parse_hex(&response).context("response must be given in hex")?;

            let project = Project::open(&project_dir)
                .with_context(|| format!("opening project {}", project_dir.display()))?;
            let request = MwbRequest {
                base_variant_filename: &base_variant,
                ecu_variant: &ecu_variant,
                did,
                response: &response,
            };
            match project::decode_mwb(
                &project,
                Box::new(FlatKeyfileDriver),
                &translations,
                &request,
            )? {
                Ok(decoded) => {
                    print!("{}", mcddb::render(&decoded)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(MwbLookupError::UnknownEcuVariant { available }) => {
                    eprintln!("available ECU-VARIANTs:");
                    for name in available {
                        eprintln!("  {name}");
                    }
                    bail!("could not find ECU-VARIANT {ecu_variant}");
                }
                Err(MwbLookupError::UnknownDid { available }) => {
                    eprintln!("available DIDs:");
                    for did in available {
                        eprintln!("  {did:04X}");
                    }
                    bail!("DID {did:04X} does not exist");
                }
            }
        }
    }
}

fn parse_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.len() % 2 != 0 {
        bail!("odd number of hex digits");
    }
    (0..cleaned.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&cleaned[i..i + 2], 16).map_err(Into::into))
        .collect()
}
