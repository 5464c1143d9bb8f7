use clap::{Parser, Subcommand};
use dosing_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dosecalc")]
#[command(about = "Diabetes dosing recommendation calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Metformin starting dose or next titration step
    Metformin {
        /// Current daily dose in mg (0 if not yet started)
        #[arg(long, allow_negative_numbers = true)]
        current_dose: i32,

        /// Extended-release formulation
        #[arg(long, conflicts_with = "formulation")]
        extended_release: bool,

        /// Formulation (immediate-release, extended-release)
        #[arg(long)]
        formulation: Option<String>,
    },

    /// Starting dose for an SGLT2 inhibitor or GLP-1 receptor agonist
    Agent {
        /// Medication name, e.g. "semaglutide (ozempic)"
        name: String,
    },

    /// List the non-insulin agents with a starting dose on file
    Agents,

    /// Type 2 basal insulin starting dose
    BasalInit {
        /// Body weight in kg
        #[arg(long, allow_negative_numbers = true)]
        weight: f64,
    },

    /// Type 2 basal insulin titration from fasting glucose
    BasalTitrate {
        /// Fasting blood glucose in mg/dL
        #[arg(long, allow_negative_numbers = true)]
        fbg: i32,

        /// Current basal dose in units
        #[arg(long, allow_negative_numbers = true)]
        current_dose: i32,
    },

    /// Prandial insulin starting dose
    PrandialInit {
        /// Current basal dose in units
        #[arg(long, allow_negative_numbers = true)]
        basal_dose: i32,
    },

    /// Type 1 total daily dose estimate
    T1dTdd {
        /// Body weight in kg
        #[arg(long, allow_negative_numbers = true)]
        weight: f64,

        /// Diabetes status (new-onset, established)
        #[arg(long)]
        status: String,
    },

    /// Basal/bolus split of a total daily dose
    Split {
        /// Total daily dose in units
        #[arg(long, allow_negative_numbers = true)]
        tdd: f64,
    },

    /// Insulin-to-carbohydrate ratio
    Icr {
        /// Total daily dose in units
        #[arg(long, allow_negative_numbers = true)]
        tdd: f64,

        /// Insulin type (rapid-acting, regular)
        #[arg(long)]
        insulin_type: Option<String>,
    },

    /// Correction factor
    Cf {
        /// Total daily dose in units
        #[arg(long, allow_negative_numbers = true)]
        tdd: f64,

        /// Insulin type (rapid-acting, regular)
        #[arg(long)]
        insulin_type: Option<String>,
    },

    /// Check a proposed medication for contraindications
    Contraindications {
        /// eGFR in mL/min/1.73m²
        #[arg(long, allow_negative_numbers = true)]
        egfr: i32,

        /// Proposed medication name
        #[arg(long)]
        medication: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate a JSONL file of queries and write results to CSV
    Batch {
        /// Input file, one JSON query per line
        input: PathBuf,

        /// Output CSV file
        output: PathBuf,
    },

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        let code = if e.is_input_error() { 2 } else { 1 };
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match cli.config {
        Some(ref path) if path.exists() => Config::load_from(path)?,
        Some(_) => Config::default(),
        None => Config::load()?,
    };

    dosing_core::logging::init_with_level(&config.logging.level);
    tracing::debug!("Effective config: {:?}", config);

    match cli.command {
        Commands::Metformin {
            current_dose,
            extended_release,
            formulation,
        } => {
            let formulation = match formulation {
                Some(f) => f.parse::<Formulation>()?,
                None if extended_release => Formulation::ExtendedRelease,
                None => config.defaults.formulation,
            };
            print_line(metformin_dose(current_dose, formulation)?)
        }
        Commands::Agent { name } => cmd_agent(&name),
        Commands::Agents => cmd_agents(),
        Commands::BasalInit { weight } => print_line(basal_insulin_initiation(weight)?),
        Commands::BasalTitrate { fbg, current_dose } => {
            print_line(basal_insulin_titration(fbg, current_dose)?)
        }
        Commands::PrandialInit { basal_dose } => {
            print_line(prandial_insulin_initiation(basal_dose)?)
        }
        Commands::T1dTdd { weight, status } => {
            print_line(t1d_total_daily_dose_str(weight, &status)?)
        }
        Commands::Split { tdd } => print_line(basal_bolus_split(tdd)?),
        Commands::Icr { tdd, insulin_type } => {
            let insulin_type = resolve_insulin_type(insulin_type, &config)?;
            print_line(insulin_to_carb_ratio(tdd, insulin_type)?)
        }
        Commands::Cf { tdd, insulin_type } => {
            let insulin_type = resolve_insulin_type(insulin_type, &config)?;
            print_line(correction_factor(tdd, insulin_type)?)
        }
        Commands::Contraindications {
            egfr,
            medication,
            json,
        } => cmd_contraindications(egfr, &medication, json),
        Commands::Batch { input, output } => cmd_batch(&input, &output),
        Commands::Config { action } => cmd_config(action, &config, cli.config),
    }
}

fn print_line(text: String) -> Result<()> {
    println!("{}", text);
    Ok(())
}

fn cmd_agent(name: &str) -> Result<()> {
    match agent_starting_dose(name) {
        Ok(text) => print_line(text),
        Err(e @ Error::UnknownMedication(_)) => {
            eprintln!("Known agents: {}", guideline::agent_names().join(", "));
            Err(e)
        }
        Err(e) => Err(e),
    }
}

fn cmd_agents() -> Result<()> {
    for name in guideline::agent_names() {
        let Some(profile) = guideline::find_agent(name) else {
            continue;
        };
        let class = match profile.class {
            DrugClass::Sglt2Inhibitor => "SGLT2i",
            DrugClass::Glp1ReceptorAgonist => "GLP-1 RA",
        };
        print!("{:<24} {:<9} start {} {}", name, class, profile.starting_dose, profile.frequency);
        if !profile.available_doses.is_empty() {
            print!(" (strengths: {})", profile.available_doses.join(", "));
        }
        println!();
    }
    Ok(())
}

fn resolve_insulin_type(arg: Option<String>, config: &Config) -> Result<InsulinType> {
    match arg {
        Some(s) => s.parse(),
        None => Ok(config.defaults.insulin_type),
    }
}

fn cmd_contraindications(egfr: i32, medication: &str, json: bool) -> Result<()> {
    let report = check_contraindications(egfr, medication)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.is_safe {
        println!("✓ No contraindications found for {}.", medication);
    } else {
        println!("✗ {} is not safe for this patient:", medication);
        for message in &report.messages {
            println!("  - {}", message);
        }
    }
    Ok(())
}

fn cmd_batch(input: &Path, output: &Path) -> Result<()> {
    let summary = run_batch(input, output)?;

    println!("✓ Evaluated {} queries", summary.evaluated);
    if summary.failed > 0 {
        println!("  {} queries failed (see error column)", summary.failed);
    }
    if summary.skipped_lines > 0 {
        println!("  {} unparseable lines skipped", summary.skipped_lines);
    }
    println!("  CSV: {}", output.display());
    Ok(())
}

fn cmd_config(action: ConfigAction, config: &Config, path: Option<PathBuf>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        ConfigAction::Init { force } => {
            let path = match path {
                Some(p) => p,
                None => Config::default_config_path()?,
            };
            if path.exists() && !force {
                return Err(Error::Config(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            Config::default().save_to(&path)?;
            println!("✓ Wrote default config to {}", path.display());
            Ok(())
        }
    }
}
