use bambam_choice::{
    app::{
        run::{run as run_choice_model, validate},
        ChoiceAppError,
    },
    config::ChoiceRunConfig,
    model::choice::ChoiceOutputMode,
};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct ChoiceAppArguments {
    #[command(subcommand)]
    app: App,
}

#[derive(Subcommand)]
pub enum App {
    /// run a choice model over a population
    Run {
        #[arg(long, help = "path to .toml or .json file with run parameters")]
        configuration_file: String,
        #[arg(long, value_enum, help = "overrides the output mode of the configuration")]
        output_mode: Option<ChoiceOutputMode>,
        #[arg(long, help = "overrides the random seed of the configuration")]
        seed: Option<u64>,
    },
    /// compile a model specification and report any errors
    Validate {
        #[arg(long, help = "path to .toml or .json model specification")]
        model_spec_file: String,
    },
}

pub fn run(app: &App) -> Result<(), ChoiceAppError> {
    env_logger::init();
    match app {
        App::Run {
            configuration_file,
            output_mode,
            seed,
        } => {
            log::info!("reading run configuration from {configuration_file}");
            let mut conf = ChoiceRunConfig::try_from(configuration_file)?;
            if let Some(mode) = output_mode {
                conf.output_mode = *mode;
            }
            if let Some(seed) = seed {
                conf.seed = *seed;
            }
            let report = run_choice_model(&conf)?;
            eprintln!(
                "finished. {} results, {} failures.",
                report.results.len(),
                report.failures.len()
            );
            Ok(())
        }
        App::Validate { model_spec_file } => {
            let spec = validate(model_spec_file)?;
            eprintln!(
                "model '{}' is valid with {} alternatives.",
                spec.name(),
                spec.len()
            );
            Ok(())
        }
    }
}

fn main() {
    let args = ChoiceAppArguments::parse();
    if let Err(e) = run(&args.app) {
        log::error!("bambam-choice failed: {e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}
