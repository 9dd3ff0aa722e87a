use clap::{Parser, Subcommand};
use loan_eligibility::artifact::DEFAULT_ARTIFACT_PATH;
use loan_eligibility::dataset::{LabeledDataset, PolicyGenerator};
use loan_eligibility::{
    ApplicantRecord, DecisionEngine, EligibilityError, EmploymentStatus, LoanTerms, LoanType,
    Result, Trainer, TrainingConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(author, version, about = "Loan eligibility decision engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic corpus, train the pipeline and save the artifact
    Train {
        /// Corpus size (overrides the config file)
        #[arg(long)]
        samples: Option<usize>,
        /// Seed for generation, split and forest (overrides the config file)
        #[arg(long)]
        seed: Option<u64>,
        /// JSON training configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Artifact output path
        #[arg(long, default_value = DEFAULT_ARTIFACT_PATH)]
        output: PathBuf,
    },
    /// Decide one applicant and print the decision as JSON
    Predict {
        /// Annual income
        #[arg(long)]
        income: f64,
        #[arg(long)]
        credit_score: u32,
        /// Employed, Self-employed or Unemployed
        #[arg(long)]
        employment: EmploymentStatus,
        /// Home, Education, Car, Personal or Business
        #[arg(long)]
        loan_type: LoanType,
        /// Requested principal, for the affordability estimate
        #[arg(long, requires = "term_months")]
        amount: Option<f64>,
        /// Repayment period in months
        #[arg(long, requires = "amount")]
        term_months: Option<u32>,
        #[arg(long, default_value = DEFAULT_ARTIFACT_PATH)]
        artifact: PathBuf,
    },
    /// Write a labeled synthetic corpus as CSV
    Generate {
        #[arg(long, default_value_t = 1000)]
        samples: usize,
        #[arg(long, default_value_t = loan_eligibility::dataset::DEFAULT_SEED)]
        seed: u64,
        #[arg(long)]
        output: PathBuf,
    },
}

fn train(
    samples: Option<usize>,
    seed: Option<u64>,
    config: Option<PathBuf>,
    output: PathBuf,
) -> Result<()> {
    let base = match config {
        Some(path) => TrainingConfig::from_json_file(path)?,
        None => TrainingConfig::default(),
    };
    let mut builder = Trainer::builder(base);
    if let Some(n) = samples {
        builder = builder.samples(n);
    }
    if let Some(s) = seed {
        builder = builder.seed(s);
    }
    let pipeline = builder.build()?.run()?;
    pipeline.save(&output)?;

    if let Some(report) = &pipeline.metadata().evaluation {
        println!("{}", report);
    }
    println!("artifact written to {}", output.display());
    Ok(())
}

fn predict(record: ApplicantRecord, terms: Option<LoanTerms>, artifact: PathBuf) -> Result<()> {
    let engine = DecisionEngine::open(&artifact)?;
    let decision = engine.decide(&record, terms)?;
    let json = serde_json::to_string_pretty(&decision)
        .map_err(|e| EligibilityError::InvalidInput(format!("cannot render decision: {}", e)))?;
    println!("{}", json);
    Ok(())
}

fn generate(samples: usize, seed: u64, output: PathBuf) -> Result<()> {
    let rows = PolicyGenerator::default().generate(samples, seed)?;
    let dataset = LabeledDataset::new(rows)?;
    dataset.write_csv(&output)?;
    let counts = dataset.class_counts();
    println!(
        "{} rows ({} eligible, {} not eligible) written to {}",
        dataset.len(),
        counts.eligible,
        counts.not_eligible,
        output.display()
    );
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Train {
            samples,
            seed,
            config,
            output,
        } => train(samples, seed, config, output),
        Commands::Predict {
            income,
            credit_score,
            employment,
            loan_type,
            amount,
            term_months,
            artifact,
        } => {
            let record = ApplicantRecord::new(income, credit_score, employment, loan_type)?;
            let terms = match (amount, term_months) {
                (Some(a), Some(m)) => Some(LoanTerms::new(a, m)?),
                _ => None,
            };
            predict(record, terms, artifact)
        }
        Commands::Generate {
            samples,
            seed,
            output,
        } => generate(samples, seed, output),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
