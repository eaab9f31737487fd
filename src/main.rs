use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use internship_match::config::Settings;
use internship_match::error::MatchError;
use internship_match::extractor::Extractor;
use internship_match::fetch::HttpFetcher;
use internship_match::search::search_opportunities;
use internship_match::session::{self, SessionError};
use internship_match::storage::{JsonFileStore, RecordStore};
use internship_match::{OpportunityRecord, StudentRecord, WorkMode};

#[derive(Parser)]
#[command(name = "internship-match")]
#[command(
    about = "Fetch internship listings and recommend them by skill overlap",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a student.
    AddStudent {
        #[arg(long)]
        name: String,
        /// Comma separated, e.g. "Python, SQL"
        #[arg(long)]
        skills: String,
    },

    /// Enter an internship by hand.
    AddOpportunity {
        #[arg(long)]
        title: String,
        /// Comma separated
        #[arg(long)]
        requirements: String,
        #[arg(long, default_value = "")]
        location: String,
        /// Remote, In-office or Hybrid
        #[arg(long, default_value = "In-office")]
        mode: WorkMode,
    },

    /// Fetch a listing page and save every internship found.
    Fetch {
        url: String,
        /// Print every fetched record
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show a stored table.
    List { table: Table },

    /// Keyword search across all internships.
    Search { keyword: String },

    /// Top internships for a student.
    Recommend {
        name: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Table {
    Students,
    Opportunities,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let root = std::env::var("ROOT").unwrap_or_else(|_| ".".to_string());
    let settings = Settings::load(&root)?;
    let mut store = JsonFileStore::new(settings.data_dir(&root));

    match cli.command {
        Command::AddStudent { name, skills } => {
            let student = session::add_student(&mut store, &name, &skills)?;
            println!("Student added: {}", format_student(&student));
        }
        Command::AddOpportunity {
            title,
            requirements,
            location,
            mode,
        } => {
            let opportunity =
                session::add_opportunity(&mut store, &title, &requirements, &location, mode)?;
            println!("Internship added: {}", format_opportunity(&opportunity));
        }
        Command::Fetch { url, verbose } => {
            let fetcher = HttpFetcher::new(&settings.fetch.user_agent, settings.fetch.timeout())
                .context("Failed to set up HTTP client")?;
            let extractor = Extractor::new(fetcher, &settings.selectors)?;

            let extraction = match session::import_listing(&mut store, &extractor, &url) {
                Ok(extraction) => extraction,
                Err(SessionError::ImportNotSaved { extraction, source }) => {
                    eprintln!("Could not save fetched internships: {}", source);
                    for record in &extraction.records {
                        println!("  (unsaved) {}", format_opportunity(record));
                    }
                    return Err(source.into());
                }
                Err(e) => return Err(e.into()),
            };

            for diagnostic in &extraction.diagnostics {
                if diagnostic.entry.is_some() {
                    println!("  skipped: {}", diagnostic);
                } else {
                    println!("Listing problem: {}", diagnostic);
                }
            }

            if extraction.records.is_empty() {
                println!("No internships found. Adjust selectors in config.yml if needed.");
            } else {
                println!("{} internships fetched and added.", extraction.records.len());
                if verbose {
                    for (i, record) in extraction.records.iter().enumerate() {
                        println!("{:>3}. {}", i + 1, format_opportunity(record));
                    }
                }
            }
        }
        Command::List { table } => match table {
            Table::Students => {
                let students: Vec<StudentRecord> = store.read_all();
                if students.is_empty() {
                    println!("No students yet.");
                }
                for student in &students {
                    println!("- {}", format_student(student));
                }
            }
            Table::Opportunities => {
                let opportunities: Vec<OpportunityRecord> = store.read_all();
                if opportunities.is_empty() {
                    println!("No internships yet. Add one or fetch from the web.");
                }
                for opportunity in &opportunities {
                    println!("- {}", format_opportunity(opportunity));
                }
            }
        },
        Command::Search { keyword } => {
            let opportunities: Vec<OpportunityRecord> = store.read_all();
            let hits = search_opportunities(&opportunities, &keyword);
            println!("{} matching internships", hits.len());
            for opportunity in hits {
                println!("- {}", format_opportunity(opportunity));
            }
        }
        Command::Recommend { name, limit } => {
            let limit = limit.unwrap_or(settings.recommend_limit);
            match session::recommend(&store, &name, limit) {
                Ok(ranked) => {
                    println!("Top recommended internships for {}", name.trim());
                    for (i, result) in ranked.iter().enumerate() {
                        println!(
                            "{:>3}. [score {}] {}",
                            i + 1,
                            result.score,
                            format_opportunity(&result.opportunity)
                        );
                    }
                }
                Err(SessionError::Match(MatchError::InvalidInput { reason })) => {
                    println!("Please add students and internships first ({}).", reason);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

fn format_student(student: &StudentRecord) -> String {
    format!(
        "{} ({})",
        student.name,
        student.skills.iter().cloned().collect::<Vec<_>>().join(", ")
    )
}

fn format_opportunity(opportunity: &OpportunityRecord) -> String {
    format!(
        "{} | {} | {} | {}",
        opportunity.title, opportunity.requirements, opportunity.location, opportunity.mode
    )
}
