use std::path::PathBuf;

use anyhow::Context;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod db;
mod models;
mod report;
mod risk;

#[derive(Parser)]
#[command(name = "biopulse-risk-scorer")]
#[command(about = "Outbreak risk scoring over search, case, and news signals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data into all three signal tables
    Seed,
    /// Import signal rows from a CSV file
    Import {
        #[arg(long, value_enum)]
        kind: db::ImportKind,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Compute a risk assessment and append it to the history
    Score {
        #[arg(long, default_value = "measles")]
        keyword: String,
        #[arg(long, default_value_t = 30)]
        trend_days: i64,
        #[arg(long, default_value_t = 10)]
        case_limit: i64,
        #[arg(long, default_value_t = 7)]
        sentiment_days: i64,
        #[arg(long, default_value_t = 1000)]
        case_threshold: i64,
        #[arg(long, default_value_t = 10.0)]
        case_bonus: f64,
        /// Print the stored record as JSON instead of the breakdown
        #[arg(long)]
        json: bool,
    },
    /// List recent assessments, newest first
    History {
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
    /// Generate a markdown report over the assessment history
    Report {
        #[arg(long, default_value = "measles")]
        keyword: String,
        #[arg(long, default_value_t = 20)]
        limit: i64,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { kind, csv } => {
            let inserted = db::import_csv(&pool, kind, &csv).await?;
            println!("Inserted {inserted} rows from {}.", csv.display());
        }
        Commands::Score {
            keyword,
            trend_days,
            case_limit,
            sentiment_days,
            case_threshold,
            case_bonus,
            json,
        } => {
            let now = Utc::now();
            let today = now.date_naive();
            let trends = db::fetch_trend_samples(
                &pool,
                &keyword,
                today - Duration::days(trend_days.max(1)),
            )
            .await?;
            let cases = db::fetch_case_samples(&pool, case_limit.max(1)).await?;
            let sentiment = db::fetch_sentiment_samples(
                &pool,
                today - Duration::days(sentiment_days.max(1)),
            )
            .await?;

            let config = risk::ScoringConfig {
                case_threshold,
                case_bonus,
            };
            let assessment =
                risk::compute_assessment(&trends, &cases, &sentiment, now, &config);
            db::insert_assessment(&pool, &assessment).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&assessment)?);
            } else {
                println!("Risk assessment for {keyword:?} saved.");
                println!();
                print!("{}", report::format_breakdown(&assessment));
                println!();
                println!(
                    "Inputs: {} trend days, {} case reports, {} sentiment days.",
                    trends.len(),
                    cases.len(),
                    sentiment.len()
                );
            }
        }
        Commands::History { limit } => {
            let assessments = db::fetch_assessments(&pool, limit.max(1)).await?;

            if assessments.is_empty() {
                println!("No assessments recorded yet.");
                return Ok(());
            }

            println!("Assessment history (newest first):");
            for assessment in assessments.iter() {
                println!(
                    "- {} score {:.1} ({}) [search {:.1}, cases {:.1}, sentiment {:.1}]",
                    assessment.calculated_at.format("%Y-%m-%d %H:%M"),
                    assessment.risk_score,
                    assessment.risk_level,
                    assessment.search_interest_score,
                    assessment.case_growth_score,
                    assessment.news_sentiment_score
                );
            }
        }
        Commands::Report { keyword, limit, out } => {
            let assessments = db::fetch_assessments(&pool, limit.max(1)).await?;
            let report = report::build_report(&keyword, &assessments);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
