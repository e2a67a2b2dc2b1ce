use anyhow::Context;
use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{CaseCountSample, RiskAssessment, SearchInterestSample, SentimentSample};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Insert a small realistic data set across all three source tables so the
/// scorer has something to chew on without the upstream scrapers.
pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let today = Utc::now().date_naive();

    let trend_points: Vec<(i64, f64)> = vec![
        (27, 34.0),
        (24, 31.0),
        (21, 38.0),
        (18, 42.0),
        (15, 40.0),
        (12, 47.0),
        (9, 55.0),
        (6, 61.0),
        (3, 66.0),
        (0, 72.0),
    ];

    for (days_ago, interest) in trend_points {
        sqlx::query(
            r#"
            INSERT INTO biopulse.search_trends (date, keyword, search_interest, geo)
            VALUES ($1, $2, $3, 'US')
            ON CONFLICT (date, keyword) DO NOTHING
            "#,
        )
        .bind(today - chrono::Duration::days(days_ago))
        .bind("measles")
        .bind(interest)
        .execute(pool)
        .await?;
    }

    let case_points: Vec<(i64, i64)> = vec![
        (42, 31),
        (35, 35),
        (28, 40),
        (21, 44),
        (14, 49),
        (7, 52),
        (0, 58),
    ];

    for (days_ago, count) in case_points {
        sqlx::query(
            r#"
            INSERT INTO biopulse.case_reports (report_date, state, case_count, source_url)
            VALUES ($1, 'US', $2, $3)
            ON CONFLICT (report_date, state) DO NOTHING
            "#,
        )
        .bind(today - chrono::Duration::days(days_ago))
        .bind(count)
        .bind("https://www.cdc.gov/measles/data-research/index.html")
        .execute(pool)
        .await?;
    }

    let sentiment_points: Vec<(i64, f64, i32)> = vec![
        (6, -0.12, 4),
        (5, -0.30, 7),
        (4, -0.25, 5),
        (3, -0.41, 9),
        (2, -0.18, 6),
        (1, -0.35, 8),
        (0, -0.28, 5),
    ];

    for (days_ago, polarity, articles) in sentiment_points {
        sqlx::query(
            r#"
            INSERT INTO biopulse.news_sentiment_daily (published_date, avg_sentiment, article_count)
            VALUES ($1, $2, $3)
            ON CONFLICT (published_date) DO NOTHING
            "#,
        )
        .bind(today - chrono::Duration::days(days_ago))
        .bind(polarity)
        .bind(articles)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Search-interest rows for one keyword since the cutoff, oldest first.
pub async fn fetch_trend_samples(
    pool: &PgPool,
    keyword: &str,
    since_date: NaiveDate,
) -> anyhow::Result<Vec<SearchInterestSample>> {
    let rows = sqlx::query(
        "SELECT date, keyword, search_interest \
         FROM biopulse.search_trends \
         WHERE keyword = $1 AND date >= $2 \
         ORDER BY date",
    )
    .bind(keyword)
    .bind(since_date)
    .fetch_all(pool)
    .await?;

    let mut samples = Vec::new();
    for row in rows {
        samples.push(SearchInterestSample {
            date: row.get("date"),
            keyword: row.get("keyword"),
            search_interest: row.get("search_interest"),
        });
    }

    Ok(samples)
}

/// Most recent case reports, newest first, capped at `limit`.
pub async fn fetch_case_samples(
    pool: &PgPool,
    limit: i64,
) -> anyhow::Result<Vec<CaseCountSample>> {
    let rows = sqlx::query(
        "SELECT report_date, state, case_count \
         FROM biopulse.case_reports \
         ORDER BY report_date DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let mut samples = Vec::new();
    for row in rows {
        samples.push(CaseCountSample {
            report_date: row.get("report_date"),
            state: row.get("state"),
            case_count: row.get("case_count"),
        });
    }

    Ok(samples)
}

/// Daily sentiment aggregates since the cutoff, oldest first.
pub async fn fetch_sentiment_samples(
    pool: &PgPool,
    since_date: NaiveDate,
) -> anyhow::Result<Vec<SentimentSample>> {
    let rows = sqlx::query(
        "SELECT published_date, avg_sentiment, article_count \
         FROM biopulse.news_sentiment_daily \
         WHERE published_date >= $1 \
         ORDER BY published_date",
    )
    .bind(since_date)
    .fetch_all(pool)
    .await?;

    let mut samples = Vec::new();
    for row in rows {
        samples.push(SentimentSample {
            published_date: row.get("published_date"),
            avg_sentiment: row.get("avg_sentiment"),
            article_count: row.get("article_count"),
        });
    }

    Ok(samples)
}

/// Append one assessment to the history. Records are never updated.
pub async fn insert_assessment(
    pool: &PgPool,
    assessment: &RiskAssessment,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO biopulse.risk_assessments
        (id, calculated_at, risk_score, risk_level, search_interest_score,
         case_growth_score, news_sentiment_score, total_articles_analyzed,
         latest_case_count)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(assessment.calculated_at)
    .bind(assessment.risk_score)
    .bind(assessment.risk_level.as_str())
    .bind(assessment.search_interest_score)
    .bind(assessment.case_growth_score)
    .bind(assessment.news_sentiment_score)
    .bind(assessment.total_articles_analyzed)
    .bind(assessment.latest_case_count)
    .execute(pool)
    .await
    .context("failed to append risk assessment")?;

    Ok(())
}

/// Assessment history, newest first.
pub async fn fetch_assessments(
    pool: &PgPool,
    limit: i64,
) -> anyhow::Result<Vec<RiskAssessment>> {
    let rows = sqlx::query(
        "SELECT calculated_at, risk_score, risk_level, search_interest_score, \
         case_growth_score, news_sentiment_score, total_articles_analyzed, \
         latest_case_count \
         FROM biopulse.risk_assessments \
         ORDER BY calculated_at DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let mut assessments = Vec::new();
    for row in rows {
        let level: String = row.get("risk_level");
        assessments.push(RiskAssessment {
            calculated_at: row.get("calculated_at"),
            risk_score: row.get("risk_score"),
            risk_level: level.parse()?,
            search_interest_score: row.get("search_interest_score"),
            case_growth_score: row.get("case_growth_score"),
            news_sentiment_score: row.get("news_sentiment_score"),
            total_articles_analyzed: row.get("total_articles_analyzed"),
            latest_case_count: row.get("latest_case_count"),
        });
    }

    Ok(assessments)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ImportKind {
    Trends,
    Cases,
    Sentiment,
}

/// Load rows from a CSV file into the table for `kind`. Duplicate rows
/// (same natural key) are skipped; returns the number actually inserted.
pub async fn import_csv(
    pool: &PgPool,
    kind: ImportKind,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    match kind {
        ImportKind::Trends => import_trends_csv(pool, csv_path).await,
        ImportKind::Cases => import_cases_csv(pool, csv_path).await,
        ImportKind::Sentiment => import_sentiment_csv(pool, csv_path).await,
    }
}

async fn import_trends_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        date: NaiveDate,
        keyword: String,
        search_interest: f64,
        geo: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        anyhow::ensure!(
            (0.0..=100.0).contains(&row.search_interest),
            "search_interest {} out of range for {} on {}",
            row.search_interest,
            row.keyword,
            row.date
        );

        let outcome = sqlx::query(
            r#"
            INSERT INTO biopulse.search_trends (date, keyword, search_interest, geo)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (date, keyword) DO NOTHING
            "#,
        )
        .bind(row.date)
        .bind(&row.keyword)
        .bind(row.search_interest)
        .bind(row.geo.as_deref().unwrap_or("US"))
        .execute(pool)
        .await?;

        if outcome.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

async fn import_cases_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        report_date: NaiveDate,
        state: Option<String>,
        case_count: i64,
        source_url: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        anyhow::ensure!(
            row.case_count >= 0,
            "negative case_count {} on {}",
            row.case_count,
            row.report_date
        );

        let outcome = sqlx::query(
            r#"
            INSERT INTO biopulse.case_reports (report_date, state, case_count, source_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (report_date, state) DO NOTHING
            "#,
        )
        .bind(row.report_date)
        .bind(row.state.as_deref().unwrap_or("US"))
        .bind(row.case_count)
        .bind(row.source_url.as_deref())
        .execute(pool)
        .await?;

        if outcome.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

async fn import_sentiment_csv(
    pool: &PgPool,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        published_date: NaiveDate,
        avg_sentiment: f64,
        article_count: i32,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        anyhow::ensure!(
            (-1.0..=1.0).contains(&row.avg_sentiment),
            "avg_sentiment {} out of range on {}",
            row.avg_sentiment,
            row.published_date
        );

        let outcome = sqlx::query(
            r#"
            INSERT INTO biopulse.news_sentiment_daily (published_date, avg_sentiment, article_count)
            VALUES ($1, $2, $3)
            ON CONFLICT (published_date) DO NOTHING
            "#,
        )
        .bind(row.published_date)
        .bind(row.avg_sentiment)
        .bind(row.article_count)
        .execute(pool)
        .await?;

        if outcome.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
