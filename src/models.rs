use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One day of search interest for a single keyword, 0-100 scale.
#[derive(Debug, Clone)]
pub struct SearchInterestSample {
    pub date: NaiveDate,
    pub keyword: String,
    pub search_interest: f64,
}

/// One case-count report. Sequences of these are ordered most-recent-first.
#[derive(Debug, Clone)]
pub struct CaseCountSample {
    pub report_date: NaiveDate,
    pub state: String,
    pub case_count: i64,
}

/// Daily-aggregated news sentiment, polarity in -1..1.
#[derive(Debug, Clone)]
pub struct SentimentSample {
    pub published_date: NaiveDate,
    pub avg_sentiment: f64,
    pub article_count: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "LOW" => Ok(RiskLevel::Low),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "HIGH" => Ok(RiskLevel::High),
            other => Err(anyhow::anyhow!("unknown risk level {other:?}")),
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed risk assessment. Append-only once written.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    pub calculated_at: DateTime<Utc>,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub search_interest_score: f64,
    pub case_growth_score: f64,
    pub news_sentiment_score: f64,
    pub total_articles_analyzed: i64,
    pub latest_case_count: i64,
}
