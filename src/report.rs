use std::fmt::Write;

use crate::models::{RiskAssessment, RiskLevel};
use crate::risk::{CASE_SCORE_MAX, SEARCH_SCORE_MAX, SENTIMENT_SCORE_MAX};

pub struct LevelMix {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

pub fn level_mix(assessments: &[RiskAssessment]) -> LevelMix {
    let mut mix = LevelMix {
        low: 0,
        medium: 0,
        high: 0,
    };

    for assessment in assessments {
        match assessment.risk_level {
            RiskLevel::Low => mix.low += 1,
            RiskLevel::Medium => mix.medium += 1,
            RiskLevel::High => mix.high += 1,
        }
    }

    mix
}

/// Component breakdown printed after a scoring run.
pub fn format_breakdown(assessment: &RiskAssessment) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "Overall risk score: {:.1}/100 ({})",
        assessment.risk_score, assessment.risk_level
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "Component breakdown:");
    let _ = writeln!(
        output,
        "  Search interest: {:.1}/{:.0}",
        assessment.search_interest_score, SEARCH_SCORE_MAX
    );
    let _ = writeln!(
        output,
        "  Case growth:     {:.1}/{:.0}",
        assessment.case_growth_score, CASE_SCORE_MAX
    );
    let _ = writeln!(
        output,
        "  News sentiment:  {:.1}/{:.0}",
        assessment.news_sentiment_score, SENTIMENT_SCORE_MAX
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "Data points:");
    let _ = writeln!(
        output,
        "  Latest case count: {}",
        assessment.latest_case_count
    );
    let _ = writeln!(
        output,
        "  Articles analyzed: {}",
        assessment.total_articles_analyzed
    );

    output
}

/// Markdown report over the stored assessment history, newest first.
pub fn build_report(keyword: &str, assessments: &[RiskAssessment]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# BioPulse Outbreak Risk Report");
    let _ = writeln!(output, "Keyword: {keyword}");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Latest Assessment");

    match assessments.first() {
        None => {
            let _ = writeln!(output, "No assessments recorded yet. Run `score` first.");
        }
        Some(latest) => {
            let _ = writeln!(
                output,
                "Calculated at {} — **{:.1}/100 ({})**",
                latest.calculated_at.format("%Y-%m-%d %H:%M UTC"),
                latest.risk_score,
                latest.risk_level
            );
            let _ = writeln!(output);
            let _ = writeln!(
                output,
                "- Search interest: {:.1}/{:.0}",
                latest.search_interest_score, SEARCH_SCORE_MAX
            );
            let _ = writeln!(
                output,
                "- Case growth: {:.1}/{:.0} (latest count {})",
                latest.case_growth_score, CASE_SCORE_MAX, latest.latest_case_count
            );
            let _ = writeln!(
                output,
                "- News sentiment: {:.1}/{:.0} ({} articles analyzed)",
                latest.news_sentiment_score,
                SENTIMENT_SCORE_MAX,
                latest.total_articles_analyzed
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Level Mix");

    if assessments.is_empty() {
        let _ = writeln!(output, "No history for this window.");
    } else {
        let mix = level_mix(assessments);
        let _ = writeln!(output, "- HIGH: {}", mix.high);
        let _ = writeln!(output, "- MEDIUM: {}", mix.medium);
        let _ = writeln!(output, "- LOW: {}", mix.low);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Assessment History");

    if assessments.is_empty() {
        let _ = writeln!(output, "No assessments recorded yet.");
    } else {
        let _ = writeln!(
            output,
            "| Calculated at | Score | Level | Search | Cases | Sentiment |"
        );
        let _ = writeln!(output, "|---|---|---|---|---|---|");
        for assessment in assessments {
            let _ = writeln!(
                output,
                "| {} | {:.1} | {} | {:.1} | {:.1} | {:.1} |",
                assessment.calculated_at.format("%Y-%m-%d %H:%M"),
                assessment.risk_score,
                assessment.risk_level,
                assessment.search_interest_score,
                assessment.case_growth_score,
                assessment.news_sentiment_score
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn assessment(score: f64, level: RiskLevel) -> RiskAssessment {
        RiskAssessment {
            calculated_at: Utc::now(),
            risk_score: score,
            risk_level: level,
            search_interest_score: 20.0,
            case_growth_score: 15.0,
            news_sentiment_score: 15.0,
            total_articles_analyzed: 12,
            latest_case_count: 58,
        }
    }

    #[test]
    fn level_mix_counts_each_bucket() {
        let history = vec![
            assessment(85.0, RiskLevel::High),
            assessment(55.0, RiskLevel::Medium),
            assessment(52.0, RiskLevel::Medium),
            assessment(20.0, RiskLevel::Low),
        ];
        let mix = level_mix(&history);
        assert_eq!(mix.high, 1);
        assert_eq!(mix.medium, 2);
        assert_eq!(mix.low, 1);
    }

    #[test]
    fn empty_history_renders_placeholders() {
        let report = build_report("measles", &[]);
        assert!(report.contains("No assessments recorded yet"));
        assert!(report.contains("No history for this window"));
    }

    #[test]
    fn report_includes_latest_breakdown() {
        let history = vec![assessment(50.0, RiskLevel::Medium)];
        let report = build_report("measles", &history);
        assert!(report.contains("50.0/100 (MEDIUM)"));
        assert!(report.contains("latest count 58"));
        assert!(report.contains("12 articles analyzed"));
    }
}
