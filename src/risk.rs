use chrono::{DateTime, Utc};

use crate::models::{
    CaseCountSample, RiskAssessment, RiskLevel, SearchInterestSample, SentimentSample,
};

/// Neutral sub-score used when search-interest data is missing or degenerate.
pub const DEFAULT_SEARCH_SCORE: f64 = 20.0;
/// Neutral sub-score used when case data is missing or degenerate.
pub const DEFAULT_CASE_SCORE: f64 = 15.0;
/// Neutral sub-score used when sentiment data is missing.
pub const DEFAULT_SENTIMENT_SCORE: f64 = 15.0;

pub const SEARCH_SCORE_MAX: f64 = 40.0;
pub const CASE_SCORE_MAX: f64 = 30.0;
pub const SENTIMENT_SCORE_MAX: f64 = 30.0;

/// Recent window (number of trailing samples) for the search trend average.
const SEARCH_RECENT_WINDOW: usize = 7;

const HIGH_RISK_THRESHOLD: f64 = 70.0;
const MEDIUM_RISK_THRESHOLD: f64 = 40.0;

/// Tunable knobs for the case-growth absolute override. Epidemiological
/// thresholds shift, so these are parameters rather than constants.
#[derive(Debug, Clone, Copy)]
pub struct ScoringConfig {
    /// Case counts above this add a flat bonus regardless of trend.
    pub case_threshold: i64,
    /// Bonus points added when the threshold is exceeded.
    pub case_bonus: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            case_threshold: 1000,
            case_bonus: 10.0,
        }
    }
}

/// Search-interest sub-score, 0-40. Compares the trailing-week average
/// against the full-window baseline; a doubling over baseline saturates.
pub fn search_interest_score(trends: &[SearchInterestSample]) -> f64 {
    if trends.len() < 2 {
        return DEFAULT_SEARCH_SCORE;
    }

    let recent_window = trends.len().min(SEARCH_RECENT_WINDOW);
    let recent_avg = trends[trends.len() - recent_window..]
        .iter()
        .map(|s| s.search_interest)
        .sum::<f64>()
        / recent_window as f64;
    let baseline_avg =
        trends.iter().map(|s| s.search_interest).sum::<f64>() / trends.len() as f64;

    if baseline_avg <= 0.0 {
        return DEFAULT_SEARCH_SCORE;
    }

    let trend_change = (recent_avg - baseline_avg) / baseline_avg;
    (DEFAULT_SEARCH_SCORE + trend_change * 40.0).clamp(0.0, SEARCH_SCORE_MAX)
}

/// Case-growth sub-score, 0-30. Input is ordered most-recent-first; the
/// newest report is compared against the mean of the whole window.
pub fn case_growth_score(cases: &[CaseCountSample], config: &ScoringConfig) -> f64 {
    if cases.len() < 2 {
        return DEFAULT_CASE_SCORE;
    }

    let recent_cases = cases[0].case_count as f64;
    let baseline_cases =
        cases.iter().map(|s| s.case_count as f64).sum::<f64>() / cases.len() as f64;

    let mut score = if baseline_cases <= 0.0 {
        DEFAULT_CASE_SCORE
    } else {
        let case_change = (recent_cases - baseline_cases) / baseline_cases;
        (DEFAULT_CASE_SCORE + case_change * 30.0).clamp(0.0, CASE_SCORE_MAX)
    };

    // Absolute severity floor, independent of the relative trend.
    if cases[0].case_count > config.case_threshold {
        score = (score + config.case_bonus).min(CASE_SCORE_MAX);
    }

    score
}

/// News-sentiment sub-score, 0-30. Polarity is inverted: uniformly negative
/// coverage (-1) maps to 30, neutral to 15, positive (+1) to 0.
pub fn news_sentiment_score(sentiment: &[SentimentSample]) -> f64 {
    if sentiment.is_empty() {
        return DEFAULT_SENTIMENT_SCORE;
    }

    let avg_sentiment =
        sentiment.iter().map(|s| s.avg_sentiment).sum::<f64>() / sentiment.len() as f64;
    (DEFAULT_SENTIMENT_SCORE - avg_sentiment * 15.0).clamp(0.0, SENTIMENT_SCORE_MAX)
}

pub fn classify(total_risk: f64) -> RiskLevel {
    if total_risk >= HIGH_RISK_THRESHOLD {
        RiskLevel::High
    } else if total_risk >= MEDIUM_RISK_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Combine the three signal windows into one assessment record. Pure and
/// deterministic; missing inputs fall back to neutral defaults instead of
/// failing.
pub fn compute_assessment(
    trends: &[SearchInterestSample],
    cases: &[CaseCountSample],
    sentiment: &[SentimentSample],
    now: DateTime<Utc>,
    config: &ScoringConfig,
) -> RiskAssessment {
    let search_score = search_interest_score(trends);
    let case_score = case_growth_score(cases, config);
    let sentiment_score = news_sentiment_score(sentiment);
    let total_risk = search_score + case_score + sentiment_score;

    RiskAssessment {
        calculated_at: now,
        risk_score: round2(total_risk),
        risk_level: classify(total_risk),
        search_interest_score: round2(search_score),
        case_growth_score: round2(case_score),
        news_sentiment_score: round2(sentiment_score),
        total_articles_analyzed: sentiment.iter().map(|s| s.article_count as i64).sum(),
        latest_case_count: cases.first().map(|s| s.case_count).unwrap_or(0),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn trend_sample(day: u32, interest: f64) -> SearchInterestSample {
        SearchInterestSample {
            date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            keyword: "measles".to_string(),
            search_interest: interest,
        }
    }

    fn case_sample(days_ago: i64, count: i64) -> CaseCountSample {
        CaseCountSample {
            report_date: NaiveDate::from_ymd_opt(2026, 3, 28).unwrap()
                - Duration::days(days_ago),
            state: "US".to_string(),
            case_count: count,
        }
    }

    fn sentiment_sample(day: u32, polarity: f64, articles: i32) -> SentimentSample {
        SentimentSample {
            published_date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            avg_sentiment: polarity,
            article_count: articles,
        }
    }

    #[test]
    fn empty_inputs_fall_back_to_neutral_defaults() {
        assert_eq!(search_interest_score(&[]), 20.0);
        assert_eq!(case_growth_score(&[], &ScoringConfig::default()), 15.0);
        assert_eq!(news_sentiment_score(&[]), 15.0);
    }

    #[test]
    fn single_sample_is_too_short_for_a_trend() {
        assert_eq!(search_interest_score(&[trend_sample(1, 50.0)]), 20.0);
        assert_eq!(
            case_growth_score(&[case_sample(0, 500)], &ScoringConfig::default()),
            15.0
        );
    }

    #[test]
    fn zero_baseline_falls_back_to_default() {
        let trends = vec![trend_sample(1, 0.0), trend_sample(2, 0.0)];
        assert_eq!(search_interest_score(&trends), 20.0);

        let cases = vec![case_sample(0, 0), case_sample(7, 0)];
        assert_eq!(case_growth_score(&cases, &ScoringConfig::default()), 15.0);
    }

    #[test]
    fn flat_search_interest_scores_neutral() {
        let trends: Vec<_> = (1..=14).map(|d| trend_sample(d, 50.0)).collect();
        assert!((search_interest_score(&trends) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn doubled_recent_search_interest_saturates() {
        // recent avg 80 against a ~44 baseline pushes past the cap.
        let mut trends: Vec<_> = (1..=21).map(|d| trend_sample(d, 26.666_666_666_67)).collect();
        for sample in trends.iter_mut().skip(14) {
            sample.search_interest = 80.0;
        }
        assert_eq!(search_interest_score(&trends), 40.0);
    }

    #[test]
    fn collapsing_search_interest_floors_at_zero() {
        let mut trends: Vec<_> = (1..=21).map(|d| trend_sample(d, 100.0)).collect();
        for sample in trends.iter_mut().skip(14) {
            sample.search_interest = 0.0;
        }
        assert_eq!(search_interest_score(&trends), 0.0);
    }

    #[test]
    fn case_growth_clamps_at_thirty() {
        // recent 500 vs baseline 100: change 4.0 would score 135 unclamped.
        let cases = vec![
            case_sample(0, 500),
            case_sample(7, 50),
            case_sample(14, 50),
            case_sample(21, 50),
            case_sample(28, 50),
            case_sample(35, 100),
            case_sample(42, 100),
            case_sample(49, 100),
            case_sample(56, 50),
            case_sample(63, 50),
        ];
        assert_eq!(case_growth_score(&cases, &ScoringConfig::default()), 30.0);
    }

    #[test]
    fn absolute_case_threshold_adds_bonus_and_clamps() {
        let cases = vec![
            case_sample(0, 1200),
            case_sample(7, 1100),
            case_sample(14, 1050),
            case_sample(21, 1000),
        ];
        // Relative trend is mild (recent 1200 vs mean 1087.5) but the
        // override pushes the score to the cap.
        let score = case_growth_score(&cases, &ScoringConfig::default());
        assert_eq!(score, 30.0);

        // With the bonus disabled the relative score stands alone.
        let no_bonus = ScoringConfig {
            case_bonus: 0.0,
            ..ScoringConfig::default()
        };
        let relative = case_growth_score(&cases, &no_bonus);
        let expected = 15.0 + ((1200.0 - 1087.5) / 1087.5) * 30.0;
        assert!((relative - expected).abs() < 1e-9);
        assert!(relative < 30.0);
    }

    #[test]
    fn case_threshold_is_configurable() {
        let cases = vec![case_sample(0, 600), case_sample(7, 600)];
        let default_score = case_growth_score(&cases, &ScoringConfig::default());
        assert!((default_score - 15.0).abs() < 1e-9);

        let lowered = ScoringConfig {
            case_threshold: 500,
            case_bonus: 10.0,
        };
        assert!((case_growth_score(&cases, &lowered) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn sentiment_inversion_endpoints() {
        let negative = vec![sentiment_sample(1, -1.0, 5)];
        assert_eq!(news_sentiment_score(&negative), 30.0);

        let neutral = vec![sentiment_sample(1, 0.0, 5)];
        assert_eq!(news_sentiment_score(&neutral), 15.0);

        let positive = vec![sentiment_sample(1, 1.0, 5)];
        assert_eq!(news_sentiment_score(&positive), 0.0);
    }

    #[test]
    fn classification_boundaries_are_inclusive_low() {
        assert_eq!(classify(39.999), RiskLevel::Low);
        assert_eq!(classify(40.0), RiskLevel::Medium);
        assert_eq!(classify(69.999), RiskLevel::Medium);
        assert_eq!(classify(70.0), RiskLevel::High);
        assert_eq!(classify(0.0), RiskLevel::Low);
        assert_eq!(classify(100.0), RiskLevel::High);
    }

    #[test]
    fn sub_scores_stay_in_bounds() {
        let config = ScoringConfig::default();
        let trends: Vec<_> = (1..=10).map(|d| trend_sample(d, (d * 10) as f64)).collect();
        let cases: Vec<_> = (0..10).map(|d| case_sample(d * 7, 2000 - d * 150)).collect();
        let sentiment: Vec<_> = (1..=7)
            .map(|d| sentiment_sample(d, -0.9 + d as f64 * 0.25, 3))
            .collect();

        let search = search_interest_score(&trends);
        let case = case_growth_score(&cases, &config);
        let news = news_sentiment_score(&sentiment);
        assert!((0.0..=40.0).contains(&search));
        assert!((0.0..=30.0).contains(&case));
        assert!((0.0..=30.0).contains(&news));

        let assessment = compute_assessment(&trends, &cases, &sentiment, Utc::now(), &config);
        assert!((0.0..=100.0).contains(&assessment.risk_score));
    }

    #[test]
    fn all_defaults_produce_a_medium_assessment() {
        let assessment =
            compute_assessment(&[], &[], &[], Utc::now(), &ScoringConfig::default());
        assert_eq!(assessment.risk_score, 50.0);
        assert_eq!(assessment.risk_level, RiskLevel::Medium);
        assert_eq!(assessment.total_articles_analyzed, 0);
        assert_eq!(assessment.latest_case_count, 0);
    }

    #[test]
    fn surging_signals_produce_a_high_assessment() {
        // Search: recent avg 80 over baseline 40 saturates at 40.
        let mut trends: Vec<_> = (1..=28).map(|d| trend_sample(d, 800.0 / 30.0)).collect();
        for sample in trends.iter_mut().skip(21) {
            sample.search_interest = 80.0;
        }
        // Cases: 500 recent vs 100 baseline clamps at 30, no override at 500.
        let cases = vec![
            case_sample(0, 500),
            case_sample(7, 60),
            case_sample(14, 60),
            case_sample(21, 60),
            case_sample(28, 60),
            case_sample(35, 60),
            case_sample(42, 60),
            case_sample(49, 60),
            case_sample(56, 70),
            case_sample(63, 10),
        ];
        // Sentiment: uniform -0.5 scores 22.5.
        let sentiment: Vec<_> = (1..=7).map(|d| sentiment_sample(d, -0.5, 4)).collect();

        let assessment = compute_assessment(
            &trends,
            &cases,
            &sentiment,
            Utc::now(),
            &ScoringConfig::default(),
        );
        assert_eq!(assessment.search_interest_score, 40.0);
        assert_eq!(assessment.case_growth_score, 30.0);
        assert_eq!(assessment.news_sentiment_score, 22.5);
        assert_eq!(assessment.risk_score, 92.5);
        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert_eq!(assessment.total_articles_analyzed, 28);
        assert_eq!(assessment.latest_case_count, 500);
    }
}
