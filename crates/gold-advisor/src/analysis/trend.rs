//! Trend Analyzer
//!
//! Orders a batch by time and derives direction, strength, duration,
//! momentum, volatility, consistency and recent change from the score
//! series.

use chrono::NaiveDateTime;

use super::stats::{linear_fit, mean, population_std};
use super::timeparse::{parse_date, sort_key};
use crate::config::TrendConfig;
use crate::model::{SentimentRecord, TrendAnalysis, TrendDirection};

/// Sort records ascending by parsed time. Unparsable times come first;
/// equal keys keep their input order.
pub fn sort_by_time(records: &[SentimentRecord]) -> Vec<&SentimentRecord> {
    let mut keyed: Vec<(Option<NaiveDateTime>, &SentimentRecord)> =
        records.iter().map(|r| (sort_key(&r.time), r)).collect();
    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, r)| r).collect()
}

/// Analyse the sentiment trend of a batch
pub fn analyze_trend(records: &[SentimentRecord], config: &TrendConfig) -> TrendAnalysis {
    if records.len() < config.min_data_points.max(2) {
        return TrendAnalysis::flat();
    }

    let ordered = sort_by_time(records);
    let scores: Vec<f64> = ordered.iter().map(|r| r.score).collect();
    let fit = linear_fit(&scores);

    TrendAnalysis {
        direction: direction_for_slope(fit.slope, config.slope_threshold),
        strength: fit.r_squared.clamp(0.0, 1.0),
        duration: duration_days(&ordered),
        momentum: momentum(&scores, config),
        volatility: population_std(&scores).clamp(0.0, 1.0),
        consistency: consistency(&scores, config.flat_epsilon),
        recent_change: recent_change(&scores, config.short_window),
    }
}

/// |slope| < T is sideways, T up to 2T is mild, 2T and beyond is strong
pub fn direction_for_slope(slope: f64, threshold: f64) -> TrendDirection {
    if slope >= threshold * 2.0 {
        TrendDirection::StrongUp
    } else if slope >= threshold {
        TrendDirection::Up
    } else if slope <= -threshold * 2.0 {
        TrendDirection::StrongDown
    } else if slope <= -threshold {
        TrendDirection::Down
    } else {
        TrendDirection::Sideways
    }
}

/// Inclusive day span of the first and last record, at least 1. Falls back
/// to the record count when either end has no parsable date.
fn duration_days(ordered: &[&SentimentRecord]) -> u32 {
    let fallback = u32::try_from(ordered.len()).unwrap_or(u32::MAX);

    let (Some(first), Some(last)) = (ordered.first(), ordered.last()) else {
        return fallback;
    };

    match (parse_date(&first.time), parse_date(&last.time)) {
        (Some(start), Some(end)) => {
            let days = (end - start).num_days() + 1;
            u32::try_from(days.max(1)).unwrap_or(u32::MAX)
        }
        _ => fallback,
    }
}

fn recent_window(scores: &[f64], window: usize) -> &[f64] {
    let size = window.max(1).min(scores.len());
    &scores[scores.len() - size..]
}

fn momentum(scores: &[f64], config: &TrendConfig) -> f64 {
    if scores.is_empty() || config.momentum_divisor <= 0.0 {
        return 0.0;
    }
    let recent = mean(recent_window(scores, config.short_window));
    ((recent - mean(scores)) / config.momentum_divisor).clamp(-1.0, 1.0)
}

/// Share of directional adjacent moves that agree with the dominant direction
fn consistency(scores: &[f64], flat_epsilon: f64) -> f64 {
    let (ups, downs) = scores
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|delta| delta.abs() > flat_epsilon)
        .fold((0usize, 0usize), |(ups, downs), delta| {
            if delta > 0.0 { (ups + 1, downs) } else { (ups, downs + 1) }
        });

    let votes = ups + downs;
    if votes == 0 {
        return 0.0;
    }
    (ups.max(downs) as f64 / votes as f64).clamp(0.0, 1.0)
}

fn recent_change(scores: &[f64], window: usize) -> f64 {
    let recent = recent_window(scores, window);
    match (recent.first(), recent.last()) {
        (Some(first), Some(last)) if recent.len() >= 2 => {
            (last - first) / (recent.len() - 1) as f64
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sentiment;

    fn series(scores: &[f64]) -> Vec<SentimentRecord> {
        scores
            .iter()
            .enumerate()
            .map(|(i, s)| SentimentRecord::new(format!("2024-01-{:02}", i + 1), Sentiment::Neutral, *s, 0.7))
            .collect()
    }

    #[test]
    fn test_too_few_points_is_flat() {
        let config = TrendConfig::default();
        assert_eq!(analyze_trend(&[], &config), TrendAnalysis::flat());
        assert_eq!(analyze_trend(&series(&[0.9, -0.9]), &config), TrendAnalysis::flat());
    }

    #[test]
    fn test_monotonic_rise() {
        let trend = analyze_trend(&series(&[-0.5, -0.3, -0.1, 0.2, 0.5]), &TrendConfig::default());
        assert!(trend.direction.is_upward());
        assert!(trend.strength > 0.8);
        assert!((trend.consistency - 1.0).abs() < f64::EPSILON);
        assert_eq!(trend.duration, 5);
        // last three: -0.1 -> 0.5 over two steps
        assert!((trend.recent_change - 0.3).abs() < 1e-12);
        assert!(trend.momentum > 0.0);
    }

    #[test]
    fn test_constant_series() {
        let trend = analyze_trend(&series(&[0.2; 5]), &TrendConfig::default());
        assert_eq!(trend.direction, TrendDirection::Sideways);
        assert!(trend.volatility.abs() < f64::EPSILON);
        assert!(trend.consistency.abs() < f64::EPSILON);
        assert!(trend.strength.abs() < f64::EPSILON);
    }

    #[test]
    fn test_direction_thresholds() {
        assert_eq!(direction_for_slope(0.05, 0.1), TrendDirection::Sideways);
        assert_eq!(direction_for_slope(0.1, 0.1), TrendDirection::Up);
        assert_eq!(direction_for_slope(0.25, 0.1), TrendDirection::StrongUp);
        assert_eq!(direction_for_slope(-0.1, 0.1), TrendDirection::Down);
        assert_eq!(direction_for_slope(-0.3, 0.1), TrendDirection::StrongDown);
    }

    #[test]
    fn test_sorts_by_time_before_fitting() {
        let mut records = series(&[-0.5, -0.3, -0.1, 0.2, 0.5]);
        records.reverse();
        let trend = analyze_trend(&records, &TrendConfig::default());
        assert!(trend.direction.is_upward());
    }

    #[test]
    fn test_unparsable_times_sort_first() {
        let records = vec![
            SentimentRecord::new("2024-01-02", Sentiment::Neutral, 0.1, 0.5),
            SentimentRecord::new("unknown", Sentiment::Neutral, 0.9, 0.5),
            SentimentRecord::new("2024-01-01", Sentiment::Neutral, 0.0, 0.5),
        ];
        let ordered = sort_by_time(&records);
        assert_eq!(ordered[0].time, "unknown");
        assert_eq!(ordered[1].time, "2024-01-01");

        // first end unparsable: duration falls back to record count
        let trend = analyze_trend(&records, &TrendConfig::default());
        assert_eq!(trend.duration, 3);
    }

    #[test]
    fn test_duration_spans_dates_inclusively() {
        let records = vec![
            SentimentRecord::new("2024-01-01 08:00:00", Sentiment::Neutral, 0.1, 0.5),
            SentimentRecord::new("2024-01-05", Sentiment::Neutral, 0.2, 0.5),
            SentimentRecord::new("2024-01-10T23:59:00", Sentiment::Neutral, 0.3, 0.5),
        ];
        assert_eq!(analyze_trend(&records, &TrendConfig::default()).duration, 10);
    }

    #[test]
    fn test_small_moves_cast_no_vote() {
        assert!((consistency(&[0.0, 0.005, 0.3, 0.2], 0.01) - 0.5).abs() < 1e-12);
        assert!(consistency(&[0.1, 0.105, 0.11], 0.01).abs() < f64::EPSILON);
    }
}
