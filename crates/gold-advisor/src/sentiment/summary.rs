//! Dashboard projections over analysed batches

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::timeparse::parse_date;
use crate::analysis::{mean, population_std, round_to, sort_by_time};
use crate::model::{Sentiment, SentimentDistribution, SentimentRecord};

/// Three-level mood of the average score
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Optimistic,
    #[default]
    Neutral,
    Pessimistic,
}

impl Mood {
    pub fn from_score(average: f64) -> Self {
        if average > 0.2 {
            Self::Optimistic
        } else if average < -0.2 {
            Self::Pessimistic
        } else {
            Self::Neutral
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Optimistic => "乐观",
            Self::Neutral => "中性",
            Self::Pessimistic => "悲观",
        }
    }
}

/// Descriptive statistics of a batch
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentOverview {
    pub total_count: usize,
    pub sentiment_distribution: SentimentDistribution,
    pub average_score: f64,
    pub average_confidence: f64,
    pub score_min: f64,
    pub score_max: f64,
    pub score_std: f64,
    pub confidence_std: f64,
    pub positive_ratio: f64,
    pub negative_ratio: f64,
    pub neutral_ratio: f64,
    pub mood: Mood,
}

impl SentimentOverview {
    pub fn from_records(records: &[SentimentRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let scores: Vec<f64> = records.iter().map(|r| r.score).collect();
        let confidences: Vec<f64> = records.iter().map(|r| r.confidence).collect();
        let distribution = SentimentDistribution::from_records(records);
        let total = records.len() as f64;
        let ratio = |s: Sentiment| distribution.count(s) as f64 / total;
        let average_score = mean(&scores);

        Self {
            total_count: records.len(),
            sentiment_distribution: distribution,
            average_score: round_to(average_score, 3),
            average_confidence: round_to(mean(&confidences), 3),
            score_min: scores.iter().copied().fold(f64::INFINITY, f64::min),
            score_max: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            score_std: population_std(&scores),
            confidence_std: population_std(&confidences),
            positive_ratio: ratio(Sentiment::Positive),
            negative_ratio: ratio(Sentiment::Negative),
            neutral_ratio: ratio(Sentiment::Neutral),
            mood: Mood::from_score(average_score),
        }
    }
}

/// One point of the score timeline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub time: String,
    pub sentiment: Sentiment,
    pub score: f64,
    pub confidence: f64,
}

/// Records as timeline points, ordered like the trend analyzer orders them
pub fn sentiment_timeline(records: &[SentimentRecord]) -> Vec<TimelinePoint> {
    sort_by_time(records)
        .into_iter()
        .map(|r| TimelinePoint {
            time: r.time.clone(),
            sentiment: r.sentiment,
            score: r.score,
            confidence: r.confidence,
        })
        .collect()
}

/// Per-day aggregate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailySentiment {
    pub date: NaiveDate,
    pub average_score: f64,
    pub average_confidence: f64,
    pub count: usize,
}

/// Daily averages, ascending by date. Records without a parsable date are
/// left out.
pub fn daily_sentiment(records: &[SentimentRecord]) -> Vec<DailySentiment> {
    let mut days: BTreeMap<NaiveDate, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for record in records {
        if let Some(date) = parse_date(&record.time) {
            let (scores, confidences) = days.entry(date).or_default();
            scores.push(record.score);
            confidences.push(record.confidence);
        }
    }

    days.into_iter()
        .map(|(date, (scores, confidences))| DailySentiment {
            date,
            average_score: round_to(mean(&scores), 3),
            average_confidence: round_to(mean(&confidences), 3),
            count: scores.len(),
        })
        .collect()
}

/// How often a keyword was tagged across a batch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

/// The `top` most frequent keywords, optionally only from records of one
/// sentiment class. Ties keep first-seen order. Keywords are trimmed and
/// blanks skipped.
pub fn keyword_frequency(records: &[SentimentRecord], filter: Option<Sentiment>, top: usize) -> Vec<KeywordCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<KeywordCount> = Vec::new();

    let matching = records.iter().filter(|r| filter.is_none_or(|s| r.sentiment == s));
    for keyword in matching.flat_map(|r| r.keywords.iter()) {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            continue;
        }
        match index.get(keyword) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(keyword, counts.len());
                counts.push(KeywordCount { keyword: keyword.to_string(), count: 1 });
            }
        }
    }

    // stable: equal counts stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(top);
    counts
}
