//! Composite-score ranking of surviving items.
//!
//! The composite combines relevance, recency, and source trust. It decides
//! ordering and truncation only; inclusion was already decided by the
//! scorer. Weight constants are preserved exactly for behavioral parity
//! with the curated feed list this crate inherited.

use chrono::{DateTime, Utc};

use crate::NewsItem;

const RELEVANCE_WEIGHT: f64 = 40.0;
const FRESH_MAX: f64 = 30.0;
const RECENT_MAX: f64 = 15.0;
const FRESH_WINDOW_HOURS: f64 = 24.0;
const RECENT_WINDOW_HOURS: f64 = 72.0;
const TRUSTED_BONUS: f64 = 15.0;

pub struct Prioritizer {
    trusted_sources: Vec<String>,
}

impl Prioritizer {
    pub fn new(trusted_sources: &[String]) -> Self {
        Self {
            trusted_sources: trusted_sources.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// Composite score for one item at time `now`.
    pub fn composite_score(&self, item: &NewsItem, now: DateTime<Utc>) -> f64 {
        let mut score = item.relevance_score * RELEVANCE_WEIGHT;

        if let Some(published_at) = item.published_at {
            let age_hours = (now - published_at).num_seconds() as f64 / 3600.0;
            if age_hours < FRESH_WINDOW_HOURS {
                score += (FRESH_MAX - age_hours / FRESH_WINDOW_HOURS * FRESH_MAX).max(0.0);
            } else if age_hours < RECENT_WINDOW_HOURS {
                score += (RECENT_MAX
                    - (age_hours - FRESH_WINDOW_HOURS)
                        / (RECENT_WINDOW_HOURS - FRESH_WINDOW_HOURS)
                        * RECENT_MAX)
                    .max(0.0);
            }
        }

        let source = item.source_name.to_lowercase();
        if self.trusted_sources.iter().any(|t| source.contains(t.as_str())) {
            score += TRUSTED_BONUS;
        }

        score
    }

    /// Sort descending by composite score (stable, ties keep their prior
    /// relative order) and truncate to `limit`.
    pub fn rank(&self, items: Vec<NewsItem>, limit: usize) -> Vec<NewsItem> {
        let now = Utc::now();
        let mut scored: Vec<(f64, NewsItem)> = items
            .into_iter()
            .map(|item| (self.composite_score(&item, now), item))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(limit).map(|(_, item)| item).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item(title: &str, source: &str, relevance: f64, age_hours: Option<i64>) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            original_link: format!("https://example.com/{}", title),
            source_name: source.to_string(),
            published: None,
            published_at: age_hours.map(|h| Utc::now() - Duration::hours(h)),
            feed_name: "Test Feed".to_string(),
            summary: String::new(),
            condensed_summary: String::new(),
            relevance_score: relevance,
        }
    }

    fn prioritizer() -> Prioritizer {
        Prioritizer::new(&["openai".to_string(), "deepmind".to_string()])
    }

    #[test]
    fn test_rank_orders_by_composite_descending() {
        let ranked = prioritizer().rank(
            vec![
                item("low", "Blog", 0.2, None),
                item("high", "Blog", 0.9, Some(1)),
                item("mid", "Blog", 0.5, None),
            ],
            10,
        );
        let titles: Vec<&str> = ranked.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["high", "mid", "low"]);

        let p = prioritizer();
        let now = Utc::now();
        for pair in ranked.windows(2) {
            assert!(p.composite_score(&pair[0], now) >= p.composite_score(&pair[1], now));
        }
    }

    #[test]
    fn test_rank_truncates_to_limit() {
        let items: Vec<NewsItem> = (0..10)
            .map(|i| item(&format!("item-{}", i), "Blog", 0.5, None))
            .collect();
        assert_eq!(prioritizer().rank(items, 3).len(), 3);
    }

    #[test]
    fn test_fresh_items_outrank_stale_ones() {
        let p = prioritizer();
        let now = Utc::now();
        let fresh = item("fresh", "Blog", 0.5, Some(2));
        let recent = item("recent", "Blog", 0.5, Some(48));
        let stale = item("stale", "Blog", 0.5, Some(200));

        let fresh_score = p.composite_score(&fresh, now);
        let recent_score = p.composite_score(&recent, now);
        let stale_score = p.composite_score(&stale, now);

        assert!(fresh_score > recent_score);
        assert!(recent_score > stale_score);
        // Stale items get relevance only.
        assert!((stale_score - 0.5 * 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_timestamp_gets_no_recency() {
        let p = prioritizer();
        let now = Utc::now();
        let undated = item("undated", "Blog", 0.5, None);
        assert!((p.composite_score(&undated, now) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_trusted_source_bonus() {
        let p = prioritizer();
        let now = Utc::now();
        let trusted = item("a", "OpenAI Blog", 0.5, None);
        let plain = item("b", "Random Blog", 0.5, None);
        assert!(
            (p.composite_score(&trusted, now) - p.composite_score(&plain, now) - 15.0).abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn test_stable_sort_preserves_tie_order() {
        let ranked = prioritizer().rank(
            vec![
                item("first", "Blog", 0.5, None),
                item("second", "Blog", 0.5, None),
            ],
            10,
        );
        assert_eq!(ranked[0].title, "first");
        assert_eq!(ranked[1].title, "second");
    }
}
