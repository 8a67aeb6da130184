//! Keyword-based relevance scoring.
//!
//! Matching is substring-based rather than token-based, so "ai" also hits
//! inside longer words. That over-matching is inherited behavior and is
//! kept as-is; the weight constants below are likewise preserved exactly.

const TITLE_MATCH_WEIGHT: f64 = 0.2;
const TITLE_MAX_CONTRIBUTION: f64 = 0.6;
const BODY_MATCH_WEIGHT: f64 = 0.1;
const BODY_MAX_CONTRIBUTION: f64 = 0.4;
const INCLUSION_THRESHOLD: f64 = 0.1;
const MIN_BODY_CHARS: usize = 100;

pub struct RelevanceScorer {
    keywords: Vec<String>,
    excludes: Vec<String>,
}

impl RelevanceScorer {
    pub fn new(keywords: &[String], excludes: &[String]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            excludes: excludes.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Score a title (plus optional body) for topical relevance.
    ///
    /// An exclusion keyword in the title is absolute: the result is
    /// `(false, 0.0)` no matter what else matches.
    pub fn score(&self, title: &str, body: Option<&str>) -> (bool, f64) {
        if title.is_empty() {
            return (false, 0.0);
        }

        let title_lower = title.to_lowercase();
        if self.excludes.iter().any(|kw| title_lower.contains(kw.as_str())) {
            return (false, 0.0);
        }

        let mut score = 0.0;

        let title_matches = self.count_matches(&title_lower);
        if title_matches > 0 {
            score += TITLE_MAX_CONTRIBUTION.min(title_matches as f64 * TITLE_MATCH_WEIGHT);
        }

        if let Some(body) = body {
            if body.chars().count() > MIN_BODY_CHARS {
                let body_matches = self.count_matches(&body.to_lowercase());
                if body_matches > 0 {
                    score += BODY_MAX_CONTRIBUTION.min(body_matches as f64 * BODY_MATCH_WEIGHT);
                }
            }
        }

        (score > INCLUSION_THRESHOLD, score.min(1.0))
    }

    fn count_matches(&self, haystack: &str) -> usize {
        self.keywords
            .iter()
            .filter(|kw| haystack.contains(kw.as_str()))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn scorer() -> RelevanceScorer {
        let config = Config::default();
        RelevanceScorer::new(&config.ai_keywords, &config.exclude_keywords)
    }

    #[test]
    fn test_exclusion_short_circuits() {
        let (included, score) = scorer().score("Webinar: Register now for our AI summit", None);
        assert!(!included);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_exclusion_is_case_insensitive() {
        let (included, score) = scorer().score("SPONSORED: GPT news roundup", None);
        assert!(!included);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_keyword_title_scores() {
        // "llm" and "gpt" both match; substring matching also finds "ai"
        // inside other words, so at minimum two distinct keywords hit.
        let (included, score) = scorer().score("New LLM model beats GPT-4 benchmark", None);
        assert!(included);
        assert!(score >= 0.4);
        assert!(score <= 0.6);
    }

    #[test]
    fn test_title_contribution_is_capped() {
        let (included, score) = scorer().score(
            "AI machine learning deep learning neural network LLM GPT transformer",
            None,
        );
        assert!(included);
        assert!(score <= 0.6);
    }

    #[test]
    fn test_body_adds_score() {
        let title = "New LLM model announced";
        let body = "The transformer model uses retrieval augmented generation and a new \
                    embedding scheme to improve inference speed across benchmarks.";
        let (_, title_only) = scorer().score(title, None);
        let (included, with_body) = scorer().score(title, Some(body));
        assert!(included);
        assert!(with_body > title_only);
        assert!(with_body <= 1.0);
    }

    #[test]
    fn test_short_body_is_ignored() {
        let title = "New LLM model announced";
        let (_, title_only) = scorer().score(title, None);
        let (_, with_short_body) = scorer().score(title, Some("gpt llm ai"));
        assert_eq!(title_only, with_short_body);
    }

    #[test]
    fn test_short_non_ascii_body_is_ignored() {
        // 40 characters but well over 100 bytes; the gate counts characters.
        let title = "New LLM model announced";
        let body = "새로운 LLM 모델이 공개되었고 GPT 계열 모델과의 벤치마크 비교 결과가 공유되었다";
        let (_, title_only) = scorer().score(title, None);
        let (_, with_short_body) = scorer().score(title, Some(body));
        assert_eq!(title_only, with_short_body);
    }

    #[test]
    fn test_unrelated_title_is_excluded() {
        let (included, score) = scorer().score("Quarterly results for the steel industry", None);
        assert!(!included);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_empty_title() {
        assert_eq!(scorer().score("", None), (false, 0.0));
    }
}
