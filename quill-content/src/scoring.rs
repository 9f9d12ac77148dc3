//! SEO scorer
//!
//! Scores article text against a ranked term list. Terms are split into
//! three tiers by rank:
//!
//! | Tier | Ranks | Points per term | Full credit | Weight |
//! |------|-------|-----------------|-------------|--------|
//! | critical | 1-10 | 3 | 3+ occurrences | 50 |
//! | important | 11-25 | 2 | 2+ occurrences | 30 |
//! | supporting | 26+ | 1 | present | 20 |
//!
//! A tier with no terms contributes its full weight. The supporting tier is
//! only scored once it holds `SUPPORTING_MIN_TERMS` terms; a short tail of
//! low-ranked terms is treated as empty so its absence never costs points.
//!
//! The cost of that cut-off: a list of 26 to 34 terms always earns the full
//! 20 supporting points, even when none of its tail terms appear. A list of
//! 35 or more is scored on every supporting term, so the same draft can lose
//! up to 20 points when the provider returns one more term.

use quill_core::domain::seo::SeoAnalysis;
use serde::Serialize;

use crate::text::count_occurrences;

pub const CRITICAL_TERMS: usize = 10;
pub const IMPORTANT_TERMS: usize = 15;
pub const SUPPORTING_MIN_TERMS: usize = 10;

const CRITICAL_WEIGHT: u32 = 50;
const IMPORTANT_WEIGHT: u32 = 30;
const SUPPORTING_WEIGHT: u32 = 20;

const CRITICAL_FULL_CREDIT: usize = 3;
const IMPORTANT_FULL_CREDIT: usize = 2;
const MAX_MISSING_IMPORTANT: usize = 5;

/// Result of scoring one draft
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeoScore {
    /// Overall score, 0-100
    pub percentage: u32,
    pub critical: TierScore,
    pub important: TierScore,
    pub supporting: TierScore,
    /// Critical terms never used, then up to five unused important terms
    pub missing_terms: Vec<String>,
}

/// Points earned inside one tier and what they contribute to the total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierScore {
    pub earned: u32,
    pub possible: u32,
    pub weight: u32,
    pub contribution: f64,
}

impl TierScore {
    fn new(earned: u32, possible: u32, weight: u32) -> Self {
        let contribution = if possible == 0 {
            f64::from(weight)
        } else {
            f64::from(earned * weight) / f64::from(possible)
        };
        Self {
            earned,
            possible,
            weight,
            contribution,
        }
    }

    fn full(weight: u32) -> Self {
        Self::new(0, 0, weight)
    }
}

/// Score `content` against the analysis' ranked term list
pub fn score(content: &str, analysis: &SeoAnalysis) -> SeoScore {
    let terms: Vec<&str> = analysis
        .terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();

    let critical_end = terms.len().min(CRITICAL_TERMS);
    let important_end = terms.len().min(CRITICAL_TERMS + IMPORTANT_TERMS);
    let critical_terms = &terms[..critical_end];
    let important_terms = &terms[critical_end..important_end];
    let supporting_terms = &terms[important_end..];

    let mut missing_terms = Vec::new();

    let mut earned = 0;
    for term in critical_terms {
        let count = count_occurrences(content, term);
        if count == 0 {
            missing_terms.push(term.to_string());
        }
        earned += count.min(CRITICAL_FULL_CREDIT) as u32;
    }
    let critical = TierScore::new(
        earned,
        (critical_terms.len() * CRITICAL_FULL_CREDIT) as u32,
        CRITICAL_WEIGHT,
    );

    let mut earned = 0;
    let mut missing_important = 0;
    for term in important_terms {
        let count = count_occurrences(content, term);
        if count == 0 && missing_important < MAX_MISSING_IMPORTANT {
            missing_terms.push(term.to_string());
            missing_important += 1;
        }
        earned += count.min(IMPORTANT_FULL_CREDIT) as u32;
    }
    let important = TierScore::new(
        earned,
        (important_terms.len() * IMPORTANT_FULL_CREDIT) as u32,
        IMPORTANT_WEIGHT,
    );

    let supporting = if supporting_terms.len() < SUPPORTING_MIN_TERMS {
        TierScore::full(SUPPORTING_WEIGHT)
    } else {
        let earned = supporting_terms
            .iter()
            .filter(|term| count_occurrences(content, term) > 0)
            .count() as u32;
        TierScore::new(earned, supporting_terms.len() as u32, SUPPORTING_WEIGHT)
    };

    let total = critical.contribution + important.contribution + supporting.contribution;
    let percentage = total.round().clamp(0.0, 100.0) as u32;

    SeoScore {
        percentage,
        critical,
        important,
        supporting,
        missing_terms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}{i:02}x")).collect()
    }

    fn analysis(critical: usize, important: usize, supporting: usize) -> SeoAnalysis {
        let mut all = terms("crit", critical);
        all.extend(terms("imp", important));
        all.extend(terms("sup", supporting));
        SeoAnalysis::new(all)
    }

    fn repeat_terms(list: &[String], times: usize) -> String {
        list.iter()
            .map(|t| vec![t.as_str(); times].join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_all_critical_only_scores_seventy() {
        let analysis = analysis(10, 15, 5);
        let content = repeat_terms(&analysis.terms[..10], 3);

        let result = score(&content, &analysis);

        assert_eq!(result.critical.contribution, 50.0);
        assert_eq!(result.important.contribution, 0.0);
        assert_eq!(result.supporting.contribution, 20.0);
        assert_eq!(result.percentage, 70);
    }

    #[test]
    fn test_score_is_deterministic() {
        let analysis = analysis(10, 15, 12);
        let content = repeat_terms(&analysis.terms[3..20], 1);
        assert_eq!(score(&content, &analysis), score(&content, &analysis));
    }

    #[test]
    fn test_empty_term_list_scores_full() {
        let result = score("anything", &SeoAnalysis::new(Vec::new()));
        assert_eq!(result.percentage, 100);
        assert!(result.missing_terms.is_empty());
    }

    #[test]
    fn test_partial_credit_for_critical_terms() {
        let analysis = analysis(1, 0, 0);
        let term = &analysis.terms[0];

        assert_eq!(score(&format!("{term}"), &analysis).critical.earned, 1);
        assert_eq!(score(&format!("{term} {term}"), &analysis).critical.earned, 2);
        assert_eq!(
            score(&format!("{term} {term} {term} {term}"), &analysis)
                .critical
                .earned,
            3
        );
    }

    #[test]
    fn test_important_full_credit_at_two() {
        let analysis = analysis(10, 15, 0);
        let content = format!("{0} {0}", analysis.terms[10]);
        let result = score(&content, &analysis);
        assert_eq!(result.important.earned, 2);
        assert_eq!(result.important.possible, 30);
    }

    #[test]
    fn test_missing_terms_lists_critical_then_five_important() {
        let analysis = analysis(10, 15, 0);
        let content = repeat_terms(&analysis.terms[..8], 3);

        let result = score(&content, &analysis);

        assert_eq!(
            result.missing_terms,
            vec![
                "crit08x", "crit09x", "imp00x", "imp01x", "imp02x", "imp03x", "imp04x"
            ]
        );
    }

    #[test]
    fn test_supporting_tier_scored_when_large_enough() {
        let analysis = analysis(10, 15, 10);
        let mut content = repeat_terms(&analysis.terms[..25], 3);
        content.push_str(&repeat_terms(&analysis.terms[25..30], 1));

        let result = score(&content, &analysis);

        assert_eq!(result.supporting.earned, 5);
        assert_eq!(result.supporting.contribution, 10.0);
        assert_eq!(result.percentage, 90);
    }

    #[test]
    fn test_short_supporting_tail_counts_as_full() {
        let content = repeat_terms(&terms("crit", 10), 3);

        let short = score(&content, &analysis(10, 15, SUPPORTING_MIN_TERMS - 1));
        assert_eq!(short.supporting.contribution, 20.0);
        assert_eq!(short.supporting.possible, 0);

        let long = score(&content, &analysis(10, 15, SUPPORTING_MIN_TERMS));
        assert_eq!(long.supporting.contribution, 0.0);
        assert_eq!(long.supporting.possible, SUPPORTING_MIN_TERMS as u32);
        assert_eq!(short.percentage - long.percentage, 20);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let analysis = SeoAnalysis::new(vec!["NISA".to_string()]);
        let result = score("nisa Nisa NISA", &analysis);
        assert_eq!(result.percentage, 100);
    }
}
