//! Prompt builders for the LLM-backed collaborators
//!
//! Each prompt opens with a task tag line; the fake provider keys its canned
//! responses on those tags.

use quill_core::domain::seo::SeoAnalysis;

use super::RetryHints;

pub const RESEARCH_MARKER: &str = "task: research-findings";
pub const SYNTHESIS_MARKER: &str = "task: research-brief";
pub const ARTICLE_MARKER: &str = "task: article-json";

const MAX_PROMPT_TERMS: usize = 40;
const MAX_PROMPT_HEADINGS: usize = 15;

pub fn research_prompt(keyword: &str) -> String {
    format!(
        "{RESEARCH_MARKER}\n\
         You are researching a Japanese personal-finance blog article.\n\
         Keyword: {keyword}\n\n\
         List the current facts, statistics, common reader questions and \
         practical advice relevant to this keyword. Plain bullet points, no \
         introduction."
    )
}

pub fn synthesis_prompt(keyword: &str, research_raw: &str) -> String {
    format!(
        "{SYNTHESIS_MARKER}\n\
         Turn the research notes below into a writing brief for an article on \
         \"{keyword}\". Describe the target reader, the main points in order, \
         and the facts worth citing.\n\n\
         Research notes:\n{research_raw}"
    )
}

pub fn article_prompt(
    keyword: &str,
    brief: &str,
    seo: Option<&SeoAnalysis>,
    retry: Option<&RetryHints>,
) -> String {
    let mut prompt = format!(
        "{ARTICLE_MARKER}\n\
         Write a Japanese blog article for Habitto on \"{keyword}\".\n\
         Mention Habitto naturally at least twice and recommend talking to a \
         ファイナンシャルアドバイザー where it fits. Keep the tone calm and \
         helpful, never pushy. Use markdown headings and separate paragraphs \
         with blank lines. Do not add links.\n\n\
         Brief:\n{brief}\n"
    );

    if let Some(seo) = seo {
        if !seo.terms.is_empty() {
            let terms: Vec<&str> = seo
                .terms
                .iter()
                .take(MAX_PROMPT_TERMS)
                .map(String::as_str)
                .collect();
            prompt.push_str(&format!(
                "\nUse these terms, most important first: {}\n",
                terms.join(", ")
            ));
        }
        if let Some(target) = seo.target_word_count {
            prompt.push_str(&format!("\nAim for about {} characters.\n", target));
        }
        if !seo.competitor_headings.is_empty() {
            prompt.push_str("\nCompetitor headings for reference:\n");
            for heading in seo.competitor_headings.iter().take(MAX_PROMPT_HEADINGS) {
                prompt.push_str(&format!("- {}\n", heading));
            }
        }
    }

    if let Some(retry) = retry {
        prompt.push_str(&format!(
            "\nThe previous draft scored {}/100 for SEO. Work in these missing terms: {}\n",
            retry.previous_score,
            retry.missing_terms.join(", ")
        ));
    }

    prompt.push_str(
        "\nRespond with only a JSON object with the string fields \
         \"title\", \"meta_description\" and \"content\" (markdown).",
    );

    prompt
}
