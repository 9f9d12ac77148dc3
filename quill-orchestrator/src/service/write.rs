//! Write stage
//!
//! Generates the article, places internal links, scores it against the SEO
//! terms (regenerating once below the threshold), post-processes the final
//! draft and stores the blog.

use quill_content::links::extract_internal_links;
use quill_content::text::character_count;
use quill_content::{PlacerOptions, apply_insertions, place_links, post_process, scoring};
use quill_core::domain::blog::NewBlog;
use quill_core::domain::job::Job;
use quill_core::domain::seo::SeoAnalysis;

use super::{StageContext, StageError, hard_timeout, soft_timeout};
use crate::provider::{Article, ArticleRequest, RetryHints};

/// A generated article with internal links applied
struct LinkedDraft {
    article: Article,
    content: String,
}

pub async fn run(ctx: &StageContext, job: &Job, seo_enabled: bool) -> Result<bool, StageError> {
    let brief = job
        .research_analyzed
        .as_deref()
        .filter(|brief| !brief.trim().is_empty())
        .ok_or_else(|| StageError::DataIntegrity(format!("job {} has no brief to write from", job.id)))?;

    let seo = job
        .seo_analysis
        .as_ref()
        .filter(|analysis| seo_enabled && !analysis.is_empty());

    let mut draft = linked_draft(ctx, job, brief, seo, None).await?;
    let mut internal_score = None;

    if let Some(analysis) = seo {
        let first = scoring::score(&draft.content, analysis);
        tracing::info!("Job {}: first draft scored {}", job.id, first.percentage);

        if first.percentage < ctx.config.score_threshold {
            let hints = RetryHints {
                previous_score: first.percentage,
                missing_terms: first.missing_terms,
            };
            tracing::info!(
                "Job {}: below threshold {}, regenerating with {} missing terms",
                job.id,
                ctx.config.score_threshold,
                hints.missing_terms.len()
            );

            draft = linked_draft(ctx, job, brief, seo, Some(&hints)).await?;
            let second = scoring::score(&draft.content, analysis);
            tracing::info!("Job {}: second draft scored {}", job.id, second.percentage);
            internal_score = Some(second.percentage);
        } else {
            internal_score = Some(first.percentage);
        }
    }

    let processed = post_process(&draft.content, &ctx.catalog);
    if processed.removed_duplicate_links > 0 || processed.softened_phrases > 0 {
        tracing::debug!(
            "Job {}: unlinked {} duplicate links, softened {} phrases",
            job.id,
            processed.removed_duplicate_links,
            processed.softened_phrases
        );
    }
    if processed.brand.passed() {
        tracing::debug!("Job {}: brand keywords present", job.id);
    } else {
        for check in processed.brand.failures() {
            tracing::warn!(
                "Job {}: brand phrase '{}' found {} times, expected at least {}",
                job.id,
                check.phrase,
                check.found,
                check.required
            );
        }
    }

    let official = match seo {
        Some(analysis) => official_score(ctx, analysis, &draft.article, &processed.content).await,
        None => None,
    };
    let seo_score = official.or(internal_score).map(|score| score.min(100) as i32);

    let blog = NewBlog {
        keyword: job.keyword.clone(),
        title: draft.article.title,
        meta_description: draft.article.meta_description,
        word_count: character_count(&processed.content) as i32,
        internal_links: extract_internal_links(&processed.content, &ctx.catalog),
        content: processed.content,
        seo_score,
    };

    Ok(ctx.store.complete_write(job.id, job.lease_expires_at, &blog).await?)
}

/// Generate an article and apply internal links to it
async fn linked_draft(
    ctx: &StageContext,
    job: &Job,
    brief: &str,
    seo: Option<&SeoAnalysis>,
    retry: Option<&RetryHints>,
) -> Result<LinkedDraft, StageError> {
    let request = ArticleRequest {
        keyword: &job.keyword,
        brief,
        seo,
        retry,
    };
    let article = generate(ctx, request).await?;

    let options = PlacerOptions {
        max_links: ctx.config.max_links,
        min_paragraph_chars: ctx.config.min_paragraph_chars,
        spacing: ctx.config.link_spacing,
    };
    let insertions = place_links(&article.content, &ctx.catalog, &options);
    tracing::debug!("Job {}: placing {} internal links", job.id, insertions.len());
    let content = apply_insertions(&article.content, &insertions);

    Ok(LinkedDraft { article, content })
}

/// Call the writer, retrying schema-invalid output a bounded number of times
async fn generate(ctx: &StageContext, request: ArticleRequest<'_>) -> Result<Article, StageError> {
    let mut retries = 0;
    loop {
        let result = hard_timeout(
            "article generation",
            ctx.config.writing_timeout,
            ctx.providers.writer.generate_article(request),
        )
        .await;

        match result {
            Err(StageError::Provider(err))
                if err.is_retryable() && retries < ctx.config.invalid_output_retries =>
            {
                retries += 1;
                tracing::warn!(
                    "Writer output rejected for '{}' ({}), retry {}",
                    request.keyword,
                    err,
                    retries
                );
            }
            other => return other,
        }
    }
}

/// Ask the SEO provider for its own score of the final article
async fn official_score(
    ctx: &StageContext,
    analysis: &SeoAnalysis,
    article: &Article,
    content: &str,
) -> Option<u32> {
    let provider = ctx.providers.seo.as_ref()?;
    let handle = analysis.provider_handle.as_deref()?;
    let html = render_html(content);

    soft_timeout(
        "official SEO score",
        ctx.config.official_score_timeout,
        provider.import_for_official_score(handle, &article.title, &article.meta_description, &html),
    )
    .await
    .flatten()
}

fn render_html(markdown: &str) -> String {
    let parser = pulldown_cmark::Parser::new(markdown);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}
