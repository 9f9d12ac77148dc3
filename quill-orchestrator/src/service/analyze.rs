//! Analyze stage
//!
//! Synthesizes the research into a brief while fetching SEO data. The brief
//! is mandatory (hard timeout); SEO data is optional (soft timeout).

use quill_core::domain::job::Job;
use quill_core::domain::seo::SeoAnalysis;

use super::{StageContext, StageError, hard_timeout, soft_timeout};

pub async fn run(ctx: &StageContext, job: &Job, seo_enabled: bool) -> Result<bool, StageError> {
    let research_raw = job
        .research_raw
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| {
            StageError::DataIntegrity(format!("job {} has no research to analyze", job.id))
        })?;

    let synthesis = hard_timeout(
        "research synthesis",
        ctx.config.synthesis_timeout,
        ctx.providers
            .research
            .synthesize_research(&job.keyword, research_raw),
    );
    let seo = seo_analysis(ctx, job, seo_enabled);

    let (brief, seo) = tokio::join!(synthesis, seo);
    let brief = brief?;

    Ok(ctx
        .store
        .complete_analysis(job.id, job.lease_expires_at, &brief, seo.as_ref())
        .await?)
}

/// SEO data for the job: from the job itself on resume, else the keyword
/// cache, else the provider
async fn seo_analysis(ctx: &StageContext, job: &Job, seo_enabled: bool) -> Option<SeoAnalysis> {
    if !seo_enabled {
        return None;
    }
    if let Some(existing) = job.seo_analysis.clone() {
        return Some(existing);
    }
    let Some(provider) = ctx.providers.seo.as_ref() else {
        tracing::debug!("No SEO provider, skipping analysis for '{}'", job.keyword);
        return None;
    };

    match ctx.store.get_seo_analysis(&job.keyword).await {
        Ok(Some(cached)) if !cached.is_empty() => {
            tracing::debug!("Using cached SEO analysis for '{}'", job.keyword);
            return Some(cached);
        }
        Ok(_) => {}
        Err(err) => tracing::warn!("SEO cache lookup failed for '{}': {}", job.keyword, err),
    }

    let analysis = soft_timeout(
        "SEO analysis",
        ctx.config.seo_timeout,
        provider.fetch_analysis(&job.keyword),
    )
    .await?;

    if analysis.is_empty() {
        tracing::warn!("SEO analysis for '{}' returned no terms", job.keyword);
        return None;
    }

    if let Err(err) = ctx.store.put_seo_analysis(&job.keyword, &analysis).await {
        tracing::warn!("Failed to cache SEO analysis for '{}': {}", job.keyword, err);
    }

    Some(analysis)
}
