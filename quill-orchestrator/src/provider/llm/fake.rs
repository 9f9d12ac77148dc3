//! Fake LLM provider
//!
//! Returns deterministic responses picked by prompt substring, so the whole
//! pipeline can run without network access.

use async_trait::async_trait;
use std::sync::RwLock;

use super::LlmProvider;
use crate::provider::ProviderError;

/// Responses are matched in registration order; the first pattern found in
/// the prompt (case-insensitive) wins.
#[derive(Debug, Default)]
pub struct FakeProvider {
    responses: RwLock<Vec<(String, String)>>,
    default_response: Option<String>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let provider = Self::new();
        provider.add_response(prompt_contains, response);
        provider
    }

    pub fn add_response(&self, prompt_contains: &str, response: &str) {
        if let Ok(mut responses) = self.responses.write() {
            responses.push((prompt_contains.to_lowercase(), response.to_string()));
        }
    }

    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    /// Canned responses for every pipeline prompt
    pub fn with_pipeline_responses() -> Self {
        let provider = Self::new();

        provider.add_response(
            crate::provider::prompts::RESEARCH_MARKER,
            "- 20代の平均貯金額は年々増加傾向にある\n\
             - 先取り貯金と固定費の見直しが定番の方法\n\
             - 新NISAによる積立投資への関心が高い",
        );

        provider.add_response(
            crate::provider::prompts::SYNTHESIS_MARKER,
            "## 読者像\n貯金を始めたい20代の会社員\n\n\
             ## 要点\n1. 先取り貯金を仕組み化する\n2. 固定費を見直す\n3. 新NISAで積立投資を始める",
        );

        provider.add_response(
            crate::provider::prompts::ARTICLE_MARKER,
            r##"{
  "title": "20代の貯金術: 無理なく続けるための基本",
  "meta_description": "20代から始める貯金の基本を、先取り貯金と固定費の見直しを中心に解説します。",
  "content": "# 20代の貯金術\n\n20代のうちに貯金の習慣を身につけると、将来の選択肢が大きく広がります。Habittoではその第一歩を応援しています。\n\n## 先取り貯金を仕組みにする\n\n給料が入ったらすぐに決まった額を普通預金とは別の口座へ移す先取り貯金は、意志の力に頼らずに続けられる方法です。\n\n## 固定費を見直す\n\n通信費や保険料などの固定費は一度見直すだけで毎月の支出を下げられます。家計管理の基本として取り組みましょう。\n\n## 専門家に相談する\n\n迷ったときはファイナンシャルアドバイザーに相談すると、自分に合った貯金のペースが見えてきます。Habittoのアドバイザーは無料で相談できます。"
}"##,
        );

        provider
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let prompt_lower = prompt.to_lowercase();

        if let Ok(responses) = self.responses.read() {
            if let Some((_, response)) = responses
                .iter()
                .find(|(pattern, _)| prompt_lower.contains(pattern.as_str()))
            {
                return Ok(response.clone());
            }
        }

        match &self.default_response {
            Some(response) => Ok(response.clone()),
            None => Err(ProviderError::RequestFailed(format!(
                "FakeProvider: no response configured for prompt: {}",
                prompt.chars().take(100).collect::<String>()
            ))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}
