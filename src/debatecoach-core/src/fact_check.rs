//! Two-stage fact checking: web-grounded search, then groundedness scoring.
//!
//! Neither stage can fail the check. Missing services and call failures are
//! reported through [`FactCheckResult::error`] and the explanation text.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::classifier::TextClassifier;
use crate::config::{Config, FactCheckConfig, RETRIEVAL_KEY_VAR, fill};
use crate::error::ServiceError;
use crate::services::{GroundednessService, RetrievalService, Services};

/// Confidence tier assigned to a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Supported,
    Partial,
    Unsupported,
    /// No keyword matched; treated as weakly grounded.
    Unknown,
    /// The check could not run.
    Unverified,
}

/// Display status derived from confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FactCheckStatus {
    Verified,
    PartiallyVerified,
    Failed,
}

impl FactCheckStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FactCheckStatus::Verified => "검증됨",
            FactCheckStatus::PartiallyVerified => "부분적으로 검증됨",
            FactCheckStatus::Failed => "검증 실패",
        }
    }
}

/// What to verify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactCheckRequest {
    pub claim: String,
    pub source_hint: String,
}

impl FactCheckRequest {
    pub fn new(claim: impl Into<String>, source_hint: impl Into<String>) -> Self {
        Self {
            claim: claim.into(),
            source_hint: source_hint.into(),
        }
    }

    /// Derive a request from a raw submission.
    ///
    /// The first cited source becomes the hint and the text after the first
    /// citation marker becomes the claim; without a marker the whole
    /// submission is the claim.
    pub fn from_submission(text: &str, classifier: &TextClassifier) -> Self {
        let source_hint = classifier
            .extract_sources(text)
            .into_iter()
            .next()
            .unwrap_or_default();
        let claim = classifier
            .cited_claim(text)
            .unwrap_or_else(|| text.trim().to_string());

        Self { claim, source_hint }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactCheckResult {
    pub claim: String,
    pub is_grounded: bool,
    pub confidence: f64,
    pub verdict: Verdict,
    pub search_summary: String,
    /// Verdict text, search summary, or an explanation of what went wrong.
    pub explanation: String,
    pub sources: Vec<String>,
    pub error: Option<ServiceError>,
}

impl FactCheckResult {
    fn unverified(claim: &str, explanation: String, error: ServiceError) -> Self {
        Self {
            claim: claim.to_string(),
            is_grounded: false,
            confidence: 0.0,
            verdict: Verdict::Unverified,
            search_summary: String::new(),
            explanation,
            sources: Vec::new(),
            error: Some(error),
        }
    }

    pub fn status(&self) -> FactCheckStatus {
        if self.confidence >= 0.7 {
            FactCheckStatus::Verified
        } else if self.confidence >= 0.4 {
            FactCheckStatus::PartiallyVerified
        } else {
            FactCheckStatus::Failed
        }
    }

    /// Whether the student should be nudged toward better sources.
    pub fn needs_better_source(&self) -> bool {
        self.confidence < 0.7
    }
}

/// Outcome of keyword grading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub verdict: Verdict,
    pub confidence: f64,
    pub is_grounded: bool,
}

impl Assessment {
    fn new(verdict: Verdict, confidence: f64, is_grounded: bool) -> Self {
        Self {
            verdict,
            confidence,
            is_grounded,
        }
    }
}

pub struct FactChecker {
    config: FactCheckConfig,
    query_template: String,
    retrieval: Option<Arc<dyn RetrievalService>>,
    groundedness: Option<Arc<dyn GroundednessService>>,
}

impl FactChecker {
    pub fn new(config: &Config, services: &Services) -> Self {
        Self {
            config: config.fact_check.clone(),
            query_template: config.prompts.fact_check_user.clone(),
            retrieval: services.retrieval.clone(),
            groundedness: services.groundedness.clone(),
        }
    }

    pub async fn check(&self, request: &FactCheckRequest) -> FactCheckResult {
        let claim = request.claim.as_str();

        let Some(retrieval) = &self.retrieval else {
            warn!("fact check requested without a retrieval service");
            return FactCheckResult::unverified(
                claim,
                format!("웹 검색 서비스가 설정되지 않았습니다 ({}).", RETRIEVAL_KEY_VAR),
                ServiceError::NotConfigured(RETRIEVAL_KEY_VAR.to_string()),
            );
        };

        let source = if request.source_hint.trim().is_empty() {
            "명시되지 않음"
        } else {
            request.source_hint.as_str()
        };
        let query = fill(&self.query_template, &[("source", source), ("claim", claim)]);

        let summary = match retrieval.search(&query).await {
            Ok(summary) => summary,
            Err(err) => {
                warn!(service = retrieval.name(), error = %err, "retrieval failed");
                return FactCheckResult::unverified(
                    claim,
                    format!("팩트체크 중 오류가 발생했습니다: {}", err),
                    err,
                );
            }
        };

        let (assessment, explanation, error) = match &self.groundedness {
            Some(groundedness) => match groundedness.score(&summary, claim).await {
                Ok(verdict_text) => (self.grade_groundedness(&verdict_text), verdict_text, None),
                Err(err) => {
                    warn!(service = groundedness.name(), error = %err, "groundedness scoring failed");
                    (
                        Assessment::new(Verdict::Unverified, 0.0, false),
                        format!("Groundedness 검증 오류: {}", err),
                        Some(err),
                    )
                }
            },
            None => (self.grade_summary(&summary), summary.clone(), None),
        };

        let sources = extract_urls(&summary, self.config.max_sources);
        debug!(
            verdict = ?assessment.verdict,
            confidence = assessment.confidence,
            sources = sources.len(),
            "fact check finished"
        );

        FactCheckResult {
            claim: claim.to_string(),
            is_grounded: assessment.is_grounded,
            confidence: assessment.confidence,
            verdict: assessment.verdict,
            search_summary: summary,
            explanation,
            sources,
            error,
        }
    }

    /// Four-tier grading of a groundedness verdict.
    ///
    /// Negative keywords are checked first so that "not grounded" or
    /// "unsupported" never count as their positive substrings.
    pub fn grade_groundedness(&self, verdict: &str) -> Assessment {
        let text = verdict.to_lowercase();
        if contains_any(&text, &self.config.unsupported_keywords) {
            Assessment::new(Verdict::Unsupported, 0.1, false)
        } else if contains_any(&text, &self.config.partial_keywords) {
            Assessment::new(Verdict::Partial, 0.5, true)
        } else if contains_any(&text, &self.config.supported_keywords) {
            Assessment::new(Verdict::Supported, 0.85, true)
        } else {
            Assessment::new(Verdict::Unknown, 0.3, true)
        }
    }

    /// Three-tier grading of the search summary itself.
    pub fn grade_summary(&self, summary: &str) -> Assessment {
        let text = summary.to_lowercase();
        if contains_any(&text, &self.config.summary_false_keywords) {
            Assessment::new(Verdict::Unsupported, 0.1, false)
        } else if contains_any(&text, &self.config.summary_true_keywords) {
            Assessment::new(Verdict::Supported, 0.7, true)
        } else {
            Assessment::new(Verdict::Unknown, 0.4, true)
        }
    }
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|k| !k.is_empty() && text.contains(&k.to_lowercase()))
}

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>()\[\]"']+"#).expect("valid URL pattern"));

/// URL-shaped substrings of `text`, first `limit` in order of appearance.
pub fn extract_urls(text: &str, limit: usize) -> Vec<String> {
    URL.find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']))
        .filter(|url| !url.is_empty())
        .take(limit)
        .map(str::to_string)
        .collect()
}
