//! Coaching feedback for a classified submission.
//!
//! Feedback comes either from canned template pools or from a generation
//! model. Both paths always yield displayable text; failures are recorded in
//! [`FeedbackOrigin::Degraded`] instead of being returned as errors.

use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::{debug, warn};

use crate::classifier::ArgumentStructure;
use crate::config::{
    Config, FeedbackConfig, FeedbackStrategy, GENERATION_KEY_VAR, TemplateEntry, fill,
};
use crate::error::ServiceError;
use crate::participant::Position;
use crate::services::{ChatMessage, TextGenerationService};

const LAST_RESORT_FEEDBACK: &str = "논증을 잘 작성했습니다. 주장, 근거, 보강자료를 계속 다듬어 보세요.";

/// Where a piece of feedback came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "error", rename_all = "snake_case")]
pub enum FeedbackOrigin {
    Template,
    Model,
    /// The model path failed; the text explains why.
    Degraded(ServiceError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub text: String,
    pub origin: FeedbackOrigin,
}

impl Feedback {
    pub fn is_degraded(&self) -> bool {
        matches!(self.origin, FeedbackOrigin::Degraded(_))
    }
}

/// Session context passed to the model strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoachingContext<'a> {
    pub text: &'a str,
    pub position: Option<Position>,
    pub topic: Option<&'a str>,
}

pub struct FeedbackSelector {
    config: FeedbackConfig,
    system_prompt: String,
    user_template: String,
    generation: Option<Arc<dyn TextGenerationService>>,
}

impl FeedbackSelector {
    pub fn new(config: &Config, generation: Option<Arc<dyn TextGenerationService>>) -> Self {
        Self {
            config: config.feedback.clone(),
            system_prompt: config.prompts.coach_system.clone(),
            user_template: config.prompts.coach_user.clone(),
            generation,
        }
    }

    /// The strategy in effect after resolving `auto`.
    pub fn strategy(&self) -> FeedbackStrategy {
        match self.config.strategy {
            FeedbackStrategy::Auto if self.generation.is_some() => FeedbackStrategy::Model,
            FeedbackStrategy::Auto => FeedbackStrategy::Template,
            other => other,
        }
    }

    pub async fn feedback<R: Rng + ?Sized>(
        &self,
        structure: &ArgumentStructure,
        context: CoachingContext<'_>,
        rng: &mut R,
    ) -> Feedback {
        match self.strategy() {
            FeedbackStrategy::Model => self.model_feedback(structure, context).await,
            _ => self.template_feedback(structure, rng),
        }
    }

    /// Pick uniformly from the first template pool matching the structure.
    pub fn template_feedback<R: Rng + ?Sized>(
        &self,
        structure: &ArgumentStructure,
        rng: &mut R,
    ) -> Feedback {
        let pool = self
            .config
            .templates
            .iter()
            .find(|entry| entry_matches(entry, structure) && !entry.messages.is_empty())
            .map(|entry| entry.messages.as_slice())
            .unwrap_or(self.config.generic.as_slice());

        let text = pool
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| LAST_RESORT_FEEDBACK.to_string());

        Feedback {
            text,
            origin: FeedbackOrigin::Template,
        }
    }

    /// Ask the generation service for coaching. A single attempt, no retry.
    pub async fn model_feedback(
        &self,
        structure: &ArgumentStructure,
        context: CoachingContext<'_>,
    ) -> Feedback {
        let Some(generation) = &self.generation else {
            warn!("model feedback requested without a generation service");
            return degraded(ServiceError::NotConfigured(GENERATION_KEY_VAR.to_string()));
        };

        let prompt = self.user_prompt(structure, context);
        let history = [ChatMessage::user(prompt)];

        match generation
            .generate(
                &self.system_prompt,
                &history,
                self.config.max_tokens,
                self.config.temperature,
            )
            .await
        {
            Ok(text) => {
                debug!(service = generation.name(), "model feedback generated");
                Feedback {
                    text,
                    origin: FeedbackOrigin::Model,
                }
            }
            Err(err) => {
                warn!(error = %err, "feedback generation failed");
                degraded(err)
            }
        }
    }

    /// The user prompt sent to the model: submission plus structure summary.
    pub fn user_prompt(&self, structure: &ArgumentStructure, context: CoachingContext<'_>) -> String {
        let sources = if structure.sources.is_empty() {
            "없음".to_string()
        } else {
            structure.sources.join(", ")
        };

        fill(
            &self.user_template,
            &[
                ("position", context.position.map(|p| p.label()).unwrap_or("미정")),
                ("topic", context.topic.unwrap_or("미정")),
                ("text", context.text),
                ("section", structure.section_type.label()),
                ("has_claim", yes_no(structure.has_claim)),
                ("has_evidence", yes_no(structure.has_evidence)),
                ("has_reinforcement", yes_no(structure.has_reinforcement)),
                ("evidence_count", structure.evidence_count.to_string().as_str()),
                ("sources", sources.as_str()),
            ],
        )
    }
}

fn entry_matches(entry: &TemplateEntry, structure: &ArgumentStructure) -> bool {
    entry.section.is_none_or(|s| s == structure.section_type)
        && entry.evidence.is_none_or(|b| b == structure.evidence_bucket())
        && entry.has_sources.is_none_or(|h| h == structure.has_sources())
}

fn degraded(error: ServiceError) -> Feedback {
    let text = match &error {
        ServiceError::NotConfigured(what) => {
            format!("코칭 모델이 설정되지 않았습니다 ({}).", what)
        }
        other => format!("피드백 생성 중 오류가 발생했습니다: {}", other),
    };
    Feedback {
        text,
        origin: FeedbackOrigin::Degraded(error),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "예" } else { "아니오" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::SectionType;
    use crate::config::default_config;
    use crate::mock::ScriptedGeneration;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn body(evidence_count: u8, sources: &[&str]) -> ArgumentStructure {
        ArgumentStructure {
            section_type: SectionType::Body,
            has_evidence: true,
            evidence_count,
            has_reinforcement: !sources.is_empty(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
            ..ArgumentStructure::default()
        }
    }

    #[test]
    fn test_template_pool_keyed_by_structure() {
        let config = default_config();
        let selector = FeedbackSelector::new(&config, None);
        let mut rng = StdRng::seed_from_u64(7);

        let two_with_sources = selector.template_feedback(&body(2, &["교육부"]), &mut rng);
        let expected = &config.feedback.templates[5];
        assert_eq!(expected.has_sources, Some(true));
        assert!(expected.messages.contains(&two_with_sources.text));
        assert_eq!(two_with_sources.origin, FeedbackOrigin::Template);

        let four = selector.template_feedback(&body(4, &[]), &mut rng);
        assert!(config.feedback.templates[7].messages.contains(&four.text));
    }

    #[test]
    fn test_template_is_reproducible_with_seed() {
        let selector = FeedbackSelector::new(&default_config(), None);
        let structure = body(1, &[]);

        let a = selector.template_feedback(&structure, &mut StdRng::seed_from_u64(42));
        let b = selector.template_feedback(&structure, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_unmatched_structure_uses_generic_pool() {
        let mut config = default_config();
        config.feedback.templates.clear();
        let selector = FeedbackSelector::new(&config, None);

        let feedback = selector.template_feedback(&body(3, &[]), &mut StdRng::seed_from_u64(1));
        assert!(config.feedback.generic.contains(&feedback.text));
    }

    #[test]
    fn test_empty_pools_still_produce_text() {
        let mut config = default_config();
        config.feedback.templates.clear();
        config.feedback.generic.clear();
        let selector = FeedbackSelector::new(&config, None);

        let feedback = selector.template_feedback(&body(1, &[]), &mut StdRng::seed_from_u64(1));
        assert_eq!(feedback.text, LAST_RESORT_FEEDBACK);
    }

    #[test]
    fn test_auto_strategy_resolution() {
        let config = default_config();
        assert_eq!(
            FeedbackSelector::new(&config, None).strategy(),
            FeedbackStrategy::Template
        );
        let generation = Arc::new(ScriptedGeneration::constant("ok"));
        assert_eq!(
            FeedbackSelector::new(&config, Some(generation)).strategy(),
            FeedbackStrategy::Model
        );
    }

    #[tokio::test]
    async fn test_model_feedback_verbatim() {
        let generation = Arc::new(ScriptedGeneration::constant("[논증 구조 평가]\n- 강점: 명확함"));
        let selector = FeedbackSelector::new(&default_config(), Some(generation.clone()));
        let context = CoachingContext {
            text: "나는 AI 사용에 반대한다",
            position: Some(Position::Against),
            topic: Some("인공지능을 활용한 수행평가"),
        };

        let feedback = selector
            .feedback(&ArgumentStructure::default(), context, &mut StdRng::seed_from_u64(0))
            .await;
        assert_eq!(feedback.text, "[논증 구조 평가]\n- 강점: 명확함");
        assert_eq!(feedback.origin, FeedbackOrigin::Model);

        let request = &generation.requests()[0];
        assert!(request.system_prompt.contains("양보 표현"));
        let prompt = &request.history[0].content;
        assert!(prompt.contains("학생의 입장: 반대"));
        assert!(prompt.contains("나는 AI 사용에 반대한다"));
        assert!(prompt.contains("언급된 출처: 없음"));
    }

    #[tokio::test]
    async fn test_model_failure_degrades() {
        let generation = Arc::new(ScriptedGeneration::failing(ServiceError::Transport(
            "connection refused".to_string(),
        )));
        let selector = FeedbackSelector::new(&default_config(), Some(generation.clone()));

        let feedback = selector
            .model_feedback(&ArgumentStructure::default(), CoachingContext::default())
            .await;
        assert!(feedback.is_degraded());
        assert!(feedback.text.contains("connection refused"));
        assert_eq!(generation.calls(), 1);
    }

    #[tokio::test]
    async fn test_forced_model_without_service() {
        let mut config = default_config();
        config.feedback.strategy = FeedbackStrategy::Model;
        let selector = FeedbackSelector::new(&config, None);

        let feedback = selector
            .feedback(&ArgumentStructure::default(), CoachingContext::default(), &mut StdRng::seed_from_u64(0))
            .await;
        assert_eq!(
            feedback.origin,
            FeedbackOrigin::Degraded(ServiceError::NotConfigured(GENERATION_KEY_VAR.to_string()))
        );
        assert!(feedback.text.contains(GENERATION_KEY_VAR));
    }
}
