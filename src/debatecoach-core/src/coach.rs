//! The argument coaching pipeline.
//!
//! A submission is classified, folded into the session's progress summary,
//! answered with feedback and, when it cites a source, fact-checked.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::classifier::{ArgumentStructure, TextClassifier};
use crate::config::Config;
use crate::error::CoachError;
use crate::fact_check::{FactCheckRequest, FactCheckResult, FactChecker};
use crate::feedback::{CoachingContext, Feedback, FeedbackSelector};
use crate::participant::{Position, Turn};
use crate::services::Services;
use crate::session::{CoachingPhase, CoachingSession, Session};

/// Shown next to fact-check results below the verified threshold.
pub const IMPROVEMENT_HINT: &str =
    "개선 제안: 더 신뢰할 수 있는 출처를 인용하거나, 구체적인 통계나 연구 결과를 제시해 보세요.";

/// Shown when a fact check runs on text without a cited source.
pub const MISSING_SOURCE_HINT: &str =
    "출처가 명시되지 않았습니다. '~에 따르면' 형식으로 출처를 포함해 주세요.";

const EVIDENCE_NOTE: &str = "근거 추출됨";
const REINFORCEMENT_NOTE: &str = "보강자료 추출됨";

/// Everything produced for one submission.
#[derive(Debug, Clone, Serialize)]
pub struct CoachingTurn {
    pub structure: ArgumentStructure,
    pub feedback: Feedback,
    pub fact_check: Option<FactCheckResult>,
}

pub struct ArgumentCoach {
    classifier: TextClassifier,
    feedback: FeedbackSelector,
    fact_checker: FactChecker,
    config: Config,
}

impl ArgumentCoach {
    /// Build the pipeline. Fails when no external service is configured at all.
    pub fn new(config: &Config, services: Services) -> Result<Self, CoachError> {
        if services.is_empty() {
            return Err(CoachError::NoCredentials);
        }

        Ok(Self {
            classifier: TextClassifier::new(&config.patterns)?,
            feedback: FeedbackSelector::new(config, services.generation.clone()),
            fact_checker: FactChecker::new(config, &services),
            config: config.clone(),
        })
    }

    pub fn classifier(&self) -> &TextClassifier {
        &self.classifier
    }

    pub fn example_topics(&self) -> &[String] {
        &self.config.coach.example_topics
    }

    /// Choose a topic and position and enter the coaching phase.
    ///
    /// Returns the step-by-step guide for the chosen topic.
    pub fn start(&self, session: &mut CoachingSession, topic: &str, position: Position) -> String {
        let topic = topic.trim();
        if session.topic.as_deref() != Some(topic) {
            session.transcript.clear();
            session.topic = Some(topic.to_string());
        }
        session.position = Some(position);
        session.phase = CoachingPhase::Coaching;

        info!(session = %session.id(), topic, %position, "coaching started");
        self.config.topic_guide(topic, position)
    }

    /// Coach one submission.
    pub async fn submit<R: Rng + ?Sized>(
        &self,
        session: &mut CoachingSession,
        text: &str,
        rng: &mut R,
    ) -> Result<CoachingTurn, CoachError> {
        if !session.is_coaching() {
            return Err(CoachError::CoachingNotStarted);
        }

        session.transcript.push(Turn::user(text));
        let structure = self.classifier.classify(text);
        record_progress(session, text, &structure);

        let context = CoachingContext {
            text,
            position: session.position,
            topic: session.topic.as_deref(),
        };
        let feedback = self.feedback.feedback(&structure, context, rng).await;
        session.transcript.push(Turn::coach(feedback.text.as_str()));

        let fact_check = if self.config.coach.auto_fact_check && structure.has_sources() {
            debug!(sources = ?structure.sources, "sources cited, running automatic fact check");
            Some(self.fact_check(session, text).await)
        } else {
            None
        };

        Ok(CoachingTurn {
            structure,
            feedback,
            fact_check,
        })
    }

    /// Fact-check a submission and keep the result on the session.
    pub async fn fact_check(&self, session: &mut CoachingSession, text: &str) -> FactCheckResult {
        let request = FactCheckRequest::from_submission(text, &self.classifier);
        let result = self.fact_checker.check(&request).await;
        session.fact_checks.push(result.clone());
        result
    }
}

/// Claim is the first sentence; evidence and reinforcement accumulate notes.
fn record_progress(session: &mut CoachingSession, text: &str, structure: &ArgumentStructure) {
    let progress = &mut session.progress;
    if structure.has_claim {
        let first = text.split('.').next().unwrap_or(text).trim();
        progress.claim = Some(first.to_string());
    }
    if structure.has_evidence {
        progress.evidence.push(EVIDENCE_NOTE.to_string());
    }
    if structure.has_reinforcement {
        let note = if structure.sources.is_empty() {
            REINFORCEMENT_NOTE.to_string()
        } else {
            format!("{} ({})", REINFORCEMENT_NOTE, structure.sources.join(", "))
        };
        progress.reinforcement.push(note);
    }
}
