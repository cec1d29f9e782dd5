//! Replies of the simulated debate opponent.
//!
//! Replies come from a generation model when one is configured. Otherwise,
//! or when the model fails, a keyword-indexed [`FallbackTable`] answers.

use std::sync::{Arc, LazyLock};

use rand::Rng;
use rand::seq::IndexedRandom;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{Config, FallbackConfig, KeywordRebuttal};
use crate::error::ServiceError;
use crate::participant::Turn;
use crate::services::{ChatMessage, TextGenerationService};

const LAST_RESORT_REBUTTAL: &str = "그 주장에는 동의하기 어렵습니다. 조금 더 구체적인 근거를 들어 주시겠습니까?";
const LAST_RESORT_CONCESSION: &str = "당신의 논리에 설득되었습니다. 이번 토론은 제가 졌습니다.";

/// Where an opponent reply came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "error", rename_all = "snake_case")]
pub enum ReplyOrigin {
    Model,
    /// No model configured; the fallback table answered.
    Fallback,
    /// The model failed; the fallback table answered.
    Degraded(ServiceError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpponentReply {
    pub text: String,
    pub origin: ReplyOrigin,
}

/// Canned rebuttals and concessions.
#[derive(Debug, Clone)]
pub struct FallbackTable {
    keyword_rebuttals: Vec<KeywordRebuttal>,
    generic: Vec<String>,
    concessions: Vec<String>,
}

impl FallbackTable {
    pub fn new(config: &FallbackConfig) -> Self {
        Self {
            keyword_rebuttals: config.keyword_rebuttals.clone(),
            generic: config.generic.clone(),
            concessions: config.concessions.clone(),
        }
    }

    /// First rebuttal whose keyword occurs in the case-folded text.
    pub fn keyword_rebuttal(&self, text: &str) -> Option<&str> {
        let folded = text.to_lowercase();
        self.keyword_rebuttals
            .iter()
            .find(|entry| {
                entry
                    .keywords
                    .iter()
                    .any(|k| !k.is_empty() && folded.contains(&k.to_lowercase()))
            })
            .map(|entry| entry.rebuttal.as_str())
    }

    /// Concessions ignore keywords entirely.
    pub fn select<R: Rng + ?Sized>(&self, text: &str, surrender: bool, rng: &mut R) -> String {
        if surrender {
            return self
                .concessions
                .choose(rng)
                .map(String::as_str)
                .unwrap_or(LAST_RESORT_CONCESSION)
                .to_string();
        }

        self.keyword_rebuttal(text)
            .or_else(|| self.generic.choose(rng).map(String::as_str))
            .unwrap_or(LAST_RESORT_REBUTTAL)
            .to_string()
    }
}

pub struct ResponseGenerator {
    table: FallbackTable,
    generation: Option<Arc<dyn TextGenerationService>>,
    system_prompt: String,
    surrender_prompt: String,
    context_turns: usize,
    max_tokens: u32,
    temperature: f32,
}

impl ResponseGenerator {
    pub fn new(config: &Config, generation: Option<Arc<dyn TextGenerationService>>) -> Self {
        let opponent = &config.opponent;
        Self {
            table: FallbackTable::new(&opponent.fallback),
            generation,
            system_prompt: config.opponent_prompt(false),
            surrender_prompt: config.opponent_prompt(true),
            context_turns: opponent.context_turns,
            max_tokens: opponent.max_tokens,
            temperature: opponent.temperature,
        }
    }

    /// The last `context_turns` entries of `history`.
    pub fn recent_turns<'a>(&self, history: &'a [Turn]) -> &'a [Turn] {
        let start = history.len().saturating_sub(self.context_turns);
        &history[start..]
    }

    /// The last `context_turns` prior turns followed by the new user turn.
    pub fn context_window(&self, prior: &[Turn], user_text: &str) -> Vec<ChatMessage> {
        self.recent_turns(prior)
            .iter()
            .map(ChatMessage::from)
            .chain(std::iter::once(ChatMessage::user(user_text)))
            .collect()
    }

    /// Produce the opponent's reply. Always returns non-empty text.
    pub async fn respond<R: Rng + ?Sized>(
        &self,
        prior: &[Turn],
        user_text: &str,
        surrender: bool,
        rng: &mut R,
    ) -> OpponentReply {
        let Some(generation) = &self.generation else {
            return OpponentReply {
                text: self.table.select(user_text, surrender, rng),
                origin: ReplyOrigin::Fallback,
            };
        };

        let system_prompt = if surrender {
            &self.surrender_prompt
        } else {
            &self.system_prompt
        };
        let history = self.context_window(prior, user_text);

        let outcome = generation
            .generate(system_prompt, &history, self.max_tokens, self.temperature)
            .await
            .map(|raw| sanitize_response(&raw))
            .and_then(|text| {
                if text.is_empty() {
                    Err(ServiceError::EmptyResponse)
                } else {
                    Ok(text)
                }
            });

        match outcome {
            Ok(text) => {
                debug!(service = generation.name(), surrender, "opponent reply generated");
                OpponentReply {
                    text,
                    origin: ReplyOrigin::Model,
                }
            }
            Err(err) => {
                warn!(error = %err, "opponent generation failed, using fallback table");
                OpponentReply {
                    text: self.table.select(user_text, surrender, rng),
                    origin: ReplyOrigin::Degraded(err),
                }
            }
        }
    }
}

const REASONING_TAGS: [&str; 9] = [
    "thinking",
    "think",
    "reflection",
    "reflect",
    "internal",
    "reasoning",
    "thought",
    "scratchpad",
    "analysis",
];

static REASONING_BLOCKS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    REASONING_TAGS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}[^>]*>.*?</{tag}>")).expect("valid reasoning tag pattern")
        })
        .collect()
});

static ORPHAN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][\w-]*[^>]*>").expect("valid tag pattern"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Sanitize a model reply by stripping reasoning tokens and XML-like tags.
///
/// Removes patterns like <thinking>...</thinking>, <reflection>...</reflection>, etc.
pub fn sanitize_response(response: &str) -> String {
    let mut result = response.to_string();

    for block in REASONING_BLOCKS.iter() {
        result = block.replace_all(&result, "").into_owned();
    }

    // Orphaned opening/closing tags
    result = ORPHAN_TAG.replace_all(&result, "").into_owned();

    result = result.replace("**", "").replace('*', "");

    WHITESPACE.replace_all(&result, " ").trim().to_string()
}
