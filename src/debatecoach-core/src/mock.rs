//! Scripted services for testing without network access.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::ServiceError;
use crate::services::{ChatMessage, GroundednessService, RetrievalService, TextGenerationService};

/// Canned outcomes, cycled in order.
#[derive(Debug)]
struct Script {
    outcomes: Vec<Result<String, ServiceError>>,
    index: AtomicUsize,
}

impl Script {
    fn new(outcomes: Vec<Result<String, ServiceError>>) -> Self {
        Self {
            outcomes,
            index: AtomicUsize::new(0),
        }
    }

    fn next(&self) -> Result<String, ServiceError> {
        if self.outcomes.is_empty() {
            return Err(ServiceError::EmptyResponse);
        }
        let idx = self.index.fetch_add(1, Ordering::Relaxed);
        self.outcomes[idx % self.outcomes.len()].clone()
    }

    fn calls(&self) -> usize {
        self.index.load(Ordering::Relaxed)
    }
}

/// A generation request as seen by [`ScriptedGeneration`].
#[derive(Debug, Clone)]
pub struct RecordedGeneration {
    pub system_prompt: String,
    pub history: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Generation service returning scripted outcomes and recording requests.
#[derive(Debug)]
pub struct ScriptedGeneration {
    script: Script,
    requests: Mutex<Vec<RecordedGeneration>>,
}

impl ScriptedGeneration {
    pub fn new(outcomes: Vec<Result<String, ServiceError>>) -> Self {
        Self {
            script: Script::new(outcomes),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn constant(response: &str) -> Self {
        Self::new(vec![Ok(response.to_string())])
    }

    pub fn failing(error: ServiceError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn calls(&self) -> usize {
        self.script.calls()
    }

    pub fn requests(&self) -> Vec<RecordedGeneration> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerationService for ScriptedGeneration {
    fn name(&self) -> &str {
        "scripted-generation"
    }

    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ServiceError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedGeneration {
                system_prompt: system_prompt.to_string(),
                history: history.to_vec(),
                max_tokens,
                temperature,
            });
        }
        self.script.next()
    }
}

/// Retrieval service returning scripted summaries.
#[derive(Debug)]
pub struct ScriptedRetrieval {
    script: Script,
    queries: Mutex<Vec<String>>,
}

impl ScriptedRetrieval {
    pub fn new(outcomes: Vec<Result<String, ServiceError>>) -> Self {
        Self {
            script: Script::new(outcomes),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn constant(summary: &str) -> Self {
        Self::new(vec![Ok(summary.to_string())])
    }

    pub fn failing(error: ServiceError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RetrievalService for ScriptedRetrieval {
    fn name(&self) -> &str {
        "scripted-retrieval"
    }

    async fn search(&self, query: &str) -> Result<String, ServiceError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        self.script.next()
    }
}

/// Groundedness service returning scripted verdicts.
#[derive(Debug)]
pub struct ScriptedGroundedness {
    script: Script,
}

impl ScriptedGroundedness {
    pub fn new(outcomes: Vec<Result<String, ServiceError>>) -> Self {
        Self {
            script: Script::new(outcomes),
        }
    }

    pub fn constant(verdict: &str) -> Self {
        Self::new(vec![Ok(verdict.to_string())])
    }

    pub fn failing(error: ServiceError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn calls(&self) -> usize {
        self.script.calls()
    }
}

#[async_trait]
impl GroundednessService for ScriptedGroundedness {
    fn name(&self) -> &str {
        "scripted-groundedness"
    }

    async fn score(&self, _premise: &str, _hypothesis: &str) -> Result<String, ServiceError> {
        self.script.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_generation_cycles() {
        let mock = ScriptedGeneration::new(vec![
            Ok("first".to_string()),
            Err(ServiceError::Transport("down".to_string())),
        ]);

        assert_eq!(mock.generate("sys", &[], 10, 0.5).await.unwrap(), "first");
        assert!(mock.generate("sys", &[], 10, 0.5).await.is_err());
        assert_eq!(mock.generate("sys", &[], 10, 0.5).await.unwrap(), "first");
        assert_eq!(mock.calls(), 3);
        assert_eq!(mock.requests()[0].system_prompt, "sys");
    }

    #[tokio::test]
    async fn test_scripted_retrieval_records_queries() {
        let mock = ScriptedRetrieval::constant("summary");
        mock.search("is it true?").await.unwrap();
        assert_eq!(mock.queries(), vec!["is it true?".to_string()]);
    }
}
