//! Debate simulation logic.
//!
//! Drives one user turn at a time against the simulated opponent.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::error::CoachError;
use crate::opponent::{OpponentReply, ResponseGenerator};
use crate::services::TextGenerationService;
use crate::session::{DebateSession, Session};
use crate::surrender::{SurrenderDecision, SurrenderPolicy};

/// Callback for simulator events.
pub type SimulatorCallback = Box<dyn Fn(SimulatorEvent) + Send + Sync>;

/// Events emitted while a turn is processed.
#[derive(Debug, Clone)]
pub enum SimulatorEvent {
    /// A user turn was accepted and counted.
    RoundStarted { round: u32 },
    /// The surrender check ran for this round.
    SurrenderEvaluated(SurrenderDecision),
    /// The opponent has replied.
    OpponentReplied { text: String },
    /// The opponent conceded; the session is closed.
    Conceded { round: u32 },
}

/// Outcome of one debate turn.
#[derive(Debug, Clone, Serialize)]
pub struct OpponentTurn {
    pub round: u32,
    pub reply: OpponentReply,
    pub decision: SurrenderDecision,
}

impl OpponentTurn {
    pub fn surrendered(&self) -> bool {
        self.decision.surrender
    }
}

pub struct DebateSimulator {
    policy: SurrenderPolicy,
    generator: ResponseGenerator,
    opponent_name: String,
    callback: Option<SimulatorCallback>,
}

impl DebateSimulator {
    pub fn new(config: &Config, generation: Option<Arc<dyn TextGenerationService>>) -> Self {
        Self {
            policy: SurrenderPolicy::new(config.surrender.clone()),
            generator: ResponseGenerator::new(config, generation),
            opponent_name: config.opponent.name.clone(),
            callback: None,
        }
    }

    /// Set the event callback.
    pub fn on_event(&mut self, callback: SimulatorCallback) {
        self.callback = Some(callback);
    }

    pub fn opponent_name(&self) -> &str {
        &self.opponent_name
    }

    fn emit_event(&self, event: SimulatorEvent) {
        if let Some(ref callback) = self.callback {
            callback(event);
        }
    }

    /// Take one turn, measuring elapsed time from the session's start.
    pub async fn take_turn<R: Rng + ?Sized>(
        &self,
        session: &mut DebateSession,
        text: &str,
        rng: &mut R,
    ) -> Result<OpponentTurn, CoachError> {
        let elapsed = session.elapsed();
        self.take_turn_at(session, text, elapsed, rng).await
    }

    /// Take one turn as if `elapsed` had passed since the session started.
    pub async fn take_turn_at<R: Rng + ?Sized>(
        &self,
        session: &mut DebateSession,
        text: &str,
        elapsed: Duration,
        rng: &mut R,
    ) -> Result<OpponentTurn, CoachError> {
        // Recent history before this turn is the model's context.
        let prior = self.generator.recent_turns(session.history()).to_vec();
        let round = session.accept_user_turn(text)?;
        self.emit_event(SimulatorEvent::RoundStarted { round });

        let decision = self.policy.decide(round, elapsed, rng);
        self.emit_event(SimulatorEvent::SurrenderEvaluated(decision));

        let reply = self
            .generator
            .respond(&prior, text, decision.surrender, rng)
            .await;
        session.record_opponent_turn(&reply.text);
        self.emit_event(SimulatorEvent::OpponentReplied {
            text: reply.text.clone(),
        });

        if decision.surrender {
            session.mark_surrendered();
            info!(session = %session.id(), round, "opponent conceded");
            self.emit_event(SimulatorEvent::Conceded { round });
        }

        Ok(OpponentTurn {
            round,
            reply,
            decision,
        })
    }
}
