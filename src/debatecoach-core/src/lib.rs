//! Debate Coach Core Library
//!
//! Provides argument structure analysis, coaching feedback, fact checking
//! and a simulated debate opponent.

pub mod classifier;
pub mod coach;
pub mod config;
pub mod error;
pub mod fact_check;
pub mod feedback;
pub mod mock;
pub mod opponent;
pub mod participant;
pub mod services;
pub mod session;
pub mod simulator;
pub mod surrender;

pub use classifier::{ArgumentStructure, EvidenceBucket, SectionType, TextClassifier};
pub use coach::{ArgumentCoach, CoachingTurn};
pub use config::{Config, Credentials, FeedbackStrategy, default_config};
pub use error::{CoachError, ErrorKind, ServiceError};
pub use fact_check::{FactCheckRequest, FactCheckResult, FactCheckStatus, FactChecker, Verdict};
pub use feedback::{CoachingContext, Feedback, FeedbackOrigin, FeedbackSelector};
pub use opponent::{FallbackTable, OpponentReply, ReplyOrigin, ResponseGenerator};
pub use participant::{Position, Speaker, Turn};
pub use services::{
    ChatMessage, ChatRole, GroundednessService, RetrievalService, Services, TextGenerationService,
};
pub use session::{
    ArgumentProgress, CoachingPhase, CoachingSession, DebateSession, Session, SessionId,
    SessionStore,
};
pub use simulator::{DebateSimulator, OpponentTurn, SimulatorEvent};
pub use surrender::{SurrenderDecision, SurrenderPolicy};
