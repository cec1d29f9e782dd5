//! Whole debates against the simulated opponent.

use std::sync::Arc;
use std::time::Duration;

use debatecoach_core::mock::ScriptedGeneration;
use debatecoach_core::{
    CoachError, DebateSession, DebateSimulator, ReplyOrigin, ServiceError, SessionStore, Speaker,
    default_config,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn minutes(m: u64) -> Duration {
    Duration::from_secs(m * 60)
}

#[tokio::test]
async fn long_debate_eventually_concedes() {
    let config = default_config();
    let simulator = DebateSimulator::new(&config, None);
    let mut rng = StdRng::seed_from_u64(7);

    // Past the late threshold each eligible round concedes with p = 0.9.
    let mut session = DebateSession::new();
    let mut conceded_at = None;
    for round in 1..=40u32 {
        let turn = simulator
            .take_turn_at(&mut session, "AI는 학습을 돕는 도구입니다", minutes(16), &mut rng)
            .await
            .unwrap();
        assert_eq!(turn.round, round);
        if round < 7 {
            assert!(!turn.surrendered());
        }
        if turn.surrendered() {
            assert!(config.opponent.fallback.concessions.contains(&turn.reply.text));
            conceded_at = Some(round);
            break;
        }
    }

    let round = conceded_at.expect("opponent should concede within 40 rounds");
    assert!(round >= 7);
    assert!(session.is_surrendered());
    assert_eq!(session.history().len(), round as usize * 2);

    let after = simulator
        .take_turn_at(&mut session, "아직 할 말이 있습니다", minutes(17), &mut rng)
        .await;
    assert!(matches!(after, Err(CoachError::SessionSurrendered)));
}

#[tokio::test]
async fn seeded_runs_are_reproducible() {
    let simulator = DebateSimulator::new(&default_config(), None);
    let inputs = ["그냥 좋다고 생각해요", "AI는 미래 사회에 필수입니다", "정말 그렇게 생각하나요?"];

    let mut transcripts = Vec::new();
    for _ in 0..2 {
        let mut rng = StdRng::seed_from_u64(99);
        let mut session = DebateSession::new();
        for input in inputs {
            simulator
                .take_turn_at(&mut session, input, minutes(1), &mut rng)
                .await
                .unwrap();
        }
        transcripts.push(session.history().to_vec());
    }
    assert_eq!(transcripts[0], transcripts[1]);
}

#[tokio::test]
async fn keyword_rebuttal_without_model() {
    let config = default_config();
    let simulator = DebateSimulator::new(&config, None);
    let mut session = DebateSession::new();

    let turn = simulator
        .take_turn(
            &mut session,
            "AI 덕분에 수행평가의 효율이 올라갑니다",
            &mut StdRng::seed_from_u64(0),
        )
        .await
        .unwrap();

    assert_eq!(turn.reply.origin, ReplyOrigin::Fallback);
    assert_eq!(
        turn.reply.text,
        config.opponent.fallback.keyword_rebuttals[0].rebuttal
    );
}

#[tokio::test]
async fn model_context_window_and_failure_recovery() {
    let generation = Arc::new(ScriptedGeneration::new(vec![
        Ok("과정이 곧 배움입니다.".to_string()),
        Err(ServiceError::Transport("connection reset".to_string())),
    ]));
    let simulator = DebateSimulator::new(&default_config(), Some(generation.clone()));
    let mut session = DebateSession::new();
    let mut rng = StdRng::seed_from_u64(5);

    let mut degraded = 0;
    for i in 0..6 {
        let turn = simulator
            .take_turn_at(&mut session, &format!("발언 {i}"), minutes(0), &mut rng)
            .await
            .unwrap();
        assert!(!turn.reply.text.is_empty());
        if matches!(turn.reply.origin, ReplyOrigin::Degraded(_)) {
            degraded += 1;
        }
    }
    assert_eq!(degraded, 3);

    // Round 6 sees ten prior turns plus the new one.
    let requests = generation.requests();
    let last = requests.last().unwrap();
    assert_eq!(last.history.len(), 11);
    assert_eq!(last.history[10].content, "발언 5");
    assert_eq!(session.history().len(), 12);
    assert_eq!(session.history()[11].speaker, Speaker::Opponent);
}

#[test]
fn restart_gives_a_clean_session() {
    let mut store: SessionStore<DebateSession> = SessionStore::new();
    let id = store.create();
    {
        let session = store.get_mut(id).unwrap();
        session.accept_user_turn("발언").unwrap();
        session.mark_surrendered();
    }

    let fresh = store.restart(id).unwrap();
    let session = store.get(fresh).unwrap();
    assert_eq!(session.round_count(), 0);
    assert!(session.history().is_empty());
    assert!(!session.is_surrendered());
    assert!(store.get(id).is_err());
}
