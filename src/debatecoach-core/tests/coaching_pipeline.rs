//! End-to-end coaching sessions against scripted services.

use std::sync::Arc;

use debatecoach_core::mock::{ScriptedGeneration, ScriptedGroundedness, ScriptedRetrieval};
use debatecoach_core::{
    ArgumentCoach, CoachingSession, Config, FactCheckStatus, FeedbackOrigin, Position,
    SectionType, ServiceError, Services, SessionStore, Verdict, default_config,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

const TOPIC: &str = "인공지능을 활용한 수행평가";

#[tokio::test]
async fn full_coaching_session_with_template_feedback() {
    let retrieval = Arc::new(ScriptedRetrieval::constant(
        "교육부 자료로 확인되었습니다. https://www.moe.go.kr/stats, https://kedi.re.kr/report.",
    ));
    let groundedness = Arc::new(ScriptedGroundedness::constant("grounded"));
    let services = Services::default()
        .with_retrieval(retrieval.clone())
        .with_groundedness(groundedness.clone());
    let coach = ArgumentCoach::new(&default_config(), services).unwrap();

    let mut store: SessionStore<CoachingSession> = SessionStore::new();
    let id = store.create();
    let mut rng = StdRng::seed_from_u64(2024);

    let guide = coach.start(store.get_mut(id).unwrap(), TOPIC, Position::Against);
    assert!(guide.contains(TOPIC));

    let intro = coach
        .submit(store.get_mut(id).unwrap(), "나는 AI 사용에 반대한다", &mut rng)
        .await
        .unwrap();
    assert_eq!(intro.structure.section_type, SectionType::Intro);
    assert!(intro.structure.has_claim);
    assert_eq!(intro.feedback.origin, FeedbackOrigin::Template);

    let body = coach
        .submit(
            store.get_mut(id).unwrap(),
            "첫째, 효율이 높다. 둘째, 접근성이 좋다.",
            &mut rng,
        )
        .await
        .unwrap();
    assert_eq!(body.structure.section_type, SectionType::Body);
    assert_eq!(body.structure.evidence_count, 2);
    assert!(body.fact_check.is_none());

    let cited = coach
        .submit(
            store.get_mut(id).unwrap(),
            "교육부 조사 결과 고등학생의 60%가 과제에 AI를 쓴다.",
            &mut rng,
        )
        .await
        .unwrap();
    let check = cited.fact_check.expect("cited source triggers a fact check");
    assert_eq!(check.verdict, Verdict::Supported);
    assert_eq!(check.status(), FactCheckStatus::Verified);
    assert_eq!(
        check.sources,
        vec!["https://www.moe.go.kr/stats", "https://kedi.re.kr/report"]
    );
    assert_eq!(groundedness.calls(), 1);

    let session = store.get(id).unwrap();
    assert_eq!(session.progress.claim.as_deref(), Some("나는 AI 사용에 반대한다"));
    assert_eq!(session.progress.evidence.len(), 1);
    assert_eq!(session.progress.reinforcement.len(), 1);
    assert_eq!(session.progress.completed_steps(), 3);
    assert_eq!(session.fact_checks.len(), 1);
    assert_eq!(session.submissions().count(), 3);
    assert_eq!(session.transcript.len(), 6);
}

#[tokio::test]
async fn model_feedback_and_degraded_fact_check() {
    let generation = Arc::new(ScriptedGeneration::new(vec![
        Ok("[논증 구조 평가] 주장이 분명합니다.".to_string()),
        Err(ServiceError::Transport("timed out".to_string())),
    ]));
    let retrieval = Arc::new(ScriptedRetrieval::failing(ServiceError::Api(
        "401 Unauthorized".to_string(),
    )));
    let services = Services::default()
        .with_generation(generation.clone())
        .with_retrieval(retrieval);
    let coach = ArgumentCoach::new(&default_config(), services).unwrap();

    let mut session = CoachingSession::new();
    let mut rng = StdRng::seed_from_u64(1);
    coach.start(&mut session, TOPIC, Position::For);

    let first = coach
        .submit(&mut session, "저는 수행평가에 AI 활용을 찬성합니다.", &mut rng)
        .await
        .unwrap();
    assert_eq!(first.feedback.origin, FeedbackOrigin::Model);
    assert_eq!(first.feedback.text, "[논증 구조 평가] 주장이 분명합니다.");

    let second = coach
        .submit(&mut session, "OECD 연구에서 학습 효과가 입증되었다.", &mut rng)
        .await
        .unwrap();
    assert!(second.feedback.is_degraded());
    assert!(second.feedback.text.contains("timed out"));

    let check = second.fact_check.unwrap();
    assert_eq!(check.confidence, 0.0);
    assert!(!check.is_grounded);
    assert_eq!(check.verdict, Verdict::Unverified);
    assert!(check.needs_better_source());
    assert_eq!(
        check.error,
        Some(ServiceError::Api("401 Unauthorized".to_string()))
    );

    let prompt = &generation.requests()[0].history[0].content;
    assert!(prompt.contains("학생의 입장: 찬성"));
    assert!(prompt.contains(TOPIC));
}

#[tokio::test]
async fn english_citation_triggers_fact_check() {
    let retrieval = Arc::new(ScriptedRetrieval::constant(
        "UNESCO's 2023 report confirms this figure. https://www.unesco.org/gem-report",
    ));
    let coach = ArgumentCoach::new(
        &default_config(),
        Services::default().with_retrieval(retrieval.clone()),
    )
    .unwrap();

    let mut session = CoachingSession::new();
    let mut rng = StdRng::seed_from_u64(11);
    coach.start(&mut session, TOPIC, Position::For);

    let turn = coach
        .submit(
            &mut session,
            "According to UNESCO, 40% of teachers already use AI tools.",
            &mut rng,
        )
        .await
        .unwrap();

    assert_eq!(turn.structure.sources, vec!["UNESCO"]);
    let check = turn.fact_check.expect("english citation triggers a fact check");
    assert_eq!(check.claim, "40% of teachers already use AI tools.");
    assert_eq!(check.sources, vec!["https://www.unesco.org/gem-report"]);

    let query = &retrieval.queries()[0];
    assert!(query.contains("출처: UNESCO"));
    assert_eq!(session.progress.reinforcement.len(), 1);
}

#[tokio::test]
async fn manual_fact_check_without_citation() {
    let retrieval = Arc::new(ScriptedRetrieval::constant("This statement is false."));
    let coach = ArgumentCoach::new(
        &default_config(),
        Services::default().with_retrieval(retrieval.clone()),
    )
    .unwrap();

    let mut session = CoachingSession::new();
    let result = coach
        .fact_check(&mut session, "AI는 모든 학생의 성적을 올린다")
        .await;

    assert_eq!(result.claim, "AI는 모든 학생의 성적을 올린다");
    assert_eq!(result.verdict, Verdict::Unsupported);
    assert_eq!(result.status(), FactCheckStatus::Failed);
    assert!(retrieval.queries()[0].contains("출처: 명시되지 않음"));
    assert_eq!(session.fact_checks.len(), 1);
}

#[tokio::test]
async fn configuration_file_overrides_templates() {
    let config = Config::from_str(
        r#"
        [feedback]
        strategy = "template"
        generic = ["구조를 더 다듬어 보세요."]

        [[feedback.templates]]
        section = "conclusion"
        messages = ["결론이 깔끔합니다."]
        "#,
    )
    .unwrap();

    let generation = Arc::new(ScriptedGeneration::constant("unused"));
    let coach =
        ArgumentCoach::new(&config, Services::default().with_generation(generation.clone()))
            .unwrap();

    let mut session = CoachingSession::new();
    let mut rng = StdRng::seed_from_u64(3);
    coach.start(&mut session, TOPIC, Position::For);

    let conclusion = coach
        .submit(&mut session, "따라서 AI 활용은 허용되어야 한다.", &mut rng)
        .await
        .unwrap();
    assert_eq!(conclusion.structure.section_type, SectionType::Conclusion);
    assert_eq!(conclusion.feedback.text, "결론이 깔끔합니다.");

    let body = coach
        .submit(&mut session, "AI는 도구일 뿐이다.", &mut rng)
        .await
        .unwrap();
    assert_eq!(body.feedback.text, "구조를 더 다듬어 보세요.");
    assert_eq!(generation.calls(), 0);
}

#[test]
fn coach_requires_at_least_one_service() {
    let result = ArgumentCoach::new(&default_config(), Services::default());
    assert!(matches!(result, Err(debatecoach_core::CoachError::NoCredentials)));
}
