use navi_core::model::{InputType, Question, QuestionId};
use serde_json::json;

use super::test_harness::{FakeBackend, ViewKind, setup_view_harness};

fn backend_with_resume(resume: serde_json::Value) -> FakeBackend {
    let backend = FakeBackend::default();
    *backend.resume.lock().unwrap() = Some(resume);
    backend
}

#[tokio::test(flavor = "current_thread")]
async fn login_view_shows_the_notice_left_for_it() {
    let mut harness = setup_view_harness(ViewKind::Login, FakeBackend::default(), false).await;
    harness
        .context
        .set_notice("Account verified successfully! You can now sign in.");

    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Account verified successfully!"), "missing notice in {html}");
    assert!(html.contains("Remember me"), "missing checkbox in {html}");
    assert!(harness.context.take_notice().is_none());
}

#[tokio::test(flavor = "current_thread")]
async fn verify_view_shows_email_and_countdown() {
    let mut harness = setup_view_harness(
        ViewKind::Verify("ada@example.com".into()),
        FakeBackend::default(),
        false,
    )
    .await;

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("ada@example.com"), "missing email in {html}");
    assert!(html.contains("Code expires in 30:00"), "missing countdown in {html}");
    assert_eq!(html.matches("code-slot").count(), 5, "expected five inputs in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_renders_steps_and_entry_button() {
    let backend = backend_with_resume(json!({
        "progress": {"personalCompleted": true, "objectiveCompleted": false},
        "redirectTo": "objective-questions",
        "sessionId": "s-1",
        "totalObjectiveQuestions": 10
    }));
    let mut harness = setup_view_harness(ViewKind::Home, backend, true).await;

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Personal Discovery"), "missing step in {html}");
    assert!(html.contains("Career Insights"), "missing step in {html}");
    assert!(
        html.contains("Continue Objective Questions"),
        "missing entry button in {html}"
    );
    assert!(!html.contains("Retake assessment"), "retake shown early in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_failure_offers_retry() {
    let mut harness = setup_view_harness(ViewKind::Home, FakeBackend::default(), true).await;

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(
        html.contains("Failed to load assessment progress"),
        "missing error in {html}"
    );
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn personal_questions_render_the_first_card() {
    let backend = FakeBackend::default();
    *backend.questions.lock().unwrap() = vec![
        Question::new(
            QuestionId::new("p1"),
            "What energizes you at work?",
            InputType::OpenEnded,
            Vec::new(),
        ),
        Question::new(
            QuestionId::new("p2"),
            "Pick a setting",
            InputType::SingleChoice,
            vec!["Office".into(), "Outdoors".into()],
        ),
    ];
    let mut harness = setup_view_harness(ViewKind::Personal, backend, true).await;

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Personal Discovery"), "missing title in {html}");
    assert!(html.contains("What energizes you at work?"), "missing question in {html}");
    assert!(html.contains("Question 1 of 2"), "missing position in {html}");
    assert!(html.contains("Save progress"), "missing save button in {html}");
    assert!(!html.contains("Pick a setting"), "second card shown early in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn failed_question_load_offers_a_retry() {
    let backend = FakeBackend::default();
    *backend.fail_questions.lock().unwrap() = true;
    let mut harness = setup_view_harness(ViewKind::Personal, backend, true).await;

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Failed to load questions"), "missing banner in {html}");
    assert!(html.contains("Try again"), "missing retry in {html}");
    assert!(!html.contains("Loading questions..."), "still loading in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_lists_careers() {
    let backend = backend_with_resume(json!({
        "progress": {"personalCompleted": true, "objectiveCompleted": true, "isFullyCompleted": true},
        "redirectTo": "results",
        "sessionId": "s-9"
    }));
    *backend.recommendations.lock().unwrap() = Some(json!({
        "recommendations": [
            {"id": "c1", "title": "Data Scientist", "matchScore": 92},
            {"id": "c2", "title": "UX Designer", "matchScore": 71}
        ]
    }));
    let mut harness = setup_view_harness(ViewKind::Results, backend, true).await;

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Top match: Data Scientist"), "missing top match in {html}");
    assert!(html.contains("UX Designer"), "missing second career in {html}");
    assert!(html.contains("Retake assessment"), "missing retake in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_reports_missing_results() {
    let backend = backend_with_resume(json!({
        "redirectTo": "results",
        "sessionId": "s-9"
    }));
    let mut harness = setup_view_harness(ViewKind::Results, backend, true).await;

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(
        html.contains("Assessment results not found"),
        "missing error in {html}"
    );
    assert!(html.contains("Try again"), "missing retry in {html}");
}
