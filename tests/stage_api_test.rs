use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use recruitment_pipeline::{
    error::{Error, Result},
    middleware::auth::Claims,
    models::candidate::{Candidate, CandidateStage, NewCandidate},
    pipeline::{is_senior, CandidateStatus},
    routes,
    services::candidate_store::{
        CandidateStore, ExpectedStage, TransitionOutcome, TransitionRequest,
    },
    AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "test_secret_key";

#[derive(Default)]
struct Tables {
    candidates: Vec<Candidate>,
    stages: Vec<CandidateStage>,
}

#[derive(Default, Clone)]
struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    fn seed(&self, status: CandidateStatus, experience_month: Option<i32>) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let mut tables = self.tables.lock().unwrap();
        let name = format!("Candidate {}", tables.candidates.len() + 1);
        tables.candidates.push(Candidate {
            id,
            name,
            email: format!("{}@example.com", id),
            whatsapp: None,
            location: None,
            highest_degree: None,
            expected_salary: None,
            experience_month,
            profile_data: None,
            processed_status: status,
            is_senior: is_senior(experience_month),
            survey: None,
            coding_test: None,
            interview: None,
            applied_at: now,
            updated_at: None,
        });
        tables.stages.push(stage_row(id, status, None, false));
        id
    }

    fn status_of(&self, id: Uuid) -> CandidateStatus {
        let tables = self.tables.lock().unwrap();
        tables
            .candidates
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.processed_status)
            .unwrap()
    }
}

fn stage_row(
    candidate_id: Uuid,
    stage_key: CandidateStatus,
    created_by: Option<Uuid>,
    send_email_on_reject: bool,
) -> CandidateStage {
    CandidateStage {
        id: Uuid::new_v4(),
        candidate_id,
        stage_key,
        entered_at: Utc::now(),
        exited_at: None,
        duration_seconds: None,
        hr_private_notes: None,
        send_email_on_reject,
        email_sent_at: None,
        created_by,
    }
}

#[async_trait]
impl CandidateStore for InMemoryStore {
    async fn create_candidate(&self, candidate: NewCandidate) -> Result<Candidate> {
        let mut tables = self.tables.lock().unwrap();
        if tables.candidates.iter().any(|c| c.email == candidate.email) {
            return Err(Error::Conflict("duplicate key value violates unique constraint".into()));
        }
        let created = Candidate {
            id: Uuid::new_v4(),
            name: candidate.name,
            email: candidate.email,
            whatsapp: candidate.whatsapp,
            location: candidate.location,
            highest_degree: candidate.highest_degree,
            expected_salary: candidate.expected_salary,
            experience_month: candidate.experience_month,
            profile_data: candidate.profile_data,
            processed_status: CandidateStatus::Applied,
            is_senior: is_senior(candidate.experience_month),
            survey: None,
            coding_test: None,
            interview: None,
            applied_at: Utc::now(),
            updated_at: None,
        };
        tables
            .stages
            .push(stage_row(created.id, CandidateStatus::Applied, None, false));
        tables.candidates.push(created.clone());
        Ok(created)
    }

    async fn get_candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.candidates.iter().find(|c| c.id == id).cloned())
    }

    async fn get_candidates(&self, ids: Vec<Uuid>) -> Result<Vec<Candidate>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .candidates
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn list_candidates(&self, status: Option<CandidateStatus>) -> Result<Vec<Candidate>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .candidates
            .iter()
            .rev()
            .filter(|c| status.map_or(true, |s| c.processed_status == s))
            .cloned()
            .collect())
    }

    async fn list_stages(&self, candidate_id: Uuid) -> Result<Vec<CandidateStage>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .stages
            .iter()
            .filter(|s| s.candidate_id == candidate_id)
            .cloned()
            .collect())
    }

    async fn apply_transition(&self, request: TransitionRequest) -> Result<TransitionOutcome> {
        let mut guard = self.tables.lock().unwrap();
        let tables = &mut *guard;
        let mut updated = Vec::new();
        let mut skipped = Vec::new();

        let stale: Vec<Uuid> = tables
            .candidates
            .iter()
            .filter(|c| request.ids.contains(&c.id) && !request.from.allows(c.id, c.processed_status))
            .map(|c| c.id)
            .collect();
        if !stale.is_empty() {
            return Ok(TransitionOutcome {
                target_status: request.target,
                updated,
                skipped,
                stale,
            });
        }

        for id in request.ids {
            let Some(candidate) = tables.candidates.iter_mut().find(|c| c.id == id) else {
                skipped.push(id);
                continue;
            };
            candidate.processed_status = request.target;
            candidate.updated_at = Some(Utc::now());

            if let Some(open) = tables
                .stages
                .iter_mut()
                .rev()
                .find(|s| s.candidate_id == id && s.exited_at.is_none())
            {
                open.exited_at = Some(Utc::now());
                open.hr_private_notes = Some(request.note.clone());
            }
            tables.stages.push(stage_row(
                id,
                request.target,
                request.actor,
                request.send_email_on_reject && request.target == CandidateStatus::Rejected,
            ));
            updated.push(id);
        }

        Ok(TransitionOutcome {
            target_status: request.target,
            updated,
            skipped,
            stale,
        })
    }

    async fn status_counts(&self) -> Result<HashMap<CandidateStatus, i64>> {
        let tables = self.tables.lock().unwrap();
        let mut counts = HashMap::new();
        for candidate in &tables.candidates {
            *counts.entry(candidate.processed_status).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

fn setup_app() -> (Router, InMemoryStore) {
    let store = InMemoryStore::default();
    let state = AppState::new(Arc::new(store.clone()), SECRET);
    (routes::router(state), store)
}

fn token(sub: &str, role: &str) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
        role: Some(role.to_string()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn admin_token() -> String {
    token(&Uuid::new_v4().to_string(), "hr_admin")
}

fn post_json(uri: &str, bearer: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", bearer))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str, bearer: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {}", bearer))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let (app, _) = setup_app();
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn api_requires_hr_admin_token() {
    let (app, store) = setup_app();
    let id = store.seed(CandidateStatus::Applied, None);
    let uri = format!("/api/candidates/{}/approve", id);

    let req = Request::builder()
        .method("POST")
        .uri(&uri)
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"], "missing_authorization");

    let resp = app
        .clone()
        .oneshot(post_json(&uri, "not-a-jwt", json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"], "invalid_token");

    let viewer = token(&Uuid::new_v4().to_string(), "viewer");
    let resp = app.oneshot(post_json(&uri, &viewer, json!({}))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["error"], "forbidden");
    assert_eq!(store.status_of(id), CandidateStatus::Applied);
}

#[tokio::test]
async fn approve_senior_coding_test_records_actor() {
    let (app, store) = setup_app();
    let id = store.seed(CandidateStatus::CodingTest, Some(96));
    let actor = Uuid::new_v4();
    let bearer = token(&actor.to_string(), "hr_admin");

    let resp = app
        .clone()
        .oneshot(post_json(
            &format!("/api/candidates/{}/approve", id),
            &bearer,
            json!({ "note": "great solution" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["target_status"], "interview_team_lead");
    assert_eq!(store.status_of(id), CandidateStatus::InterviewTeamLead);

    let resp = app
        .oneshot(get(&format!("/api/candidates/{}/stages", id), &bearer))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let history = body_json(resp).await;
    assert_eq!(history["latest_stage"], "interview_team_lead");
    assert_eq!(history["latest_stage_order"], 6);
    assert_eq!(history["next_stage"], "interview_general_manager");
    assert_eq!(history["is_hired"], false);
    let stages = history["stages"].as_array().unwrap();
    assert_eq!(stages.len(), 2);
    assert_eq!(stages[0]["hr_private_notes"], "great solution");
    assert_eq!(stages[1]["created_by"], actor.to_string());
}

#[tokio::test]
async fn approve_standard_coding_test_skips_team_lead() {
    let (app, store) = setup_app();
    let id = store.seed(CandidateStatus::CodingTest, Some(24));

    let resp = app
        .oneshot(post_json(
            &format!("/api/candidates/{}/approve", id),
            &admin_token(),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(store.status_of(id), CandidateStatus::InterviewGeneralManager);
}

#[tokio::test]
async fn approving_hired_candidate_conflicts() {
    let (app, store) = setup_app();
    let id = store.seed(CandidateStatus::Hired, None);

    let resp = app
        .oneshot(post_json(
            &format!("/api/candidates/{}/approve", id),
            &admin_token(),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Can't update recruitment process");
    assert_eq!(store.list_stages(id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn approving_unknown_candidate_is_not_found() {
    let (app, _) = setup_app();
    let resp = app
        .oneshot(post_json(
            &format!("/api/candidates/{}/approve", Uuid::new_v4()),
            &admin_token(),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reject_marks_email_flag() {
    let (app, store) = setup_app();
    let id = store.seed(CandidateStatus::Survey, None);

    let resp = app
        .clone()
        .oneshot(post_json(
            &format!("/api/candidates/{}/reject", id),
            &admin_token(),
            json!({ "note": "not a fit", "send_email_on_reject": true }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(store.status_of(id), CandidateStatus::Rejected);
    let stages = store.list_stages(id).await.unwrap();
    assert!(stages.last().unwrap().send_email_on_reject);

    let resp = app
        .oneshot(post_json(
            &format!("/api/candidates/{}/reject", id),
            &admin_token(),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn batch_approve_moves_every_selected_candidate() {
    let (app, store) = setup_app();
    let ids: Vec<Uuid> = (0..5)
        .map(|_| store.seed(CandidateStatus::Survey, None))
        .collect();
    let untouched = store.seed(CandidateStatus::Survey, None);

    let resp = app
        .oneshot(post_json(
            "/api/recruitment/batch/approve",
            &admin_token(),
            json!({ "ids": ids, "filter_by": "survey", "note": "survey passed" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["target_status"], "coding_test");
    assert_eq!(body["updated"].as_array().unwrap().len(), 5);

    for id in ids {
        assert_eq!(store.status_of(id), CandidateStatus::CodingTest);
    }
    assert_eq!(store.status_of(untouched), CandidateStatus::Survey);
}

#[tokio::test]
async fn batch_refuses_terminal_candidates_outside_the_filter() {
    let (app, store) = setup_app();
    let hired = store.seed(CandidateStatus::Hired, None);
    let rejected = store.seed(CandidateStatus::Rejected, None);

    let resp = app
        .oneshot(post_json(
            "/api/recruitment/batch/approve",
            &admin_token(),
            json!({ "ids": [hired, rejected], "filter_by": "survey" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(store.status_of(hired), CandidateStatus::Hired);
    assert_eq!(store.status_of(rejected), CandidateStatus::Rejected);
    assert_eq!(store.list_stages(hired).await.unwrap().len(), 1);
}

#[tokio::test]
async fn batch_with_mismatched_filter_moves_nobody() {
    let (app, store) = setup_app();
    let in_survey = store.seed(CandidateStatus::Survey, None);
    let still_applied = store.seed(CandidateStatus::Applied, None);

    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/recruitment/batch/approve",
            &admin_token(),
            json!({ "ids": [in_survey, still_applied], "filter_by": "survey" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = body_json(resp).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Can't update recruitment process"));
    assert_eq!(store.status_of(in_survey), CandidateStatus::Survey);
    assert_eq!(store.status_of(still_applied), CandidateStatus::Applied);

    let resp = app
        .oneshot(post_json(
            "/api/recruitment/batch/reject",
            &admin_token(),
            json!({ "ids": [still_applied], "filter_by": "offer" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(store.status_of(still_applied), CandidateStatus::Applied);
}

#[tokio::test]
async fn transition_resolved_from_an_outdated_stage_is_refused() {
    let store = InMemoryStore::default();
    let id = store.seed(CandidateStatus::Rejected, None);

    // approve resolved while the candidate was still in survey
    let outcome = store
        .apply_transition(TransitionRequest {
            ids: vec![id],
            from: ExpectedStage::All(CandidateStatus::Survey),
            note: String::new(),
            target: CandidateStatus::CodingTest,
            send_email_on_reject: false,
            actor: None,
        })
        .await
        .unwrap();
    assert_eq!(outcome.stale, vec![id]);
    assert!(outcome.updated.is_empty());
    assert_eq!(store.status_of(id), CandidateStatus::Rejected);
    assert_eq!(store.list_stages(id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn batch_requires_a_concrete_filter() {
    let (app, store) = setup_app();
    let id = store.seed(CandidateStatus::Applied, None);

    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/recruitment/batch/approve",
            &admin_token(),
            json!({ "ids": [id], "filter_by": "all" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Please specify the recruitment process");

    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/recruitment/batch/reject",
            &admin_token(),
            json!({ "ids": [], "filter_by": "applied" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .oneshot(post_json(
            "/api/recruitment/batch/approve",
            &admin_token(),
            json!({ "ids": [id], "filter_by": "hired" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(store.status_of(id), CandidateStatus::Applied);
}

#[tokio::test]
async fn update_stages_checks_every_edge() {
    let (app, store) = setup_app();
    let a = store.seed(CandidateStatus::Offer, None);
    let b = store.seed(CandidateStatus::Survey, None);

    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/recruitment/update-stages",
            &admin_token(),
            json!({ "id": [a, b], "candidate_status": "hired" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(store.status_of(a), CandidateStatus::Offer);

    let resp = app
        .oneshot(post_json(
            "/api/recruitment/update-stages",
            &admin_token(),
            json!({ "id": [a], "note": "signed", "candidate_status": "hired" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(store.status_of(a), CandidateStatus::Hired);
}

#[tokio::test]
async fn unknown_status_in_body_is_a_bad_request() {
    let (app, store) = setup_app();
    let id = store.seed(CandidateStatus::Survey, None);

    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/recruitment/update-stages",
            &admin_token(),
            json!({ "id": [id], "candidate_status": "on_hold" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("on_hold"));

    let resp = app
        .oneshot(post_json(
            "/api/recruitment/batch/approve",
            &admin_token(),
            json!({ "filter_by": "waiting", "ids": [id] }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.status_of(id), CandidateStatus::Survey);
    assert_eq!(store.list_stages(id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn create_and_list_candidates() {
    let (app, store) = setup_app();
    store.seed(CandidateStatus::Offer, None);

    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/candidates",
            &admin_token(),
            json!({ "name": "Sari Wulandari", "email": "Sari@Example.com", "experience_month": 80 }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["email"], "sari@example.com");
    assert_eq!(created["is_senior"], true);
    assert_eq!(created["processed_status"], "applied");
    assert_eq!(created["stage_order"], 1);

    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/candidates",
            &admin_token(),
            json!({ "name": "", "email": "not-an-email" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .clone()
        .oneshot(get("/api/candidates?filter_by=applied", &admin_token()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_json(resp).await;
    assert_eq!(page["metadata"]["total_items"], 1);

    let resp = app
        .oneshot(get("/api/candidates?sort=progress&per_page=1", &admin_token()))
        .await
        .unwrap();
    let page = body_json(resp).await;
    assert_eq!(page["metadata"]["total_pages"], 2);
    assert_eq!(page["items"][0]["processed_status"], "offer");
}

#[tokio::test]
async fn import_reports_row_failures() {
    let (app, _) = setup_app();

    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/recruitment/import",
            &admin_token(),
            json!([
                { "name": "Budi", "email": "budi@example.com" },
                { "name": "Budi again", "email": "budi@example.com" },
                { "name": "No email" },
                { "name": "Ayu", "email": "ayu@example.com", "experience_month": 12 }
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let report = body_json(resp).await;
    assert_eq!(report["created"].as_array().unwrap().len(), 2);
    let failed = report["failed"].as_array().unwrap();
    assert_eq!(failed.len(), 2);
    assert_eq!(failed[0]["index"], 1);
    assert_eq!(failed[1]["index"], 2);

    let resp = app
        .oneshot(post_json("/api/recruitment/import", &admin_token(), json!([])))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stats_and_dictionaries() {
    let (app, store) = setup_app();
    store.seed(CandidateStatus::Applied, None);
    store.seed(CandidateStatus::Applied, None);
    store.seed(CandidateStatus::Rejected, None);

    let resp = app
        .clone()
        .oneshot(get("/api/recruitment/stats/count", &admin_token()))
        .await
        .unwrap();
    let stats = body_json(resp).await;
    assert_eq!(stats["items"]["applied"], 2);
    assert_eq!(stats["items"]["rejected"], 1);
    assert_eq!(stats["items"]["hired"], 0);
    assert_eq!(stats["items"]["all"], 3);

    let resp = app
        .clone()
        .oneshot(get("/api/recruitment/stages?is_senior=false", &admin_token()))
        .await
        .unwrap();
    let flow = body_json(resp).await;
    assert_eq!(flow["items"].as_array().unwrap().len(), 9);

    let resp = app
        .clone()
        .oneshot(get(
            "/api/recruitment/next?status=coding_test&is_senior=true",
            &admin_token(),
        ))
        .await
        .unwrap();
    let next = body_json(resp).await;
    assert_eq!(next["stage_order"], 5);
    assert_eq!(next["next_status"], "interview_team_lead");

    let resp = app
        .oneshot(get("/api/recruitment/next?status=on_hold", &admin_token()))
        .await
        .unwrap();
    let next = body_json(resp).await;
    assert_eq!(next["stage_order"], 0);
    assert!(next["next_status"].is_null());
}

#[tokio::test]
async fn export_returns_workbook() {
    let (app, store) = setup_app();
    store.seed(CandidateStatus::Survey, None);

    let resp = app
        .oneshot(post_json("/api/recruitment/export", &admin_token(), json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 10 * 1024 * 1024).await.unwrap();
    assert!(bytes.starts_with(b"PK"));
}
