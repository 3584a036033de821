use grade_stats::api::{AppState, router};
use grade_stats::config::InvalidGrades;
use serde_json::{Value, json};
use tokio::net::TcpListener;

async fn spawn_server(state: AppState) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });

    format!("http://{addr}")
}

async fn post(base: &str, path: &str, body: Value) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(format!("{base}{path}"))
        .json(&body)
        .send()
        .await
        .expect("request failed");
    let status = resp.status().as_u16();
    (status, resp.json().await.expect("response is not JSON"))
}

fn class() -> Value {
    json!({
        "ana": {"math": [8, "10"], "art": [5], "music": []},
        "bo": {"math": [6]},
        "cy": {}
    })
}

#[tokio::test]
async fn test_ping() {
    let base = spawn_server(AppState::default()).await;

    for path in ["/ping", "/api/ping"] {
        let resp = reqwest::get(format!("{base}{path}")).await.unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({"ok": true}));
    }
}

#[tokio::test]
async fn test_every_endpoint_and_alias() {
    let base = spawn_server(AppState::default()).await;

    let cases = [
        (
            ["/student-avg", "/api/student-avg", "/api/student_avg"],
            json!({"grades": class(), "student": "ana"}),
            json!({"student": "ana", "student_avg": 7.0}),
        ),
        (
            ["/subject-avg", "/api/subject-avg", "/subject_avg"],
            json!({"grades": class(), "student": "ana", "subject": "math"}),
            json!({"student": "ana", "subject": "math", "subject_avg": 9.0}),
        ),
        (
            ["/students-rank", "/api/students-rank", "/api/students_rank"],
            json!({"grades": class()}),
            json!({"students_rank": [["ana", 7.0], ["bo", 6.0]]}),
        ),
        (
            ["/full-student-data", "/api/full-student-data", "/full_student_data"],
            json!({"grades": class(), "student": "ana"}),
            json!({"full_student_data": {
                "student": "ana",
                "subject_averages": {"math": 9.0, "art": 5.0},
                "overall_average": 7.0
            }}),
        ),
    ];

    for (paths, request, expected) in cases {
        for path in paths {
            let (status, body) = post(&base, path, request.clone()).await;
            assert_eq!(status, 200, "{path}");
            assert_eq!(body, expected, "{path}");
        }
    }
}

#[tokio::test]
async fn test_absent_values_are_null() {
    let base = spawn_server(AppState::default()).await;

    let (_, body) = post(&base, "/student-avg", json!({"grades": class(), "student": "cy"})).await;
    assert_eq!(body["student_avg"], Value::Null);

    let (_, body) = post(
        &base,
        "/subject-avg",
        json!({"grades": class(), "student": "ana", "subject": "history"}),
    )
    .await;
    assert_eq!(body["subject_avg"], Value::Null);

    let (_, body) = post(&base, "/full-student-data", json!({"grades": class(), "student": "zed"})).await;
    assert_eq!(body, json!({"full_student_data": null}));
}

#[tokio::test]
async fn test_invalid_request_is_400() {
    let base = spawn_server(AppState::default()).await;

    for (path, request) in [
        ("/student-avg", json!({"grades": [], "student": "ana"})),
        ("/student-avg", json!({"grades": {}, "student": 1})),
        ("/subject-avg", json!({"grades": {}, "student": "ana", "subject": null})),
        ("/students-rank", json!({"grades": "ana"})),
        ("/full-student-data", json!([1, 2])),
    ] {
        let (status, body) = post(&base, path, request).await;
        assert_eq!(status, 400, "{path}");
        assert_eq!(body, json!({"error": "Invalid request"}));
    }
}

#[tokio::test]
async fn test_body_without_json_content_type_is_accepted() {
    let base = spawn_server(AppState::default()).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/students-rank"))
        .body(r#"{"grades": {"a": {"m": [3]}}}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"students_rank": [["a", 3.0]]}));
}

#[tokio::test]
async fn test_body_over_two_megabytes_is_accepted() {
    let base = spawn_server(AppState::default()).await;

    let grades: Vec<u8> = vec![7; 1_500_000];
    let request = json!({"grades": {"ana": {"math": grades}}});
    assert!(serde_json::to_vec(&request).unwrap().len() > 2 * 1024 * 1024);

    let (status, body) = post(&base, "/students-rank", request).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"students_rank": [["ana", 7.0]]}));
}

#[tokio::test]
async fn test_bad_grade_is_500() {
    let base = spawn_server(AppState::default()).await;

    let mut grades = class();
    grades["bo"]["art"] = json!(["abc"]);

    for path in ["/student-avg", "/students-rank", "/full-student-data"] {
        let (status, body) = post(&base, path, json!({"grades": grades, "student": "ana"})).await;
        assert_eq!(status, 500, "{path}");
        assert_eq!(body["error"], "Server error");
        assert!(body["detail"].as_str().unwrap().contains("abc"));
    }
}

#[tokio::test]
async fn test_skip_policy_computes_around_bad_grades() {
    let base = spawn_server(AppState {
        invalid_grades: InvalidGrades::Skip,
    })
    .await;

    let mut grades = class();
    grades["bo"]["math"] = json!([6, "abc"]);

    let (status, body) = post(&base, "/students-rank", json!({"grades": grades})).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"students_rank": [["ana", 7.0], ["bo", 6.0]]}));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let base = spawn_server(AppState::default()).await;

    let (status, body) = post(&base, "/median", json!({})).await;
    assert_eq!(status, 404);
    assert_eq!(body, json!({"error": "Not found"}));
}
