//! Integration tests for the resource, schedule, export and log endpoints

use axum::{
    Router,
    http::{Method, StatusCode},
};
use serde_json::{Value, json};

#[path = "test_utils/mod.rs"]
mod test_utils;

use test_utils::{admin_token, execute_sql, request, send, setup_app};

async fn create(app: &Router, token: &str, uri: &str, body: Value) -> Value {
    let (status, created) = send(app, request(Method::POST, uri, Some(token), Some(body))).await;
    assert_eq!(status, StatusCode::CREATED, "POST {uri} failed: {created}");
    created
}

async fn get(app: &Router, token: &str, uri: &str) -> Value {
    let (status, body) = send(app, request(Method::GET, uri, Some(token), None)).await;
    assert_eq!(status, StatusCode::OK, "GET {uri} failed: {body}");
    body
}

/// One teacher, room and subject plus `groups` groups; returns their ids.
async fn seed_resources(app: &Router, token: &str, groups: usize) -> (i64, i64, i64, Vec<i64>) {
    let teacher = create(
        app,
        token,
        "/api/teachers",
        json!({ "last_name": "Rakoto", "first_name": "Jean", "email": "jean.rakoto@univ.mg" }),
    )
    .await;
    let room = create(
        app,
        token,
        "/api/rooms",
        json!({ "name": "B12", "capacity": 40 }),
    )
    .await;
    let subject = create(
        app,
        token,
        "/api/subjects",
        json!({ "name": "Algèbre", "duration_hours": 2 }),
    )
    .await;

    let mut group_ids = Vec::new();
    for index in 1..=groups {
        let group = create(
            app,
            token,
            "/api/groups",
            json!({ "name": format!("L{index} Info"), "student_count": 30 }),
        )
        .await;
        group_ids.push(group["id"].as_i64().unwrap());
    }

    (
        teacher["id"].as_i64().unwrap(),
        room["id"].as_i64().unwrap(),
        subject["id"].as_i64().unwrap(),
        group_ids,
    )
}

fn entry(teacher: i64, group: i64, room: i64, subject: i64, day: &str, start: &str, end: &str) -> Value {
    json!({
        "teacher_id": teacher,
        "group_id": group,
        "room_id": room,
        "subject_id": subject,
        "day": day,
        "start_time": start,
        "end_time": end,
    })
}

#[tokio::test]
async fn test_create_user_writes_exactly_one_log_record() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();
    let seeded_logs = get(&app, &token, "/api/logs").await.as_array().unwrap().len();

    let created = create(
        &app,
        &token,
        "/api/users",
        json!({
            "last_name": "Randria",
            "first_name": "Soa",
            "email": "soa@univ.mg",
            "mot_de_passe": "secret"
        }),
    )
    .await;
    assert_eq!(created["role"], "enseignant");
    assert!(created.get("password_hash").is_none());

    let logs = get(&app, &token, "/api/logs").await;
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), seeded_logs + 1);
    assert_eq!(logs[0]["action"], "user_created");
    assert_eq!(logs[0]["details"], "Added Randria Soa");
    assert_eq!(logs[0]["user"], "Rabe Admin");
    assert_eq!(logs[0]["conflict_resolved"], false);
}

#[tokio::test]
async fn test_duplicate_user_email_conflicts_without_log() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();
    let body = json!({
        "last_name": "Randria",
        "first_name": "Soa",
        "email": "soa@univ.mg",
        "password": "secret"
    });

    create(&app, &token, "/api/users", body.clone()).await;
    let logs_before = get(&app, &token, "/api/logs").await.as_array().unwrap().len();

    let (status, error) = send(&app, request(Method::POST, "/api/users", Some(&token), Some(body))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "CONFLICT");

    let logs_after = get(&app, &token, "/api/logs").await.as_array().unwrap().len();
    assert_eq!(logs_before, logs_after);

    let users = get(&app, &token, "/api/users").await;
    assert_eq!(users.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_role_is_rejected() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/users",
            Some(&token),
            Some(json!({
                "last_name": "X",
                "first_name": "Y",
                "email": "xy@univ.mg",
                "password": "secret",
                "role": "superuser"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_teacher_availability_round_trips_and_lists_subjects() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();
    let availability = json!({ "lundi": ["08:00-12:00"], "mardi": [] });

    let teacher = create(
        &app,
        &token,
        "/api/teachers",
        json!({
            "last_name": "Rakoto",
            "first_name": "Jean",
            "email": "jean.rakoto@univ.mg",
            "availability": availability,
        }),
    )
    .await;
    let teacher_id = teacher["id"].as_i64().unwrap();

    for name in ["Physique", "Algèbre"] {
        let subject = create(
            &app,
            &token,
            "/api/subjects",
            json!({ "name": name, "duration_hours": 2 }),
        )
        .await;
        let uri = format!("/api/teachers/{teacher_id}/subjects");
        let link = json!({ "subject_id": subject["id"] });
        for _ in 0..2 {
            let (status, _) = send(&app, request(Method::POST, &uri, Some(&token), Some(link.clone()))).await;
            assert_eq!(status, StatusCode::NO_CONTENT);
        }
    }

    let teachers = get(&app, &token, "/api/teachers").await;
    let listed = &teachers[0];
    assert_eq!(listed["name"], "Rakoto Jean");
    assert_eq!(listed["availability"], availability);
    assert_eq!(listed["subjects"], json!(["Algèbre", "Physique"]));
}

#[tokio::test]
async fn test_duplicate_teacher_email_conflicts() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();
    let body = json!({ "last_name": "A", "first_name": "B", "email": "ab@univ.mg" });

    create(&app, &token, "/api/teachers", body.clone()).await;
    let (status, _) = send(&app, request(Method::POST, "/api/teachers", Some(&token), Some(body))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_linking_unknown_subject_is_not_found() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();
    let (_, _, _, groups) = seed_resources(&app, &token, 1).await;

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/groups/{}/subjects", groups[0]),
            Some(&token),
            Some(json!({ "subject_id": 999 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_positive_counts_are_rejected() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();

    let cases = [
        ("/api/rooms", json!({ "name": "B12", "capacity": 0 })),
        ("/api/groups", json!({ "name": "L1", "student_count": -3 })),
        ("/api/subjects", json!({ "name": "Algèbre", "duration_hours": 0 })),
    ];
    for (uri, body) in cases {
        let (status, error) = send(&app, request(Method::POST, uri, Some(&token), Some(body))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(error["code"], "VALIDATION_FAILED");
    }

    assert_eq!(get(&app, &token, "/api/rooms").await, json!([]));
    assert_eq!(get(&app, &token, "/api/groups").await, json!([]));
}

#[tokio::test]
async fn test_room_equipment_defaults_to_empty_list() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();

    create(
        &app,
        &token,
        "/api/rooms",
        json!({ "name": "Amphi A", "capacity": 200, "equipment": ["projecteur"] }),
    )
    .await;
    create(&app, &token, "/api/rooms", json!({ "name": "B12", "capacity": 40 })).await;

    let rooms = get(&app, &token, "/api/rooms").await;
    assert_eq!(rooms[0]["equipment"], json!(["projecteur"]));
    assert_eq!(rooms[1]["equipment"], json!([]));
}

#[tokio::test]
async fn test_constraint_target_kind_is_validated() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/constraints",
            Some(&token),
            Some(json!({
                "kind": "indisponibilite",
                "value": "lundi",
                "target_kind": "classroom",
                "target_id": 1
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(get(&app, &token, "/api/constraints").await, json!([]));

    for target_kind in ["teacher", "room"] {
        create(
            &app,
            &token,
            "/api/constraints",
            json!({
                "kind": "indisponibilite",
                "value": "lundi",
                "target_kind": target_kind,
                "target_id": 1
            }),
        )
        .await;
    }

    let rooms_only = get(&app, &token, "/api/constraints?target_kind=room").await;
    assert_eq!(rooms_only.as_array().unwrap().len(), 1);
    assert_eq!(rooms_only[0]["target_kind"], "room");

    let (status, _) = send(
        &app,
        request(Method::GET, "/api/constraints?target_kind=classroom", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_schedule_filter_by_group_and_day() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();
    let (teacher, room, subject, groups) = seed_resources(&app, &token, 3).await;
    assert_eq!(groups[2], 3);

    for body in [
        entry(teacher, 3, room, subject, "2024-05-10", "14:00", "16:00"),
        entry(teacher, 3, room, subject, "2024-05-10", "08:00", "10:00"),
        entry(teacher, 3, room, subject, "2024-05-11", "08:00", "10:00"),
        entry(teacher, 1, room, subject, "2024-05-10", "10:00", "12:00"),
    ] {
        create(&app, &token, "/api/schedule", body).await;
    }

    let listed = get(&app, &token, "/api/schedule?group_id=3&day=2024-05-10").await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["start_time"], "08:00");
    assert_eq!(listed[0]["time_range"], "08:00 - 10:00");
    assert_eq!(listed[1]["start_time"], "14:00");
    for item in listed {
        assert_eq!(item["group_id"], 3);
        assert_eq!(item["day"], "2024-05-10");
        assert_eq!(item["weekday"], "Friday");
        assert_eq!(item["subject"], "Algèbre");
        assert_eq!(item["teacher"], "Rakoto Jean");
    }

    let by_teacher = get(&app, &token, &format!("/api/schedule?teacher_id={teacher}")).await;
    assert_eq!(by_teacher.as_array().unwrap().len(), 4);

    let (status, _) = send(
        &app,
        request(Method::GET, "/api/schedule?day=10/05/2024", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_schedule_entry_validation() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();
    let (teacher, room, subject, groups) = seed_resources(&app, &token, 1).await;
    let group = groups[0];

    let invalid = [
        entry(teacher, group, room, subject, "2024-05-10", "10:00", "10:00"),
        entry(teacher, group, room, subject, "2024-05-10", "10:00", "09:00"),
        entry(teacher, group, room, subject, "10-05-2024", "08:00", "10:00"),
        entry(teacher, group, room, subject, "2024-05-10", "8h", "10:00"),
        entry(999, group, room, subject, "2024-05-10", "08:00", "10:00"),
        entry(teacher, group, 999, subject, "2024-05-10", "08:00", "10:00"),
    ];
    for body in invalid {
        let (status, _) = send(&app, request(Method::POST, "/api/schedule", Some(&token), Some(body.clone()))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    }

    assert_eq!(get(&app, &token, "/api/schedule").await, json!([]));
}

#[tokio::test]
async fn test_restrict_delete_keeps_referenced_rows() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();
    let (teacher, room, subject, groups) = seed_resources(&app, &token, 1).await;
    create(
        &app,
        &token,
        "/api/schedule",
        entry(teacher, groups[0], room, subject, "2024-05-10", "08:00", "10:00"),
    )
    .await;

    for uri in [
        format!("/api/rooms/{room}"),
        format!("/api/teachers/{teacher}"),
        format!("/api/groups/{}", groups[0]),
        format!("/api/subjects/{subject}"),
    ] {
        let (status, error) = send(&app, request(Method::DELETE, &uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::CONFLICT, "{uri}");
        assert_eq!(error["code"], "CONFLICT");
    }

    assert_eq!(get(&app, &token, "/api/rooms").await.as_array().unwrap().len(), 1);
    assert_eq!(get(&app, &token, "/api/schedule").await.as_array().unwrap().len(), 1);

    let spare = create(&app, &token, "/api/rooms", json!({ "name": "C3", "capacity": 20 })).await;
    let (status, _) = send(
        &app,
        request(Method::DELETE, &format!("/api/rooms/{}", spare["id"]), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, request(Method::DELETE, "/api/rooms/999", Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_subject_removes_its_links() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();
    let (teacher, _, subject, groups) = seed_resources(&app, &token, 1).await;
    let link = json!({ "subject_id": subject });

    for uri in [
        format!("/api/teachers/{teacher}/subjects"),
        format!("/api/groups/{}/subjects", groups[0]),
    ] {
        let (status, _) = send(&app, request(Method::POST, &uri, Some(&token), Some(link.clone()))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (status, _) = send(
        &app,
        request(Method::DELETE, &format!("/api/subjects/{subject}"), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert_eq!(get(&app, &token, "/api/teachers").await[0]["subjects"], json!([]));
    assert_eq!(get(&app, &token, "/api/groups").await[0]["subjects"], json!([]));
}

#[tokio::test]
async fn test_dangling_reference_reads_as_inconnu() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();
    let (teacher, room, subject, groups) = seed_resources(&app, &token, 1).await;
    create(
        &app,
        &token,
        "/api/schedule",
        entry(teacher, groups[0], room, subject, "2024-05-10", "08:00", "10:00"),
    )
    .await;

    execute_sql(&state.db, &format!("DELETE FROM subjects WHERE id = {subject}"))
        .await
        .unwrap();
    execute_sql(&state.db, &format!("DELETE FROM teachers WHERE id = {teacher}"))
        .await
        .unwrap();

    let listed = get(&app, &token, "/api/schedule").await;
    assert_eq!(listed[0]["subject"], "Inconnu");
    assert_eq!(listed[0]["teacher"], "Inconnu");
    assert_eq!(listed[0]["room"], "B12");
}

#[tokio::test]
async fn test_export_is_ordered_by_day_then_start_time() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();
    let (teacher, room, subject, groups) = seed_resources(&app, &token, 2).await;
    let group = groups[0];

    for body in [
        entry(teacher, group, room, subject, "2024-05-11", "08:00", "10:00"),
        entry(teacher, group, room, subject, "2024-05-10", "14:00", "16:00"),
        entry(teacher, groups[1], room, subject, "2024-05-09", "08:00", "10:00"),
        entry(teacher, group, room, subject, "2024-05-10", "08:00", "10:00"),
    ] {
        create(&app, &token, "/api/schedule", body).await;
    }

    let export = get(&app, &token, &format!("/api/export/schedule?group_id={group}")).await;
    assert_eq!(export["group_id"], group);
    assert_eq!(export["group_name"], "L1 Info");

    let order: Vec<(String, String)> = export["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["day"].as_str().unwrap().to_string(),
                e["start_time"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        order,
        vec![
            ("2024-05-10".to_string(), "08:00".to_string()),
            ("2024-05-10".to_string(), "14:00".to_string()),
            ("2024-05-11".to_string(), "08:00".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_export_requires_known_group() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();

    let (status, _) = send(&app, request(Method::GET, "/api/export/schedule", Some(&token), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        request(Method::GET, "/api/export/schedule?group_id=42", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();

    let req = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/rooms")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let (status, error) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_constraint_value_is_stored_verbatim() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();

    let created = create(
        &app,
        &token,
        "/api/constraints",
        json!({
            "kind": "indisponibilite",
            "value": "  lundi\n",
            "target_kind": "teacher",
            "target_id": 1
        }),
    )
    .await;
    assert_eq!(created["value"], "  lundi\n");
    assert_eq!(get(&app, &token, "/api/constraints").await[0]["value"], "  lundi\n");

    let (status, error) = send(
        &app,
        request(
            Method::POST,
            "/api/constraints",
            Some(&token),
            Some(json!({
                "kind": "indisponibilite",
                "value": " \n ",
                "target_kind": "teacher",
                "target_id": 1
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_over_long_name_is_rejected() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();

    let (status, error) = send(
        &app,
        request(
            Method::POST,
            "/api/rooms",
            Some(&token),
            Some(json!({ "name": "x".repeat(51), "capacity": 20 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_FAILED");
    assert_eq!(get(&app, &token, "/api/rooms").await, json!([]));
}

#[tokio::test]
async fn test_non_numeric_path_id_is_json_bad_request() {
    let (app, state) = setup_app().await.unwrap();
    let token = admin_token(&state).await.unwrap();

    for uri in [
        "/api/rooms/abc",
        "/api/teachers/abc",
        "/api/groups/abc",
        "/api/subjects/abc",
    ] {
        let (status, error) = send(&app, request(Method::DELETE, uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(error["code"], "VALIDATION_FAILED", "{uri}");
    }

    let (status, error) = send(
        &app,
        request(
            Method::POST,
            "/api/teachers/abc/subjects",
            Some(&token),
            Some(json!({ "subject_id": 1 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_FAILED");
}
