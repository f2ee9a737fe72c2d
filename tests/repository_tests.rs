//! Repository tests against in-memory SQLite

use chrono::{NaiveDate, NaiveTime};
use timetable::error::RepositoryError;
use timetable::password::PasswordHasher;
use timetable::repositories::{
    ConstraintRepository, GroupRepository, LogRepository, NewConstraint, NewGroup, NewRoom,
    NewScheduleEntry, NewSubject, NewTeacher, NewUser, RoomRepository, ScheduleFilter,
    ScheduleRepository, SubjectRepository, TeacherRepository, UserRepository,
};

#[path = "test_utils/mod.rs"]
mod test_utils;

fn hasher() -> PasswordHasher {
    PasswordHasher::new(1000)
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        last_name: "Rasoa".to_string(),
        first_name: "Lova".to_string(),
        email: email.to_string(),
        password: "pa55word".to_string(),
        role: None,
    }
}

struct Fixture {
    teacher_id: i32,
    room_id: i32,
    subject_id: i32,
    group_id: i32,
}

async fn fixture(db: &sea_orm::DatabaseConnection) -> Fixture {
    let teacher = TeacherRepository::new(db)
        .create_teacher(NewTeacher {
            last_name: "Rakoto".to_string(),
            first_name: "Jean".to_string(),
            email: "jean@univ.mg".to_string(),
            availability: None,
            preferences: None,
        })
        .await
        .unwrap();
    let room = RoomRepository::new(db)
        .create_room(NewRoom {
            name: "B12".to_string(),
            capacity: 40,
            equipment: None,
        })
        .await
        .unwrap();
    let subject = SubjectRepository::new(db)
        .create_subject(NewSubject {
            name: "Algèbre".to_string(),
            duration_hours: 2,
        })
        .await
        .unwrap();
    let group = GroupRepository::new(db)
        .create_group(NewGroup {
            name: "L1 Info".to_string(),
            student_count: 30,
        })
        .await
        .unwrap();

    Fixture {
        teacher_id: teacher.id,
        room_id: room.id,
        subject_id: subject.id,
        group_id: group.id,
    }
}

fn slot(f: &Fixture, day: (i32, u32, u32), start: u32, end: u32) -> NewScheduleEntry {
    NewScheduleEntry {
        teacher_id: f.teacher_id,
        group_id: f.group_id,
        room_id: f.room_id,
        subject_id: f.subject_id,
        day: NaiveDate::from_ymd_opt(day.0, day.1, day.2).unwrap(),
        start_time: NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn test_created_user_stores_hash_not_password() {
    let db = test_utils::setup_test_db().await.unwrap();
    let users = UserRepository::new(&db);

    let user = users
        .create_user(&hasher(), new_user("lova@univ.mg"))
        .await
        .unwrap();

    assert_ne!(user.password_hash, "pa55word");
    assert!(user.password_hash.starts_with("pbkdf2:sha256:1000$"));
    assert!(hasher().verify("pa55word", &user.password_hash));
    assert!(!hasher().verify("pa55word!", &user.password_hash));
    assert_eq!(user.role.as_str(), "enseignant");
}

#[tokio::test]
async fn test_failed_user_create_writes_no_log() {
    let db = test_utils::setup_test_db().await.unwrap();
    let users = UserRepository::new(&db);
    let logs = LogRepository::new(&db);

    users
        .create_user(&hasher(), new_user("lova@univ.mg"))
        .await
        .unwrap();
    assert_eq!(logs.list_logs().await.unwrap().len(), 1);

    let duplicate = users
        .create_user(&hasher(), new_user("lova@univ.mg"))
        .await
        .unwrap_err();
    assert!(matches!(duplicate, RepositoryError::Conflict(_)));

    let invalid = users
        .create_user(&hasher(), new_user("not-an-email"))
        .await
        .unwrap_err();
    assert!(matches!(invalid, RepositoryError::Validation(_)));

    let records = logs.list_logs().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].action, "user_created");
    assert_eq!(records[0].details.as_deref(), Some("Added Rasoa Lova"));
    assert!(!records[0].conflict_resolved);
}

#[tokio::test]
async fn test_record_login_for_missing_user_is_not_found() {
    let db = test_utils::setup_test_db().await.unwrap();

    let err = UserRepository::new(&db).record_login(41).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
}

#[tokio::test]
async fn test_room_delete_is_restricted_while_scheduled() {
    let db = test_utils::setup_test_db().await.unwrap();
    let f = fixture(&db).await;
    let schedule = ScheduleRepository::new(&db);
    let entry = schedule
        .create_entry(slot(&f, (2024, 5, 10), 8, 10))
        .await
        .unwrap();

    let err = RoomRepository::new(&db)
        .delete_room(f.room_id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    assert_eq!(RoomRepository::new(&db).list_rooms().await.unwrap().len(), 1);
    let listing = schedule.find_listing(entry.id).await.unwrap().unwrap();
    assert_eq!(listing.room_name, "B12");
}

#[tokio::test]
async fn test_group_delete_removes_subject_links() {
    let db = test_utils::setup_test_db().await.unwrap();
    let f = fixture(&db).await;
    let groups = GroupRepository::new(&db);

    groups.assign_subject(f.group_id, f.subject_id).await.unwrap();
    groups.assign_subject(f.group_id, f.subject_id).await.unwrap();
    let listed = groups.list_groups().await.unwrap();
    assert_eq!(listed[0].subjects, vec!["Algèbre".to_string()]);

    groups.delete_group(f.group_id).await.unwrap();
    assert!(groups.find_group(f.group_id).await.unwrap().is_none());

    let err = groups.delete_group(f.group_id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
}

#[tokio::test]
async fn test_schedule_listing_filters_combine() {
    let db = test_utils::setup_test_db().await.unwrap();
    let f = fixture(&db).await;
    let schedule = ScheduleRepository::new(&db);

    schedule
        .create_entry(slot(&f, (2024, 5, 10), 14, 16))
        .await
        .unwrap();
    schedule
        .create_entry(slot(&f, (2024, 5, 10), 8, 10))
        .await
        .unwrap();
    schedule
        .create_entry(slot(&f, (2024, 5, 13), 8, 10))
        .await
        .unwrap();

    let friday = schedule
        .list_entries(ScheduleFilter {
            group_id: Some(f.group_id),
            day: NaiveDate::from_ymd_opt(2024, 5, 10),
            ..Default::default()
        })
        .await
        .unwrap();
    let starts: Vec<u32> = friday
        .iter()
        .map(|l| l.start_time.format("%H").to_string().parse().unwrap())
        .collect();
    assert_eq!(starts, vec![8, 14]);
    assert!(friday.iter().all(|l| l.teacher_name == "Rakoto Jean"));

    let other_teacher = schedule
        .list_entries(ScheduleFilter {
            teacher_id: Some(f.teacher_id + 100),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(other_teacher.is_empty());
}

#[tokio::test]
async fn test_schedule_entry_rejects_inverted_range() {
    let db = test_utils::setup_test_db().await.unwrap();
    let f = fixture(&db).await;

    let err = ScheduleRepository::new(&db)
        .create_entry(slot(&f, (2024, 5, 10), 10, 8))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));
}

#[tokio::test]
async fn test_names_longer_than_their_column_are_rejected() {
    let db = test_utils::setup_test_db().await.unwrap();
    let rooms = RoomRepository::new(&db);

    let err = rooms
        .create_room(NewRoom {
            name: "x".repeat(51),
            capacity: 20,
            equipment: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));

    rooms
        .create_room(NewRoom {
            name: "é".repeat(50),
            capacity: 20,
            equipment: None,
        })
        .await
        .unwrap();

    let err = SubjectRepository::new(&db)
        .create_subject(NewSubject {
            name: "s".repeat(101),
            duration_hours: 2,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));

    let long_email = format!("{}@univ.mg", "a".repeat(93));
    let err = UserRepository::new(&db)
        .create_user(&hasher(), new_user(&long_email))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));
    assert!(LogRepository::new(&db).list_logs().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_constraint_value_is_kept_as_given() {
    let db = test_utils::setup_test_db().await.unwrap();
    let constraints = ConstraintRepository::new(&db);

    let created = constraints
        .create_constraint(NewConstraint {
            kind: " indisponibilite ".to_string(),
            value: "  lundi 08:00-10:00\n".to_string(),
            target_kind: "room".to_string(),
            target_id: 3,
        })
        .await
        .unwrap();
    assert_eq!(created.kind, "indisponibilite");
    assert_eq!(created.value, "  lundi 08:00-10:00\n");

    let err = constraints
        .create_constraint(NewConstraint {
            kind: "indisponibilite".to_string(),
            value: "\t ".to_string(),
            target_kind: "room".to_string(),
            target_id: 3,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));
}

#[tokio::test]
async fn test_unscheduled_teacher_delete_removes_row_and_links() {
    let db = test_utils::setup_test_db().await.unwrap();
    let f = fixture(&db).await;
    let teachers = TeacherRepository::new(&db);

    teachers.assign_subject(f.teacher_id, f.subject_id).await.unwrap();
    let found = teachers.find_teacher(f.teacher_id).await.unwrap().unwrap();
    assert_eq!(found.email, "jean@univ.mg");

    teachers.delete_teacher(f.teacher_id).await.unwrap();
    assert!(teachers.find_teacher(f.teacher_id).await.unwrap().is_none());
    assert!(teachers.list_teachers().await.unwrap().is_empty());

    let err = teachers.delete_teacher(f.teacher_id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
}

#[tokio::test]
async fn test_foreign_key_restrict_surfaces_as_conflict() {
    use sea_orm::EntityTrait;
    use timetable::models::Room;

    let db = test_utils::setup_test_db().await.unwrap();
    test_utils::execute_sql(&db, "PRAGMA foreign_keys = ON")
        .await
        .unwrap();
    let f = fixture(&db).await;
    ScheduleRepository::new(&db)
        .create_entry(slot(&f, (2024, 5, 10), 8, 10))
        .await
        .unwrap();

    // Bypass the repository's own reference check so the store's RESTRICT fires.
    let err = Room::delete_by_id(f.room_id)
        .exec(&db)
        .await
        .map_err(RepositoryError::database_error)
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)), "{err:?}");
    assert_eq!(RoomRepository::new(&db).list_rooms().await.unwrap().len(), 1);
}
