use chrono::NaiveDate;
use rusqlite::Connection;
use taskmanager_core::db::open_db_in_memory;
use taskmanager_core::model::task::NewTask;
use taskmanager_core::repo::task_repo::TaskRepository;
use taskmanager_core::{
    NewProjectRequest, NewUserRequest, ProjectService, ServiceError, ServicePolicy, SqliteStore,
    UpdateProjectRequest, UserService,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seed_users(conn: &Connection) {
    let users = UserService::new(SqliteStore::try_new(conn).unwrap());
    for (name, email, role) in [
        ("Admin", "admin@example.com", "admin"),
        ("Project Manager", "pm@example.com", "manager"),
        ("John Doe", "john@example.com", "member"),
    ] {
        users
            .add(&NewUserRequest {
                name: name.to_string(),
                email: email.to_string(),
                role: role.to_string(),
            })
            .unwrap();
    }
}

fn website_redesign() -> NewProjectRequest {
    NewProjectRequest {
        name: "Website Redesign".to_string(),
        description: Some("Redesign the company website".to_string()),
        start_date: "2024-01-01".to_string(),
        end_date: "2024-03-31".to_string(),
        manager_email: "pm@example.com".to_string(),
    }
}

#[test]
fn add_resolves_manager_and_lists_display_name() {
    let conn = open_db_in_memory().unwrap();
    seed_users(&conn);
    let service = ProjectService::new(SqliteStore::try_new(&conn).unwrap(), ServicePolicy::default());

    let project = service.add(&website_redesign()).unwrap();
    assert_eq!(project.name, "Website Redesign");
    assert_eq!(project.start_date, date(2024, 1, 1));
    assert_eq!(project.end_date, date(2024, 3, 31));

    let listed = service.list(None, date(2024, 2, 1)).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].project, project);
    assert_eq!(listed[0].manager_name.as_deref(), Some("Project Manager"));
}

#[test]
fn add_rejects_unknown_manager_member_manager_and_inverted_period() {
    let conn = open_db_in_memory().unwrap();
    seed_users(&conn);
    let service = ProjectService::new(SqliteStore::try_new(&conn).unwrap(), ServicePolicy::default());

    let err = service
        .add(&NewProjectRequest {
            manager_email: "ghost@example.com".to_string(),
            ..website_redesign()
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: "user", .. }));

    let err = service
        .add(&NewProjectRequest {
            manager_email: "john@example.com".to_string(),
            ..website_redesign()
        })
        .unwrap_err();
    assert_eq!(err.field(), Some("manager"));

    let err = service
        .add(&NewProjectRequest {
            end_date: "2023-12-31".to_string(),
            ..website_redesign()
        })
        .unwrap_err();
    assert_eq!(err.field(), Some("end_date"));

    let err = service
        .add(&NewProjectRequest {
            start_date: "01/01/2024".to_string(),
            ..website_redesign()
        })
        .unwrap_err();
    assert_eq!(err.field(), Some("start_date"));

    assert!(service.list(None, date(2024, 2, 1)).unwrap().is_empty());
}

#[test]
fn add_stops_at_max_projects() {
    let conn = open_db_in_memory().unwrap();
    seed_users(&conn);
    let policy = ServicePolicy {
        max_projects: 1,
        ..ServicePolicy::default()
    };
    let service = ProjectService::new(SqliteStore::try_new(&conn).unwrap(), policy);

    service.add(&website_redesign()).unwrap();
    let err = service
        .add(&NewProjectRequest {
            name: "Mobile App".to_string(),
            ..website_redesign()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::LimitExceeded {
            setting: "max_projects",
            limit: 1,
            ..
        }
    ));
}

#[test]
fn list_filters_by_timeline_state() {
    let conn = open_db_in_memory().unwrap();
    seed_users(&conn);
    let service = ProjectService::new(SqliteStore::try_new(&conn).unwrap(), ServicePolicy::default());
    for (name, start, end) in [
        ("Past", "2023-01-01", "2023-06-30"),
        ("Current", "2024-01-01", "2024-03-31"),
        ("Future", "2024-06-01", "2024-12-31"),
    ] {
        service
            .add(&NewProjectRequest {
                name: name.to_string(),
                description: None,
                start_date: start.to_string(),
                end_date: end.to_string(),
                manager_email: "admin@example.com".to_string(),
            })
            .unwrap();
    }
    let today = date(2024, 2, 15);
    let names = |state: Option<&str>| -> Vec<String> {
        service
            .list(state, today)
            .unwrap()
            .into_iter()
            .map(|summary| summary.project.name)
            .collect()
    };

    assert_eq!(names(None), vec!["Past", "Current", "Future"]);
    assert_eq!(names(Some("active")), vec!["Current"]);
    assert_eq!(names(Some("completed")), vec!["Past"]);
    assert_eq!(names(Some("upcoming")), vec!["Future"]);
    assert_eq!(
        service.list(Some("archived"), today).unwrap_err().field(),
        Some("state")
    );
}

#[test]
fn update_extends_end_date_and_rechecks_period() {
    let conn = open_db_in_memory().unwrap();
    seed_users(&conn);
    let service = ProjectService::new(SqliteStore::try_new(&conn).unwrap(), ServicePolicy::default());
    let project = service.add(&website_redesign()).unwrap();

    let extended = service
        .update(
            project.id,
            &UpdateProjectRequest {
                end_date: Some("2024-04-30".to_string()),
                ..UpdateProjectRequest::default()
            },
        )
        .unwrap();
    assert_eq!(extended.end_date, date(2024, 4, 30));
    assert_eq!(extended.name, project.name);

    let err = service
        .update(
            project.id,
            &UpdateProjectRequest {
                start_date: Some("2024-05-01".to_string()),
                ..UpdateProjectRequest::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.field(), Some("end_date"));
    assert_eq!(service.get(project.id).unwrap(), extended);
}

#[test]
fn update_reassigns_manager_only_to_managing_roles() {
    let conn = open_db_in_memory().unwrap();
    seed_users(&conn);
    let service = ProjectService::new(SqliteStore::try_new(&conn).unwrap(), ServicePolicy::default());
    let project = service.add(&website_redesign()).unwrap();

    let err = service
        .update(
            project.id,
            &UpdateProjectRequest {
                manager_email: Some("john@example.com".to_string()),
                ..UpdateProjectRequest::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), "validation_error");

    let moved = service
        .update(
            project.id,
            &UpdateProjectRequest {
                manager_email: Some("admin@example.com".to_string()),
                ..UpdateProjectRequest::default()
            },
        )
        .unwrap();
    let listed = service.list(None, date(2024, 2, 1)).unwrap();
    assert_eq!(listed[0].project, moved);
    assert_eq!(listed[0].manager_name.as_deref(), Some("Admin"));

    let err = service
        .update(999, &UpdateProjectRequest::default())
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: "project", .. }));
}

#[test]
fn delete_is_blocked_while_tasks_reference_the_project() {
    let conn = open_db_in_memory().unwrap();
    seed_users(&conn);
    let store = SqliteStore::try_new(&conn).unwrap();
    let service = ProjectService::new(store, ServicePolicy::default());
    let project = service.add(&website_redesign()).unwrap();
    let task_id = store
        .create_task(&NewTask {
            title: "Design Homepage Mockup".to_string(),
            description: String::new(),
            due_date: date(2024, 1, 15),
            priority: 1,
            assigned_to: 3,
            project_id: project.id,
        })
        .unwrap();

    let err = service.delete(project.id).unwrap_err();
    assert_eq!(err.kind(), "conflict");

    store.delete_task(task_id).unwrap();
    assert_eq!(service.delete(project.id).unwrap(), project);
    assert_eq!(service.get(project.id).unwrap_err().kind(), "not_found");
}
