use chrono::NaiveDate;
use taskmanager_core::db::open_db_in_memory;
use taskmanager_core::model::project::NewProject;
use taskmanager_core::repo::project_repo::ProjectRepository;
use taskmanager_core::{
    NewUserRequest, ServiceError, SqliteStore, UpdateUserRequest, UserRef, UserRole, UserService,
};

fn request(name: &str, email: &str, role: &str) -> NewUserRequest {
    NewUserRequest {
        name: name.to_string(),
        email: email.to_string(),
        role: role.to_string(),
    }
}

#[test]
fn added_user_is_listed_with_unmodified_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteStore::try_new(&conn).unwrap());

    let user = service
        .add(&request("Jane Smith", "jane@example.com", "member"))
        .unwrap();
    let users = service.list(None).unwrap();

    assert_eq!(users, vec![user.clone()]);
    assert_eq!(user.name, "Jane Smith");
    assert_eq!(user.email, "jane@example.com");
    assert_eq!(user.role, UserRole::Member);
}

#[test]
fn duplicate_email_fails_regardless_of_case() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteStore::try_new(&conn).unwrap());

    service
        .add(&request("Jane Smith", "jane@example.com", "member"))
        .unwrap();
    let err = service
        .add(&request("Jane Again", "JANE@example.com", "admin"))
        .unwrap_err();

    assert!(matches!(err, ServiceError::Duplicate { field: "email", .. }));
    assert_eq!(err.kind(), "duplicate");
    assert_eq!(service.list(None).unwrap().len(), 1);
}

#[test]
fn add_rejects_invalid_fields_with_field_names() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteStore::try_new(&conn).unwrap());

    let cases = [
        (request("", "a@example.com", "member"), "name"),
        (request("A", "not-an-email", "member"), "email"),
        (request("A", "a@example.com", "owner"), "role"),
    ];
    for (input, field) in cases {
        let err = service.add(&input).unwrap_err();
        assert_eq!(err.kind(), "validation_error");
        assert_eq!(err.field(), Some(field));
    }
    assert!(service.list(None).unwrap().is_empty());
}

#[test]
fn list_filters_by_role() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteStore::try_new(&conn).unwrap());
    service.add(&request("Admin", "admin@example.com", "admin")).unwrap();
    service.add(&request("John", "john@example.com", "member")).unwrap();
    service.add(&request("Jane", "jane@example.com", "member")).unwrap();

    let members = service.list(Some("member")).unwrap();
    let names: Vec<_> = members.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["John", "Jane"]);
    assert!(service.list(Some("superuser")).is_err());
}

#[test]
fn get_accepts_id_or_email() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteStore::try_new(&conn).unwrap());
    let user = service.add(&request("John", "john@example.com", "member")).unwrap();

    assert_eq!(service.get(&UserRef::Id(user.id)).unwrap(), user);
    assert_eq!(
        service
            .get(&UserRef::Email("John@Example.com".to_string()))
            .unwrap(),
        user
    );
    let err = service.get(&UserRef::Id(user.id + 1)).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: "user", .. }));
}

#[test]
fn update_changes_only_given_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteStore::try_new(&conn).unwrap());
    let user = service.add(&request("John", "john@example.com", "member")).unwrap();

    let updated = service
        .update(
            &UserRef::Id(user.id),
            &UpdateUserRequest {
                name: Some("John Doe".to_string()),
                ..UpdateUserRequest::default()
            },
        )
        .unwrap();
    assert_eq!(updated.name, "John Doe");
    assert_eq!(updated.email, user.email);
    assert_eq!(updated.role, user.role);
}

#[test]
fn update_to_another_users_email_is_duplicate() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteStore::try_new(&conn).unwrap());
    service.add(&request("John", "john@example.com", "member")).unwrap();
    let jane = service.add(&request("Jane", "jane@example.com", "member")).unwrap();

    let err = service
        .update(
            &UserRef::Id(jane.id),
            &UpdateUserRequest {
                email: Some("john@example.com".to_string()),
                ..UpdateUserRequest::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Duplicate { .. }));

    // Re-saving one's own email is not a conflict.
    service
        .update(
            &UserRef::Id(jane.id),
            &UpdateUserRequest {
                email: Some("JANE@example.com".to_string()),
                ..UpdateUserRequest::default()
            },
        )
        .unwrap();
}

#[test]
fn manager_of_a_project_cannot_become_member_or_be_deleted() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let service = UserService::new(store);
    let manager = service
        .add(&request("Project Manager", "pm@example.com", "manager"))
        .unwrap();
    store
        .create_project(&NewProject {
            name: "Website Redesign".to_string(),
            description: String::new(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            manager_id: manager.id,
        })
        .unwrap();

    let err = service
        .update(
            &UserRef::Id(manager.id),
            &UpdateUserRequest {
                role: Some("member".to_string()),
                ..UpdateUserRequest::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), "conflict");

    let promoted = service
        .update(
            &UserRef::Id(manager.id),
            &UpdateUserRequest {
                role: Some("admin".to_string()),
                ..UpdateUserRequest::default()
            },
        )
        .unwrap();
    assert_eq!(promoted.role, UserRole::Admin);

    let err = service.delete(manager.id).unwrap_err();
    assert!(matches!(err, ServiceError::Conflict { entity: "user", .. }));
}

#[test]
fn unreferenced_user_can_be_deleted_once() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteStore::try_new(&conn).unwrap());
    let user = service.add(&request("John", "john@example.com", "member")).unwrap();

    let deleted = service.delete(user.id).unwrap();
    assert_eq!(deleted, user);
    assert!(service.list(None).unwrap().is_empty());

    let err = service.delete(user.id).unwrap_err();
    assert_eq!(err.kind(), "not_found");
}
