//! Integration tests for forge-db
//!
//! Runs the organization store against real SQLite databases, in memory
//! and, for concurrency tests, on a temporary file

use chrono::{DateTime, Duration, TimeZone, Utc};
use forge_db::entities::prelude::*;
use forge_db::entities::{org_user, team};
use forge_db::{
    connect, migrate, DatabaseConfig, NameError, NameRegistry, OrgError, OrgLookup,
    Organizations, Users,
};
use forge_org::{
    AccessMode, AccountType, CreateOrganizationOptions, FixedClock, ListOrganizationsOptions,
    NamePolicy, NameReason, OrgOrder, Organization, Pagination,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use std::sync::Arc;
use tempfile::TempDir;

fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// Helper to create migrated stores sharing one in-memory database
async fn setup() -> (Organizations, Users) {
    let db = connect(&DatabaseConfig::in_memory())
        .await
        .expect("Failed to connect to in-memory database");
    migrate(&db).await.expect("Failed to run migrations");

    let clock = Arc::new(FixedClock::new(created_at()));
    let orgs = Organizations::new(db.clone()).with_clock(clock.clone());
    let users = Users::new(db).with_clock(clock);
    (orgs, users)
}

/// Helper for stores on a SQLite file behind a multi-connection pool
async fn setup_file_backed(dir: &TempDir) -> (Organizations, Users) {
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", dir.path().join("forge.db").display()),
        max_connections: 8,
        ..Default::default()
    };
    let db = connect(&config)
        .await
        .expect("Failed to connect to file database");
    migrate(&db).await.expect("Failed to run migrations");

    let clock = Arc::new(FixedClock::new(created_at()));
    let orgs = Organizations::new(db.clone()).with_clock(clock.clone());
    let users = Users::new(db).with_clock(clock);
    (orgs, users)
}

/// Row counts of (users, teams, team_users, org_users)
async fn table_counts(db: &DatabaseConnection) -> (u64, u64, u64, u64) {
    (
        User::find().count(db).await.unwrap(),
        Team::find().count(db).await.unwrap(),
        TeamUser::find().count(db).await.unwrap(),
        OrgUser::find().count(db).await.unwrap(),
    )
}

fn names(orgs: &[Organization]) -> Vec<&str> {
    orgs.iter().map(|o| o.name.as_str()).collect()
}

/// Put `user_id` on the Owners team without going through the store
async fn make_owner(orgs: &Organizations, org_id: i64, user_id: i64) {
    let db = orgs.connection();
    orgs.add_member(org_id, user_id).await.unwrap();

    let owners = orgs.owner_team(org_id).await.unwrap();
    forge_db::entities::team_user::ActiveModel {
        org_id: Set(org_id),
        team_id: Set(owners.id),
        uid: Set(user_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    let mut team: team::ActiveModel = Team::find_by_id(owners.id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .into();
    team.num_members = Set(owners.num_members + 1);
    team.update(db).await.unwrap();

    let mut membership: org_user::ActiveModel = OrgUser::find()
        .filter(org_user::Column::OrgId.eq(org_id))
        .filter(org_user::Column::Uid.eq(user_id))
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .into();
    membership.is_owner = Set(true);
    membership.num_teams = Set(1);
    membership.update(db).await.unwrap();
}

#[tokio::test]
async fn test_create_organization() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();

    let opts = CreateOrganizationOptions::default()
        .with_full_name("Acme Corporation")
        .with_email("hello@acme.test")
        .with_location("Earth")
        .with_website("https://acme.test")
        .with_description("We make everything");
    let acme = orgs.create("Acme", alice.id, opts).await.unwrap();

    assert_eq!(acme.name, "Acme");
    assert_eq!(acme.lower_name, "acme");
    assert_eq!(acme.account_type, AccountType::Organization);
    assert_eq!(acme.full_name, "Acme Corporation");
    assert_eq!(acme.email, "hello@acme.test");
    assert_eq!(acme.location, "Earth");
    assert_eq!(acme.website, "https://acme.test");
    assert_eq!(acme.description, "We make everything");
    assert_eq!(acme.created_at, created_at());
    assert_eq!(acme.updated_at, created_at());

    let found = orgs.get_by_name("ACME").await.unwrap();
    assert_eq!(found, acme);
    assert_eq!(orgs.get_by_id(acme.id).await.unwrap(), acme);

    // One of each row
    assert_eq!(table_counts(orgs.connection()).await, (2, 1, 1, 1));
}

#[tokio::test]
async fn test_create_defaults() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();

    orgs.create("acme", alice.id, Default::default())
        .await
        .unwrap();

    let acme = orgs.get_by_name("acme").await.unwrap();
    assert_eq!(acme.num_teams, 1);
    assert_eq!(acme.num_members, 1);
    assert_eq!(acme.max_repo_creation, -1);
    assert!(acme.has_unlimited_repo_creation());
    assert_eq!(acme.full_name, "");
    assert_eq!(acme.display_name(), "acme");
}

#[tokio::test]
async fn test_create_sets_up_owner_team() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();
    let acme = orgs
        .create("acme", alice.id, Default::default())
        .await
        .unwrap();

    let owners = orgs.owner_team(acme.id).await.unwrap();
    assert!(owners.is_owner_team());
    assert_eq!(owners.name, "Owners");
    assert_eq!(owners.authorize, AccessMode::Owner);
    assert_eq!(owners.num_members, 1);

    let teams = orgs.teams(acme.id).await.unwrap();
    assert_eq!(teams, vec![owners.clone()]);

    let membership = orgs.membership(acme.id, alice.id).await.unwrap().unwrap();
    assert!(membership.is_owner);
    assert!(!membership.is_public);
    assert_eq!(membership.num_teams, 1);

    let team_memberships = orgs.team_memberships(acme.id, alice.id).await.unwrap();
    assert_eq!(team_memberships.len(), 1);
    assert_eq!(team_memberships[0].team_id, owners.id);

    assert!(orgs.is_member(acme.id, alice.id).await.unwrap());
    assert!(orgs.is_owner(acme.id, alice.id).await.unwrap());
    assert!(!orgs.is_public_member(acme.id, alice.id).await.unwrap());
}

#[tokio::test]
async fn test_create_rejects_disallowed_names() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();

    match orgs.create("-", alice.id, Default::default()).await {
        Err(OrgError::NameNotAllowed(e)) => {
            assert_eq!(e.reason, NameReason::Reserved);
            assert_eq!(e.value(), "-");
        }
        other => panic!("expected NameNotAllowed, got {:?}", other),
    }

    let cases = [
        ("", NameReason::Empty),
        ("Explore", NameReason::Reserved),
        ("acme.keys", NameReason::Reserved),
        ("acme corp", NameReason::InvalidCharacters),
        ("a-very-long-organization-name-that-overflows", NameReason::TooLong),
    ];
    for (name, reason) in cases {
        match orgs.create(name, alice.id, Default::default()).await {
            Err(OrgError::NameNotAllowed(e)) => assert_eq!(e.reason, reason, "{}", name),
            other => panic!("expected NameNotAllowed for {:?}, got {:?}", name, other),
        }
    }

    assert_eq!(orgs.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_rejects_taken_names() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();

    let result = orgs.create("alice", alice.id, Default::default()).await;
    assert!(matches!(
        result,
        Err(OrgError::OrganizationAlreadyExist { ref name }) if name == "alice"
    ));

    let result = orgs.create("ALICE", alice.id, Default::default()).await;
    assert!(matches!(result, Err(OrgError::OrganizationAlreadyExist { .. })));

    orgs.create("acme", alice.id, Default::default())
        .await
        .unwrap();
    let result = orgs.create("Acme", alice.id, Default::default()).await;
    assert!(matches!(result, Err(OrgError::OrganizationAlreadyExist { .. })));

    // Users draw from the same namespace
    let result = users.create("ACME", "someone@example.com").await;
    assert!(matches!(result, Err(OrgError::UserAlreadyExist { .. })));

    assert_eq!(orgs.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_failed_create_leaves_no_rows() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();
    let before = table_counts(orgs.connection()).await;

    let result = orgs.create("acme", 9999, Default::default()).await;
    assert!(matches!(result, Err(OrgError::UserNotExist { id: 9999 })));
    assert_eq!(table_counts(orgs.connection()).await, before);

    let result = orgs.create("admin", alice.id, Default::default()).await;
    assert!(matches!(result, Err(OrgError::NameNotAllowed(_))));
    assert_eq!(table_counts(orgs.connection()).await, before);

    // The name was never taken
    let acme = orgs
        .create("acme", alice.id, Default::default())
        .await
        .unwrap();
    assert_eq!(acme.num_members, 1);
}

#[tokio::test]
async fn test_create_rolls_back_when_owner_team_insert_fails() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();
    let before = table_counts(orgs.connection()).await;

    orgs.connection()
        .execute_unprepared(
            "CREATE TRIGGER block_teams BEFORE INSERT ON teams \
             BEGIN SELECT RAISE(ABORT, 'teams are blocked'); END;",
        )
        .await
        .unwrap();

    let err = orgs
        .create("acme", alice.id, Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, OrgError::Database(_)));
    assert!(err.is_server_error());
    assert_eq!(table_counts(orgs.connection()).await, before);
    assert!(orgs.get_by_name("acme").await.unwrap_err().is_not_found());

    orgs.connection()
        .execute_unprepared("DROP TRIGGER block_teams;")
        .await
        .unwrap();

    // The account row was rolled back, so the name is still free
    let acme = orgs
        .create("acme", alice.id, Default::default())
        .await
        .unwrap();
    assert_eq!(acme.num_teams, 1);
    assert_eq!(table_counts(orgs.connection()).await, (2, 1, 1, 1));
}

#[tokio::test]
async fn test_organization_cannot_own_organization() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();
    let acme = orgs
        .create("acme", alice.id, Default::default())
        .await
        .unwrap();

    let result = orgs.create("acme-labs", acme.id, Default::default()).await;
    assert!(matches!(result, Err(OrgError::UserNotExist { .. })));
    assert_eq!(orgs.count().await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_create_same_name() {
    let (orgs, users) = setup().await;
    let owner_id = users.create("alice", "alice@example.com").await.unwrap().id;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let orgs = orgs.clone();
            tokio::spawn(async move { orgs.create("race", owner_id, Default::default()).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(OrgError::OrganizationAlreadyExist { .. }) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(orgs.count().await.unwrap(), 1);
    assert_eq!(table_counts(orgs.connection()).await, (2, 1, 1, 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_create_on_file_database() {
    let dir = TempDir::new().unwrap();
    let (orgs, users) = setup_file_backed(&dir).await;
    let owner_id = users.create("alice", "alice@example.com").await.unwrap().id;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let orgs = orgs.clone();
            tokio::spawn(async move { orgs.create("race", owner_id, Default::default()).await })
        })
        .collect();

    let mut created = 0;
    let mut taken = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(OrgError::OrganizationAlreadyExist { .. }) => taken += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(taken, 7);
    assert_eq!(table_counts(orgs.connection()).await, (2, 1, 1, 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_add_member_on_file_database() {
    let dir = TempDir::new().unwrap();
    let (orgs, users) = setup_file_backed(&dir).await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();
    let bob_id = users.create("bob", "bob@example.com").await.unwrap().id;
    let org_id = orgs
        .create("acme", alice.id, Default::default())
        .await
        .unwrap()
        .id;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let orgs = orgs.clone();
            tokio::spawn(async move { orgs.add_member(org_id, bob_id).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(orgs.get_by_id(org_id).await.unwrap().num_members, 2);
    assert_eq!(table_counts(orgs.connection()).await, (3, 1, 1, 2));
}

#[tokio::test]
async fn test_get_by_name_only_finds_organizations() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();

    match orgs.get_by_name("alice").await {
        Err(OrgError::OrganizationNotExist(lookup)) => {
            assert_eq!(lookup, OrgLookup::Name("alice".to_string()))
        }
        other => panic!("expected OrganizationNotExist, got {:?}", other),
    }

    let err = orgs.get_by_name("bad_name").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.status_code(), 404);

    let err = orgs.get_by_id(alice.id).await.unwrap_err();
    assert!(matches!(
        err,
        OrgError::OrganizationNotExist(OrgLookup::Id(id)) if id == alice.id
    ));
}

#[tokio::test]
async fn test_list_member_visibility() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();
    let bob = users.create("bob", "bob@example.com").await.unwrap();

    orgs.create("org1", alice.id, Default::default())
        .await
        .unwrap();
    let org2 = orgs
        .create("org2", alice.id, Default::default())
        .await
        .unwrap();
    orgs.set_member_visibility(org2.id, alice.id, true)
        .await
        .unwrap();
    orgs.add_member(org2.id, bob.id).await.unwrap();

    let public = orgs
        .list(&ListOrganizationsOptions::default().member(alice.id))
        .await
        .unwrap();
    assert_eq!(names(&public), vec!["org2"]);

    let all = orgs
        .list(
            &ListOrganizationsOptions::default()
                .member(alice.id)
                .include_private(),
        )
        .await
        .unwrap();
    assert_eq!(names(&all), vec!["org1", "org2"]);

    // Bob's membership is private
    let bobs = orgs
        .list(&ListOrganizationsOptions::default().member(bob.id))
        .await
        .unwrap();
    assert!(bobs.is_empty());
}

#[tokio::test]
async fn test_list_owner_filter() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();
    let bob = users.create("bob", "bob@example.com").await.unwrap();

    let org1 = orgs
        .create("org1", alice.id, Default::default())
        .await
        .unwrap();
    let org2 = orgs
        .create("org2", bob.id, Default::default())
        .await
        .unwrap();
    orgs.add_member(org2.id, alice.id).await.unwrap();
    orgs.set_member_visibility(org2.id, alice.id, true)
        .await
        .unwrap();

    let owned = orgs
        .list(
            &ListOrganizationsOptions::default()
                .owner(alice.id)
                .include_private(),
        )
        .await
        .unwrap();
    assert_eq!(names(&owned), vec!["org1"]);

    // Public membership in org2 is not ownership; org1 ownership is private
    let owned = orgs
        .list(&ListOrganizationsOptions::default().owner(alice.id))
        .await
        .unwrap();
    assert!(owned.is_empty());

    orgs.set_member_visibility(org1.id, alice.id, true)
        .await
        .unwrap();
    let both = orgs
        .list(
            &ListOrganizationsOptions::default()
                .member(alice.id)
                .owner(alice.id),
        )
        .await
        .unwrap();
    assert_eq!(names(&both), vec!["org1"]);
}

#[tokio::test]
async fn test_list_pagination_and_order() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();
    for name in ["beta", "alpha", "gamma"] {
        orgs.create(name, alice.id, Default::default())
            .await
            .unwrap();
    }

    let all = orgs.list(&ListOrganizationsOptions::default()).await.unwrap();
    assert_eq!(names(&all), vec!["beta", "alpha", "gamma"]);

    let page = |page, size| ListOrganizationsOptions::default().page(page, size);
    assert_eq!(
        names(&orgs.list(&page(1, 2)).await.unwrap()),
        vec!["beta", "alpha"]
    );
    assert_eq!(names(&orgs.list(&page(2, 2)).await.unwrap()), vec!["gamma"]);
    assert!(orgs.list(&page(3, 2)).await.unwrap().is_empty());
    assert_eq!(
        names(&orgs.list(&page(0, 2)).await.unwrap()),
        vec!["beta", "alpha"]
    );
    assert_eq!(orgs.list(&page(5, 0)).await.unwrap().len(), 3);

    let by_name = orgs
        .list(&ListOrganizationsOptions::default().order_by(OrgOrder::NameAsc))
        .await
        .unwrap();
    assert_eq!(names(&by_name), vec!["alpha", "beta", "gamma"]);

    let reversed = orgs
        .list(&ListOrganizationsOptions::default().order_by(OrgOrder::IdDesc))
        .await
        .unwrap();
    assert_eq!(names(&reversed), vec!["gamma", "alpha", "beta"]);
}

#[tokio::test]
async fn test_list_unknown_member_is_empty() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();
    orgs.create("acme", alice.id, Default::default())
        .await
        .unwrap();

    let listed = orgs
        .list(&ListOrganizationsOptions::default().member(404).include_private())
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_search_by_name() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();

    orgs.create(
        "org1",
        alice.id,
        CreateOrganizationOptions::default().with_full_name("Acme Corp"),
    )
    .await
    .unwrap();
    orgs.create(
        "org2",
        alice.id,
        CreateOrganizationOptions::default().with_full_name("Acme Corp 2"),
    )
    .await
    .unwrap();
    orgs.create(
        "globex",
        alice.id,
        CreateOrganizationOptions::default().with_full_name("Globex 100%"),
    )
    .await
    .unwrap();

    let (found, total) = orgs
        .search_by_name("ACME", Pagination::new(1, 10), OrgOrder::IdAsc)
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(names(&found), vec!["org1", "org2"]);

    let (found, total) = orgs
        .search_by_name("G1", Pagination::new(1, 10), OrgOrder::IdAsc)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(names(&found), vec!["org1"]);

    // Count is taken before paging
    let (found, total) = orgs
        .search_by_name("acme", Pagination::new(1, 1), OrgOrder::IdDesc)
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(names(&found), vec!["org2"]);

    // Individuals are never matched
    let (found, total) = orgs
        .search_by_name("alice", Pagination::all(), OrgOrder::IdAsc)
        .await
        .unwrap();
    assert!(found.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn test_search_folds_non_ascii_case() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();

    orgs.create(
        "elan",
        alice.id,
        CreateOrganizationOptions::default().with_full_name("Élan Systèmes"),
    )
    .await
    .unwrap();

    for query in ["élan", "ÉLAN", "SYSTÈMES"] {
        let (found, total) = orgs
            .search_by_name(query, Pagination::all(), OrgOrder::IdAsc)
            .await
            .unwrap();
        assert_eq!(total, 1, "query {}", query);
        assert_eq!(names(&found), vec!["elan"]);
    }
}

#[tokio::test]
async fn test_far_page_is_empty() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();
    orgs.create("acme", alice.id, Default::default())
        .await
        .unwrap();

    let found = orgs
        .list(&ListOrganizationsOptions::default().page(u64::MAX, 10))
        .await
        .unwrap();
    assert!(found.is_empty());

    let (found, total) = orgs
        .search_by_name("acme", Pagination::new(u64::MAX, u64::MAX), OrgOrder::IdAsc)
        .await
        .unwrap();
    assert!(found.is_empty());
    assert_eq!(total, 1);
}

#[tokio::test]
async fn test_search_matches_wildcards_literally() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();
    orgs.create("my_org", alice.id, Default::default())
        .await
        .unwrap();
    orgs.create(
        "myorg",
        alice.id,
        CreateOrganizationOptions::default().with_full_name("100% Organic"),
    )
    .await
    .unwrap();

    let (found, total) = orgs
        .search_by_name("_", Pagination::all(), OrgOrder::IdAsc)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(names(&found), vec!["my_org"]);

    let (found, _) = orgs
        .search_by_name("%", Pagination::all(), OrgOrder::IdAsc)
        .await
        .unwrap();
    assert_eq!(names(&found), vec!["myorg"]);

    let (found, total) = orgs
        .search_by_name("   ", Pagination::all(), OrgOrder::IdAsc)
        .await
        .unwrap();
    assert!(found.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn test_count_and_count_by_user() {
    let (orgs, users) = setup().await;
    assert_eq!(orgs.count().await.unwrap(), 0);
    assert_eq!(orgs.count_by_user(1).await.unwrap(), 0);

    let alice = users.create("alice", "alice@example.com").await.unwrap();
    let bob = users.create("bob", "bob@example.com").await.unwrap();
    orgs.create("org1", alice.id, Default::default())
        .await
        .unwrap();
    let org2 = orgs
        .create("org2", alice.id, Default::default())
        .await
        .unwrap();
    orgs.add_member(org2.id, bob.id).await.unwrap();

    assert_eq!(orgs.count().await.unwrap(), 2);
    assert_eq!(orgs.count_by_user(alice.id).await.unwrap(), 2);
    assert_eq!(orgs.count_by_user(bob.id).await.unwrap(), 1);
    assert_eq!(orgs.count_by_user(9999).await.unwrap(), 0);
}

#[tokio::test]
async fn test_add_member_is_idempotent() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();
    let bob = users.create("bob", "bob@example.com").await.unwrap();
    let acme = orgs
        .create("acme", alice.id, Default::default())
        .await
        .unwrap();

    let later = created_at() + Duration::hours(1);
    let orgs = orgs.with_clock(Arc::new(FixedClock::new(later)));

    orgs.add_member(acme.id, bob.id).await.unwrap();
    orgs.add_member(acme.id, bob.id).await.unwrap();

    let acme = orgs.get_by_id(acme.id).await.unwrap();
    assert_eq!(acme.num_members, 2);
    assert_eq!(acme.created_at, created_at());
    assert_eq!(acme.updated_at, later);

    let membership = orgs.membership(acme.id, bob.id).await.unwrap().unwrap();
    assert!(!membership.is_public);
    assert!(!membership.is_owner);
    assert!(!orgs.is_owner(acme.id, bob.id).await.unwrap());
    assert!(orgs.team_memberships(acme.id, bob.id).await.unwrap().is_empty());

    assert_eq!(table_counts(orgs.connection()).await, (3, 1, 1, 2));
}

#[tokio::test]
async fn test_add_member_errors() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();
    let acme = orgs
        .create("acme", alice.id, Default::default())
        .await
        .unwrap();
    let other = orgs
        .create("other", alice.id, Default::default())
        .await
        .unwrap();

    let result = orgs.add_member(alice.id, alice.id).await;
    assert!(matches!(
        result,
        Err(OrgError::OrganizationNotExist(OrgLookup::Id(_)))
    ));

    let result = orgs.add_member(acme.id, 9999).await;
    assert!(matches!(result, Err(OrgError::UserNotExist { id: 9999 })));

    let result = orgs.add_member(acme.id, other.id).await;
    assert!(matches!(result, Err(OrgError::UserNotExist { .. })));

    assert_eq!(orgs.get_by_id(acme.id).await.unwrap().num_members, 1);
}

#[tokio::test]
async fn test_set_member_visibility() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();
    let bob = users.create("bob", "bob@example.com").await.unwrap();
    let acme = orgs
        .create("acme", alice.id, Default::default())
        .await
        .unwrap();

    let result = orgs.set_member_visibility(acme.id, bob.id, true).await;
    match result {
        Err(OrgError::MembershipNotExist { org_id, user_id }) => {
            assert_eq!(org_id, acme.id);
            assert_eq!(user_id, bob.id);
        }
        other => panic!("expected MembershipNotExist, got {:?}", other),
    }

    orgs.set_member_visibility(acme.id, alice.id, true)
        .await
        .unwrap();
    assert!(orgs.is_public_member(acme.id, alice.id).await.unwrap());

    orgs.set_member_visibility(acme.id, alice.id, false)
        .await
        .unwrap();
    assert!(!orgs.is_public_member(acme.id, alice.id).await.unwrap());
}

#[tokio::test]
async fn test_remove_member() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();
    let bob = users.create("bob", "bob@example.com").await.unwrap();
    let acme = orgs
        .create("acme", alice.id, Default::default())
        .await
        .unwrap();
    orgs.add_member(acme.id, bob.id).await.unwrap();

    orgs.remove_member(acme.id, bob.id).await.unwrap();
    assert!(!orgs.is_member(acme.id, bob.id).await.unwrap());
    assert_eq!(orgs.get_by_id(acme.id).await.unwrap().num_members, 1);

    // Not a member any more
    orgs.remove_member(acme.id, bob.id).await.unwrap();
    assert_eq!(orgs.get_by_id(acme.id).await.unwrap().num_members, 1);

    let result = orgs.remove_member(acme.id, alice.id).await;
    assert!(matches!(result, Err(OrgError::LastOwner { .. })));
    assert!(orgs.is_owner(acme.id, alice.id).await.unwrap());
    assert_eq!(orgs.owner_team(acme.id).await.unwrap().num_members, 1);
}

#[tokio::test]
async fn test_remove_co_owner() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();
    let bob = users.create("bob", "bob@example.com").await.unwrap();
    let acme = orgs
        .create("acme", alice.id, Default::default())
        .await
        .unwrap();
    make_owner(&orgs, acme.id, bob.id).await;
    assert!(orgs.is_owner(acme.id, bob.id).await.unwrap());
    assert_eq!(orgs.owner_team(acme.id).await.unwrap().num_members, 2);

    orgs.remove_member(acme.id, alice.id).await.unwrap();

    assert!(!orgs.is_member(acme.id, alice.id).await.unwrap());
    assert!(orgs.team_memberships(acme.id, alice.id).await.unwrap().is_empty());
    assert_eq!(orgs.owner_team(acme.id).await.unwrap().num_members, 1);
    assert_eq!(orgs.get_by_id(acme.id).await.unwrap().num_members, 1);

    let result = orgs.remove_member(acme.id, bob.id).await;
    assert!(matches!(result, Err(OrgError::LastOwner { .. })));
}

#[tokio::test]
async fn test_counters_match_rows() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();
    let acme = orgs
        .create("acme", alice.id, Default::default())
        .await
        .unwrap();
    let mut member_ids = Vec::new();
    for name in ["bob", "carol", "dave"] {
        let user = users
            .create(name, &format!("{}@example.com", name))
            .await
            .unwrap();
        orgs.add_member(acme.id, user.id).await.unwrap();
        member_ids.push(user.id);
    }
    let carol = users.get_by_id(member_ids[1]).await.unwrap();
    assert_eq!(carol.name, "carol");
    orgs.remove_member(acme.id, carol.id).await.unwrap();

    let acme = orgs.get_by_id(acme.id).await.unwrap();
    let members = OrgUser::find()
        .filter(org_user::Column::OrgId.eq(acme.id))
        .count(orgs.connection())
        .await
        .unwrap();
    let teams = Team::find()
        .filter(team::Column::OrgId.eq(acme.id))
        .count(orgs.connection())
        .await
        .unwrap();
    assert_eq!(acme.num_members as u64, members);
    assert_eq!(acme.num_teams as u64, teams);
    assert_eq!(acme.num_members, 3);
}

#[tokio::test]
async fn test_delete_organization() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();
    let bob = users.create("bob", "bob@example.com").await.unwrap();
    let acme = orgs
        .create("acme", alice.id, Default::default())
        .await
        .unwrap();
    orgs.add_member(acme.id, bob.id).await.unwrap();

    orgs.delete(acme.id).await.unwrap();

    assert_eq!(table_counts(orgs.connection()).await, (2, 0, 0, 0));
    assert!(orgs.get_by_id(acme.id).await.unwrap_err().is_not_found());
    assert_eq!(orgs.count_by_user(alice.id).await.unwrap(), 0);

    // The name is free again
    orgs.create("acme", bob.id, Default::default())
        .await
        .unwrap();

    let result = orgs.delete(alice.id).await;
    assert!(matches!(result, Err(OrgError::OrganizationNotExist(_))));
}

#[tokio::test]
async fn test_custom_name_policy() {
    let (orgs, users) = setup().await;
    let alice = users.create("alice", "alice@example.com").await.unwrap();

    let policy: NamePolicy = serde_json::from_str(r#"{"reserved_names": ["acme"]}"#).unwrap();
    let registry = NameRegistry::new(Arc::new(policy.clone()));
    assert!(registry.reserve(orgs.connection(), "acme").await.is_err());
    assert!(registry.reserve(orgs.connection(), "explore").await.is_ok());
    assert!(matches!(
        registry.reserve(orgs.connection(), "ALICE").await,
        Err(NameError::AlreadyExists { .. })
    ));

    let orgs = orgs.with_policy(policy);
    let result = orgs.create("ACME", alice.id, Default::default()).await;
    assert!(matches!(result, Err(OrgError::NameNotAllowed(_))));
    orgs.create("explore", alice.id, Default::default())
        .await
        .unwrap();
}
