use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Engine, EngineError, NotificationFilter, NotificationKind};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "password".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

async fn insert_goal(db: &DatabaseConnection, target: i64, current: i64, due: NaiveDate) -> Uuid {
    let id = Uuid::new_v4();
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "INSERT INTO goals (id, user_id, name, target_amount_minor, current_amount_minor, due_date) \
         VALUES (?, ?, ?, ?, ?, ?)",
        vec![
            id.to_string().into(),
            "alice".into(),
            "Vacanze".into(),
            target.into(),
            current.into(),
            due.into(),
        ],
    ))
    .await
    .unwrap();
    id
}

async fn insert_transaction(
    db: &DatabaseConnection,
    kind: &str,
    occurred_on: NaiveDate,
    amount_minor: i64,
) {
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "INSERT INTO transactions (id, user_id, kind, occurred_on, amount_minor, name) \
         VALUES (?, ?, ?, ?, ?, ?)",
        vec![
            Uuid::new_v4().to_string().into(),
            "alice".into(),
            kind.into(),
            occurred_on.into(),
            amount_minor.into(),
            "seed".into(),
        ],
    ))
    .await
    .unwrap();
}

#[tokio::test]
async fn reminder_fires_once_per_threshold() {
    let (engine, db) = engine_with_db().await;
    insert_goal(&db, 100_000, 0, date(2025, 9, 1)).await;

    // Seven days out.
    let fired = engine
        .check_goal_reminders_as_of("alice", date(2025, 8, 25))
        .await
        .unwrap();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].kind, NotificationKind::GoalReminder);
    assert!(fired[0].message.contains("due in 7 days"));

    // Same day again: already fired.
    let fired = engine
        .check_goal_reminders_as_of("alice", date(2025, 8, 25))
        .await
        .unwrap();
    assert!(fired.is_empty());

    // Six days out is not a threshold.
    let fired = engine
        .check_goal_reminders_as_of("alice", date(2025, 8, 26))
        .await
        .unwrap();
    assert!(fired.is_empty());

    // Three days out is the next threshold.
    let fired = engine
        .check_goal_reminders_as_of("alice", date(2025, 8, 29))
        .await
        .unwrap();
    assert_eq!(fired.len(), 1);
    assert!(fired[0].message.contains("due in 3 days"));

    // Due day.
    let fired = engine
        .check_goal_reminders_as_of("alice", date(2025, 9, 1))
        .await
        .unwrap();
    assert_eq!(fired.len(), 1);
    assert!(fired[0].message.contains("due today"));
}

#[tokio::test]
async fn achieved_goal_notifies_once_and_silences_reminders() {
    let (engine, db) = engine_with_db().await;
    insert_goal(&db, 100_000, 100_000, date(2025, 9, 1)).await;

    // Achievement wins even on a reminder-threshold day.
    let fired = engine
        .check_goal_reminders_as_of("alice", date(2025, 8, 25))
        .await
        .unwrap();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].kind, NotificationKind::GoalAchieved);

    let fired = engine
        .check_goal_reminders_as_of("alice", date(2025, 8, 29))
        .await
        .unwrap();
    assert!(fired.is_empty());
}

#[tokio::test]
async fn deleting_a_notification_does_not_refire_it() {
    let (engine, db) = engine_with_db().await;
    insert_goal(&db, 100_000, 100_000, date(2025, 9, 1)).await;

    let fired = engine
        .check_goal_reminders_as_of("alice", date(2025, 8, 25))
        .await
        .unwrap();
    assert_eq!(fired.len(), 1);

    engine
        .delete_notification("alice", fired[0].id)
        .await
        .unwrap();

    let fired = engine
        .check_goal_reminders_as_of("alice", date(2025, 8, 25))
        .await
        .unwrap();
    assert!(fired.is_empty());
}

#[tokio::test]
async fn budget_thresholds_fire_incrementally() {
    let (engine, db) = engine_with_db().await;
    insert_transaction(&db, "income", date(2025, 8, 1), 100_000).await;
    insert_transaction(&db, "expense", date(2025, 8, 5), 75_000).await;

    let fired = engine
        .check_budget_alerts_as_of("alice", date(2025, 8, 25))
        .await
        .unwrap();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].kind, NotificationKind::BudgetAlert);
    assert!(fired[0].message.contains("70%"));

    // Crossing 90 fires only the new threshold; 70 stays fired.
    insert_transaction(&db, "expense", date(2025, 8, 10), 20_000).await;
    let fired = engine
        .check_budget_alerts_as_of("alice", date(2025, 8, 25))
        .await
        .unwrap();
    assert_eq!(fired.len(), 1);
    assert!(fired[0].message.contains("90%"));

    insert_transaction(&db, "expense", date(2025, 8, 15), 10_000).await;
    let fired = engine
        .check_budget_alerts_as_of("alice", date(2025, 8, 25))
        .await
        .unwrap();
    assert_eq!(fired.len(), 1);
    assert!(fired[0].message.contains("100%"));
}

#[tokio::test]
async fn budget_keys_rearm_each_month() {
    let (engine, db) = engine_with_db().await;
    insert_transaction(&db, "income", date(2025, 8, 1), 100_000).await;
    insert_transaction(&db, "expense", date(2025, 8, 5), 80_000).await;

    let fired = engine
        .check_budget_alerts_as_of("alice", date(2025, 8, 25))
        .await
        .unwrap();
    assert_eq!(fired.len(), 1);

    // September spending crosses 70 again under a fresh month key. The
    // same call also emits August's summary, exactly once.
    insert_transaction(&db, "income", date(2025, 9, 1), 100_000).await;
    insert_transaction(&db, "expense", date(2025, 9, 3), 72_000).await;
    let fired = engine
        .check_budget_alerts_as_of("alice", date(2025, 9, 10))
        .await
        .unwrap();
    let kinds: Vec<NotificationKind> = fired.iter().map(|n| n.kind).collect();
    assert!(kinds.contains(&NotificationKind::BudgetAlert));
    assert!(kinds.contains(&NotificationKind::MonthlySummary));
    assert_eq!(fired.len(), 2);

    let fired = engine
        .check_budget_alerts_as_of("alice", date(2025, 9, 10))
        .await
        .unwrap();
    assert!(fired.is_empty());
}

#[tokio::test]
async fn no_income_means_no_budget_alerts() {
    let (engine, db) = engine_with_db().await;
    insert_transaction(&db, "expense", date(2025, 8, 5), 50_000).await;

    let fired = engine
        .check_budget_alerts_as_of("alice", date(2025, 8, 25))
        .await
        .unwrap();
    assert!(fired.is_empty());
}

#[tokio::test]
async fn monthly_summary_reports_previous_month_totals() {
    let (engine, db) = engine_with_db().await;
    insert_transaction(&db, "income", date(2025, 7, 1), 250_000).await;
    insert_transaction(&db, "expense", date(2025, 7, 20), 100_000).await;

    let fired = engine
        .check_budget_alerts_as_of("alice", date(2025, 8, 2))
        .await
        .unwrap();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].kind, NotificationKind::MonthlySummary);
    assert!(fired[0].message.contains("2025-07"));
    assert!(fired[0].message.contains("2500.00"));
    assert!(fired[0].message.contains("1000.00"));

    let fired = engine
        .check_budget_alerts_as_of("alice", date(2025, 8, 15))
        .await
        .unwrap();
    assert!(fired.is_empty());
}

#[tokio::test]
async fn notification_lifecycle() {
    let (engine, db) = engine_with_db().await;
    insert_goal(&db, 100_000, 100_000, date(2025, 12, 1)).await;
    insert_transaction(&db, "income", date(2025, 8, 1), 100_000).await;
    insert_transaction(&db, "expense", date(2025, 8, 5), 75_000).await;

    engine
        .check_goal_reminders_as_of("alice", date(2025, 8, 25))
        .await
        .unwrap();
    engine
        .check_budget_alerts_as_of("alice", date(2025, 8, 25))
        .await
        .unwrap();

    let (all, unread) = engine
        .list_notifications("alice", NotificationFilter::All)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(unread, 2);

    let (alerts, _) = engine
        .list_notifications("alice", NotificationFilter::Kind(NotificationKind::BudgetAlert))
        .await
        .unwrap();
    assert_eq!(alerts.len(), 1);

    let marked = engine
        .mark_notification_read("alice", all[0].id)
        .await
        .unwrap();
    assert!(marked.is_read);

    let (unread_list, unread) = engine
        .list_notifications("alice", NotificationFilter::Unread)
        .await
        .unwrap();
    assert_eq!(unread_list.len(), 1);
    assert_eq!(unread, 1);

    let updated = engine.mark_all_notifications_read("alice").await.unwrap();
    assert_eq!(updated, 1);

    let err = engine
        .delete_notification("alice", Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let deleted = engine.delete_all_notifications("alice").await.unwrap();
    assert_eq!(deleted, 2);

    let (all, unread) = engine
        .list_notifications("alice", NotificationFilter::All)
        .await
        .unwrap();
    assert!(all.is_empty());
    assert_eq!(unread, 0);
}

#[tokio::test]
async fn notifications_are_scoped_to_their_user() {
    let (engine, db) = engine_with_db().await;
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["bob".into(), "password".into()],
    ))
    .await
    .unwrap();
    insert_goal(&db, 100_000, 100_000, date(2025, 12, 1)).await;

    let fired = engine
        .check_goal_reminders_as_of("alice", date(2025, 8, 25))
        .await
        .unwrap();
    assert_eq!(fired.len(), 1);

    let (bobs, _) = engine
        .list_notifications("bob", NotificationFilter::All)
        .await
        .unwrap();
    assert!(bobs.is_empty());

    let err = engine
        .mark_notification_read("bob", fired[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}
