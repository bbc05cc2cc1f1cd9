//! End-to-end flow against the in-memory remote: sign-up, collection
//! activation, event-driven refresh, compound completion writes, and
//! derived streak statistics.

use std::sync::Arc;
use std::time::Duration;

use habitsync_app::application::queries::streak_queries;
use habitsync_app::application::services::{
    HabitMutationService, RouteAction, RouteGuard, SessionManager, SyncedCollection,
};
use habitsync_domain::completion::Completion;
use habitsync_domain::habit::{Frequency, Habit};
use habitsync_domain::session::AuthGateway;
use habitsync_domain::store::{DocumentStore, SyncedEntity};
use habitsync_infrastructure::memory::{MemoryAuthGateway, MemoryDocumentStore};

async fn wait_for_count<T: SyncedEntity>(collection: &SyncedCollection<T>, count: usize) {
    for _ in 0..100 {
        if collection.items().await.len() == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "collection {} never reached {count} items",
        T::COLLECTION
    );
}

#[tokio::test]
async fn full_session_and_streak_flow() {
    let auth: Arc<dyn AuthGateway> = Arc::new(MemoryAuthGateway::new());
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());

    // Fresh process: session unresolved, then settles anonymous.
    let session = SessionManager::new(auth.clone());
    assert_eq!(
        RouteGuard::decide(&session.state().await, false),
        RouteAction::Stay
    );
    session.initialize().await;
    assert_eq!(
        RouteGuard::decide(&session.state().await, false),
        RouteAction::RedirectToSignIn
    );

    let error = session
        .sign_up("Grace", "Hopper", "grace@example.com", "nanoseconds")
        .await;
    assert!(error.is_none());
    assert_eq!(
        RouteGuard::decide(&session.state().await, true),
        RouteAction::RedirectToHome
    );
    let user_id = session.current_user().await.expect("authenticated");

    // Session gates collection activation.
    let habits: Arc<SyncedCollection<Habit>> = Arc::new(SyncedCollection::new(store.clone()));
    let completions: Arc<SyncedCollection<Completion>> =
        Arc::new(SyncedCollection::new(store.clone()));
    habits.activate(&user_id).await;
    completions.activate(&user_id).await;

    let mutations = HabitMutationService::new(store.clone(), habits.clone(), completions.clone());

    let run_id = mutations
        .create_habit(&user_id, "Run", "5km", Frequency::Daily)
        .await
        .unwrap();
    mutations
        .create_habit(&user_id, "Read", "One chapter", Frequency::Weekly)
        .await
        .unwrap();
    wait_for_count(&habits, 2).await;

    mutations.complete_habit(&run_id, &user_id).await.unwrap();
    wait_for_count(&completions, 1).await;

    // Same local day: suppressed.
    mutations.complete_habit(&run_id, &user_id).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(completions.items().await.len(), 1);

    let ranked = streak_queries::ranked_streaks(&habits.items().await, &completions.items().await);
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].title, "Run");
    assert_eq!(ranked[0].current_streak, 1);
    assert_eq!(ranked[0].best_streak, 1);
    assert_eq!(ranked[0].total_completions, 1);
    assert_eq!(ranked[1].total_completions, 0);

    // Denormalized counter moved with the log.
    let mut counter_synced = false;
    for _ in 0..100 {
        let cached = habits.items().await;
        if cached
            .iter()
            .any(|h| h.id() == &run_id && h.streak_count() == 1)
        {
            counter_synced = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(counter_synced, "denormalized counter did not sync");

    habits.deactivate().await;
    completions.deactivate().await;
    assert!(session.sign_out().await.is_none());
}

#[tokio::test]
async fn deactivation_isolates_user_switch() {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
    let first_user = habitsync_domain::UserId::new();
    let second_user = habitsync_domain::UserId::new();

    let habits: Arc<SyncedCollection<Habit>> = Arc::new(SyncedCollection::new(store.clone()));
    habits.activate(&first_user).await;

    let theirs = Habit::new(
        first_user.clone(),
        "Theirs".into(),
        "d".into(),
        Frequency::Daily,
    )
    .unwrap();
    store
        .create(Habit::COLLECTION, theirs.id().as_str(), theirs.to_fields())
        .await
        .unwrap();
    wait_for_count(&habits, 1).await;

    // Hand the collection to a second user; the first user's
    // subscription must not leak documents into the new view.
    habits.deactivate().await;
    habits.activate(&second_user).await;
    assert!(habits.items().await.is_empty());

    let more_theirs = Habit::new(
        first_user.clone(),
        "More".into(),
        "d".into(),
        Frequency::Daily,
    )
    .unwrap();
    store
        .create(
            Habit::COLLECTION,
            more_theirs.id().as_str(),
            more_theirs.to_fields(),
        )
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(habits.items().await.is_empty());

    habits.deactivate().await;
}
