//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency. Every test
//! works against its own showing, so they can run in parallel.

use std::sync::Arc;

use chrono::{Duration, Utc};
use seat_store::{
    OrderId, PostgresSeatStore, SeatLabel, SeatStore, SeatStoreExt, SeatTransition, ShowingId,
    TransitionOutcome,
};
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for the schema
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_seat_states_table.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

async fn new_store() -> PostgresSeatStore {
    let info = get_container_info().await;
    let pool = PgPool::connect(&info.connection_string).await.unwrap();
    PostgresSeatStore::new(pool)
}

fn hold_batch(
    seats: &[&str],
    order: OrderId,
    at: chrono::DateTime<Utc>,
    ttl: Duration,
) -> Vec<SeatTransition> {
    seats
        .iter()
        .map(|s| SeatTransition::hold(SeatLabel::new(*s), order, at, at + ttl))
        .collect()
}

#[tokio::test]
async fn holds_free_seats_and_records_their_state() {
    let store = new_store().await;
    let showing = ShowingId::new();
    let order = OrderId::new();
    let now = Utc::now();

    let outcome = store
        .transition(showing, hold_batch(&["1A", "1B"], order, now, Duration::minutes(10)))
        .await
        .unwrap();
    assert_eq!(outcome, TransitionOutcome::Applied);

    let states = store.seat_states(showing).await.unwrap();
    assert_eq!(states.len(), 2);
    for state in states.values() {
        assert_eq!(state.order(), Some(order));
    }
}

#[tokio::test]
async fn rejected_batch_rolls_back_and_lists_conflicts() {
    let store = new_store().await;
    let showing = ShowingId::new();
    let now = Utc::now();

    let winner = OrderId::new();
    store
        .transition(showing, hold_batch(&["2B"], winner, now, Duration::minutes(10)))
        .await
        .unwrap();

    let outcome = store
        .transition(
            showing,
            hold_batch(&["2A", "2B"], OrderId::new(), now, Duration::minutes(10)),
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        TransitionOutcome::Rejected {
            conflicts: vec![SeatLabel::new("2B")]
        }
    );

    // 2A must not have been written.
    assert!(
        store
            .seat_state(showing, &SeatLabel::new("2A"))
            .await
            .unwrap()
            .is_none()
    );
    let state = store
        .seat_state(showing, &SeatLabel::new("2B"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.order(), Some(winner));
}

#[tokio::test]
async fn expired_hold_is_taken_over_without_a_sweep() {
    let store = new_store().await;
    let showing = ShowingId::new();
    let now = Utc::now();

    store
        .transition(
            showing,
            vec![SeatTransition::hold(
                SeatLabel::new("3A"),
                OrderId::new(),
                now - Duration::minutes(10),
                now - Duration::minutes(5),
            )],
        )
        .await
        .unwrap();

    let fresh = OrderId::new();
    let outcome = store
        .transition(showing, hold_batch(&["3A"], fresh, now, Duration::minutes(10)))
        .await
        .unwrap();
    assert_eq!(outcome, TransitionOutcome::Applied);

    let state = store
        .seat_state(showing, &SeatLabel::new("3A"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.order(), Some(fresh));
}

#[tokio::test]
async fn sell_and_release_follow_hold_ownership() {
    let store = new_store().await;
    let showing = ShowingId::new();
    let order = OrderId::new();
    let now = Utc::now();
    let seat = SeatLabel::new("4A");

    store
        .transition(
            showing,
            vec![SeatTransition::hold(seat.clone(), order, now, now + Duration::minutes(10))],
        )
        .await
        .unwrap();

    // Selling under a different order is rejected.
    let outcome = store
        .transition(
            showing,
            vec![SeatTransition::sell(seat.clone(), OrderId::new(), now)],
        )
        .await
        .unwrap();
    assert!(!outcome.is_applied());

    let outcome = store
        .transition(showing, vec![SeatTransition::sell(seat.clone(), order, now)])
        .await
        .unwrap();
    assert_eq!(outcome, TransitionOutcome::Applied);

    let outcome = store
        .transition(showing, vec![SeatTransition::release_sold(seat.clone(), order)])
        .await
        .unwrap();
    assert_eq!(outcome, TransitionOutcome::Applied);

    let view = store.availability(showing, now).await.unwrap();
    assert_eq!(view[&seat], seat_store::SeatStatus::Free);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_overlapping_batches_admit_exactly_one() {
    let store = new_store().await;
    let showing = ShowingId::new();
    let now = Utc::now();

    let mut tasks = Vec::new();
    for _ in 0..6 {
        let store = store.clone();
        let order = OrderId::new();
        tasks.push(tokio::spawn(async move {
            store
                .transition(showing, hold_batch(&["5A", "5B"], order, now, Duration::minutes(10)))
                .await
                .unwrap()
        }));
    }

    let mut applied = 0;
    for task in tasks {
        if task.await.unwrap().is_applied() {
            applied += 1;
        }
    }
    assert_eq!(applied, 1);
}
