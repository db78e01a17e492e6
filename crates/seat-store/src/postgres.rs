use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use common::{OrderId, SeatLabel, ShowingId};

use crate::error::{Result, SeatStoreError};
use crate::state::SeatState;
use crate::store::{SeatStore, validate_transition_batch};
use crate::transition::{SeatTransition, TransitionOutcome};

/// PostgreSQL-backed seat store implementation.
///
/// One row per (showing, seat). A transition batch runs inside a
/// transaction holding a per-showing advisory lock, which serializes
/// batches on the same showing; rows that do not exist yet read as free.
#[derive(Clone)]
pub struct PostgresSeatStore {
    pool: PgPool,
}

impl PostgresSeatStore {
    /// Creates a new PostgreSQL seat store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_entry(showing: ShowingId, row: &PgRow) -> Result<(SeatLabel, SeatState)> {
        let seat: String = row.try_get("seat_label")?;
        let state: String = row.try_get("state")?;
        let order_id: Option<Uuid> = row.try_get("order_id")?;
        let expires_at: Option<DateTime<Utc>> = row.try_get("expires_at")?;

        let state = match state.as_str() {
            "free" => SeatState::Free,
            "held" => match (order_id, expires_at) {
                (Some(order), Some(expires_at)) => SeatState::Held {
                    order: OrderId::from_uuid(order),
                    expires_at,
                },
                _ => {
                    return Err(SeatStoreError::InvalidRow {
                        showing,
                        seat,
                        message: "held row without order or deadline".to_string(),
                    });
                }
            },
            "sold" => match order_id {
                Some(order) => SeatState::Sold {
                    order: OrderId::from_uuid(order),
                },
                None => {
                    return Err(SeatStoreError::InvalidRow {
                        showing,
                        seat,
                        message: "sold row without order".to_string(),
                    });
                }
            },
            other => {
                return Err(SeatStoreError::InvalidRow {
                    showing,
                    seat,
                    message: format!("unknown state tag '{other}'"),
                });
            }
        };

        Ok((SeatLabel::new(seat), state))
    }

    fn state_columns(state: &SeatState) -> (&'static str, Option<Uuid>, Option<DateTime<Utc>>) {
        match state {
            SeatState::Free => ("free", None, None),
            SeatState::Held { order, expires_at } => {
                ("held", Some(order.as_uuid()), Some(*expires_at))
            }
            SeatState::Sold { order } => ("sold", Some(order.as_uuid()), None),
        }
    }
}

#[async_trait]
impl SeatStore for PostgresSeatStore {
    async fn transition(
        &self,
        showing: ShowingId,
        transitions: Vec<SeatTransition>,
    ) -> Result<TransitionOutcome> {
        validate_transition_batch(&transitions)?;

        let mut tx = self.pool.begin().await?;

        // Serialize batches per showing. The advisory lock also covers
        // seats with no row yet, which row locks cannot.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(showing.as_uuid().to_string())
            .execute(&mut *tx)
            .await?;

        let seat_labels: Vec<String> = transitions
            .iter()
            .map(|t| t.seat.as_str().to_owned())
            .collect();

        let rows = sqlx::query(
            r#"
            SELECT seat_label, state, order_id, expires_at
            FROM seat_states
            WHERE showing_id = $1 AND seat_label = ANY($2)
            "#,
        )
        .bind(showing.as_uuid())
        .bind(&seat_labels)
        .fetch_all(&mut *tx)
        .await?;

        let mut current: HashMap<SeatLabel, SeatState> = HashMap::with_capacity(rows.len());
        for row in &rows {
            let (seat, state) = Self::row_to_entry(showing, row)?;
            current.insert(seat, state);
        }

        let mut conflicts: Vec<SeatLabel> = transitions
            .iter()
            .filter(|t| {
                let state = current.get(&t.seat).copied().unwrap_or_default();
                !t.expect.matches(&state)
            })
            .map(|t| t.seat.clone())
            .collect();

        if !conflicts.is_empty() {
            tx.rollback().await?;
            conflicts.sort();
            return Ok(TransitionOutcome::Rejected { conflicts });
        }

        for transition in &transitions {
            let (state, order_id, expires_at) = Self::state_columns(&transition.to);
            sqlx::query(
                r#"
                INSERT INTO seat_states (showing_id, seat_label, state, order_id, expires_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, now())
                ON CONFLICT (showing_id, seat_label) DO UPDATE SET
                    state = EXCLUDED.state,
                    order_id = EXCLUDED.order_id,
                    expires_at = EXCLUDED.expires_at,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(showing.as_uuid())
            .bind(transition.seat.as_str())
            .bind(state)
            .bind(order_id)
            .bind(expires_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(TransitionOutcome::Applied)
    }

    async fn seat_states(&self, showing: ShowingId) -> Result<BTreeMap<SeatLabel, SeatState>> {
        let rows = sqlx::query(
            r#"
            SELECT seat_label, state, order_id, expires_at
            FROM seat_states
            WHERE showing_id = $1
            ORDER BY seat_label ASC
            "#,
        )
        .bind(showing.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Self::row_to_entry(showing, row))
            .collect()
    }

    async fn seat_state(&self, showing: ShowingId, seat: &SeatLabel) -> Result<Option<SeatState>> {
        let row = sqlx::query(
            r#"
            SELECT seat_label, state, order_id, expires_at
            FROM seat_states
            WHERE showing_id = $1 AND seat_label = $2
            "#,
        )
        .bind(showing.as_uuid())
        .bind(seat.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_entry(showing, &row)?.1)),
            None => Ok(None),
        }
    }
}
