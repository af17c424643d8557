//! Turns a completed session into an activity record and hands it off.

use std::sync::Arc;

use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    errors::{StoreError, TrackingError},
    models::{ActivityKind, ActivityRecord, PositionSample, SavedActivity, SessionEvent},
    session::CompletedSession,
};

/// Fixed estimate of energy spent walking, in kcal per kilometer.
pub const CALORIES_PER_KM: f64 = 50.0;

/// Persistence collaborator for finished activities.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Stores the record for `user_id` and returns the id assigned to it.
    async fn save(&self, user_id: Uuid, record: &ActivityRecord) -> Result<Uuid, StoreError>;
}

/// Collaborator keeping the day's "calories burned" total.
#[async_trait]
pub trait CalorieLedger: Send + Sync {
    async fn add_burned(&self, date: Date, calories: u32);
}

pub fn calories_for(distance_km: f64) -> u32 {
    (distance_km * CALORIES_PER_KM).round() as u32
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

#[derive(Clone)]
pub struct SessionFinalizer {
    user_id: Uuid,
    store: Arc<dyn ActivityStore>,
    ledger: Arc<dyn CalorieLedger>,
}

impl SessionFinalizer {
    pub fn new(user_id: Uuid, store: Arc<dyn ActivityStore>, ledger: Arc<dyn CalorieLedger>) -> Self {
        Self {
            user_id,
            store,
            ledger,
        }
    }

    pub fn build_record(
        route: Vec<PositionSample>,
        distance_km: f64,
        duration_seconds: u64,
        today: Date,
    ) -> ActivityRecord {
        ActivityRecord {
            kind: ActivityKind::Walk,
            distance_km,
            duration_seconds,
            calories_burned: calories_for(distance_km),
            route,
            date: today,
        }
    }

    /// Builds the record and persists it in the background. Calories are
    /// credited to the ledger only once the store has accepted the record.
    pub fn finalize(
        &self,
        completed: CompletedSession,
        today: Date,
        events: broadcast::Sender<SessionEvent>,
    ) -> FinalizeHandle {
        let session_id = completed.session_id;
        let record = Self::build_record(
            completed.route,
            completed.distance_km,
            completed.duration_seconds,
            today,
        );
        let finalizer = self.clone();

        let task = tokio::spawn(async move {
            match finalizer.persist(record).await {
                Ok(saved) => {
                    let _ = events.send(SessionEvent::Saved(saved.clone()));
                    Ok(saved)
                }
                Err(error) => {
                    let _ = events.send(SessionEvent::SaveFailed {
                        session_id,
                        error: error.clone(),
                    });
                    Err(TrackingError::PersistenceFailure(error))
                }
            }
        });

        FinalizeHandle { session_id, task }
    }

    async fn persist(&self, record: ActivityRecord) -> Result<SavedActivity, StoreError> {
        let id = match self.store.save(self.user_id, &record).await {
            Ok(id) => id,
            Err(e) => {
                warn!("Failed to save activity, discarding record: {e}");
                return Err(e);
            }
        };

        self.ledger
            .add_burned(record.date, record.calories_burned)
            .await;

        info!(
            activity_id = %id,
            distance_km = record.distance_km,
            duration_seconds = record.duration_seconds,
            calories = record.calories_burned,
            "Saved walk"
        );

        Ok(SavedActivity {
            id,
            user_id: self.user_id,
            record,
        })
    }
}

/// Completion signal of a background finalization.
#[derive(Debug)]
pub struct FinalizeHandle {
    session_id: Uuid,
    task: JoinHandle<Result<SavedActivity, TrackingError>>,
}

impl FinalizeHandle {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub async fn outcome(self) -> Result<SavedActivity, TrackingError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Finalization task failed: {e}");
                Err(TrackingError::FinalizeAborted)
            }
        }
    }
}
