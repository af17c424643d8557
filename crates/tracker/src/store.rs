//! In-memory collaborators for hosts without a remote store.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;
use time::Date;
use uuid::Uuid;

use crate::{
    errors::StoreError,
    finalizer::{ActivityStore, CalorieLedger},
    models::{ActivityKind, ActivityRecord, SavedActivity},
};

#[derive(Debug, Default)]
pub struct MemoryActivityStore {
    activities: Mutex<Vec<SavedActivity>>,
}

impl MemoryActivityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activities of `user_id` on `date`, newest first.
    pub fn activities_on(&self, user_id: Uuid, date: Date) -> Vec<SavedActivity> {
        let activities = self
            .activities
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        activities
            .iter()
            .rev()
            .filter(|a| a.user_id == user_id && a.record.date == date)
            .cloned()
            .collect()
    }

    /// Total calories burned by `user_id` on `date` across stored activities.
    pub fn burned_on(&self, user_id: Uuid, date: Date) -> u32 {
        self.activities_on(user_id, date)
            .iter()
            .map(|a| a.record.calories_burned)
            .sum()
    }

    /// The most recent walk of `user_id` on `date`.
    pub fn last_walk(&self, user_id: Uuid, date: Date) -> Option<SavedActivity> {
        self.activities_on(user_id, date)
            .into_iter()
            .find(|a| a.record.kind == ActivityKind::Walk)
    }

    pub fn len(&self) -> usize {
        self.activities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ActivityStore for MemoryActivityStore {
    async fn save(&self, user_id: Uuid, record: &ActivityRecord) -> Result<Uuid, StoreError> {
        if !record.distance_km.is_finite() || record.distance_km < 0.0 {
            return Err(StoreError::Rejected(format!(
                "invalid distance {}",
                record.distance_km
            )));
        }

        let id = Uuid::new_v4();
        self.activities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SavedActivity {
                id,
                user_id,
                record: record.clone(),
            });
        Ok(id)
    }
}

#[derive(Debug, Default)]
pub struct MemoryCalorieLedger {
    burned: Mutex<HashMap<Date, u32>>,
}

impl MemoryCalorieLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn burned_on(&self, date: Date) -> u32 {
        self.burned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&date)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl CalorieLedger for MemoryCalorieLedger {
    async fn add_burned(&self, date: Date, calories: u32) {
        *self
            .burned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(date)
            .or_insert(0) += calories;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finalizer::SessionFinalizer;
    use time::macros::date;

    #[tokio::test]
    async fn test_day_queries() {
        let store = MemoryActivityStore::new();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        let day = date!(2024 - 05 - 01);

        let morning = SessionFinalizer::build_record(Vec::new(), 1.0, 600, day);
        let evening = SessionFinalizer::build_record(Vec::new(), 2.0, 1200, day);
        let next_day = SessionFinalizer::build_record(Vec::new(), 5.0, 3000, date!(2024 - 05 - 02));

        store.save(user, &morning).await.unwrap();
        let evening_id = store.save(user, &evening).await.unwrap();
        store.save(user, &next_day).await.unwrap();
        store.save(other, &morning).await.unwrap();

        assert_eq!(store.len(), 4);
        assert_eq!(store.activities_on(user, day).len(), 2);
        assert_eq!(store.burned_on(user, day), 150);
        assert_eq!(store.last_walk(user, day).unwrap().id, evening_id);
        assert!(store.last_walk(user, date!(2024 - 05 - 03)).is_none());
    }

    #[tokio::test]
    async fn test_rejects_invalid_distance() {
        let store = MemoryActivityStore::new();
        let record = SessionFinalizer::build_record(Vec::new(), f64::NAN, 10, date!(2024 - 05 - 01));
        assert!(matches!(
            store.save(Uuid::new_v4(), &record).await,
            Err(StoreError::Rejected(_))
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_ledger_accumulates_per_day() {
        let ledger = MemoryCalorieLedger::new();
        ledger.add_burned(date!(2024 - 05 - 01), 100).await;
        ledger.add_burned(date!(2024 - 05 - 01), 23).await;
        ledger.add_burned(date!(2024 - 05 - 02), 7).await;

        assert_eq!(ledger.burned_on(date!(2024 - 05 - 01)), 123);
        assert_eq!(ledger.burned_on(date!(2024 - 05 - 02)), 7);
        assert_eq!(ledger.burned_on(date!(2024 - 05 - 03)), 0);
    }
}
