use std::sync::Arc;

use tokio::sync::Mutex;

use practice_core::model::{AttendanceState, Buddy, CheckInOutcome, Mood, SnackOutcome};
use storage::documents::{load_attendance, save_attendance};
use storage::repository::DocumentStore;

use crate::Clock;
use crate::error::AttendanceServiceError;

/// Daily check-in, streak and snack operations over the `attendance` document.
///
/// Every mutation is a load-modify-save under one lock, so two calls issued
/// back to back (a double click) observe each other's writes.
#[derive(Clone)]
pub struct AttendanceService {
    clock: Clock,
    documents: Arc<dyn DocumentStore>,
    write_lock: Arc<Mutex<()>>,
}

impl AttendanceService {
    #[must_use]
    pub fn new(clock: Clock, documents: Arc<dyn DocumentStore>) -> Self {
        Self {
            clock,
            documents,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Same store and lock, different clock.
    #[must_use]
    pub fn with_clock(&self, clock: Clock) -> Self {
        Self {
            clock,
            documents: Arc::clone(&self.documents),
            write_lock: Arc::clone(&self.write_lock),
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Current attendance state (defaults when nothing usable is stored).
    ///
    /// # Errors
    ///
    /// Returns `AttendanceServiceError::Storage` if the backend cannot be read.
    pub async fn state(&self) -> Result<AttendanceState, AttendanceServiceError> {
        self.load().await
    }

    /// Pick the buddy. Idempotent; streak and snacks are untouched.
    ///
    /// # Errors
    ///
    /// Returns `AttendanceServiceError::Storage` if persistence fails.
    pub async fn choose_buddy(
        &self,
        buddy: Buddy,
    ) -> Result<AttendanceState, AttendanceServiceError> {
        self.mutate(|state| {
            state.choose_buddy(buddy);
            (state.clone(), true)
        })
        .await
    }

    /// Check in for today in the reference timezone.
    ///
    /// # Errors
    ///
    /// Returns `AttendanceServiceError::Storage` if persistence fails.
    pub async fn check_in(&self) -> Result<CheckInOutcome, AttendanceServiceError> {
        let today = self.clock.today();
        let outcome = self
            .mutate(|state| {
                let outcome = state.check_in(today);
                (outcome, outcome.is_ok())
            })
            .await?;

        match outcome {
            CheckInOutcome::Recorded {
                streak,
                bonus,
                snacks,
            } => tracing::info!(%today, streak, bonus, snacks, "check-in recorded"),
            CheckInOutcome::AlreadyCheckedInToday => {
                tracing::debug!(%today, "already checked in today");
            }
        }
        Ok(outcome)
    }

    /// Spend one snack; refused when the balance is zero.
    ///
    /// # Errors
    ///
    /// Returns `AttendanceServiceError::Storage` if persistence fails.
    pub async fn give_snack(&self) -> Result<SnackOutcome, AttendanceServiceError> {
        let outcome = self
            .mutate(|state| {
                let outcome = state.give_snack();
                (outcome, outcome.is_ok())
            })
            .await?;
        tracing::debug!(?outcome, "give snack");
        Ok(outcome)
    }

    /// Mood of `state` as of the clock's today. Recomputed on every call.
    #[must_use]
    pub fn mood_for(&self, state: &AttendanceState) -> Mood {
        state.mood_on(self.clock.today())
    }

    /// Load the state and project its mood.
    ///
    /// # Errors
    ///
    /// Returns `AttendanceServiceError::Storage` if the backend cannot be read.
    pub async fn mood(&self) -> Result<Mood, AttendanceServiceError> {
        let state = self.load().await?;
        Ok(self.mood_for(&state))
    }

    /// Whether a check-in today would be accepted.
    ///
    /// # Errors
    ///
    /// Returns `AttendanceServiceError::Storage` if the backend cannot be read.
    pub async fn can_check_in_today(&self) -> Result<bool, AttendanceServiceError> {
        let state = self.load().await?;
        Ok(state.can_check_in(self.clock.today()))
    }

    async fn load(&self) -> Result<AttendanceState, AttendanceServiceError> {
        let state = load_attendance(self.documents.as_ref()).await?;
        Ok(state.unwrap_or_default())
    }

    /// Run `apply` against freshly loaded state and persist when it reports a change.
    async fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut AttendanceState) -> (T, bool),
    ) -> Result<T, AttendanceServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut state = self.load().await?;
        let (out, changed) = apply(&mut state);
        if changed {
            save_attendance(self.documents.as_ref(), &state).await?;
        }
        Ok(out)
    }
}
