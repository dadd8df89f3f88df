// libs/appointment-cell/src/services/reconcile.rs
//
// Payment -> booking reconciliation. The payment processor confirms
// payment to the client before the backend's asynchronous settlement
// has necessarily finalized the reservation; this service converges
// the slot to "booked for this patient" through a bounded,
// fixed-interval retry loop that never retries a hopeless case.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::models::{
    BookingAttempt, BookingConfirmation, BookingError, CancellationToken, PaymentConfirmation,
    ReconcilePolicy,
};
use crate::services::backend::{BookingBackend, FinalizeOutcome};

pub struct BookingReconciliationService<B: BookingBackend> {
    backend: B,
    policy: ReconcilePolicy,
}

impl<B: BookingBackend> BookingReconciliationService<B> {
    pub fn new(backend: B, policy: ReconcilePolicy) -> Self {
        Self { backend, policy }
    }

    /// Converge a paid-for slot to a confirmed booking.
    ///
    /// Attempts are strictly sequential: attempt N+1 never starts
    /// before N's response is known, and no state is shared between
    /// independent runs. Cancellation is checked before every delay
    /// and every network call and surfaces as a distinct
    /// `Cancelled` outcome.
    #[instrument(skip(self, payment, cancel, auth_token), fields(intent = %payment.intent_id))]
    pub async fn reconcile(
        &self,
        session_id: Uuid,
        slot_index: usize,
        payment: &PaymentConfirmation,
        cancel: &CancellationToken,
        auth_token: &str,
    ) -> Result<BookingConfirmation, BookingError> {
        if self.policy.max_attempts == 0 {
            return Err(BookingError::Validation(
                "reconciliation requires at least one attempt".to_string(),
            ));
        }

        // Malformed targets are fatal before any retry budget is spent.
        self.validate_target(session_id, slot_index, cancel, auth_token).await?;

        // Grace delay: tolerance for payment settlement lag before the
        // first finalize attempt.
        self.checked_wait(self.policy.grace_delay, cancel).await?;

        for attempt_number in 1..=self.policy.max_attempts {
            if cancel.is_cancelled() {
                return Err(BookingError::Cancelled);
            }

            let attempt = BookingAttempt {
                session_id,
                slot_index,
                payment_intent_id: payment.intent_id.clone(),
                attempt_number,
            };
            debug!("Finalize attempt {:?}", attempt);

            match self
                .backend
                .finalize_booking(session_id, slot_index, &payment.intent_id, auth_token)
                .await?
            {
                FinalizeOutcome::Booked { session, slot_index } => {
                    let slot = session.slots.get(slot_index).cloned().ok_or_else(|| {
                        BookingError::Backend(format!(
                            "finalize response slot index {} out of range",
                            slot_index
                        ))
                    })?;

                    info!(
                        "Booking finalized for session {} slot {} on attempt {}",
                        session_id, slot_index, attempt_number
                    );
                    return Ok(BookingConfirmation {
                        session,
                        slot_index,
                        slot,
                        attempts: attempt_number,
                    });
                }
                FinalizeOutcome::Conflict { reason } => {
                    // Another reservation holds the slot. Retrying can
                    // never succeed.
                    warn!(
                        "Booking conflict for session {} slot {}: {}",
                        session_id, slot_index, reason
                    );
                    return Err(BookingError::Conflict(reason));
                }
                FinalizeOutcome::NotReady { reason } => {
                    if attempt_number < self.policy.max_attempts {
                        debug!(
                            "Backend not ready ({}) on attempt {}/{}, retrying after {:?}",
                            reason, attempt_number, self.policy.max_attempts,
                            self.policy.retry_interval
                        );
                        self.checked_wait(self.policy.retry_interval, cancel).await?;
                    } else {
                        warn!(
                            "Backend still not ready ({}) after final attempt {}",
                            reason, attempt_number
                        );
                    }
                }
            }
        }

        // The payment may have succeeded while the booking did not;
        // this must reach the caller as a support-escalation outcome.
        Err(BookingError::ReconciliationExhausted {
            attempts: self.policy.max_attempts,
        })
    }

    async fn validate_target(
        &self,
        session_id: Uuid,
        slot_index: usize,
        cancel: &CancellationToken,
        auth_token: &str,
    ) -> Result<(), BookingError> {
        if cancel.is_cancelled() {
            return Err(BookingError::Cancelled);
        }

        let session = self.backend.get_session(session_id, auth_token).await?;

        if slot_index >= session.slots.len() {
            return Err(BookingError::Validation(format!(
                "slot index {} out of range for session {} ({} slots)",
                slot_index,
                session_id,
                session.slots.len()
            )));
        }

        Ok(())
    }

    async fn checked_wait(
        &self,
        delay: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), BookingError> {
        if cancel.is_cancelled() {
            return Err(BookingError::Cancelled);
        }
        sleep(delay).await;
        Ok(())
    }
}
