//! Provenance and amount checks against a fetched payment transaction.
//! All fail-closed: any mismatch rejects the checkout before persistence.

use uuid::Uuid;

use crate::payments::PaymentTransaction;
use crate::types::money::Cents;

/// Who is submitting the checkout, as established by the API layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    User(Uuid),
    Guest(String),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProvenanceError {
    #[error("payment transaction has not succeeded")]
    NotSucceeded,
    #[error("payment transaction does not belong to this caller")]
    IdentityMismatch,
}

/// The transaction must have succeeded and its creation-time metadata must
/// name the caller. Defends against replaying someone else's completed
/// payment reference.
pub fn verify_transaction(
    tx: &PaymentTransaction,
    identity: &Identity,
) -> Result<(), ProvenanceError> {
    if tx.status != "succeeded" {
        return Err(ProvenanceError::NotSucceeded);
    }
    let matches = match identity {
        Identity::User(user_id) => tx
            .user_id
            .as_deref()
            .is_some_and(|recorded| recorded == user_id.to_string()),
        Identity::Guest(email) => tx
            .guest_email
            .as_deref()
            .is_some_and(|recorded| recorded.eq_ignore_ascii_case(email)),
    };
    if matches {
        Ok(())
    } else {
        Err(ProvenanceError::IdentityMismatch)
    }
}

/// Captured and recomputed totals may differ by at most one cent.
pub const RECONCILE_TOLERANCE: Cents = 1;

pub fn amounts_reconcile(computed: Cents, captured: Cents) -> bool {
    (computed - captured).abs() <= RECONCILE_TOLERANCE
}
