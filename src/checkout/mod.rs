//! Order validation pipeline: catalog re-pricing plus payment provenance
//! and reconciliation. Pure over data the API layer fetches.

mod pricing;
mod validate;

pub use pricing::{price_order, CatalogSnapshot, PricedOrder, PricingError};
pub use validate::{
    amounts_reconcile, verify_transaction, Identity, ProvenanceError, RECONCILE_TOLERANCE,
};
