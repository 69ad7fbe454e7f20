//! Reception workflow services.
//!
//! Each service borrows a [`Store`] and runs every check-then-act sequence in
//! one [`Transaction`](crate::store::Transaction), locking the pickup point
//! first so concurrent calls against the same pickup point are serialized.

mod ledger;
mod registry;
mod reports;
mod sessions;

pub use ledger::ProductLedger;
pub use registry::PickupPointRegistry;
pub use reports::ReportQuery;
pub use sessions::ReceptionManager;

use chrono::{DateTime, SubsecRound, Utc};

use crate::error::PvzError;
use crate::models::PickupPoint;
use crate::store::Transaction;
use crate::types::PickupPointId;

/// Current time at the precision the store keeps (microseconds).
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

async fn lock_existing(
    tx: &mut dyn Transaction,
    id: PickupPointId,
) -> Result<PickupPoint, PvzError> {
    tx.lock_pickup_point(id)
        .await?
        .ok_or(PvzError::PickupPointNotFound(id))
}
