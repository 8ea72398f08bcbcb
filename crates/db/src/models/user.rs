//! User account model.
//!
//! Accounts are provisioned by the auth frontend; this service only reads
//! balances and applies ledger debits/credits.

use serde::Serialize;
use sqlx::FromRow;

use atelier_core::types::{EntityId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserAccount {
    pub id: EntityId,
    pub credit_balance: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Balance payload for `GET /users/{id}/balance`.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub credit_balance: i64,
}
