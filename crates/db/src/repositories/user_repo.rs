//! Repository for the `users` table.
//!
//! Balance mutations are single conditional statements; the `debit` guard
//! (`credit_balance >= amount`) is the linearization point that keeps two
//! concurrent debits from both succeeding when only one is affordable.

use sqlx::PgPool;

use atelier_core::types::EntityId;

use crate::models::user::UserAccount;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, credit_balance, created_at, updated_at";

/// Provides read and ledger operations for user accounts.
pub struct UserRepo;

impl UserRepo {
    /// Insert a user with a starting balance. Accounts normally arrive
    /// from the auth frontend; this exists for provisioning and tests.
    pub async fn create(
        pool: &PgPool,
        id: EntityId,
        credit_balance: i64,
    ) -> Result<UserAccount, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (id, credit_balance) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserAccount>(&query)
            .bind(id)
            .bind(credit_balance)
            .fetch_one(pool)
            .await
    }

    /// Find a user by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<UserAccount>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserAccount>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Conditionally debit an account.
    ///
    /// Returns `true` if the balance covered `amount` and was decremented,
    /// `false` if the account is missing or the balance was insufficient.
    /// The check and the decrement are one statement, so concurrent
    /// debits for the same account serialize on the row lock.
    pub async fn debit<'e, E>(
        executor: E,
        user_id: EntityId,
        amount: i64,
    ) -> Result<bool, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE users \
             SET credit_balance = credit_balance - $2, updated_at = NOW() \
             WHERE id = $1 AND credit_balance >= $2",
        )
        .bind(user_id)
        .bind(amount)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Credit an account (refund path).
    ///
    /// Returns `true` if the account exists.
    pub async fn credit<'e, E>(
        executor: E,
        user_id: EntityId,
        amount: i64,
    ) -> Result<bool, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE users \
             SET credit_balance = credit_balance + $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(amount)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
