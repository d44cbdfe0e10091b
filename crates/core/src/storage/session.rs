use std::sync::Arc;

use tracing::debug;

use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;
use crate::models::transaction::TransactionLog;
use crate::models::user::UserProfile;

use super::store::KeyValueStore;

const KEY_PREFIX: &str = "microcap";
const PROFILE_ENTRY: &str = "profile";
const PORTFOLIO_ENTRY: &str = "portfolio";
const TRANSACTIONS_ENTRY: &str = "transactions";

/// Everything persisted for one user: profile, portfolio state, trade log.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub profile: UserProfile,
    pub portfolio: Portfolio,
    pub transactions: TransactionLog,
}

/// High-level session persistence over an injected [`KeyValueStore`].
///
/// Three named JSON entries per user id, loaded once at session start and
/// overwritten in full on every portfolio or transaction mutation — no
/// partial or delta writes. Single writer by design, so no locking beyond
/// whatever the store itself needs.
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load a user's session. `None` when no portfolio has been saved for
    /// this user id yet (first visit).
    pub fn load(&self, user_id: &str) -> Result<Option<SessionRecord>, CoreError> {
        let Some(portfolio_json) = self.store.load(&Self::key(user_id, PORTFOLIO_ENTRY))? else {
            return Ok(None);
        };

        let portfolio: Portfolio = serde_json::from_str(&portfolio_json)?;

        let profile = match self.store.load(&Self::key(user_id, PROFILE_ENTRY))? {
            Some(json) => serde_json::from_str(&json)?,
            // Older records may predate the profile entry; rebuild a stub.
            None => UserProfile::new(user_id, chrono::Utc::now().to_rfc3339()),
        };

        let transactions = match self.store.load(&Self::key(user_id, TRANSACTIONS_ENTRY))? {
            Some(json) => serde_json::from_str(&json)?,
            None => TransactionLog::new(),
        };

        debug!(user = user_id, "session loaded");
        Ok(Some(SessionRecord {
            profile,
            portfolio,
            transactions,
        }))
    }

    /// Persist a user's full session: all three entries overwritten.
    pub fn save(&self, record: &SessionRecord) -> Result<(), CoreError> {
        let user_id = record.profile.id.as_str();

        let profile_json = serde_json::to_string(&record.profile)
            .map_err(|e| CoreError::Serialization(format!("profile: {e}")))?;
        let portfolio_json = serde_json::to_string(&record.portfolio)
            .map_err(|e| CoreError::Serialization(format!("portfolio: {e}")))?;
        let transactions_json = serde_json::to_string(&record.transactions)
            .map_err(|e| CoreError::Serialization(format!("transactions: {e}")))?;

        self.store
            .save(&Self::key(user_id, PROFILE_ENTRY), &profile_json)?;
        self.store
            .save(&Self::key(user_id, PORTFOLIO_ENTRY), &portfolio_json)?;
        self.store
            .save(&Self::key(user_id, TRANSACTIONS_ENTRY), &transactions_json)?;

        debug!(user = user_id, "session saved");
        Ok(())
    }

    /// Delete every entry for a user id.
    pub fn clear(&self, user_id: &str) -> Result<(), CoreError> {
        self.store.remove(&Self::key(user_id, PROFILE_ENTRY))?;
        self.store.remove(&Self::key(user_id, PORTFOLIO_ENTRY))?;
        self.store.remove(&Self::key(user_id, TRANSACTIONS_ENTRY))?;
        Ok(())
    }

    fn key(user_id: &str, entry: &str) -> String {
        format!("{KEY_PREFIX}.{user_id}.{entry}")
    }
}
