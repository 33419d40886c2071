//! The signed-in user, cached in device storage.
//!
//! The full record and the identity key live under separate keys so
//! `is_logged_in` never has to deserialize the record. A cached user stays
//! valid until it is cleared or overwritten; there is no expiry.

use std::sync::Arc;

use tracing::warn;

use crate::error::ApiError;
use crate::storage::Storage;
use crate::types::User;

pub const USER_INFO_KEY: &str = "userInfo";
pub const OPEN_ID_KEY: &str = "openId";

#[derive(Clone)]
pub struct Session {
    storage: Arc<dyn Storage>,
}

impl Session {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn save_user(&self, user: &User) -> Result<(), ApiError> {
        let raw = serde_json::to_string(user).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.storage.set(USER_INFO_KEY, &raw)?;
        self.storage.set(OPEN_ID_KEY, &user.open_id)?;
        Ok(())
    }

    /// The cached user; unreadable records count as signed out.
    pub fn current_user(&self) -> Option<User> {
        let raw = match self.storage.get(USER_INFO_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "reading cached user failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "cached user is corrupt");
                None
            }
        }
    }

    pub fn open_id(&self) -> Option<String> {
        match self.storage.get(OPEN_ID_KEY) {
            Ok(id) => id.filter(|id| !id.is_empty()),
            Err(e) => {
                warn!(error = %e, "reading cached open id failed");
                None
            }
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.open_id().is_some()
    }

    pub fn clear(&self) -> Result<(), ApiError> {
        self.storage.remove(USER_INFO_KEY)?;
        self.storage.remove(OPEN_ID_KEY)?;
        Ok(())
    }
}
