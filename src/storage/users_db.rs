//! Mock users database
//!
//! A single JSON object keyed by phone number, stored under one key of the
//! backing store. Stands in for the marketplace's user service.

use std::collections::HashMap;
use std::sync::Arc;

use super::traits::{write_json, KeyValueStore};
use crate::auth::user::User;
use crate::constants::USERS_DB_KEY;
use crate::error::Result;

pub struct MockUserDb {
    store: Arc<dyn KeyValueStore>,
}

impl MockUserDb {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load every stored user, keyed by phone. An unreadable database reads
    /// as empty; only store I/O errors propagate.
    pub async fn all(&self) -> Result<HashMap<String, User>> {
        let Some(raw) = self.store.get_item(USERS_DB_KEY).await? else {
            return Ok(HashMap::new());
        };

        match serde_json::from_str(&raw) {
            Ok(db) => Ok(db),
            Err(e) => {
                log::warn!("Discarding unreadable users database: {}", e);
                Ok(HashMap::new())
            }
        }
    }

    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<User>> {
        Ok(self.all().await?.remove(phone))
    }

    /// Insert or replace a user under its phone number
    pub async fn save(&self, user: &User) -> Result<()> {
        let mut db = self.all().await?;
        db.insert(user.phone.clone(), user.clone());
        write_json(self.store.as_ref(), USERS_DB_KEY, &db).await
    }
}
