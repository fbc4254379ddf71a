//! # Session & Store Context
//!
//! Every business operation runs on behalf of one user inside one store.
//! That pair is an explicit value, never ambient state.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Bearer token ──► Session { user_id, store_id: Option }                │
//! │                        │                                                │
//! │                        │ store_context()                                │
//! │                        ▼                                                │
//! │              ┌─────────┴─────────┐                                      │
//! │        no store_id            store_id present                         │
//! │              │                     │                                    │
//! │              ▼                     ▼                                    │
//! │      NoStoreSelected     StoreContext { user_id, store_id }            │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │                 create_sale(&ctx, ..), adjust_stock(&ctx, ..), ...     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Who is calling, and which store they selected (if any).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub store_id: Option<String>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, store_id: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            store_id,
        }
    }

    /// Resolves the store scope required by every business operation.
    ///
    /// ## Errors
    /// - `NotAuthenticated` when the user id is blank
    /// - `NoStoreSelected` when no store was chosen yet
    pub fn store_context(&self) -> CoreResult<StoreContext> {
        if self.user_id.trim().is_empty() {
            return Err(CoreError::NotAuthenticated);
        }
        match &self.store_id {
            Some(store_id) if !store_id.trim().is_empty() => Ok(StoreContext {
                user_id: self.user_id.clone(),
                store_id: store_id.clone(),
            }),
            _ => Err(CoreError::NoStoreSelected),
        }
    }
}

/// Authenticated user acting inside a selected store.
///
/// Only obtainable through [`Session::store_context`] (or directly in
/// tests and the seed binary), so holding one means both checks passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreContext {
    pub user_id: String,
    pub store_id: String,
}

impl StoreContext {
    pub fn new(user_id: impl Into<String>, store_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            store_id: store_id.into(),
        }
    }
}
