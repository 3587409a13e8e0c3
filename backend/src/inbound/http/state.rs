//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only ever see the driving
//! ports, so they can be exercised against in-memory adapters.

use std::sync::Arc;

use crate::domain::ports::{ReplyBoard, UserAccounts};

/// Services shared by every `/api/v1` handler.
#[derive(Clone)]
pub struct HttpState {
    /// Account and profile operations.
    pub accounts: Arc<dyn UserAccounts>,
    /// Reply operations.
    pub replies: Arc<dyn ReplyBoard>,
}

impl HttpState {
    /// Bundle the driving ports.
    pub fn new(accounts: Arc<dyn UserAccounts>, replies: Arc<dyn ReplyBoard>) -> Self {
        Self { accounts, replies }
    }
}
