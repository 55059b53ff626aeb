//! Shared helpers for the integration tests
#![allow(dead_code)]

pub mod database_helper;
pub mod mock_servers;
pub mod test_context;
pub mod test_data;

pub use database_helper::TestDatabase;
pub use mock_servers::{IdentityMockServer, WebhookMockServer};
pub use test_context::{lazy_state, test_settings, TestContext};
pub use test_data::*;
