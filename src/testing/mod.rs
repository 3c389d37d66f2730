//! Testing utilities: record builders, demo data and router scenarios.
//!
//! ```rust,ignore
//! use ledgerdesk::testing::{self, fixtures::DemoData};
//!
//! let state = AppState::builder().with_demo_data(DemoData::generate(1, 10)).build();
//! testing::get(router(state), "/health").execute().await.assert_ok();
//! ```

pub mod fixtures;
mod scenario;

pub use fixtures::{DemoData, fake};
pub use scenario::{Scenario, ScenarioAssert, get, patch, post, put};
