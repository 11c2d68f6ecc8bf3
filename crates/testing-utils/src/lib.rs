//! # Requester Testing Utils
//!
//! Shared testing utilities for the requester workspace: scripted in-memory
//! implementations of every service port, test data builders and small
//! async helpers.
//!
//! ## Usage
//!
//! ```toml
//! [dev-dependencies]
//! requester-testing-utils = { path = "../testing-utils" }
//! ```
//!
//! ```rust
//! use requester_testing_utils::{MockRequestSource, PendingRequestBuilder};
//!
//! let source = MockRequestSource::with_requests(vec![
//!     PendingRequestBuilder::new().with_id(1).build(),
//! ]);
//! assert_eq!(source.remaining(), 1);
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use helpers::*;
pub use mocks::*;
