//! GraphQL client gateway for the bookshelf backend.
//!
//! One configured gateway serves the whole process: typed operations go in,
//! `Result<Data, OperationError>` comes out. Queries are cached and
//! deduplicated; mutations pass straight through, and the calling screen is
//! responsible for refetching whatever the mutation invalidated.

pub mod cache;
pub mod client;
pub mod error;
pub mod operations;
pub mod transport;
pub mod types;

pub use client::{FetchPolicy, Gateway};
pub use error::OperationError;
