//! Remote document store access for routines.
//!
//! The store is an external collaborator with generic document-collection
//! semantics. The sync loop and controller talk to the [`DocumentStore`]
//! trait so tests can substitute an in-memory double; [`StoreClient`] is
//! the Appwrite-style REST implementation.

pub mod client;
pub mod document;

pub use client::StoreClient;

use crate::error::Result;
use crate::routine::{Routine, RoutineFields};
use async_trait::async_trait;

/// Generic routine-collection contract.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch every routine document. No filtering or pagination is assumed.
    async fn list(&self) -> Result<Vec<Routine>>;

    /// Create a routine; the store assigns the identifier.
    async fn create(&self, fields: &RoutineFields) -> Result<Routine>;

    /// Update an existing routine by identifier.
    async fn update(&self, id: &str, fields: &RoutineFields) -> Result<Routine>;

    /// Delete a routine by identifier.
    async fn delete(&self, id: &str) -> Result<()>;
}
