// Synchronization protocol against the backend log store: the wire
// contract, the transport client, and response reconciliation.

pub mod client;
pub mod protocol;
pub mod reconcile;

pub use client::BackendClient;
pub use protocol::{ErrorCode, LogEntry, LogPage, OpKind, SyncRequest, SyncResponse};
pub use reconcile::Outcome;
