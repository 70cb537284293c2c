//! Versioned synchronization of the core, library and example trees with
//! a remote revision-numbered repository.

pub mod events;
pub mod listing;
pub mod promote;
pub mod remote;
pub mod revision;
pub mod session;
pub mod tree;

pub use events::{EventBus, FailureKind, SyncEvent};
pub use remote::{FetchError, HttpRemote, Remote};
pub use revision::{RevisionIndex, RevisionTag};
pub use session::{CancelToken, SyncSession, SyncState};
pub use tree::RemoteTree;
