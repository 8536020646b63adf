//! Interactive editing: edit messages, drag debouncing, the graph coordinator
//! and its async session driver.

pub mod coordinator;
pub mod events;
pub mod pending;
pub mod session;

pub use coordinator::{GraphCoordinator, ProfileListener, ReloadOutcome, Selection};
pub use events::{GraphEdit, NodePatch};
pub use pending::{PendingSync, SyncState};
pub use session::{EditorCommand, EditorHandle, EditorSession, SessionEvent};
