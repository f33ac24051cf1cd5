//! Facade Module
//!
//! Object-valued get/set over a string-valued backing store, with fallback to
//! volatile storage and optional lazy expiry.

mod clock;
mod envelope;
mod expiring;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use envelope::Envelope;
pub use expiring::{ExpiringFacade, SetOutcome, STATUS_FAILED, STATUS_OK};
pub use store::StorageFacade;

use tracing::{debug, warn};

use crate::storage::{KeyValueStore, MemoryStore};

// == Backend Selection ==
/// Probes `persistent` with a trial read and returns the store to use.
///
/// On any failure the persistent store is dropped and a fresh `MemoryStore`
/// takes its place. The bool is true when the volatile fallback was chosen.
pub(crate) fn select_backend<S>(persistent: S) -> (Box<dyn KeyValueStore>, bool)
where
    S: KeyValueStore + 'static,
{
    match persistent.get_item("") {
        Ok(_) => {
            debug!("Persistent storage is accessible");
            (Box::new(persistent), false)
        }
        Err(e) => {
            warn!("Persistent storage unavailable, falling back to memory: {}", e);
            (Box::new(MemoryStore::new()), true)
        }
    }
}
