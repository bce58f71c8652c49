//! Type aliases for shared state.
//!
//! Collaborators handed to the engine as trait objects often need to be
//! observed from the outside (a test asserting on recorded engine calls while a
//! job runs on another thread). This alias names the wrapper used for that.

use parking_lot::Mutex;
use std::sync::Arc;

/// A thread-safe vector, typically used as an append-only record.
///
/// Uses `parking_lot::Mutex`, so locking never returns a poison error.
pub type ThreadSafeVec<T> = Arc<Mutex<Vec<T>>>;

/// Creates an empty `Arc<Mutex<Vec<T>>>`.
pub fn thread_safe_vec<T>() -> ThreadSafeVec<T> {
    Arc::new(Mutex::new(Vec::new()))
}
