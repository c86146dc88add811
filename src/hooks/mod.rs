//! Async loaders that bridge backend calls into dashboard state.
//!
//! Each loader keeps its own `{data, loading, error}` view behind a
//! non-poisoning lock and, when it owns data shared across the dashboard,
//! forwards results to the store as actions. Locks are never held across an
//! await; visible state only changes once a call has resolved.

pub mod committee;
pub mod ideas;
pub mod invoke;
pub mod notifications;

use parking_lot::Mutex;

/// Clears a loading flag when dropped, so every exit path (including an
/// early return or a panic in the awaited call) releases it.
pub(crate) struct LoadingGuard<'a, S> {
    state: &'a Mutex<S>,
    clear: fn(&mut S),
}

impl<'a, S> LoadingGuard<'a, S> {
    pub(crate) fn begin(state: &'a Mutex<S>, set: fn(&mut S), clear: fn(&mut S)) -> Self {
        set(&mut state.lock());
        Self { state, clear }
    }
}

impl<S> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        (self.clear)(&mut self.state.lock());
    }
}
