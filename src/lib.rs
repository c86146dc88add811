//! Client-state core of the committee review dashboard.
//!
//! The entity store (`state`) changes only through the pure reducer
//! (`reducer`). Loaders in `hooks` call the backend (`api`) and either keep
//! their own scoped state or dispatch actions into the store.

pub mod api;
pub mod config;
pub mod error;
pub mod hooks;
pub mod poller;
pub mod reducer;
pub mod sample;
pub mod state;
pub mod types;
