//! Event system: the dispatch collaborator contract and an in-memory registry.

pub mod dispatch;
pub mod handler;

pub use dispatch::{Dispatch, Event, Handler};
pub use handler::ListenerRegistry;
