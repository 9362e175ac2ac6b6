//! Record store abstraction.
//!
//! The core never touches ambient storage. It reads through the
//! [`Repository`] trait and writes by committing a [`StateDelta`].

mod delta;
mod memory;
mod repository;

pub use delta::{Change, LogTarget, StateDelta};
pub use memory::{InMemoryStore, StoreSeed};
pub use repository::Repository;
