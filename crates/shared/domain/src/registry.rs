//! Registry for modular route groups.
//! This provides a minimal type-erased container for the pre-initialized
//! per-group state, so the application state can carry every group without
//! depending on the group crates.

use std::any::{Any, TypeId};
use std::fmt::Debug;

/// Marker trait for route-group state that can be shared across threads.
pub trait GroupState: Any + Debug + Send + Sync {
    /// Helper to allow downcasting from the trait object.
    fn as_any(&self) -> &dyn Any;
}

/// A route group whose state has been initialized and is ready to be
/// registered into the application.
#[derive(Debug)]
pub struct RegisteredGroup {
    pub id: TypeId,
    /// Stable group name, used for diagnostics and ordering checks.
    pub name: &'static str,
    /// URL prefix the group's router is mounted under.
    pub prefix: &'static str,
    pub state: Box<dyn GroupState>,
}

impl RegisteredGroup {
    /// Create a registered group from a concrete state.
    pub fn new<T: GroupState>(name: &'static str, prefix: &'static str, state: T) -> Self {
        Self { id: TypeId::of::<T>(), name, prefix, state: Box::new(state) }
    }
}
