//! Environment for the station reducer.

use crate::gate::Gate;
use std::sync::Arc;

/// Dependencies the station's effects call into.
#[derive(Clone)]
pub struct StationEnvironment {
    gate: Arc<Gate>,
}

impl StationEnvironment {
    /// Create an environment over a shared gate.
    #[must_use]
    pub const fn new(gate: Arc<Gate>) -> Self {
        Self { gate }
    }

    /// Shared handle to the gate, for moving into effects.
    #[must_use]
    pub fn gate(&self) -> Arc<Gate> {
        Arc::clone(&self.gate)
    }
}
