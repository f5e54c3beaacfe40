// State machine module for the slot reservation lifecycle.
//
// Slot statuses are persisted as single-character codes on the slot row; the
// transition function here is the single source of truth for which moves are
// legal.

pub mod events;
pub mod states;
pub mod transitions;

// Re-export main types for convenient access
pub use events::SlotEvent;
pub use states::SlotStatus;
pub use transitions::target_state;
