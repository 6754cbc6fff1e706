//! Controller layer: operator input, backend events, reducer-like state transitions.

pub mod events;
pub mod input;
pub mod orchestration;
pub mod reducer;
