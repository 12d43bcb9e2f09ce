//! Council session
//!
//! - [`state::SessionState`]: everything one session knows
//! - [`action::SessionAction`]: user intents and effect results
//! - [`effect::Effect`]: requests the runtime must perform
//! - [`reducer::reduce`]: the pure transition function tying them together

pub mod action;
pub mod answer;
pub mod conclusion;
pub mod effect;
pub mod reducer;
pub mod state;
