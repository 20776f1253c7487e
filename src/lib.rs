//! Gravity Well game core
//!
//! Shapes spawn at the scene edges and fall under tilt-controlled gravity
//! toward a central portal. The player steers them into matching corner
//! zones before they reach it.
//!
//! # Features
//!
//! - `parallel_forces` - Integrate bodies in parallel with rayon (enabled by default)

pub mod config;
pub mod game;
pub mod runtime;
pub mod util;
