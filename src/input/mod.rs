//! Input module - replaying engine moves as pointer clicks
//!
//! # Architecture
//!
//! - `pointer` - [`InputReplayer`] and its [`InputTiming`] settle delays
//!
//! Geometry lives in [`crate::board`]; this module only sequences clicks and
//! waits against a [`crate::browser::RenderSurface`].

pub mod pointer;

pub use pointer::{InputReplayer, InputTiming};
