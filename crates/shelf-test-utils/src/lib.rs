//! Test helpers shared by the shelf crates.

pub mod sandbox;

pub use sandbox::Sandbox;
