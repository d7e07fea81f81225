// Public API for integration tests and potential library usage

pub mod error;
pub mod game;
pub mod protocol;
pub mod registry;
pub mod types;
pub mod words;
pub mod ws;
