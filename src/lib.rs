// Library surface for the typing engine, shared by the binary and tests.
// The terminal front-end (App, rendering) stays in main.rs.
pub mod access;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod diff;
pub mod error;
pub mod observer;
pub mod reference;
pub mod results;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod typing_policy;
pub mod util;
