// RegSift - lib.rs
//
// Library entry point, exposing every layer for integration testing and for
// front ends other than the bundled command-line binary.

pub mod app;
pub mod core;
pub mod platform;
pub mod ui;
pub mod util;
