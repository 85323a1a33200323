// RegSift - platform/mod.rs
//
// Platform abstraction layer: directories, config file, local store, HTTP.
// Must NOT depend on: core, app, ui.

pub mod config;
pub mod fs;
pub mod http;
