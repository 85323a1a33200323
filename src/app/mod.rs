// RegSift - app/mod.rs
//
// Application layer: dataset loading, load-state management, annotation and
// preference persistence.
// Must NOT depend on: ui.

pub mod annotations;
pub mod loader;
pub mod session;
pub mod state;
