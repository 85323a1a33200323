// RegSift - ui/mod.rs
//
// UI layer: presentation only, writing to any `io::Write`.
// Must NOT depend on: platform, app, direct I/O.

pub mod render;
