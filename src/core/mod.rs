// RegSift - core/mod.rs
//
// Core business logic layer.
// Must NOT depend on: ui, platform, app. Dataset text arrives as `&str`;
// discovery reads directory entries only.

pub mod annotation;
pub mod discovery;
pub mod export;
pub mod facets;
pub mod filter;
pub mod model;
pub mod parser;
pub mod query;
pub mod sort;
