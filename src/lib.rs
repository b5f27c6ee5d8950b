// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod game;
pub mod keymap;
pub mod layout;
pub mod presenter;
pub mod progression;
pub mod runtime;
pub mod scoring;
pub mod sequence;
pub mod session;
pub mod symmetry;
pub mod timeline;
pub mod view;
