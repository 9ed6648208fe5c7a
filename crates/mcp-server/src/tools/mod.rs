//! systemd MCP tool surface.
//!
//! Schemas, dispatch and rendering live in separate submodules; the dispatch layer only talks
//! to the units and journal crates.

mod dispatch;
mod render;
mod schemas;

pub use dispatch::SystemdService;
