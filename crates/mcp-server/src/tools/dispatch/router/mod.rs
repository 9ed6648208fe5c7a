// Per-tool dispatch functions used by the MCP tool router.

pub(super) mod capabilities;
pub(super) mod error;
pub(super) mod jobs;
pub(super) mod logs;
pub(super) mod units;

mod tool_router;

pub(super) use tool_router::build_tool_router;
