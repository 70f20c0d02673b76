//! 工具层：封闭的 ToolName 集合、注册表、执行器、参数 schema 与各具体工具

pub mod delegate;
pub mod executor;
pub mod ground_facts;
pub mod patch_notes;
pub mod registry;
pub mod schema;
pub mod stats;
pub mod web;

pub use delegate::AgentTool;
pub use executor::ToolExecutor;
pub use ground_facts::{GroundFactsTool, NO_GROUNDED_FACTS};
pub use patch_notes::{GetPatchNotesTool, PatchNotesSource, NO_ARTICLE_LINK, PATCH_NOTES_NOT_FOUND};
pub use registry::{Tool, ToolDispatch, ToolName, ToolRegistry, UnknownToolPolicy};
pub use stats::{comp_stats_disabled_output, GetCompStatsTool, GetGeneralStatsTool, StatsSource};
