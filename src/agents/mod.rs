//! 多 agent 编排：角色、提示词、专家 agent、编排器会话与装配

pub mod builder;
pub mod catalog;
pub mod orchestrator;
pub mod prompts;
pub mod specialist;
pub mod turn;

pub use builder::AppBuilder;
pub use catalog::AgentCatalog;
pub use orchestrator::{Orchestrator, TurnReply};
pub use specialist::{AgentRole, SpecialistAgent};
pub use turn::{Consultation, TurnContext};
