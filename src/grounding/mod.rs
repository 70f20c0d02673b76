//! Grounding：实体抽取、会话去重、digest 格式与引擎

pub mod digest;
pub mod engine;
pub mod extract;
pub mod seen;

pub use digest::{build_digest, format_fact, DIGEST_HEADER};
pub use engine::{GroundingEngine, GroundingResult, LookupPath};
pub use extract::extract_entities;
pub use seen::SeenFacts;
