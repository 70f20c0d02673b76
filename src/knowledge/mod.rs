//! 知识层：三类索引（unit / item / trait）的检索后端与查询客户端

pub mod backend;
pub mod lookup;
pub mod mock;
pub mod types;

pub use backend::{AzureSearchBackend, SearchBackend, SearchHit};
pub use lookup::{IndexNames, KnowledgeClient, DEFAULT_INDEX_TOP, MAX_HITS_PER_KIND};
pub use mock::StaticSearchBackend;
pub use types::{Fact, FactKey, FactKind};
