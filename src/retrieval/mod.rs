pub mod retriever;
pub mod sqlite;
pub mod store;

pub use retriever::Retriever;
pub use sqlite::SqliteVectorStore;
pub use store::{ScoredPassage, VectorStore};
