pub mod error;
pub mod storage;
pub mod types;

pub use error::Error;
pub use storage::{ArticleStorage, BlockingArticleStorage};
pub use types::{parse_timestamp, Article, ArticleStatus, StoredArticle};

pub type Result<T> = std::result::Result<T, Error>;
