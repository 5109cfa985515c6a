use std::io;

use thiserror::Error;

use crate::models::ListingKind;
use crate::query::Table;

/// 存储协作方返回的错误，原样向上传递
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table `{0}` is not served by this store")]
    UnsupportedTable(Table),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// 索引文件构建或加载失败
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to read listing index: {0}")]
    Io(#[from] io::Error),
    #[error("no listing records to index")]
    Empty,
    #[error("duplicate slug `{slug}` in table `{table}`")]
    DuplicateSlug { table: Table, slug: String },
}

/// JS 接口层的错误
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("invalid JSON argument: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("unknown listing kind `{0}`")]
    UnknownKind(String),
    #[error("no index loaded for {} listings", .0.as_str())]
    IndexNotLoaded(ListingKind),
    #[error("listing index lock poisoned")]
    Lock,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Index(#[from] IndexError),
}
