//! 存储协作方接口，以及在其之上组装列表页元数据的薄编排层

use tracing::debug;
use utils_common::TaxonomyTerm;

use crate::error::StoreError;
use crate::metadata::{describe_for_metadata, ListingMetadata, ResolvedNames};
use crate::models::{FilterState, ListingConfig};
use crate::query::{total_pages, ListingPredicate, Table};

/// 后端存储的只读查询接口
pub trait CatalogStore {
    /// 按 slug 查找一条记录，不存在时返回 None
    fn find_by_slug(&self, table: Table, slug: &str) -> Result<Option<TaxonomyTerm>, StoreError>;

    /// 统计满足条件的记录数
    fn count_matching(&self, table: Table, predicate: &ListingPredicate) -> Result<usize, StoreError>;
}

impl<S: CatalogStore + ?Sized> CatalogStore for &S {
    fn find_by_slug(&self, table: Table, slug: &str) -> Result<Option<TaxonomyTerm>, StoreError> {
        (**self).find_by_slug(table, slug)
    }

    fn count_matching(&self, table: Table, predicate: &ListingPredicate) -> Result<usize, StoreError> {
        (**self).count_matching(table, predicate)
    }
}

/// 解析分类/标签名称并统计总页数
///
/// 名称查询与计数互不依赖。计数使用原始 slug，无法解析的 slug 得到 0 条、1 页。
/// 存储错误不做处理，直接返回给调用方。
pub fn resolve_names<S: CatalogStore>(
    store: &S,
    config: &ListingConfig,
    state: &FilterState,
) -> Result<ResolvedNames, StoreError> {
    let category = match state.category.as_deref() {
        Some(slug) => store
            .find_by_slug(Table::categories(config.kind), slug)?
            .map(|term| term.name),
        None => None,
    };
    let tag = match state.tag.as_deref() {
        Some(slug) => store
            .find_by_slug(Table::tags(config.kind), slug)?
            .map(|term| term.name),
        None => None,
    };

    let count = store.count_matching(Table::items(config.kind), &ListingPredicate::from_state(state))?;
    let total = total_pages(count, config.page_size);
    debug!(count, total_pages = total, "listing names resolved");

    Ok(ResolvedNames {
        category,
        tag,
        total_pages: Some(total),
    })
}

/// 生成列表页元数据: 先查询存储，再交给纯函数组装
pub fn resolve_listing_metadata<S: CatalogStore>(
    store: &S,
    config: &ListingConfig,
    state: &FilterState,
) -> Result<ListingMetadata, StoreError> {
    let names = resolve_names(store, config, state)?;
    Ok(describe_for_metadata(config, state, &names))
}
