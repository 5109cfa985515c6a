use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utils_common::compression::from_compressed_with_max_version;
use utils_common::{ListingRecord, TaxonomyTerm};

use crate::error::{IndexError, StoreError};
use crate::models::{FilterState, FilterView, ListingKind};
use crate::query::{total_pages, ListingPredicate, ListingQuery, OrderField, Table};
use crate::store::CatalogStore;

/// 索引文件格式版本
pub const INDEX_VERSION: [u8; 2] = [1, 0];

/// 分类/标签与列表条目的快照，由索引工具离线生成
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TaxonomyIndex {
    /// 列表类型
    pub kind: ListingKind,
    /// 分类: slug -> 条目
    pub categories: HashMap<String, TaxonomyTerm>,
    /// 标签: slug -> 条目
    pub tags: HashMap<String, TaxonomyTerm>,
    /// 所有列表条目
    pub items: Vec<ListingRecord>,
    /// 生成时间
    pub built_at: DateTime<Utc>,
}

/// 一页列表结果
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    /// 解析出的筛选状态
    pub state: FilterView,
    /// 当前页条目
    pub items: Vec<ListingRecord>,
    /// 满足条件的条目总数
    pub total: usize,
    /// 每页条数
    pub limit: u32,
    /// 总页数
    pub total_pages: u32,
}

impl TaxonomyIndex {
    /// 从压缩的二进制数据恢复索引
    pub fn from_compressed(data: &[u8]) -> Result<Self, IndexError> {
        let index: TaxonomyIndex = from_compressed_with_max_version(data, INDEX_VERSION[0])?;
        info!(
            kind = index.kind.as_str(),
            items = index.items.len(),
            categories = index.categories.len(),
            tags = index.tags.len(),
            "listing index loaded"
        );
        Ok(index)
    }

    fn owns(&self, table: Table) -> bool {
        table == Table::categories(self.kind)
            || table == Table::tags(self.kind)
            || table == Table::items(self.kind)
    }

    /// 执行列表查询: 筛选、排序、分页。超出末页时返回空列表
    pub fn execute(&self, state: FilterState, query: &ListingQuery) -> Result<ListingPage, StoreError> {
        if query.table != Table::items(self.kind) {
            return Err(StoreError::UnsupportedTable(query.table));
        }

        let mut matching: Vec<&ListingRecord> = self
            .items
            .iter()
            .filter(|item| matches_predicate(item, &query.predicate))
            .collect();

        match query.order_by.field {
            OrderField::CreatedAt => matching.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            OrderField::Title => {
                matching.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
            }
        }
        if !query.order_by.ascending {
            matching.reverse();
        }

        let total = matching.len();
        let items = matching
            .into_iter()
            .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
            .take(query.limit as usize)
            .cloned()
            .collect();

        Ok(ListingPage {
            state: FilterView::new(self.kind, &state),
            items,
            total,
            limit: query.limit,
            total_pages: total_pages(total, query.limit),
        })
    }
}

fn matches_predicate(item: &ListingRecord, predicate: &ListingPredicate) -> bool {
    item.matches(predicate.category.as_deref(), predicate.tag.as_deref())
}

impl CatalogStore for TaxonomyIndex {
    fn find_by_slug(&self, table: Table, slug: &str) -> Result<Option<TaxonomyTerm>, StoreError> {
        if !self.owns(table) {
            return Err(StoreError::UnsupportedTable(table));
        }

        let found = if table == Table::categories(self.kind) {
            self.categories.get(slug).cloned()
        } else if table == Table::tags(self.kind) {
            self.tags.get(slug).cloned()
        } else {
            self.items
                .iter()
                .find(|item| item.slug == slug)
                .map(|item| TaxonomyTerm::new(item.slug.clone(), item.title.clone()))
        };
        Ok(found)
    }

    fn count_matching(&self, table: Table, predicate: &ListingPredicate) -> Result<usize, StoreError> {
        if table != Table::items(self.kind) {
            return Err(StoreError::UnsupportedTable(table));
        }
        Ok(self
            .items
            .iter()
            .filter(|item| matches_predicate(item, predicate))
            .count())
    }
}
