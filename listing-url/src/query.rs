use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{FilterState, ListingConfig, ListingKind, SortOrder};

/// 后端数据表
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Categories,
    Tags,
    Products,
    BlogCategories,
    BlogTags,
    Articles,
}

impl Table {
    pub fn categories(kind: ListingKind) -> Self {
        match kind {
            ListingKind::Catalog => Table::Categories,
            ListingKind::Blog => Table::BlogCategories,
        }
    }

    pub fn tags(kind: ListingKind) -> Self {
        match kind {
            ListingKind::Catalog => Table::Tags,
            ListingKind::Blog => Table::BlogTags,
        }
    }

    /// 列表条目所在的表
    pub fn items(kind: ListingKind) -> Self {
        match kind {
            ListingKind::Catalog => Table::Products,
            ListingKind::Blog => Table::Articles,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Table::Categories => "categories",
            Table::Tags => "tags",
            Table::Products => "products",
            Table::BlogCategories => "blog_categories",
            Table::BlogTags => "blog_tags",
            Table::Articles => "blog_articles",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 列表查询的筛选条件，保留原始 slug (无法解析的 slug 会得到空结果)
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPredicate {
    pub category: Option<String>,
    pub tag: Option<String>,
}

impl ListingPredicate {
    pub fn from_state(state: &FilterState) -> Self {
        Self {
            category: state.category.clone(),
            tag: state.tag.clone(),
        }
    }
}

/// 排序字段
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderField {
    CreatedAt,
    Title,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: OrderField,
    pub ascending: bool,
}

impl From<SortOrder> for OrderBy {
    fn from(sort: SortOrder) -> Self {
        match sort {
            SortOrder::Recent => OrderBy { field: OrderField::CreatedAt, ascending: false },
            SortOrder::Oldest => OrderBy { field: OrderField::CreatedAt, ascending: true },
            SortOrder::TitleAsc => OrderBy { field: OrderField::Title, ascending: true },
            SortOrder::TitleDesc => OrderBy { field: OrderField::Title, ascending: false },
        }
    }
}

/// 由筛选状态得到的列表查询参数
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub table: Table,
    pub predicate: ListingPredicate,
    pub order_by: OrderBy,
    pub offset: u64,
    pub limit: u32,
}

impl ListingQuery {
    pub fn from_state(config: &ListingConfig, state: &FilterState) -> Self {
        let limit = config.page_size.max(1);
        let page = state.page.max(1);
        Self {
            table: Table::items(config.kind),
            predicate: ListingPredicate::from_state(state),
            order_by: state.sort.into(),
            offset: u64::from(page - 1) * u64::from(limit),
            limit,
        }
    }
}

/// 总页数，至少为 1
pub fn total_pages(count: usize, page_size: u32) -> u32 {
    let page_size = page_size.max(1) as usize;
    let pages = (count + page_size - 1) / page_size;
    pages.max(1).min(u32::MAX as usize) as u32
}
