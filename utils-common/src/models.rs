use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 分类/标签条目 - slug 与展示名称
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TaxonomyTerm {
    /// URL 安全的唯一标识
    pub slug: String,
    /// 展示名称
    pub name: String,
}

impl TaxonomyTerm {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
        }
    }
}

/// 列表条目 - 商品或博客文章中列表页需要的字段
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ListingRecord {
    /// 条目 slug
    pub slug: String,
    /// 标题 (商品名或文章标题)
    pub title: String,
    /// 所属分类 slug
    #[serde(default)]
    pub category: Option<String>,
    /// 标签 slug 列表
    #[serde(default)]
    pub tags: Vec<String>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl ListingRecord {
    /// 是否同时满足分类和标签条件，未给出的条件视为满足
    pub fn matches(&self, category: Option<&str>, tag: Option<&str>) -> bool {
        let category_ok = category.map_or(true, |c| self.category.as_deref() == Some(c));
        let tag_ok = tag.map_or(true, |t| self.tags.iter().any(|own| own == t));
        category_ok && tag_ok
    }
}
