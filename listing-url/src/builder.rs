use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};
use utils_common::compression::to_compressed;
use utils_common::{ListingRecord, TaxonomyTerm};

use crate::error::IndexError;
use crate::index::{TaxonomyIndex, INDEX_VERSION};
use crate::models::ListingKind;
use crate::query::Table;

/// 列表索引构建器
pub struct IndexBuilder {
    kind: ListingKind,
    categories: Vec<TaxonomyTerm>,
    tags: Vec<TaxonomyTerm>,
    items: Vec<ListingRecord>,
}

impl IndexBuilder {
    /// 创建新的索引构建器
    pub fn new(kind: ListingKind) -> Self {
        Self {
            kind,
            categories: Vec::new(),
            tags: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn add_category(&mut self, term: TaxonomyTerm) {
        self.categories.push(term);
    }

    pub fn add_tag(&mut self, term: TaxonomyTerm) {
        self.tags.push(term);
    }

    /// 添加列表条目
    pub fn add_item(&mut self, item: ListingRecord) {
        self.items.push(item);
    }

    /// 构建索引
    ///
    /// slug 重复时失败。引用了不存在的分类或标签的条目照常收录，只记录警告，
    /// 这些 slug 在列表页上会得到空结果。
    pub fn build_index(&self) -> Result<TaxonomyIndex, IndexError> {
        if self.items.is_empty() {
            return Err(IndexError::Empty);
        }

        let categories = keyed_by_slug(Table::categories(self.kind), &self.categories)?;
        let tags = keyed_by_slug(Table::tags(self.kind), &self.tags)?;

        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if !seen.insert(item.slug.as_str()) {
                return Err(IndexError::DuplicateSlug {
                    table: Table::items(self.kind),
                    slug: item.slug.clone(),
                });
            }
            if let Some(category) = item.category.as_deref() {
                if !categories.contains_key(category) {
                    warn!(item = %item.slug, category, "record references unknown category");
                }
            }
            for tag in item.tags.iter().filter(|t| !tags.contains_key(t.as_str())) {
                warn!(item = %item.slug, tag = %tag, "record references unknown tag");
            }
        }

        info!(
            kind = self.kind.as_str(),
            items = self.items.len(),
            categories = categories.len(),
            tags = tags.len(),
            "listing index built"
        );

        Ok(TaxonomyIndex {
            kind: self.kind,
            categories,
            tags,
            items: self.items.clone(),
            built_at: Utc::now(),
        })
    }

    /// 构建并压缩索引
    pub fn to_bytes(&self) -> Result<Vec<u8>, IndexError> {
        let index = self.build_index()?;
        Ok(to_compressed(&index, INDEX_VERSION)?)
    }

    /// 保存索引到文件
    pub fn save_index(&self, path: &Path) -> Result<(), IndexError> {
        let data = self.to_bytes()?;
        let mut file = File::create(path)?;
        file.write_all(&data)?;
        info!(path = %path.display(), bytes = data.len(), "listing index written");
        Ok(())
    }
}

fn keyed_by_slug(table: Table, terms: &[TaxonomyTerm]) -> Result<HashMap<String, TaxonomyTerm>, IndexError> {
    let mut map = HashMap::with_capacity(terms.len());
    for term in terms {
        if map.insert(term.slug.clone(), term.clone()).is_some() {
            return Err(IndexError::DuplicateSlug {
                table,
                slug: term.slug.clone(),
            });
        }
    }
    Ok(map)
}
