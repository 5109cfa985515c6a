//! 读取后端数据表导出的 JSON 文件
//!
//! 每张表导出为 `<表名>.json`，大表可以拆成 `<表名>-1.json`、`<表名>-2.json` 等分片。

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use listing_url::{ListingKind, Table};
use utils_common::{is_valid_slug, slugify, unique_slug, ListingRecord, TaxonomyTerm};

/// 分类/标签表的一行
#[derive(Deserialize, Debug)]
pub struct TermRow {
    #[serde(default)]
    pub slug: String,
    pub name: String,
}

/// 商品/文章表的一行
#[derive(Deserialize, Debug)]
pub struct ItemRow {
    #[serde(default)]
    pub slug: String,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// 扫描结果
#[derive(Debug, Default)]
pub struct Export {
    pub categories: Vec<TaxonomyTerm>,
    pub tags: Vec<TaxonomyTerm>,
    pub items: Vec<ListingRecord>,
    /// 读取的文件数
    pub files: usize,
    /// 被修正的 slug 数
    pub repaired: usize,
}

/// 扫描导出目录，读取该列表类型需要的三张表
pub fn scan_exports(dir: &Path, kind: ListingKind) -> Result<Export> {
    let category_table = Table::categories(kind);
    let tag_table = Table::tags(kind);
    let item_table = Table::items(kind);

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.with_context(|| format!("遍历目录时出错: {}", dir.display()))?;
        if entry.file_type().is_file() && entry.path().extension().map_or(false, |ext| ext == "json") {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    let mut export = Export::default();
    let mut taken: HashSet<String> = HashSet::new();

    for path in paths {
        let table = match table_of(&path, [category_table, tag_table, item_table]) {
            Some(table) => table,
            None => {
                debug!(path = %path.display(), "skipping unrelated export file");
                continue;
            }
        };

        let data = fs::read_to_string(&path)
            .with_context(|| format!("无法读取文件 {}", path.display()))?;
        export.files += 1;

        if table == item_table {
            let rows: Vec<ItemRow> = serde_json::from_str(&data)
                .with_context(|| format!("解析 {} 失败", path.display()))?;
            for row in rows {
                if let Some(item) = item_from_row(row, &mut taken, &mut export.repaired) {
                    export.items.push(item);
                }
            }
        } else {
            let rows: Vec<TermRow> = serde_json::from_str(&data)
                .with_context(|| format!("解析 {} 失败", path.display()))?;
            let terms = rows
                .into_iter()
                .filter_map(|row| term_from_row(table, row, &mut export.repaired));
            if table == category_table {
                export.categories.extend(terms);
            } else {
                export.tags.extend(terms);
            }
        }
    }

    Ok(export)
}

/// 根据文件名判断属于哪张表
fn table_of(path: &Path, tables: [Table; 3]) -> Option<Table> {
    let stem = path.file_stem()?.to_str()?;
    tables.into_iter().find(|table| {
        let name = table.as_str();
        stem == name
            || stem
                .strip_prefix(name)
                .and_then(|rest| rest.strip_prefix('-'))
                .map_or(false, |shard| !shard.is_empty() && shard.bytes().all(|b| b.is_ascii_digit()))
    })
}

/// 合法 slug 原样返回，否则由 slug 或名称重新生成；无法生成时返回 None
fn repair_slug(slug: &str, name: &str) -> Option<String> {
    if is_valid_slug(slug) {
        return Some(slug.to_string());
    }
    let source = if slug.trim().is_empty() { name } else { slug };
    Some(slugify(source)).filter(|s| !s.is_empty())
}

fn term_from_row(table: Table, row: TermRow, repaired: &mut usize) -> Option<TaxonomyTerm> {
    match repair_slug(&row.slug, &row.name) {
        Some(slug) => {
            if slug != row.slug {
                warn!(%table, from = %row.slug, to = %slug, "slug repaired");
                *repaired += 1;
            }
            Some(TaxonomyTerm::new(slug, row.name))
        }
        None => {
            warn!(%table, name = %row.name, "row without usable slug skipped");
            None
        }
    }
}

fn item_from_row(row: ItemRow, taken: &mut HashSet<String>, repaired: &mut usize) -> Option<ListingRecord> {
    let mut slug = match repair_slug(&row.slug, &row.title) {
        Some(slug) => slug,
        None => {
            warn!(title = %row.title, "item without usable slug skipped");
            return None;
        }
    };
    if slug != row.slug {
        *repaired += 1;
    }

    // 复制出的条目可能还带着原条目的 slug
    if taken.contains(&slug) {
        let unique = unique_slug(&slug, |candidate| taken.contains(candidate));
        warn!(from = %slug, to = %unique, "duplicate item slug renamed");
        *repaired += 1;
        slug = unique;
    }
    taken.insert(slug.clone());

    Some(ListingRecord {
        slug,
        title: row.title,
        category: row.category.filter(|c| !c.is_empty()),
        tags: row.tags.into_iter().filter(|t| !t.is_empty()).collect(),
        created_at: row.created_at,
    })
}
