//! 列表页 `<head>` 元数据: 标题、描述、robots 与 canonical
//!
//! 只依赖筛选状态和调用方已解析好的名称，不访问存储。

use serde::{Deserialize, Serialize};

use crate::codec::build_list_url;
use crate::models::{FilterState, ListingConfig, ListingKind, SortOrder};

/// 调用方从存储中解析出的名称与总页数
///
/// slug 无法解析时对应名称为 None；总页数无法计算时为 None。
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolvedNames {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub total_pages: Option<u32>,
}

/// robots 指令
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Robots {
    pub index: bool,
    pub follow: bool,
}

impl Robots {
    pub const INDEX: Robots = Robots { index: true, follow: true };
    pub const NO_INDEX: Robots = Robots { index: false, follow: false };
}

/// 列表页元数据
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListingMetadata {
    pub title: String,
    pub description: String,
    pub robots: Robots,
    /// 仅可索引的页面才有 canonical
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
}

/// 生成列表页元数据
///
/// 非默认排序的页面一律 noindex 且不输出 canonical；其余页面可索引，
/// canonical 始终为站点地址加该状态的规范路径。未解析出名称的筛选条件
/// 只在标题和描述中视为未设置。总页数未知或页码超出总页数时不输出分页文字。
pub fn describe_for_metadata(
    config: &ListingConfig,
    state: &FilterState,
    names: &ResolvedNames,
) -> ListingMetadata {
    let category = state.category.as_ref().and(names.category.as_deref());
    let tag = state.tag.as_ref().and(names.tag.as_deref());
    let pagination = page_of_total(state.page, names.total_pages);

    let mut title = category.unwrap_or(&config.default_title).to_string();
    if let Some(tag) = tag {
        title.push_str(&format!(" #{}", tag));
    }
    if let Some((page, total)) = pagination {
        title.push_str(&format!(" - página {} de {}", page, total));
    }
    title.push_str(&format!(" | {}", config.site_name));

    let mut description = base_description(config, category, tag);
    if !state.sort.is_default() {
        description.push_str(&format!(" Ordenados por {}.", sort_label(state.sort)));
    }
    if let Some((page, total)) = pagination {
        description.push_str(&format!(" Página {} de {}.", page, total));
    }

    let (robots, canonical) = if state.sort.is_default() {
        let canonical = format!("{}{}", config.base_url, build_list_url(config, state));
        (Robots::INDEX, Some(canonical))
    } else {
        (Robots::NO_INDEX, None)
    };

    ListingMetadata {
        title,
        description,
        robots,
        canonical,
    }
}

fn page_of_total(page: u32, total_pages: Option<u32>) -> Option<(u32, u32)> {
    match total_pages {
        Some(total) if page > 1 && page <= total => Some((page, total)),
        _ => None,
    }
}

fn base_description(config: &ListingConfig, category: Option<&str>, tag: Option<&str>) -> String {
    match (config.kind, category, tag) {
        (ListingKind::Catalog, None, None) => {
            format!("Descubre todos los productos hechos a mano de {}.", config.site_name)
        }
        (ListingKind::Catalog, Some(c), None) => {
            format!("Descubre nuestros productos de {} hechos a mano.", c)
        }
        (ListingKind::Catalog, None, Some(t)) => {
            format!("Descubre nuestros productos hechos a mano con la etiqueta #{}.", t)
        }
        (ListingKind::Catalog, Some(c), Some(t)) => {
            format!("Descubre nuestros productos de {} con la etiqueta #{}.", c, t)
        }
        (ListingKind::Blog, None, None) => {
            format!("Lee todos los artículos del blog de {}.", config.site_name)
        }
        (ListingKind::Blog, Some(c), None) => format!("Lee nuestros artículos sobre {}.", c),
        (ListingKind::Blog, None, Some(t)) => {
            format!("Lee nuestros artículos con la etiqueta #{}.", t)
        }
        (ListingKind::Blog, Some(c), Some(t)) => {
            format!("Lee nuestros artículos sobre {} con la etiqueta #{}.", c, t)
        }
    }
}

fn sort_label(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Recent => "más recientes",
        SortOrder::Oldest => "más antiguos",
        SortOrder::TitleAsc => "título (A-Z)",
        SortOrder::TitleDesc => "título (Z-A)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(category: Option<&str>, tag: Option<&str>, total: Option<u32>) -> ResolvedNames {
        ResolvedNames {
            category: category.map(str::to_string),
            tag: tag.map(str::to_string),
            total_pages: total,
        }
    }

    #[test]
    fn title_assembles_present_parts_in_order() {
        let config = ListingConfig::catalog();
        let state = FilterState::default()
            .with_category("figuras")
            .with_tag("navidad")
            .with_page(2);
        let meta = describe_for_metadata(&config, &state, &names(Some("Figuras"), Some("navidad"), Some(5)));
        assert_eq!(meta.title, "Figuras #navidad - página 2 de 5 | Grimmiz");

        let meta = describe_for_metadata(&config, &FilterState::default(), &ResolvedNames::default());
        assert_eq!(meta.title, "Mundo Grimmiz | Grimmiz");
    }

    #[test]
    fn unknown_total_omits_page_suffixes() {
        let config = ListingConfig::catalog();
        let state = FilterState::default().with_page(3);
        let meta = describe_for_metadata(&config, &state, &ResolvedNames::default());
        assert_eq!(meta.title, "Mundo Grimmiz | Grimmiz");
        assert!(!meta.description.contains("Página"));
        assert_eq!(meta.canonical.as_deref(), Some("https://grimmiz.com/mundo-grimmiz/pagina/3"));
    }

    #[test]
    fn first_page_never_shows_pagination() {
        let config = ListingConfig::catalog();
        let meta = describe_for_metadata(&config, &FilterState::default(), &names(None, None, Some(4)));
        assert_eq!(meta.title, "Mundo Grimmiz | Grimmiz");
        assert!(!meta.description.contains("Página"));
    }

    #[test]
    fn description_templates_follow_filter_presence() {
        let config = ListingConfig::catalog();
        let state = FilterState::default().with_category("figuras").with_tag("navidad");

        let both = describe_for_metadata(&config, &state, &names(Some("Figuras"), Some("Navidad"), Some(1)));
        assert_eq!(both.description, "Descubre nuestros productos de Figuras con la etiqueta #Navidad.");

        let category_only = describe_for_metadata(&config, &state, &names(Some("Figuras"), None, Some(1)));
        assert_eq!(category_only.description, "Descubre nuestros productos de Figuras hechos a mano.");

        let tag_only = describe_for_metadata(&config, &state, &names(None, Some("Navidad"), Some(1)));
        assert_eq!(tag_only.description, "Descubre nuestros productos hechos a mano con la etiqueta #Navidad.");

        let neither = describe_for_metadata(&config, &FilterState::default(), &ResolvedNames::default());
        assert_eq!(neither.description, "Descubre todos los productos hechos a mano de Grimmiz.");
    }

    #[test]
    fn sort_and_pagination_clauses_are_appended() {
        let config = ListingConfig::blog();
        let state = FilterState::default()
            .with_category("taller")
            .with_sort(SortOrder::TitleAsc)
            .with_page(2);
        let meta = describe_for_metadata(&config, &state, &names(Some("Taller"), None, Some(3)));
        assert_eq!(
            meta.description,
            "Lee nuestros artículos sobre Taller. Ordenados por título (A-Z). Página 2 de 3."
        );
        assert_eq!(meta.title, "Taller - página 2 de 3 | Grimmiz");
    }

    #[test]
    fn sorted_views_are_noindex_without_canonical() {
        let config = ListingConfig::catalog();
        for sort in SortOrder::ALL {
            let state = FilterState::default().with_category("figuras").with_sort(sort);
            let meta = describe_for_metadata(&config, &state, &names(Some("Figuras"), None, Some(2)));
            if sort.is_default() {
                assert_eq!(meta.robots, Robots::INDEX);
                assert_eq!(
                    meta.canonical,
                    Some(format!("{}{}", config.base_url, build_list_url(&config, &state)))
                );
            } else {
                assert_eq!(meta.robots, Robots::NO_INDEX);
                assert_eq!(meta.canonical, None);
            }
        }
    }

    #[test]
    fn unresolved_slug_only_affects_text() {
        let config = ListingConfig::catalog();
        let state = FilterState::default().with_category("no-existe").with_tag("navidad");
        let meta = describe_for_metadata(&config, &state, &names(None, Some("Navidad"), Some(1)));
        assert_eq!(meta.title, "Mundo Grimmiz #Navidad | Grimmiz");
        assert_eq!(
            meta.canonical.as_deref(),
            Some("https://grimmiz.com/mundo-grimmiz/categoria/no-existe/etiqueta/navidad")
        );
    }

    #[test]
    fn filtered_canonical_survives_missing_names() {
        let config = ListingConfig::catalog();
        let state = FilterState::default().with_category("figuras").with_page(2);
        let meta = describe_for_metadata(&config, &state, &ResolvedNames::default());
        assert_eq!(meta.title, "Mundo Grimmiz | Grimmiz");
        assert_eq!(
            meta.canonical.as_deref(),
            Some("https://grimmiz.com/mundo-grimmiz/categoria/figuras/pagina/2")
        );
    }

    #[test]
    fn page_beyond_total_omits_page_suffixes() {
        let config = ListingConfig::catalog();
        let state = FilterState::default().with_category("figuras").with_page(9);
        let meta = describe_for_metadata(&config, &state, &names(Some("Figuras"), None, Some(1)));
        assert_eq!(meta.title, "Figuras | Grimmiz");
        assert!(!meta.description.contains("Página"));

        let last = describe_for_metadata(&config, &state.with_page(3), &names(Some("Figuras"), None, Some(3)));
        assert_eq!(last.title, "Figuras - página 3 de 3 | Grimmiz");
    }

    #[test]
    fn names_without_matching_filter_are_ignored() {
        let config = ListingConfig::catalog();
        let meta = describe_for_metadata(&config, &FilterState::default(), &names(Some("Figuras"), None, None));
        assert_eq!(meta.title, "Mundo Grimmiz | Grimmiz");
        assert_eq!(meta.canonical.as_deref(), Some("https://grimmiz.com/mundo-grimmiz"));
    }

    #[test]
    fn serialized_metadata_omits_absent_canonical() {
        let config = ListingConfig::catalog();
        let state = FilterState::default().with_sort(SortOrder::Oldest);
        let meta = describe_for_metadata(&config, &state, &ResolvedNames::default());
        let json = serde_json::to_value(&meta).unwrap();
        assert!(json.get("canonical").is_none());
        assert_eq!(json["robots"]["index"], false);
    }
}
