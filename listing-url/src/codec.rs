//! 列表页 URL 编解码
//!
//! 筛选状态以路径段的形式出现在 URL 中，例如
//! `/mundo-grimmiz/categoria/figuras/orden/title-asc/pagina/2`。
//! 解析时关键字/值成对出现、顺序任意；生成时按固定顺序输出并省略默认值，
//! 因此同一个状态只有一个规范 URL。
//!
//! 旧版本使用查询参数 (`?categoria=&etiqueta=&orden=&pagina=`)，
//! 这类请求只用于永久重定向到规范 URL。

use tracing::debug;
use url::form_urlencoded;

use crate::models::{FilterState, ListingConfig, ListingKind, SortOrder};

pub const CATEGORY_KEY: &str = "categoria";
pub const TAG_KEY: &str = "etiqueta";
pub const SORT_KEY: &str = "orden";
pub const PAGE_KEY: &str = "pagina";

/// 旧版查询参数名，与路径关键字相同
pub const LEGACY_KEYS: [&str; 4] = [CATEGORY_KEY, TAG_KEY, SORT_KEY, PAGE_KEY];

/// 从路径段解析筛选状态
///
/// 路径段按 (关键字, 值) 两两成对读取，各组之间顺序无关。未知关键字、
/// 缺少值的末尾关键字以及非法值都会被忽略；同一关键字出现多次时以最后一个
/// 合法值为准。该函数不会失败，缺失或非法的字段取默认值。
pub fn parse_list_url<S: AsRef<str>>(kind: ListingKind, segments: &[S]) -> FilterState {
    let mut state = FilterState::default();

    for pair in segments.chunks(2) {
        match pair {
            [key, value] => apply_pair(kind, &mut state, key.as_ref(), value.as_ref()),
            [key] => debug!(keyword = key.as_ref(), "trailing keyword without value ignored"),
            _ => {}
        }
    }

    state
}

/// 从完整请求路径解析筛选状态
pub fn parse_list_path(config: &ListingConfig, path: &str) -> FilterState {
    parse_list_url(config.kind, &segments_of(path, &config.base_path))
}

/// 把请求路径拆成路径段
///
/// 去掉查询串、片段、列表页前缀以及空段。路径不以前缀开头时，
/// 丢弃第一个已知关键字之前的所有段，避免前缀的段打乱关键字/值的配对。
pub fn segments_of<'a>(path: &'a str, base_path: &str) -> Vec<&'a str> {
    let path = path.split(&['?', '#'][..]).next().unwrap_or("");
    let base = base_path.trim_end_matches('/');

    match path.strip_prefix(base) {
        Some(rest) if !base.is_empty() && (rest.is_empty() || rest.starts_with('/')) => {
            rest.split('/').filter(|s| !s.is_empty()).collect()
        }
        _ => {
            let segments: Vec<&str> = path
                .split('/')
                .filter(|s| !s.is_empty())
                .skip_while(|s| !LEGACY_KEYS.contains(s))
                .collect();
            if !base.is_empty() {
                debug!(%path, base, "path outside listing base, leading segments dropped");
            }
            segments
        }
    }
}

/// 生成规范 URL 路径
///
/// 按分类、标签、排序、页码的固定顺序追加关键字/值，等于默认值的组省略。
/// slug 原样输出，上游已保证其 URL 安全。
pub fn build_list_url(config: &ListingConfig, state: &FilterState) -> String {
    let mut path = config.base_path.trim_end_matches('/').to_string();

    for (key, value) in canonical_pairs(config.kind, state) {
        path.push('/');
        path.push_str(key);
        path.push('/');
        path.push_str(&value);
    }

    if path.is_empty() {
        path.push('/');
    }
    path
}

/// 非默认字段对应的 (关键字, 值)，顺序固定
fn canonical_pairs(kind: ListingKind, state: &FilterState) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::with_capacity(4);

    if let Some(category) = state.category.as_deref().filter(|c| !c.is_empty()) {
        pairs.push((CATEGORY_KEY, category.to_string()));
    }
    if let Some(tag) = state.tag.as_deref().filter(|t| !t.is_empty()) {
        pairs.push((TAG_KEY, tag.to_string()));
    }
    if !state.sort.is_default() {
        pairs.push((SORT_KEY, state.sort.token(kind).to_string()));
    }
    if state.page > 1 {
        pairs.push((PAGE_KEY, state.page.to_string()));
    }

    pairs
}

/// 请求是否带有旧版查询参数
pub fn is_legacy_query_request<I, K, V>(params: I) -> bool
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    params
        .into_iter()
        .any(|(key, _)| LEGACY_KEYS.contains(&key.as_ref()))
}

/// 把旧版查询参数翻译为筛选状态，取值规则与路径解析相同
pub fn translate_legacy_query<I, K, V>(kind: ListingKind, params: I) -> FilterState
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut state = FilterState::default();
    apply_legacy_params(kind, &mut state, params);
    state
}

/// 解析原始查询串 (可带前导 `?`)，值会做百分号解码
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// 计算旧版请求的永久重定向目标
///
/// 查询串不含旧版参数时返回 None，调用方应正常渲染。路径中已有的条件保留，
/// 查询参数中的同名条件覆盖它们。其余查询参数不会带到规范 URL 上。
pub fn legacy_redirect(config: &ListingConfig, path: &str, query: &str) -> Option<String> {
    let params = parse_query(query);
    if !is_legacy_query_request(params.iter().map(|(k, v)| (k.as_str(), v.as_str()))) {
        return None;
    }

    let mut state = parse_list_path(config, path);
    apply_legacy_params(config.kind, &mut state, params);
    let target = build_list_url(config, &state);
    debug!(%path, %query, %target, "legacy listing query redirected");
    Some(target)
}

fn apply_legacy_params<I, K, V>(kind: ListingKind, state: &mut FilterState, params: I)
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    for (key, value) in params {
        let key = key.as_ref();
        if LEGACY_KEYS.contains(&key) {
            apply_pair(kind, state, key, value.as_ref());
        }
    }
}

fn apply_pair(kind: ListingKind, state: &mut FilterState, key: &str, value: &str) {
    match key {
        CATEGORY_KEY | TAG_KEY if value.is_empty() => {
            debug!(keyword = key, "empty slug ignored");
        }
        CATEGORY_KEY => state.category = Some(value.to_string()),
        TAG_KEY => state.tag = Some(value.to_string()),
        SORT_KEY => match SortOrder::from_token(kind, value) {
            Some(sort) => state.sort = sort,
            None => debug!(token = value, "unknown sort token ignored"),
        },
        PAGE_KEY => match parse_page(value) {
            Some(page) => state.page = page,
            None => debug!(value, "invalid page number ignored"),
        },
        _ => debug!(keyword = key, "unknown listing keyword ignored"),
    }
}

pub(crate) fn parse_page(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|page| *page >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ListingConfig {
        ListingConfig::catalog()
    }

    fn state(category: Option<&str>, tag: Option<&str>, sort: SortOrder, page: u32) -> FilterState {
        FilterState {
            category: category.map(str::to_string),
            tag: tag.map(str::to_string),
            sort,
            page,
        }
    }

    #[test]
    fn parse_is_order_independent() {
        let a = parse_list_url(ListingKind::Catalog, &["categoria", "figuras", "orden", "title-asc"]);
        let b = parse_list_url(ListingKind::Catalog, &["orden", "title-asc", "categoria", "figuras"]);
        assert_eq!(a, b);
        assert_eq!(a, state(Some("figuras"), None, SortOrder::TitleAsc, 1));

        let a = parse_list_url(ListingKind::Catalog, &["categoria", "figuras", "orden", "precio-asc"]);
        let b = parse_list_url(ListingKind::Catalog, &["orden", "precio-asc", "categoria", "figuras"]);
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_page_defaults_to_one() {
        for value in ["0", "abc", "-3", "", "99999999999", "2.5"] {
            let parsed = parse_list_url(ListingKind::Catalog, &["pagina", value]);
            assert_eq!(parsed.page, 1, "pagina/{}", value);
        }
        assert_eq!(parse_list_url(ListingKind::Catalog, &["pagina", "7"]).page, 7);
    }

    #[test]
    fn invalid_sort_defaults_to_recent() {
        let parsed = parse_list_url(ListingKind::Catalog, &["orden", "nonsense"]);
        assert_eq!(parsed.sort, SortOrder::Recent);
        let parsed = parse_list_url(ListingKind::Blog, &["orden", "title-asc"]);
        assert_eq!(parsed.sort, SortOrder::Recent);
        let parsed = parse_list_url(ListingKind::Blog, &["orden", "titulo-asc"]);
        assert_eq!(parsed.sort, SortOrder::TitleAsc);
    }

    #[test]
    fn malformed_pairs_do_not_stop_parsing() {
        let parsed = parse_list_url(
            ListingKind::Catalog,
            &["color", "rojo", "etiqueta", "navidad", "categoria"],
        );
        assert_eq!(parsed, state(None, Some("navidad"), SortOrder::Recent, 1));

        let parsed = parse_list_url(ListingKind::Catalog, &["categoria", "", "etiqueta", "navidad"]);
        assert_eq!(parsed.category, None);

        let empty: [&str; 0] = [];
        assert_eq!(parse_list_url(ListingKind::Catalog, &empty), FilterState::default());
    }

    #[test]
    fn repeated_keyword_keeps_last_valid_value() {
        let parsed = parse_list_url(
            ListingKind::Catalog,
            &["pagina", "3", "categoria", "tazas", "pagina", "x", "categoria", "figuras"],
        );
        assert_eq!(parsed.page, 3);
        assert_eq!(parsed.category.as_deref(), Some("figuras"));
    }

    #[test]
    fn default_state_builds_bare_base_path() {
        assert_eq!(build_list_url(&catalog(), &FilterState::default()), "/mundo-grimmiz");
        assert_eq!(build_list_url(&ListingConfig::blog(), &FilterState::default()), "/blog");

        let root = ListingConfig {
            base_path: String::new(),
            ..catalog()
        };
        assert_eq!(build_list_url(&root, &FilterState::default()), "/");
        assert_eq!(
            build_list_url(&root, &FilterState::default().with_page(2)),
            "/pagina/2"
        );
    }

    #[test]
    fn build_uses_fixed_order_and_omits_defaults() {
        let full = state(Some("figuras"), Some("navidad"), SortOrder::TitleDesc, 2);
        assert_eq!(
            build_list_url(&catalog(), &full),
            "/mundo-grimmiz/categoria/figuras/etiqueta/navidad/orden/title-desc/pagina/2"
        );
        assert_eq!(
            build_list_url(&ListingConfig::blog(), &full),
            "/blog/categoria/figuras/etiqueta/navidad/orden/titulo-desc/pagina/2"
        );
        assert_eq!(
            build_list_url(&catalog(), &state(None, Some("navidad"), SortOrder::Recent, 1)),
            "/mundo-grimmiz/etiqueta/navidad"
        );
    }

    #[test]
    fn round_trip_over_normalized_states() {
        let config = catalog();
        for category in [None, Some("figuras")] {
            for tag in [None, Some("navidad")] {
                for sort in SortOrder::ALL {
                    for page in [1, 2, 40] {
                        let original = state(category, tag, sort, page);
                        let url = build_list_url(&config, &original);
                        assert_eq!(parse_list_path(&config, &url), original, "{}", url);
                    }
                }
            }
        }
    }

    #[test]
    fn toggling_one_axis_leaves_the_other() {
        let config = catalog();
        let base = state(Some("figuras"), Some("navidad"), SortOrder::Recent, 1);

        let without_tag = parse_list_path(&config, &build_list_url(&config, &base.clone().without_tag()));
        assert_eq!(without_tag.category.as_deref(), Some("figuras"));
        assert_eq!(without_tag.tag, None);

        let without_category = parse_list_path(&config, &build_list_url(&config, &base.without_category()));
        assert_eq!(without_category.tag.as_deref(), Some("navidad"));
        assert_eq!(without_category.category, None);
    }

    #[test]
    fn segments_strip_prefix_query_and_empties() {
        assert_eq!(
            segments_of("/mundo-grimmiz/categoria/figuras/?x=1#top", "/mundo-grimmiz"),
            vec!["categoria", "figuras"]
        );
        assert!(segments_of("/mundo-grimmiz", "/mundo-grimmiz").is_empty());
        assert_eq!(segments_of("categoria//figuras", ""), vec!["categoria", "figuras"]);
    }

    #[test]
    fn path_outside_base_keeps_pairs_aligned() {
        assert_eq!(
            segments_of("/mundo-grimmizz/pagina/2", "/mundo-grimmiz"),
            vec!["pagina", "2"]
        );
        let config = ListingConfig::catalog();
        let parsed = parse_list_path(&config, "/tienda/vieja/categoria/figuras/pagina/2");
        assert_eq!(parsed, state(Some("figuras"), None, SortOrder::Recent, 2));
        assert_eq!(parse_list_path(&config, "/otra/ruta"), FilterState::default());
    }

    #[test]
    fn legacy_query_detection() {
        assert!(is_legacy_query_request([("categoria", "figuras")]));
        assert!(is_legacy_query_request([("utm_source", "x"), ("pagina", "")]));
        assert!(!is_legacy_query_request([("utm_source", "x")]));
        assert!(!is_legacy_query_request(Vec::<(String, String)>::new()));
    }

    #[test]
    fn legacy_query_translates_and_redirects() {
        let translated = translate_legacy_query(
            ListingKind::Catalog,
            [("categoria", "figuras"), ("pagina", "3")],
        );
        assert_eq!(translated, state(Some("figuras"), None, SortOrder::Recent, 3));
        assert_eq!(
            build_list_url(&catalog(), &translated),
            "/mundo-grimmiz/categoria/figuras/pagina/3"
        );

        assert_eq!(
            legacy_redirect(&catalog(), "/mundo-grimmiz", "?categoria=figuras&pagina=3").as_deref(),
            Some("/mundo-grimmiz/categoria/figuras/pagina/3")
        );
        assert_eq!(legacy_redirect(&catalog(), "/mundo-grimmiz", "utm_source=ig"), None);
        assert_eq!(legacy_redirect(&catalog(), "/mundo-grimmiz", ""), None);
    }

    #[test]
    fn legacy_redirect_merges_path_and_cleans_defaults() {
        assert_eq!(
            legacy_redirect(
                &catalog(),
                "/mundo-grimmiz/categoria/tazas/etiqueta/navidad",
                "categoria=figuras&orden=recent&pagina=1&utm_source=ig",
            )
            .as_deref(),
            Some("/mundo-grimmiz/categoria/figuras/etiqueta/navidad")
        );
        assert_eq!(
            legacy_redirect(&catalog(), "/mundo-grimmiz", "?orden=nonsense").as_deref(),
            Some("/mundo-grimmiz")
        );
        assert_eq!(
            legacy_redirect(&ListingConfig::blog(), "/blog", "orden=antiguos&etiqueta=taller-abierto").as_deref(),
            Some("/blog/etiqueta/taller-abierto/orden/antiguos")
        );
    }
}
