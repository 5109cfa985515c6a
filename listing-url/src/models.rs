use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::parse_page;

/// 列表类型 - 决定排序参数的词汇和描述文案
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    /// 商品目录
    #[default]
    Catalog,
    /// 博客文章
    Blog,
}

impl ListingKind {
    /// 从字符串解析列表类型，无法识别时返回 None
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "catalog" => Some(ListingKind::Catalog),
            "blog" => Some(ListingKind::Blog),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ListingKind::Catalog => "catalog",
            ListingKind::Blog => "blog",
        }
    }
}

/// 排序方式 - 封闭集合，默认最新优先
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    Recent,
    Oldest,
    TitleAsc,
    TitleDesc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::Recent,
        SortOrder::Oldest,
        SortOrder::TitleAsc,
        SortOrder::TitleDesc,
    ];

    /// URL 中使用的排序参数值
    pub fn token(self, kind: ListingKind) -> &'static str {
        match (kind, self) {
            (ListingKind::Catalog, SortOrder::Recent) => "recent",
            (ListingKind::Catalog, SortOrder::Oldest) => "oldest",
            (ListingKind::Catalog, SortOrder::TitleAsc) => "title-asc",
            (ListingKind::Catalog, SortOrder::TitleDesc) => "title-desc",
            (ListingKind::Blog, SortOrder::Recent) => "recientes",
            (ListingKind::Blog, SortOrder::Oldest) => "antiguos",
            (ListingKind::Blog, SortOrder::TitleAsc) => "titulo-asc",
            (ListingKind::Blog, SortOrder::TitleDesc) => "titulo-desc",
        }
    }

    /// 精确匹配排序参数值 (区分大小写)
    pub fn from_token(kind: ListingKind, token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sort| sort.token(kind) == token)
    }

    pub fn is_default(self) -> bool {
        self == SortOrder::default()
    }
}

/// 筛选状态 - 当前正在浏览的内容
///
/// 每次请求重新构造，不持久化。页码始终 >= 1，空 slug 视为未设置。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    /// 分类 slug，None 表示全部分类
    pub category: Option<String>,
    /// 标签 slug，None 表示不按标签筛选
    pub tag: Option<String>,
    /// 排序方式
    pub sort: SortOrder,
    /// 页码，从 1 开始
    pub page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            category: None,
            tag: None,
            sort: SortOrder::default(),
            page: 1,
        }
    }
}

impl FilterState {
    /// 把外部传入的值规整为合法状态: 空 slug 置空，页码至少为 1
    pub fn normalized(mut self) -> Self {
        self.category = self.category.filter(|c| !c.is_empty());
        self.tag = self.tag.filter(|t| !t.is_empty());
        self.page = self.page.max(1);
        self
    }

    /// 是否没有任何非默认条件
    pub fn is_default(&self) -> bool {
        *self == FilterState::default()
    }

    pub fn with_category(mut self, slug: impl Into<String>) -> Self {
        self.category = Some(slug.into());
        self.page = 1;
        self.normalized()
    }

    pub fn without_category(mut self) -> Self {
        self.category = None;
        self.page = 1;
        self
    }

    pub fn with_tag(mut self, slug: impl Into<String>) -> Self {
        self.tag = Some(slug.into());
        self.page = 1;
        self.normalized()
    }

    pub fn without_tag(mut self) -> Self {
        self.tag = None;
        self.page = 1;
        self
    }

    /// 切换排序时回到第一页
    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self.page = 1;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }
}

/// JS 端传入的筛选参数
///
/// 排序使用当前列表类型的 URL 参数值，页码可以是数字或字符串。
/// 无法识别的值一律取默认值，不会报错。
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct FilterParams {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub sort: Option<String>,
    pub page: Option<Value>,
}

impl FilterParams {
    pub fn into_state(self, kind: ListingKind) -> FilterState {
        let sort = self
            .sort
            .as_deref()
            .and_then(|token| SortOrder::from_token(kind, token))
            .unwrap_or_default();
        let page = self.page.as_ref().and_then(page_of_value).unwrap_or(1);

        FilterState {
            category: self.category,
            tag: self.tag,
            sort,
            page,
        }
        .normalized()
    }
}

fn page_of_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|page| *page >= 1),
        Value::String(s) => parse_page(s),
        _ => None,
    }
}

/// 返回给 JS 的筛选状态，排序使用当前列表类型的 URL 参数值
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterView {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub sort: &'static str,
    pub page: u32,
}

impl FilterView {
    pub fn new(kind: ListingKind, state: &FilterState) -> Self {
        Self {
            category: state.category.clone(),
            tag: state.tag.clone(),
            sort: state.sort.token(kind),
            page: state.page,
        }
    }
}

/// 列表页配置
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingConfig {
    /// 列表类型
    pub kind: ListingKind,
    /// 列表页路径前缀，如 `/mundo-grimmiz`
    pub base_path: String,
    /// 站点根地址，不带末尾斜杠
    pub base_url: String,
    /// 站点名称，出现在标题末尾
    pub site_name: String,
    /// 未选分类时的标题
    pub default_title: String,
    /// 每页条数
    pub page_size: u32,
}

/// 公开列表每页条数
pub const PUBLIC_PAGE_SIZE: u32 = 12;
/// 后台列表每页条数
pub const ADMIN_PAGE_SIZE: u32 = 10;

const SITE_URL: &str = "https://grimmiz.com";
const SITE_NAME: &str = "Grimmiz";

impl Default for ListingConfig {
    fn default() -> Self {
        Self::catalog()
    }
}

impl ListingConfig {
    pub fn catalog() -> Self {
        Self {
            kind: ListingKind::Catalog,
            base_path: "/mundo-grimmiz".to_string(),
            base_url: SITE_URL.to_string(),
            site_name: SITE_NAME.to_string(),
            default_title: "Mundo Grimmiz".to_string(),
            page_size: PUBLIC_PAGE_SIZE,
        }
    }

    pub fn blog() -> Self {
        Self {
            kind: ListingKind::Blog,
            base_path: "/blog".to_string(),
            default_title: "Blog".to_string(),
            ..Self::catalog()
        }
    }

    pub fn admin_products() -> Self {
        Self {
            base_path: "/admin/productos".to_string(),
            page_size: ADMIN_PAGE_SIZE,
            ..Self::catalog()
        }
    }

    pub fn admin_articles() -> Self {
        Self {
            base_path: "/admin/blog".to_string(),
            page_size: ADMIN_PAGE_SIZE,
            ..Self::blog()
        }
    }

    /// 按列表类型返回公开列表的默认配置
    pub fn for_kind(kind: ListingKind) -> Self {
        match kind {
            ListingKind::Catalog => Self::catalog(),
            ListingKind::Blog => Self::blog(),
        }
    }

    /// 去掉路径前缀末尾的斜杠，页大小至少为 1
    pub fn normalized(mut self) -> Self {
        let trimmed = self.base_path.trim_end_matches('/');
        self.base_path = if trimmed.is_empty() {
            String::new()
        } else if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        };
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        self.page_size = self.page_size.max(1);
        self
    }
}

/// 列表页配置的覆盖项，未给出的字段取该列表类型的默认值
///
/// JS 端以 JSON 传入，索引工具从 TOML 文件读取。
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingConfigOverrides {
    pub kind: Option<ListingKind>,
    #[serde(alias = "base_path")]
    pub base_path: Option<String>,
    #[serde(alias = "base_url")]
    pub base_url: Option<String>,
    #[serde(alias = "site_name")]
    pub site_name: Option<String>,
    #[serde(alias = "default_title")]
    pub default_title: Option<String>,
    #[serde(alias = "page_size")]
    pub page_size: Option<u32>,
}

impl ListingConfigOverrides {
    /// 叠加到对应列表类型的默认配置上
    pub fn resolve(self) -> ListingConfig {
        let defaults = ListingConfig::for_kind(self.kind.unwrap_or_default());
        ListingConfig {
            kind: defaults.kind,
            base_path: self.base_path.unwrap_or(defaults.base_path),
            base_url: self.base_url.unwrap_or(defaults.base_url),
            site_name: self.site_name.unwrap_or(defaults.site_name),
            default_title: self.default_title.unwrap_or(defaults.default_title),
            page_size: self.page_size.unwrap_or(defaults.page_size),
        }
        .normalized()
    }
}
