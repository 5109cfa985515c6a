use wasm_bindgen::prelude::*;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use web_sys::console;

// 导出模块
pub mod builder;
pub mod codec;
pub mod error;
pub mod index;
pub mod metadata;
pub mod models;
pub mod query;
pub mod store;

pub use codec::{
    build_list_url, is_legacy_query_request, legacy_redirect, parse_list_path, parse_list_url,
    segments_of, translate_legacy_query,
};
pub use error::{IndexError, ListingError, StoreError};
pub use index::{ListingPage, TaxonomyIndex};
pub use metadata::{describe_for_metadata, ListingMetadata, ResolvedNames, Robots};
pub use models::{
    FilterParams, FilterState, FilterView, ListingConfig, ListingConfigOverrides, ListingKind, SortOrder,
};
pub use query::{ListingPredicate, ListingQuery, Table};
pub use store::{resolve_listing_metadata, CatalogStore};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

// 全局索引存储，每种列表类型一份
static INDEXES: OnceCell<Mutex<HashMap<ListingKind, TaxonomyIndex>>> = OnceCell::new();

/// 初始化函数 - 设置错误处理
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// 版本信息
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// 列表页服务 - JS 接口背后的纯 Rust 实现，参数和返回值都是 JSON
pub struct ListingService;

impl ListingService {
    /// 加载索引数据，同一类型的旧索引会被替换
    pub fn load_index(data: &[u8]) -> Result<ListingKind, ListingError> {
        let index = TaxonomyIndex::from_compressed(data)?;
        let kind = index.kind;
        let indexes = INDEXES.get_or_init(|| Mutex::new(HashMap::new()));
        let mut guard = indexes.lock().map_err(|_| ListingError::Lock)?;
        guard.insert(kind, index);
        Ok(kind)
    }

    fn with_index<T>(
        kind: ListingKind,
        f: impl FnOnce(&TaxonomyIndex) -> Result<T, ListingError>,
    ) -> Result<T, ListingError> {
        let indexes = INDEXES.get().ok_or(ListingError::IndexNotLoaded(kind))?;
        let guard = indexes.lock().map_err(|_| ListingError::Lock)?;
        let index = guard.get(&kind).ok_or(ListingError::IndexNotLoaded(kind))?;
        f(index)
    }

    /// 解析列表配置，空字符串表示商品目录的默认配置
    pub fn parse_config(config_json: &str) -> Result<ListingConfig, ListingError> {
        if config_json.trim().is_empty() {
            return Ok(ListingConfig::catalog());
        }
        let overrides: ListingConfigOverrides = serde_json::from_str(config_json)?;
        Ok(overrides.resolve())
    }

    /// 解析 JS 端的筛选状态，排序按该列表类型的参数值识别，非法值取默认值
    pub fn parse_state(kind: ListingKind, state_json: &str) -> Result<FilterState, ListingError> {
        if state_json.trim().is_empty() {
            return Ok(FilterState::default());
        }
        let params: FilterParams = serde_json::from_str(state_json)?;
        Ok(params.into_state(kind))
    }

    pub fn parse_kind(kind: &str) -> Result<ListingKind, ListingError> {
        ListingKind::from_name(kind).ok_or_else(|| ListingError::UnknownKind(kind.to_string()))
    }

    pub fn build_url(config_json: &str, state_json: &str) -> Result<String, ListingError> {
        let config = Self::parse_config(config_json)?;
        let state = Self::parse_state(config.kind, state_json)?;
        Ok(build_list_url(&config, &state))
    }

    pub fn describe(config_json: &str, state_json: &str, names_json: &str) -> Result<ListingMetadata, ListingError> {
        let config = Self::parse_config(config_json)?;
        let state = Self::parse_state(config.kind, state_json)?;
        let names: ResolvedNames = if names_json.trim().is_empty() {
            ResolvedNames::default()
        } else {
            serde_json::from_str(names_json)?
        };
        Ok(describe_for_metadata(&config, &state, &names))
    }

    /// 使用已加载的索引解析名称和总页数，再生成元数据
    pub fn resolve_metadata(config_json: &str, path: &str) -> Result<ListingMetadata, ListingError> {
        let config = Self::parse_config(config_json)?;
        let state = parse_list_path(&config, path);
        Self::with_index(config.kind, |index| {
            Ok(resolve_listing_metadata(index, &config, &state)?)
        })
    }

    /// 查询一页列表
    pub fn list(config_json: &str, path: &str) -> Result<ListingPage, ListingError> {
        let config = Self::parse_config(config_json)?;
        let state = parse_list_path(&config, path);
        let query = ListingQuery::from_state(&config, &state);
        Self::with_index(config.kind, |index| Ok(index.execute(state, &query)?))
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("序列化结果失败: {}", e)))
}

fn to_js_error(e: ListingError) -> JsValue {
    let message = e.to_string();
    console::log_1(&JsValue::from_str(&format!("列表页接口调用失败: {}", message)));
    JsValue::from_str(&message)
}

/// 列表页 JS 接口
#[wasm_bindgen]
pub struct ListingUrlJS;

#[wasm_bindgen]
impl ListingUrlJS {
    /// 加载索引，返回索引对应的列表类型
    #[wasm_bindgen]
    pub fn init(index_data: &[u8]) -> Result<String, JsValue> {
        console_error_panic_hook::set_once();
        ListingService::load_index(index_data)
            .map(|kind| kind.as_str().to_string())
            .map_err(to_js_error)
    }

    /// 从请求路径解析筛选状态
    #[wasm_bindgen]
    pub fn parse_path(config_json: &str, path: &str) -> Result<JsValue, JsValue> {
        let config = ListingService::parse_config(config_json).map_err(to_js_error)?;
        to_js(&FilterView::new(config.kind, &parse_list_path(&config, path)))
    }

    /// 从已拆分的路径段解析筛选状态
    #[wasm_bindgen]
    pub fn parse_segments(kind: &str, segments: js_sys::Array) -> Result<JsValue, JsValue> {
        let kind = ListingService::parse_kind(kind).map_err(to_js_error)?;
        let segments: Vec<String> = segments.iter().filter_map(|v| v.as_string()).collect();
        to_js(&FilterView::new(kind, &parse_list_url(kind, &segments)))
    }

    /// 生成规范路径
    #[wasm_bindgen]
    pub fn build_url(config_json: &str, state_json: &str) -> Result<String, JsValue> {
        ListingService::build_url(config_json, state_json).map_err(to_js_error)
    }

    /// 旧版查询参数请求的重定向目标，无需重定向时返回 undefined
    #[wasm_bindgen]
    pub fn legacy_redirect(config_json: &str, path: &str, query: &str) -> Result<Option<String>, JsValue> {
        let config = ListingService::parse_config(config_json).map_err(to_js_error)?;
        Ok(legacy_redirect(&config, path, query))
    }

    /// 由调用方提供的名称生成元数据
    #[wasm_bindgen]
    pub fn describe(config_json: &str, state_json: &str, names_json: &str) -> Result<JsValue, JsValue> {
        let meta = ListingService::describe(config_json, state_json, names_json).map_err(to_js_error)?;
        to_js(&meta)
    }

    /// 使用已加载的索引生成元数据
    #[wasm_bindgen]
    pub fn resolve_metadata(config_json: &str, path: &str) -> Result<JsValue, JsValue> {
        let meta = ListingService::resolve_metadata(config_json, path).map_err(to_js_error)?;
        to_js(&meta)
    }

    /// 查询一页列表
    #[wasm_bindgen]
    pub fn list(config_json: &str, path: &str) -> Result<JsValue, JsValue> {
        let page = ListingService::list(config_json, path).map_err(to_js_error)?;
        to_js(&page)
    }
}
