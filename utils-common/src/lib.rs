pub mod compression;
pub mod models;
pub mod reorder;
pub mod slug;

// 重新导出常用模块和函数，方便直接使用
pub use compression::{to_compressed, from_compressed, to_binary, from_binary, validate_compressed_data};
pub use models::{ListingRecord, TaxonomyTerm};
pub use slug::{is_valid_slug, slugify, unique_slug};
