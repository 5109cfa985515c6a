use unicode_normalization::UnicodeNormalization;

/// 复制条目时追加的后缀
pub const COPY_SUFFIX: &str = "copia";

/// 由展示名称生成 slug: 小写 ASCII，去掉重音，非字母数字字符合并为单个连字符
///
/// `"Gnomo Navideño"` -> `"gnomo-navideno"`
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    // NFD 分解后，重音符号成为独立的非 ASCII 组合字符，直接丢弃
    for c in name.nfd().filter(|c| c.is_ascii()) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// slug 只允许小写字母、数字和单个连字符，且不能以连字符开头或结尾
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// 为复制出的条目寻找未被占用的 slug
///
/// 依次尝试 `base-copia`、`base-copia-2`、`base-copia-3` ...，返回第一个
/// `is_taken` 返回 false 的候选。
pub fn unique_slug(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let first = format!("{}-{}", base, COPY_SUFFIX);
    if !is_taken(&first) {
        return first;
    }

    let mut n: u32 = 2;
    loop {
        let candidate = format!("{}-{}", first, n);
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
