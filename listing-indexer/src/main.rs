use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, Command};
use tracing::info;
use tracing_subscriber::EnvFilter;

use listing_url::builder::IndexBuilder;
use listing_url::{build_list_url, FilterState, ListingConfig, ListingConfigOverrides, ListingKind};

mod export;

// 主函数
fn main() {
    // 设置命令行参数
    let matches = Command::new("列表索引生成器")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Grimmiz")
        .about("根据数据表导出生成商品目录和博客列表页使用的索引")
        .arg(Arg::new("source")
            .short('s')
            .long("source")
            .value_name("SOURCE_DIR")
            .help("数据表导出目录路径")
            .required(true))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("OUTPUT_DIR")
            .help("索引输出目录路径")
            .required(true))
        .arg(Arg::new("kind")
            .short('k')
            .long("kind")
            .value_name("KIND")
            .help("列表类型")
            .value_parser(["catalog", "blog"])
            .default_value("catalog"))
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_name("SITE_TOML")
            .help("列表页配置文件 (TOML)"))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("显示详细信息")
            .action(ArgAction::SetTrue))
        .get_matches();

    let verbose = matches.get_flag("verbose");
    init_logging(verbose);

    // clap 已保证必填参数存在、类型取值合法
    let source_dir = matches.get_one::<String>("source").map(String::as_str).unwrap_or_default();
    let output_dir = matches.get_one::<String>("output").map(String::as_str).unwrap_or_default();
    let kind = matches
        .get_one::<String>("kind")
        .and_then(|k| ListingKind::from_name(k))
        .unwrap_or_default();
    let config_path = matches.get_one::<String>("config").map(Path::new);

    println!("开始生成索引...");
    println!("源目录: {}", source_dir);
    println!("输出目录: {}", output_dir);

    match generate_index(Path::new(source_dir), Path::new(output_dir), kind, config_path, verbose) {
        Ok(_) => println!("索引生成成功！"),
        Err(e) => {
            eprintln!("错误: 索引生成失败: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "debug"
    } else {
        "info,listing_indexer=debug"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// 读取列表页配置，命令行指定的列表类型优先
fn load_config(path: Option<&Path>, kind: ListingKind) -> Result<ListingConfig> {
    let mut overrides = match path {
        Some(path) => {
            let data = fs::read_to_string(path)
                .with_context(|| format!("无法读取配置文件 {}", path.display()))?;
            toml::from_str::<ListingConfigOverrides>(&data)
                .with_context(|| format!("配置文件格式错误 {}", path.display()))?
        }
        None => ListingConfigOverrides::default(),
    };
    overrides.kind = Some(kind);
    Ok(overrides.resolve())
}

// 生成索引的主函数
fn generate_index(
    source_dir: &Path,
    output_dir: &Path,
    kind: ListingKind,
    config_path: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let start_time = std::time::Instant::now();

    if !source_dir.is_dir() {
        bail!("源目录不存在或不是有效目录 '{}'", source_dir.display());
    }
    fs::create_dir_all(output_dir)
        .with_context(|| format!("无法创建输出目录 '{}'", output_dir.display()))?;

    let config = load_config(config_path, kind)?;

    info!(kind = kind.as_str(), "scanning exports");
    let export = export::scan_exports(source_dir, kind)?;
    println!(
        "扫描完成。读取 {} 个文件，条目 {} 个，分类 {} 个，标签 {} 个，修正 slug {} 个。",
        export.files,
        export.items.len(),
        export.categories.len(),
        export.tags.len(),
        export.repaired
    );

    let mut builder = IndexBuilder::new(kind);
    for term in &export.categories {
        builder.add_category(term.clone());
    }
    for term in export.tags {
        builder.add_tag(term);
    }
    for item in export.items {
        builder.add_item(item);
    }

    let index_path = output_dir.join(format!("{}_index.bin", kind.as_str()));
    builder.save_index(&index_path)?;

    if verbose {
        println!("列表页地址示例:");
        println!("  {}{}", config.base_url, build_list_url(&config, &FilterState::default()));
        for term in export.categories.iter().take(5) {
            let state = FilterState::default().with_category(term.slug.as_str());
            println!("  {}{}  ({})", config.base_url, build_list_url(&config, &state), term.name);
        }
    }

    let elapsed = start_time.elapsed();
    println!("索引生成完成！耗时: {:.2}秒", elapsed.as_secs_f32());

    Ok(())
}
