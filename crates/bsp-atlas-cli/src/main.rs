use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use bsp_atlas_core::config::SortOrder;
use bsp_atlas_core::{AtlasConfig, InputImage, load_input, pack_images_with, pack_layout, save_page};
use clap::{ArgAction, Parser, Subcommand};
use serde::Deserialize;
use tracing::{error, info};
use walkdir::WalkDir;

const METADATA_FORMATS: [&str; 4] = ["none", "json-array", "json", "json-hash"];

#[derive(Parser, Debug)]
#[command(
    name = "bsp-atlas",
    about = "Pack images into square atlas pages",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack images into atlas pages (atlas1.png, atlas2.png, ...)
    Pack(PackArgs),
    /// Layout-only export (no PNGs): compute placements and write metadata
    Layout(PackArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Input files or directories (directories are walked recursively)
    #[arg(required = true, help_heading = "Input/Output")]
    inputs: Vec<PathBuf>,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Page base name (pages are written as name1.png, name2.png, ...)
    #[arg(short, long, default_value = "atlas", help_heading = "Input/Output")]
    name: String,
    /// YAML config file path (fields present there override the CLI values)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,

    // Layout
    /// Gap in pixels between packed images
    #[arg(long, default_value_t = bsp_atlas_core::PADDING, help_heading = "Layout")]
    padding: u32,
    /// Sort order: sum_desc|none
    #[arg(long = "sort", default_value = "sum_desc", help_heading = "Layout")]
    sort_order: String,

    // Export
    /// Metadata format: none | json-array | json (alias) | json-hash
    #[arg(
        long,
        default_value = "none",
        value_parser = METADATA_FORMATS,
        help_heading = "Export"
    )]
    metadata: String,
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Layout(args) => run_layout(args, cli.progress && !cli.quiet),
    }
}

fn resolve_config(cli: &PackArgs) -> anyhow::Result<AtlasConfig> {
    let base = AtlasConfig {
        name: cli.name.clone(),
        padding: cli.padding,
        sort_order: parse_sort_order(&cli.sort_order)?,
    };
    let cfg = if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        y.into_atlas_config(base)?
    } else {
        base
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Returns true when the caller should stop after printing.
fn maybe_print_config(cli: &PackArgs, cfg: &AtlasConfig) -> anyhow::Result<bool> {
    if !cli.print_config {
        return Ok(false);
    }
    match cli.print_config_format.as_str() {
        "yaml" => println!("{}", serde_yaml::to_string(cfg)?),
        _ => println!("{}", serde_json::to_string_pretty(cfg)?),
    }
    Ok(true)
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = resolve_config(cli)?;
    if maybe_print_config(cli, &cfg)? {
        return Ok(());
    }

    let paths = gather_paths(&cli.inputs)?;
    let inputs = load_images_with_progress(&paths, show_progress)?;
    info!(count = inputs.len(), "loaded input images");

    if !cli.dry_run {
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
    }

    let start = Instant::now();
    let save_cfg = cfg.clone();
    let atlas = pack_images_with(inputs, cfg, |page| {
        if cli.dry_run {
            info!(
                page = page.page.id,
                side = page.page.width,
                frames = page.page.frames.len(),
                "page packed (dry run)"
            );
            return Ok(());
        }
        let path = save_page(&page, &cli.out_dir, &save_cfg)?;
        info!(?path, frames = page.page.frames.len(), "page written");
        Ok(())
    })?;
    let stats = atlas.stats();
    info!(elapsed = %fmt_dur(start.elapsed()), "{}", stats.summary());

    if !cli.dry_run {
        write_metadata(&cli.metadata, &cli.out_dir, &save_cfg.name, &atlas)?;
        if let Some(stats_path) = &cli.export_stats {
            let json = serde_json::to_string_pretty(&stats)?;
            fs::write(stats_path, json)
                .with_context(|| format!("write {}", stats_path.display()))?;
        }
    }
    Ok(())
}

fn run_layout(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = resolve_config(cli)?;
    if maybe_print_config(cli, &cfg)? {
        return Ok(());
    }

    let paths = gather_paths(&cli.inputs)?;
    let inputs = load_images_with_progress(&paths, show_progress)?;
    let items: Vec<(String, u32, u32)> = inputs
        .into_iter()
        .map(|inp| (inp.key, inp.image.width(), inp.image.height()))
        .collect();
    let name = cfg.name.clone();
    let atlas = pack_layout(items, cfg)?;
    info!(pages = atlas.pages.len(), "{}", atlas.stats().summary());

    if cli.dry_run {
        return Ok(());
    }
    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
    // Layout without metadata writes nothing useful; default to the array form.
    let format = match cli.metadata.as_str() {
        "none" => "json-array",
        other => other,
    };
    write_metadata(format, &cli.out_dir, &name, &atlas)
}

fn write_metadata(
    format: &str,
    out_dir: &Path,
    name: &str,
    atlas: &bsp_atlas_core::Atlas,
) -> anyhow::Result<()> {
    let value = match format {
        "none" => return Ok(()),
        "json-array" | "json" => bsp_atlas_core::to_json_array(atlas),
        "json-hash" => bsp_atlas_core::to_json_hash(atlas),
        other => anyhow::bail!("unknown metadata format: {}", other),
    };
    let json_path = out_dir.join(format!("{}.json", name));
    let json = bsp_atlas_core::to_pretty_string(&value)?;
    fs::write(&json_path, json).with_context(|| format!("write {}", json_path.display()))?;
    info!(?json_path, pages = atlas.pages.len(), "metadata written");
    Ok(())
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}µs", d.as_micros())
    }
}

fn gather_paths(inputs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut list: Vec<PathBuf> = Vec::new();
    for path in inputs {
        if path.is_file() {
            // Explicit files are taken as-is; a bad one fails at load time.
            list.push(path.clone());
        } else if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .map(|e| e.into_path())
                .filter(|p| p.is_file() && is_image(p))
                .collect();
            found.sort();
            list.extend(found);
        } else {
            anyhow::bail!("input not found: {}", path.display());
        }
    }
    if list.is_empty() {
        anyhow::bail!("no input images found");
    }
    Ok(list)
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg")
    )
}

fn load_images_with_progress(paths: &[PathBuf], progress: bool) -> anyhow::Result<Vec<InputImage>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match load_input(p) {
            Ok(input) => list.push(input),
            Err(e) => {
                if let Some(b) = &bar {
                    b.abandon();
                }
                error!(?p, error = %e, "cannot load image");
                return Err(e.into());
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    name: Option<String>,
    padding: Option<u32>,
    sort_order: Option<String>,
}

impl YamlConfig {
    fn into_atlas_config(self, mut cfg: AtlasConfig) -> anyhow::Result<AtlasConfig> {
        if let Some(v) = self.name {
            cfg.name = v;
        }
        if let Some(v) = self.padding {
            cfg.padding = v;
        }
        if let Some(v) = self.sort_order {
            cfg.sort_order = parse_sort_order(&v)?;
        }
        Ok(cfg)
    }
}

fn parse_sort_order(s: &str) -> anyhow::Result<SortOrder> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("invalid sort order: {} (expected sum_desc|none)", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack_args(argv: &[&str]) -> Result<PackArgs, clap::Error> {
        let cli = Cli::try_parse_from(argv)?;
        match cli.command {
            Commands::Pack(args) | Commands::Layout(args) => Ok(args),
        }
    }

    #[test]
    fn unknown_metadata_format_fails_at_parse_time() {
        let err = pack_args(&["bsp-atlas", "pack", "in", "--metadata", "jsn"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);

        for format in METADATA_FORMATS {
            let args = pack_args(&["bsp-atlas", "pack", "in", "--metadata", format]).unwrap();
            assert_eq!(args.metadata, format);
        }
    }

    #[test]
    fn sort_flag_sets_sort_order() {
        let args = pack_args(&["bsp-atlas", "layout", "in", "--sort", "none"]).unwrap();
        let cfg = resolve_config(&args).unwrap();
        assert_eq!(cfg.sort_order, SortOrder::None);

        let args = pack_args(&["bsp-atlas", "pack", "in"]).unwrap();
        assert_eq!(resolve_config(&args).unwrap().sort_order, SortOrder::SumDesc);

        assert!(pack_args(&["bsp-atlas", "pack", "in", "--sort-order", "none"]).is_err());
    }
}
