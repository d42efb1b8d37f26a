//! assetgraph CLI - inspect, check and re-encode serialized asset files.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use assetgraph::prelude::*;
use assetgraph::settings::Settings;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Verbosity level
const LOG_QUIET: u8 = 0;
const LOG_INFO: u8 = 1;
const LOG_DEBUG: u8 = 2;
const LOG_TRACE: u8 = 3;

fn init_logging(level: u8) {
    let default = match level {
        LOG_QUIET => "error",
        LOG_INFO => "warn,assetgraph=info",
        LOG_DEBUG => "info,assetgraph=debug",
        _ => "debug,assetgraph=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = LOG_INFO;
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = LOG_DEBUG,
            "-vv" | "--trace" => level = LOG_TRACE,
            "-q" | "--quiet" => level = LOG_QUIET,
            _ => filtered_args.push(arg),
        }
    }
    init_logging(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let result = match filtered_args[0] {
        "info" | "i" => with_files(&filtered_args, "info <files..>", cmd_info),
        "list" | "l" => with_files(&filtered_args, "list <files..>", cmd_list),
        "check" | "k" => with_files(&filtered_args, "check <files..>", cmd_check),
        "copy" | "c" => cmd_copy(&filtered_args[1..]),
        "settings" => cmd_settings(),
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        // Default: if file exists, show info; otherwise error
        other if Path::new(other).exists() => cmd_info(&filtered_args),
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn print_help() {
    println!("assetgraph - serialized asset file toolkit");
    println!();
    println!("USAGE:");
    println!("    assetgraph [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info  <files..>                    Show header, revision and tables");
    println!("    l, list  <files..>                    List objects passing the settings filters");
    println!("    k, check <files..>                    Resolve component and hierarchy pointers");
    println!("    c, copy  <in> <out> [--target VER] [--normalize]");
    println!("                                          Re-encode a file, optionally for another revision");
    println!("    settings                              Show the settings file and its values");
    println!("    h, help                               Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose     Debug output");
    println!("    -vv, --trace      Trace output");
    println!("    -q, --quiet       Errors only");
    println!();
    println!("RUST_LOG overrides the verbosity flags.");
}

fn with_files(args: &[&str], usage: &str, cmd: fn(&[&str]) -> anyhow::Result<()>) -> anyhow::Result<()> {
    if args.len() < 2 {
        bail!("missing file argument\nUsage: assetgraph {}", usage);
    }
    cmd(&args[1..])
}

/// Load every path into one collection; failures are reported and skipped.
fn load_all(paths: &[&str], settings: &Settings, status: Arc<StatusReporter>) -> (AssetCollection, Vec<FileHandle>) {
    let reporter: Arc<dyn Reporter> = Arc::new(Tee(status));
    let mut assets = AssetCollection::with_options(settings.load_options()).with_reporter(reporter);
    let mut handles = Vec::new();
    for path in paths {
        match assets.load_path(path) {
            Ok(handle) => handles.push(handle),
            Err(e) => eprintln!("Failed to load {}: {}", path, e),
        }
    }
    (assets, handles)
}

/// Forwards to `tracing` and keeps counts for the summary line.
struct Tee(Arc<StatusReporter>);

impl Reporter for Tee {
    fn progress(&self, file: &str, done: usize, total: usize) {
        TracingReporter.progress(file, done, total);
        self.0.progress(file, done, total);
    }

    fn event(&self, event: &Event) {
        TracingReporter.event(event);
        self.0.event(event);
    }
}

fn cmd_info(paths: &[&str]) -> anyhow::Result<()> {
    let settings = Settings::load();
    let (assets, handles) = load_all(paths, &settings, Arc::new(StatusReporter::new()));

    for handle in handles {
        let file = assets.file(handle)?;
        let header = file.header();
        println!("{}", file.name());
        println!("  Format:       {}", header.format);
        println!("  Revision:     {}", file.version_string());
        println!("  Endian:       {:?}", header.endian);
        println!("  Platform:     {}", file.target_platform());
        println!("  Type trees:   {}", file.has_type_trees());
        println!("  Metadata:     {} bytes", header.metadata_size);
        println!("  Data offset:  {}", header.data_offset);
        println!("  File size:    {}", header.file_size);
        println!("  Types:        {}", file.types().len());
        println!("  Objects:      {}", file.len());
        println!("  Script types: {}", file.script_types().len());
        if !file.ref_types().is_empty() {
            println!("  Ref types:    {}", file.ref_types().len());
        }
        if file.externals().is_empty() {
            println!("  Externals:    none");
        } else {
            println!("  Externals:");
            for (i, external) in file.externals().iter().enumerate() {
                let loaded = if assets.file_by_name(&external.path).is_some() { "" } else { " (not loaded)" };
                println!("    [{}] {}{}", i + 1, external.path, loaded);
            }
        }

        let mut counts: Vec<(ClassId, usize)> = Vec::new();
        for entry in file.entries() {
            match counts.iter_mut().find(|(id, _)| *id == entry.class_id) {
                Some((_, n)) => *n += 1,
                None => counts.push((entry.class_id, 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        println!("  Classes:");
        for (class_id, n) in counts {
            println!("    {:>6}  {} ({})", n, class_id, class_id.0);
        }
        println!();
    }
    Ok(())
}

fn cmd_list(paths: &[&str]) -> anyhow::Result<()> {
    let settings = Settings::load();
    let filter = settings.filter();
    let (assets, handles) = load_all(paths, &settings, Arc::new(StatusReporter::new()));

    for handle in handles {
        let file = assets.file(handle)?;
        for entry in file.entries() {
            if !filter.accepts_entry(entry.class_id, entry.path_id) {
                continue;
            }
            let name = if filter.needs_name() {
                let Some(object) = file.object(entry.path_id) else { continue };
                if !filter.accepts(object) {
                    continue;
                }
                object.name().map(str::to_string)
            } else {
                file.object(entry.path_id).and_then(|o| o.name().map(str::to_string))
            };
            println!(
                "{}\t{}\t{}\t{}\t{}",
                file.name(),
                entry.path_id,
                entry.class_id,
                entry.byte_size,
                name.unwrap_or_default()
            );
        }
    }
    Ok(())
}

fn cmd_check(paths: &[&str]) -> anyhow::Result<()> {
    let settings = Settings::load();
    let status = Arc::new(StatusReporter::new());
    let (assets, handles) = load_all(paths, &settings, status.clone());

    let mut checked = 0usize;
    for &handle in &handles {
        let file = assets.file(handle)?;
        for path_id in file.path_ids() {
            if let Some(go) = file.object_as::<GameObject>(path_id) {
                for pair in go.components() {
                    checked += 1;
                    if let Resolved::Dangling(reason) = assets.try_resolve(&pair.ptr, handle)? {
                        println!("{}: '{}' ({}) component {:?}: {}", file.name(), go.name, path_id, pair.ptr, reason);
                    }
                }
            } else if let Some(t) = file.object_as::<Transform>(path_id) {
                let pointers = std::iter::once(t.game_object.cast::<AnyObject>())
                    .chain(std::iter::once(t.father.cast()))
                    .chain(t.children.iter().map(|c| c.cast()));
                for ptr in pointers {
                    checked += 1;
                    if let Resolved::Dangling(reason) = assets.try_resolve(&ptr, handle)? {
                        println!("{}: transform {} pointer {:?}: {}", file.name(), path_id, ptr, reason);
                    }
                }
            }
        }
    }

    let snapshot = status.snapshot();
    println!(
        "{} files, {} pointers checked, {} dangling, {} decode failures",
        handles.len(),
        checked,
        snapshot.dangling(),
        snapshot.decode_failures()
    );
    if snapshot.dangling() > 0 || snapshot.decode_failures() > 0 {
        std::process::exit(2);
    }
    Ok(())
}

fn cmd_copy(args: &[&str]) -> anyhow::Result<()> {
    let mut positional = Vec::new();
    let mut target = None;
    let mut normalize = false;
    let mut iter = args.iter();
    while let Some(&arg) = iter.next() {
        match arg {
            "--target" | "-t" => {
                let value = iter.next().context("--target needs a revision")?;
                target = Some(value.parse::<EngineVersion>()?);
            }
            "--normalize" | "-n" => normalize = true,
            _ => positional.push(arg),
        }
    }
    let &[input, output] = positional.as_slice() else {
        bail!("missing arguments\nUsage: assetgraph copy <in> <out> [--target VER] [--normalize]");
    };

    let mut settings = Settings::load();
    let target = target.or_else(|| settings.target());
    tracing::info!("Copying {} -> {}", input, output);

    let status = Arc::new(StatusReporter::new());
    let reporter: Arc<dyn Reporter> = Arc::new(Tee(status.clone()));
    let mut assets = AssetCollection::with_options(settings.load_options()).with_reporter(reporter);
    let handle = assets.load_path(input).with_context(|| format!("failed to load {}", input))?;

    // Externals next to the input help recover component class ids.
    if normalize {
        let dir = Path::new(input).parent().map(Path::to_path_buf).unwrap_or_default();
        let externals: Vec<PathBuf> = assets
            .file(handle)?
            .externals()
            .iter()
            .map(|e| dir.join(e.file_name()))
            .filter(|p| p.exists())
            .collect();
        for path in externals {
            if let Err(e) = assets.load_path(&path) {
                tracing::warn!("skipping external {}: {}", path.display(), e);
            }
        }
        let updated = assets.normalize_component_class_ids();
        tracing::info!("normalized {} component class ids", updated);
    }

    let bytes = assets.encode(handle, &EncodeOptions { target })?;
    std::fs::write(output, &bytes).with_context(|| format!("failed to write {}", output))?;

    let original = std::fs::read(input)?;
    let identical = original == bytes;
    println!(
        "Copied {} -> {} ({} bytes, {}{})",
        input,
        output,
        bytes.len(),
        target.map_or_else(|| "declared revision".to_string(), |t| t.to_string()),
        if identical { ", byte-identical" } else { "" }
    );
    let warnings = status.snapshot().count(|e| matches!(e, Event::EncodeWarning { .. }));
    if warnings > 0 {
        println!("{} encode warnings", warnings);
    }

    settings.add_recent(PathBuf::from(input));
    if let Err(e) = settings.save() {
        tracing::debug!("settings not saved: {}", e);
    }
    Ok(())
}

fn cmd_settings() -> anyhow::Result<()> {
    let settings = Settings::load();
    match Settings::path() {
        Some(path) => println!("Settings file: {}", path.display()),
        None => println!("Settings file: (no config directory)"),
    }
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
