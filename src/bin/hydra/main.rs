//! hydra-cli - Inspect, query and diff JSON scene descriptions.

use std::env;
use std::rc::Rc;

use anyhow::{bail, Context, Result};

use hydra_scene::collection::{CollectionExpressionEvaluator, MatchKind, PathExpression};
use hydra_scene::core::{debug_print, DataSource};
use hydra_scene::scene::{
    load_scene_json, AddedPrimEntry, DirtiedPrimEntry, PinnedCurveExpandingFilter, PrimView,
    RemovedPrimEntry, RenamedPrimEntry, RetainedSceneIndex, SceneIndex, SceneIndexHandle,
    SceneIndexObserver, SwitchingSceneIndex,
};
use hydra_scene::settings::{init_logging, DiffStrategy, Settings};
use hydra_scene::tracker::PerfLog;
use hydra_scene::util::ScenePath;

const BUILD_DATE: &str = env!("HYDRA_SCENE_BUILD_DATE");

fn main() {
    let args: Vec<String> = env::args().collect();
    let settings = Settings::load();

    // Parse global flags
    let mut log_filter = settings.log_filter.clone();
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => log_filter = "debug".to_string(),
            "-vv" | "--trace" => log_filter = "trace".to_string(),
            "-q" | "--quiet" => log_filter = "off".to_string(),
            _ => filtered_args.push(arg),
        }
    }
    init_logging(&log_filter);
    if settings.perf_log_enabled {
        PerfLog::instance().enable();
    }

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let result = match filtered_args[0] {
        "t" | "tree" => cmd_tree(&filtered_args[1..]),
        "m" | "match" => cmd_match(&filtered_args[1..]),
        "d" | "diff" => cmd_diff(&filtered_args[1..], settings.diff_strategy),
        "h" | "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        "--version" => {
            println!("hydra-cli {} ({})", env!("CARGO_PKG_VERSION"), BUILD_DATE);
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Run 'hydra-cli help' for usage");
            std::process::exit(1);
        }
    };

    if settings.perf_log_enabled {
        print_perf_counters();
    }
    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn print_help() {
    println!("hydra-cli - Scene index toolkit ({})", BUILD_DATE);
    println!();
    println!("USAGE:");
    println!("    hydra-cli [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    t, tree  <scene.json> [--data] [--expand-curves]");
    println!("                                   Show prim hierarchy (and prim data)");
    println!("    m, match <scene.json> <expr> [--shallowest | --shallowest-and-descendants]");
    println!("                                   List prims matching a path expression");
    println!("    d, diff  <a.json> <b.json> [--root | --delta]");
    println!("                                   Show notices for switching from a to b");
    println!("    h, help                        Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Suppress log output");
    println!("    --version        Show version and build date");
    println!();
    println!("EXAMPLES:");
    println!("    hydra-cli tree scene.json --data");
    println!("    hydra-cli match scene.json '//{{hdType:mesh}} - //Proxy//'");
    println!("    hydra-cli diff before.json after.json --delta");
    println!();
    println!("NOTES:");
    println!("    - Settings are read from $HYDRA_SCENE_CONFIG or <config dir>/hydra-scene/settings.json");
    println!("    - RUST_LOG overrides the configured log filter");
}

fn load(path: &str) -> Result<Rc<RetainedSceneIndex>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    let scene = load_scene_json(&text).with_context(|| format!("Failed to load {}", path))?;
    tracing::info!(path, prims = scene.len(), "loaded scene");
    Ok(scene)
}

/// Split arguments into (positional, `--flags`).
fn split_flags<'a>(args: &[&'a str]) -> (Vec<&'a str>, Vec<&'a str>) {
    let (flags, positional): (Vec<&str>, Vec<&str>) =
        args.iter().copied().partition(|a| a.starts_with("--"));
    (positional, flags)
}

fn cmd_tree(args: &[&str]) -> Result<()> {
    let (positional, flags) = split_flags(args);
    let [path] = positional.as_slice() else {
        bail!("Usage: hydra-cli tree <scene.json> [--data] [--expand-curves]");
    };
    let show_data = flags.contains(&"--data");

    let retained = load(path)?;
    let scene: SceneIndexHandle = if flags.contains(&"--expand-curves") {
        PinnedCurveExpandingFilter::new_scene_index(retained) as SceneIndexHandle
    } else {
        retained as SceneIndexHandle
    };

    println!("Scene: {}", path);
    println!();
    for prim_path in PrimView::new(&*scene, ScenePath::absolute_root()) {
        if prim_path.is_absolute_root() {
            continue;
        }
        let prim = scene.get_prim(&prim_path);
        let indent = "  ".repeat(prim_path.element_count() - 1);
        let name = prim_path.name().map(|n| n.as_str()).unwrap_or_default();
        if prim.prim_type.is_empty() {
            println!("{}{}", indent, name);
        } else {
            println!("{}{} [{}]", indent, name, prim.prim_type);
        }
        if show_data {
            if let Some(ds) = prim.data_source {
                for line in debug_print(&DataSource::Container(ds)).lines() {
                    println!("{}    {}", indent, line);
                }
            }
        }
    }
    Ok(())
}

fn cmd_match(args: &[&str]) -> Result<()> {
    let (positional, flags) = split_flags(args);
    let [path, expr] = positional.as_slice() else {
        bail!("Usage: hydra-cli match <scene.json> <expr> [--shallowest | --shallowest-and-descendants]");
    };
    let kind = if flags.contains(&"--shallowest-and-descendants") {
        MatchKind::ShallowestMatchesAndAllDescendants
    } else if flags.contains(&"--shallowest") {
        MatchKind::ShallowestMatches
    } else {
        MatchKind::MatchAll
    };

    let expression: PathExpression = expr
        .parse()
        .with_context(|| format!("Invalid expression '{}'", expr))?;
    let scene: SceneIndexHandle = load(path)?;
    let evaluator = CollectionExpressionEvaluator::new(Some(scene), expression);
    let matches = evaluator.populate_matches(&ScenePath::absolute_root(), kind);
    for m in &matches {
        println!("{}", m);
    }
    tracing::info!(count = matches.len(), "matched");
    Ok(())
}

/// Prints notices as they arrive.
struct PrintingObserver;

impl SceneIndexObserver for PrintingObserver {
    fn prims_added(&self, _sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
        for e in entries {
            println!("+ {} [{}]", e.prim_path, e.prim_type);
        }
    }

    fn prims_removed(&self, _sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
        for e in entries {
            println!("- {}", e.prim_path);
        }
    }

    fn prims_dirtied(&self, _sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]) {
        for e in entries {
            println!("~ {} {:?}", e.prim_path, e.dirty_locators);
        }
    }

    fn prims_renamed(&self, _sender: &dyn SceneIndex, entries: &[RenamedPrimEntry]) {
        for e in entries {
            println!("> {} -> {}", e.old_prim_path, e.new_prim_path);
        }
    }
}

fn cmd_diff(args: &[&str], configured: DiffStrategy) -> Result<()> {
    let (positional, flags) = split_flags(args);
    let [a, b] = positional.as_slice() else {
        bail!("Usage: hydra-cli diff <a.json> <b.json> [--root | --delta]");
    };
    let strategy = if flags.contains(&"--delta") {
        DiffStrategy::Delta
    } else if flags.contains(&"--root") {
        DiffStrategy::Root
    } else {
        configured
    };

    let inputs: Vec<SceneIndexHandle> = vec![load(a)? as SceneIndexHandle, load(b)? as SceneIndexHandle];
    let switching = SwitchingSceneIndex::new(inputs, 0).with_diff_fn(strategy.diff_fn());
    let observer = Rc::new(PrintingObserver);
    let weak = Rc::downgrade(&observer);
    switching.add_observer(weak);
    switching.set_index(1)?;
    Ok(())
}

fn print_perf_counters() {
    let perf = PerfLog::instance();
    let counters = perf.counters();
    if counters.is_empty() {
        return;
    }
    eprintln!();
    eprintln!("Perf counters:");
    for (name, value) in counters {
        eprintln!("  {:<32} {}", name.as_str(), value);
    }
}
