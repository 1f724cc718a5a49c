use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dyndash", version)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset (e.g. `debug`, `dyndash=trace`).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a scene, bring it into view and print the rendered element tree as JSON.
    Render(RenderArgs),
    /// Build a scene and print one line per node with its parent and resolved providers.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene descriptor JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Reference time in epoch milliseconds for relative ranges. Defaults to the wall clock.
    #[arg(long)]
    now: Option<i64>,

    /// Output JSON path. Prints to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input scene descriptor JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Reference time in epoch milliseconds for relative ranges. Defaults to the wall clock.
    #[arg(long)]
    now: Option<i64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn build_context(now: Option<i64>) -> dyndash::BuildContext {
    match now {
        Some(ms) => dyndash::BuildContext {
            now: dyndash::Timestamp(ms),
        },
        None => dyndash::BuildContext::default(),
    }
}

fn read_scene(path: &Path, now: Option<i64>) -> anyhow::Result<dyndash::SceneRef> {
    let f = File::open(path).with_context(|| format!("open scene '{}'", path.display()))?;
    let desc = dyndash::SceneDescriptor::from_reader(BufReader::new(f))
        .with_context(|| "parse scene JSON")?;
    let root = dyndash::build_scene(&desc, &build_context(now))
        .with_context(|| format!("build scene '{}'", path.display()))?;
    Ok(root)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let root = read_scene(&args.in_path, args.now)?;
    let mounted = dyndash::mount_tree(&root);
    tracing::info!(nodes = mounted.len(), "scene mounted");

    let element = root
        .render()
        .with_context(|| format!("root node '{}' rendered nothing", root.kind()))?;
    let json = serde_json::to_string_pretty(&element).with_context(|| "serialize element tree")?;
    drop(mounted);
    dyndash::destroy_subtree(&root);

    match args.out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(&out, json)
                .with_context(|| format!("write element json '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").with_context(|| "write to stdout")?;
        }
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let root = read_scene(&args.in_path, args.now)?;
    let _mounted = dyndash::mount_tree(&root);

    let mut stdout = std::io::stdout().lock();
    let mut stack = vec![(root.clone(), 0_usize)];
    while let Some((node, depth)) = stack.pop() {
        let parent = node
            .parent()
            .map_or_else(|| "-".to_string(), |p| p.id().to_string());
        let range = node.resolve_time_range().map_or_else(
            || "-".to_string(),
            |tr| {
                let r = tr.time_range();
                format!("{}..{}", r.from.0, r.to.0)
            },
        );
        writeln!(
            stdout,
            "{:indent$}{} {} parent={} range={} series={}",
            "",
            node.id(),
            node.kind(),
            parent,
            range,
            node.resolve_data().series_count(),
            indent = depth * 2,
        )
        .with_context(|| "write to stdout")?;

        for child in node.children().into_iter().rev() {
            stack.push((child, depth + 1));
        }
    }
    Ok(())
}
