use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use statelink_config::GraphDef;
use statelink_engine::{FnNotifier, Graph, NoopNotifier, State, Stateful, Transition};
use statelink_resolver::{Resolver, StandardResolver};

/// Statelink - propagate state changes across linked tasks and workflows
#[derive(Parser)]
#[command(name = "statelink")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Maximum cascade depth (overrides the graph file)
  #[arg(long, global = true)]
  max_depth: Option<usize>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Apply state changes to a graph and print the resulting states
  Run {
    /// Path to the graph file (JSON)
    graph_file: PathBuf,

    /// State change to apply, as ENTITY=STATE. Repeatable; applied in order.
    #[arg(long = "set", value_parser = parse_assignment)]
    assignments: Vec<(String, String)>,

    /// Do not print individual transitions
    #[arg(long)]
    quiet: bool,
  },

  /// Print the entities and links of a graph
  Show {
    /// Path to the graph file (JSON)
    graph_file: PathBuf,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("statelink=info,warn")),
    )
    .with_target(false)
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  match cli.command {
    Some(Commands::Run {
      graph_file,
      assignments,
      quiet,
    }) => {
      run_graph(&graph_file, &assignments, quiet, cli.max_depth)?;
    }
    Some(Commands::Show { graph_file }) => {
      show_graph(&graph_file, cli.max_depth)?;
    }
    None => {
      println!("statelink - use --help to see available commands");
    }
  }

  Ok(())
}

fn run_graph(
  graph_file: &Path,
  assignments: &[(String, String)],
  quiet: bool,
  max_depth: Option<usize>,
) -> Result<()> {
  let def = load_graph_def(graph_file)?;
  eprintln!("Loaded graph: {}", def.name);

  let mut resolver = if quiet {
    StandardResolver::new().with_notifier(Arc::new(NoopNotifier))
  } else {
    StandardResolver::new().with_notifier(Arc::new(FnNotifier::new(|t: Transition| {
      eprintln!("{}{}", "  ".repeat(t.depth), t);
    })))
  };
  if let Some(max_depth) = max_depth {
    resolver = resolver.with_max_depth(max_depth);
  }

  let mut graph = resolver
    .resolve(def)
    .context("failed to resolve graph")?;

  let applied = apply_assignments(&mut graph, assignments);

  // A failed cascade keeps the transitions it made, so print the states either way
  println!("{}", serde_json::to_string_pretty(&graph.snapshot())?);

  applied
}

/// Apply `ENTITY=STATE` assignments in order, stopping at the first failure.
fn apply_assignments(graph: &mut Graph, assignments: &[(String, String)]) -> Result<()> {
  for (entity, state) in assignments {
    let id = graph
      .entity_id(entity)
      .with_context(|| format!("entity '{}' not found in graph", entity))?;

    // Undeclared labels are passed through so the engine reports them
    let state = graph
      .states()
      .get(state)
      .cloned()
      .unwrap_or_else(|| State::new(state.as_str()));

    graph
      .set_state(id, state)
      .with_context(|| format!("failed to set state of '{}'", entity))?;
  }

  Ok(())
}

fn show_graph(graph_file: &Path, max_depth: Option<usize>) -> Result<()> {
  let def = load_graph_def(graph_file)?;

  let mut resolver = StandardResolver::new();
  if let Some(max_depth) = max_depth {
    resolver = resolver.with_max_depth(max_depth);
  }
  let graph = resolver
    .resolve(def)
    .context("failed to resolve graph")?;

  print!("{}", describe(&graph));
  Ok(())
}

fn describe(graph: &Graph) -> String {
  let mut out = String::new();
  let states: Vec<&str> = graph.states().iter().map(|s| s.label()).collect();
  out.push_str(&format!("Graph: {}\n", graph.name()));
  out.push_str(&format!("States: {}\n", states.join(", ")));
  out.push_str(&format!("Max depth: {}\n", graph.config().max_depth));

  out.push_str("Entities:\n");
  for (id, entity) in graph.entities() {
    out.push_str(&format!(
      "  {} ({}) = {}\n",
      entity.name(),
      entity.kind(),
      entity.state()
    ));
    if let Ok(children) = graph.children(id) {
      for child in children {
        if let Some(child) = graph.entity(*child) {
          out.push_str(&format!("    - {}\n", child.name()));
        }
      }
    }
  }

  out.push_str("Links:\n");
  for (_, link) in graph.links() {
    let (Some(source), Some(target)) = (graph.entity(link.source()), graph.entity(link.target()))
    else {
      continue;
    };
    let mut rules: Vec<String> = link
      .mapping()
      .iter()
      .map(|(from, to)| format!("{} => {}", from, to))
      .collect();
    rules.sort();
    out.push_str(&format!(
      "  {} -> {} [{}]\n",
      source.name(),
      target.name(),
      rules.join(", ")
    ));
  }

  out
}

fn load_graph_def(path: &Path) -> Result<GraphDef> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read graph file: {}", path.display()))?;

  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse graph file: {}", path.display()))
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
  let (entity, state) = raw
    .split_once('=')
    .ok_or_else(|| format!("expected ENTITY=STATE, got '{}'", raw))?;

  let (entity, state) = (entity.trim(), state.trim());
  if entity.is_empty() || state.is_empty() {
    return Err(format!("expected ENTITY=STATE, got '{}'", raw));
  }

  Ok((entity.to_string(), state.to_string()))
}
