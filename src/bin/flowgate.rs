use clap::{Parser, Subcommand};
use flowgate::graph::NodeKind;
use flowgate::graph::compile::{GraphCompiler, ProcessGraph};
use flowgate::graph::loader::load_definition_from_yaml;
use flowgate::runtime::gateway::InclusiveJoinStrategy;
use flowgate::runtime::instance::{InstanceId, TaskInstance, TaskState};
use flowgate::runtime::reachability::can_reach;
use flowgate::runtime::store::{InMemoryInstanceStore, InstanceSnapshot, InstanceStore};
use std::collections::HashMap;
use std::path::PathBuf;
use std::fs;
use anyhow::{Result, Context, anyhow};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a process definition and print the compiled node table
    Inspect {
        /// Path to the process definition YAML file
        #[arg(long, short)]
        file: PathBuf,
    },

    /// List nodes from which a token could still reach a target node
    Reach {
        /// Path to the process definition YAML file
        #[arg(long, short)]
        file: PathBuf,

        /// Label of the target node
        #[arg(long)]
        target: String,
    },

    /// Run the inclusive-join firing decision for a scenario of task instances
    Decide {
        /// Path to the process definition YAML file
        #[arg(long, short)]
        file: PathBuf,

        /// Path to the scenario YAML file
        #[arg(long, short)]
        scenario: PathBuf,

        /// Bypass the wait condition (forced completion path)
        #[arg(long)]
        force: bool,

        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },
}

/// 场景文件：以符号名描述一组任务实例
#[derive(Debug, Deserialize)]
struct Scenario {
    /// Name of the instance representing the gateway's activation attempt
    gateway: String,
    instances: Vec<ScenarioInstance>,
}

#[derive(Debug, Deserialize)]
struct ScenarioInstance {
    name: String,
    /// Definition node label this instance executes
    node: String,
    state: TaskState,
    /// Name of the parent instance, if any
    #[serde(default)]
    parent: Option<String>,
    /// Symbolic thread-of-control name; instances sharing a name share a
    /// thread. Defaults to "main".
    #[serde(default)]
    thread: Option<String>,
}

fn load_graph(file: &PathBuf) -> Result<ProcessGraph> {
    let definition = load_definition_from_yaml(
        file.to_str().ok_or_else(|| anyhow!("Invalid path: {:?}", file))?,
    )?;
    Ok(GraphCompiler::new().compile(definition)?)
}

fn load_scenario(file: &PathBuf) -> Result<Scenario> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read scenario file from {:?}", file))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to deserialize scenario from {:?}", file))
}

/// Materialize scenario instances into the store. Returns the instances
/// keyed by their scenario names.
async fn build_instances(
    graph: &ProcessGraph,
    scenario: &Scenario,
    store: &InMemoryInstanceStore,
) -> Result<HashMap<String, TaskInstance>> {
    let workflow_id = Uuid::new_v4();

    // Pass 1: assign ids so parents can be declared in any order
    let mut ids: HashMap<&str, InstanceId> = HashMap::new();
    for entry in &scenario.instances {
        if ids.insert(entry.name.as_str(), Uuid::new_v4()).is_some() {
            return Err(anyhow!("Duplicate instance name: {}", entry.name));
        }
    }

    let mut threads: HashMap<&str, Uuid> = HashMap::new();
    let mut built = HashMap::new();
    for entry in &scenario.instances {
        let node = graph.find(&entry.node)
            .ok_or_else(|| anyhow!("Unknown node label in scenario: {}", entry.node))?;
        let parent = match &entry.parent {
            Some(name) => Some(*ids.get(name.as_str())
                .ok_or_else(|| anyhow!("Unknown parent instance: {}", name))?),
            None => None,
        };
        let thread_name = entry.thread.as_deref().unwrap_or("main");
        let thread_id = *threads.entry(thread_name).or_insert_with(Uuid::new_v4);

        let instance = TaskInstance {
            id: ids[entry.name.as_str()],
            node,
            parent,
            thread_id,
            workflow_id,
            state: entry.state,
        };
        store.insert(instance.clone()).await?;
        built.insert(entry.name.clone(), instance);
    }
    Ok(built)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { file } => {
            let graph = load_graph(&file)?;
            info!("Loaded process definition: {} ({} nodes)", graph.id, graph.len());

            println!("{:<6} {:<24} {:<18} outputs", "index", "label", "kind");
            for (id, node) in graph.nodes() {
                let outputs: Vec<&str> = node.outputs.iter()
                    .filter_map(|&o| graph.node(o).map(|n| n.label.as_str()))
                    .collect();
                println!("{:<6} {:<24} {:<18} {}", id, node.label, format!("{:?}", node.kind), outputs.join(", "));

                if node.outputs.is_empty() && node.kind != NodeKind::End {
                    warn!("Node '{}' has no outputs but is not an End node", node.label);
                }
            }
        }

        Commands::Reach { file, target } => {
            let graph = load_graph(&file)?;
            let target_id = graph.find(&target)
                .ok_or_else(|| anyhow!("Unknown node label: {}", target))?;

            // History-free probes: every node gets a synthetic parentless
            // instance, so this shows raw graph reachability.
            let snapshot = InstanceSnapshot::default();
            let workflow_id = Uuid::new_v4();
            println!("Nodes that can still reach '{}':", target);
            for (id, node) in graph.nodes() {
                let probe = TaskInstance::root(workflow_id, id);
                if can_reach(&graph, target_id, &probe, &snapshot) {
                    println!("  {}", node.label);
                }
            }
        }

        Commands::Decide { file, scenario, force, json } => {
            let graph = load_graph(&file)?;
            let scenario = load_scenario(&scenario)?;

            let store = InMemoryInstanceStore::new();
            let instances = build_instances(&graph, &scenario, &store).await?;

            let gateway = instances.get(&scenario.gateway)
                .ok_or_else(|| anyhow!("Gateway instance not found in scenario: {}", scenario.gateway))?;
            let gateway_node = graph.node(gateway.node).expect("instance node was resolved against this graph");
            if gateway_node.kind != NodeKind::InclusiveGateway {
                warn!("Node '{}' is not an InclusiveGateway ({:?})", gateway_node.label, gateway_node.kind);
            }

            let strategy = InclusiveJoinStrategy::new();
            let decision = strategy.decide(&graph, &store, gateway, force).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&decision)?);
            } else if decision.can_fire {
                println!("FIRE: gateway '{}' may consume its tokens and proceed", gateway_node.label);
            } else {
                println!("WAIT: gateway '{}' is blocked by:", gateway_node.label);
                for blocker in &decision.blockers {
                    let label = graph.node(blocker.node).map(|n| n.label.as_str()).unwrap_or("?");
                    println!("  {} (instance {}, {:?})", label, blocker.id, blocker.state);
                }
            }
        }
    }

    Ok(())
}
