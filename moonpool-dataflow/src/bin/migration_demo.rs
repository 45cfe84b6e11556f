//! Two in-process nodes migrating a counter actor back and forth.
//!
//! Run with `RUST_LOG=moonpool_dataflow=debug` to follow every migration phase.

use moonpool_dataflow::prelude::*;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

/// Counts tokens; its count travels with it.
#[derive(Default)]
struct Counter {
    count: u64,
}

impl Actor for Counter {
    fn init(&mut self, args: Args) -> std::result::Result<(), ActorError> {
        self.count = args.get("start").and_then(Value::as_u64).unwrap_or(0);
        Ok(())
    }

    fn state(&self) -> Value {
        json!({ "count": self.count })
    }

    fn set_state(&mut self, state: Value) -> std::result::Result<(), ActorError> {
        self.count = state["count"]
            .as_u64()
            .ok_or_else(|| ActorError::instantiation("demo.Counter", "missing count"))?;
        Ok(())
    }

    fn did_migrate(&mut self) -> std::result::Result<(), ActorError> {
        self.count += 1;
        Ok(())
    }

    fn report(&self) -> Value {
        json!({ "count": self.count })
    }
}

fn catalog() -> Rc<InMemoryCatalog> {
    let catalog = InMemoryCatalog::new();
    catalog.register(
        ActorDescriptor::new("demo.Counter", |_: &Capabilities| {
            Ok(Box::new(Counter::default()))
        })
        .inports(&["token"])
        .outports(&["token"]),
    );
    Rc::new(catalog)
}

fn node(
    name: &str,
    fabric: &LoopbackPortManager,
    cluster: &Rc<LocalCluster>,
    registry: &InMemoryRegistry,
) -> Rc<ActorManager> {
    let config = ManagerConfig::builder()
        .node_id(name)
        .migration_timeout(Duration::from_secs(5))
        .build();
    let manager = Rc::new(
        ActorManager::builder(config)
            .catalog(catalog())
            .ports(Rc::new(fabric.for_node(name)))
            .registry(Rc::new(registry.clone()))
            .remote(cluster.clone())
            .build(),
    );
    cluster.join(&manager);
    manager
}

async fn run() -> std::result::Result<(), ActorError> {
    let cluster = Rc::new(LocalCluster::new());
    let registry = InMemoryRegistry::new();
    let fabric = LoopbackPortManager::new();
    let node_a = node("node-a", &fabric, &cluster, &registry);
    let node_b = node("node-b", &fabric, &cluster, &registry);

    let mut args = Args::new();
    args.insert("name".into(), json!("counter"));
    args.insert("start".into(), json!(40));
    let id = node_a.create("demo.Counter", args).await?;
    tracing::info!(actor_id = %id, "created on node-a");

    let mut args = Args::new();
    args.insert("name".into(), json!("sink"));
    let sink = node_b.create("demo.Counter", args).await?;
    let out = node_a.snapshot(&id)?.ports.outports["token"].id.clone();
    let sink_in = node_b.snapshot(&sink)?.ports.inports["token"].id.clone();
    let wiring = vec![ConnectionDescriptor::new(
        node_a.node_id().clone(),
        out,
        node_b.node_id().clone(),
        sink_in,
    )];
    let wired = node_a.connect(&id, wiring).await?;
    tracing::info!(status = ?wired.status, sink = %sink, "counter wired to sink on node-b");

    let there = node_a.migrate(&id, node_b.node_id()).await;
    tracing::info!(status = ?there.status, report = ?node_b.report(&id)?, "migrated to node-b");
    tracing::info!(
        sink = %sink,
        connections = node_b.connections(&sink)?.len(),
        "sink still wired to the counter"
    );

    let back = node_b.migrate(&id, node_a.node_id()).await;
    tracing::info!(status = ?back.status, report = ?node_a.report(&id)?, "migrated back to node-a");

    cluster.partition(node_b.node_id());
    let refused = node_a.migrate(&id, node_b.node_id()).await;
    tracing::info!(
        status = ?refused.status,
        resident = node_a.is_resident(&id),
        "migration towards partitioned node-b"
    );

    let location = registry.lookup(&id).await.ok().flatten();
    tracing::info!(actor_id = %id, location = ?location, "registry view");
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to build runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run()) {
        tracing::error!(error = %e, "demo failed");
        std::process::exit(1);
    }
}
