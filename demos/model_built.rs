//! End-to-end wiring: a background fetch publishes a fully-built model,
//! and a UI-affine subscriber renders it.
//!
//! Run with: `cargo run --example model_built`

use std::sync::Arc;
use std::time::Duration;

use typedbus::{Dispatch, Dispatcher, EventAggregator, UiDispatcher};

/// Payload published once the remote project/release model has been built.
#[derive(Clone)]
struct ModelBuilt {
    server: String,
    projects: Vec<Project>,
}

#[derive(Clone)]
struct Project {
    name: String,
    releases: Vec<String>,
}

async fn fetch_model(bus: Arc<EventAggregator>) {
    // Pretend to call the deployment server.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let model = ModelBuilt {
        server: "https://deploy.example.com".into(),
        projects: vec![
            Project {
                name: "website".into(),
                releases: vec!["1.0.2".into(), "1.0.1".into()],
            },
            Project {
                name: "billing-api".into(),
                releases: vec!["3.4.0".into()],
            },
        ],
    };

    bus.channel::<ModelBuilt>().publish(model);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let ui = Arc::new(UiDispatcher::new());
    let dispatcher: Arc<dyn Dispatcher> = ui.clone();
    let bus = Arc::new(EventAggregator::with_ui_dispatcher(dispatcher));

    // The "tool window": renders on the UI-affine context, never on the
    // fetching task.
    bus.channel::<ModelBuilt>().subscribe_on(
        |model: &ModelBuilt| {
            println!("{}", model.server);
            for project in &model.projects {
                println!("└─ {}", project.name);
                for release in &project.releases {
                    println!("   └─ {release}");
                }
            }
        },
        Dispatch::Ui,
    )?;

    tokio::spawn(fetch_model(Arc::clone(&bus))).await?;

    // Give the UI worker a moment to drain, then tear it down.
    tokio::time::sleep(Duration::from_millis(100)).await;
    ui.shutdown().await;
    Ok(())
}
