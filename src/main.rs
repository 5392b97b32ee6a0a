mod cli;
mod ui;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use qualboard::board::{BoardController, Notice};
use qualboard::config::QualboardConfig;
use qualboard::sync::{HttpStatusStore, MemoryStore, StatusStore};
use qualboard::workflow::{EntityKind, ItemId, StageId, WorkflowItem};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => QualboardConfig::load_from(path),
        None => QualboardConfig::load(),
    }
    .context("failed to load configuration")?;

    init_tracing(cli.verbose, config.log_json);

    let entity = EntityKind::from(cli.entity);
    match cli.command {
        Command::Stages => {
            ui::print_stages(entity.workflow());
        }
        Command::Board => {
            let (controller, _notices) = http_board(&config, entity)?;
            controller
                .refresh()
                .await
                .with_context(|| format!("failed to fetch {entity}"))?;
            ui::print_board(controller.workflow(), &controller.columns());
        }
        Command::Move { id, stage } => {
            let (controller, mut notices) = http_board(&config, entity)?;
            controller
                .refresh()
                .await
                .with_context(|| format!("failed to fetch {entity}"))?;
            drag_and_drop(&controller, &mut notices, &ItemId::from(id), stage.into()).await;
            println!();
            ui::print_board(controller.workflow(), &controller.columns());
        }
        Command::Demo => run_demo(&config).await,
    }

    Ok(())
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "qualboard=debug" } else { "warn" }));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn http_board(
    config: &QualboardConfig,
    entity: EntityKind,
) -> Result<(BoardController<HttpStatusStore>, UnboundedReceiver<Notice>)> {
    let store = HttpStatusStore::new(&config.api_url, config.resource_for(entity))
        .context("failed to build HTTP client")?
        .with_token(&config.api_token);
    Ok(BoardController::new(
        entity.workflow(),
        Arc::new(store),
        config.sync_timeout(),
    ))
}

/// Replays one pointer gesture: pick the item up, hover the target, drop it.
async fn drag_and_drop<S: StatusStore>(
    controller: &BoardController<S>,
    notices: &mut UnboundedReceiver<Notice>,
    item_id: &ItemId,
    target: StageId,
) {
    match controller.on_drag_start(item_id) {
        Ok(session) => {
            controller.on_drag_over(Some(target));
            let progress = ui::SyncProgress::start(&format!(
                "#{item_id}: {} → {}",
                session.source_stage.map(|s| s.label()).unwrap_or("?"),
                target.label()
            ));
            let outcome = controller.on_drop(item_id, target).await;
            progress.finish(&outcome);
        }
        Err(reason) => println!("  {reason}"),
    }

    while let Ok(notice) = notices.try_recv() {
        ui::print_notice(&notice);
    }
}

async fn run_demo(config: &QualboardConfig) {
    let store = Arc::new(MemoryStore::new(vec![
        WorkflowItem::new("101", "d1_iniciado").with_title("Registros de calibración vencidos"),
        WorkflowItem::new("102", "t3_plan_de_accion_definido").with_title("Proveedor sin evaluar"),
        WorkflowItem::new("103", "c4_ejecutada_la_verificacion").with_title("Capacitación ineficaz"),
        WorkflowItem::new("104", "abierto").with_title("Hallazgo importado del sistema anterior"),
        WorkflowItem::new("105", "d2_en_revision").with_title("Documento obsoleto en planta"),
    ]));
    store.set_latency(Duration::from_millis(400));

    let workflow = EntityKind::Findings.workflow();
    let (controller, mut notices) =
        BoardController::new(workflow, store.clone(), config.sync_timeout());
    controller.load(store.snapshot());

    ui::print_board(workflow, &controller.columns());

    let steps: [(&str, StageId, Option<&str>); 5] = [
        ("101", StageId::Treatment, None),
        ("105", StageId::Closure, None),
        ("103", StageId::Treatment, None),
        ("104", StageId::Treatment, None),
        ("102", StageId::Verification, Some("plan de acción sin responsable asignado")),
    ];

    for (id, target, failure) in steps {
        if let Some(message) = failure {
            store.fail_next_update(422, message);
        }
        drag_and_drop(&controller, &mut notices, &ItemId::from(id), target).await;
    }

    println!();
    ui::print_board(workflow, &controller.columns());
}
