use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use canary_core::{CanaryController, Gateway, MetricsHandle};
use canary_gateway::RancherGateway;
use canary_model::{Endpoint, WatchSpec};
use canary_observe::init_logger;
use canary_prometheus::{Encoder, PrometheusMetrics, TextEncoder};
use canary_watch::{HealthScheduler, MemoryTaskStore, TaskRegistry, TracingAlertSink, WatchService};

mod config;
use config::{AgentConfig, WatchMode};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // 1) config + logger
    let cfg = AgentConfig::load().context("loading agent config")?;
    init_logger(&cfg.logger)?;
    info!(mode = ?cfg.watch.mode, interval = ?cfg.watch.interval(), "logger initialized");

    // 2) metrics + gateway
    let prom = Arc::new(PrometheusMetrics::new()?);
    let metrics: MetricsHandle = prom.clone();
    let gateway: Arc<dyn Gateway> = Arc::new(RancherGateway::new(&cfg.http)?);

    // 3) canary inventory
    let controller = CanaryController::new(gateway.clone()).with_metrics(metrics.clone());
    if cfg.rancher.validate().is_ok() {
        report_canaries(&controller, gateway.as_ref(), &cfg.rancher).await;
    } else {
        warn!("rancher endpoint incomplete, skipping canary inventory");
    }

    // 4) watch service
    let scheduler = HealthScheduler::new(gateway.clone(), Arc::new(TracingAlertSink))
        .with_interval(cfg.watch.interval())
        .with_metrics(metrics);
    let registry = TaskRegistry::new(Arc::new(MemoryTaskStore::new()));
    let service = WatchService::new(registry, scheduler);

    // 5) seeded watches
    for seed in &cfg.watches {
        let spec = WatchSpec::new(seed.service.as_str(), seed.channel.as_str(), seed.endpoint(&cfg.rancher));
        let res = match cfg.watch.mode {
            WatchMode::PerTask => service.watch(spec).await,
            WatchMode::Batch => service.registry().add(spec).await,
        };
        match res {
            Ok(id) => info!(task = %id, service = %seed.service, "watch registered"),
            Err(e) => warn!(service = %seed.service, error = %e, "watch rejected"),
        }
    }

    // 6) run until ctrl-c
    match cfg.watch.mode {
        WatchMode::PerTask => tokio::signal::ctrl_c().await?,
        WatchMode::Batch => {
            let mut every = tokio::time::interval(cfg.watch.interval());
            loop {
                tokio::select! {
                    _ = every.tick() => match service.sweep().await {
                        Ok(r) => info!(healthy = r.healthy, unhealthy = r.unhealthy, failed = r.failed, "sweep done"),
                        Err(e) => warn!(error = %e, "sweep failed"),
                    },
                    res = tokio::signal::ctrl_c() => {
                        res?;
                        break;
                    }
                }
            }
        }
    }

    // 7) shutdown
    info!("shutting down");
    service.shutdown().await;

    let mut buf = Vec::new();
    TextEncoder::new().encode(&prom.gather(), &mut buf)?;
    info!(metrics = %String::from_utf8_lossy(&buf), "final metrics");
    Ok(())
}

async fn report_canaries(controller: &CanaryController, gateway: &dyn Gateway, ep: &Endpoint) {
    let lbs = match gateway.list_load_balancers(ep).await {
        Ok(lbs) => lbs,
        Err(e) => {
            warn!(error = %e, "cannot list load balancers");
            return;
        }
    };
    for lb in lbs {
        match controller.info(ep, &lb.id).await {
            Ok(info) => info!(lb = %lb.id, name = %lb.name, state = ?info.state, weights = ?info.weights, "canary"),
            Err(e) => warn!(lb = %lb.id, error = %e, "canary unreadable"),
        }
    }
}
