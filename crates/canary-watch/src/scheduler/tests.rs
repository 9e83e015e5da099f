use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use canary_core::AlertError;
use canary_core::testing::{FakeGateway, RecordingSink};
use canary_model::{Endpoint, Resource, TaskId, WatchSpec, WatchTask};

use super::*;

fn task(id: u64, service: &str) -> WatchTask {
    let ep = Endpoint::new("https://r.local/v2-beta/projects", "ak", "sk", "1a5");
    WatchTask::new(TaskId::new(id), WatchSpec::new(service, "ops-alerts", ep))
}

fn shop(health: &str) -> FakeGateway {
    FakeGateway::new()
        .with_stack("1st1", "shop")
        .with_service("1st1", Resource::new("1s10", "api").with_health(health))
        .with_instances(
            "1s10",
            vec![
                Resource::new("1i1", "shop-api-1").with_health("healthy"),
                Resource::new("1i2", "shop-api-2").with_health("initializing"),
            ],
        )
}

/// Sink whose delivery takes a second.
#[derive(Default)]
struct SlowSink {
    inner: RecordingSink,
}

#[async_trait]
impl AlertSink for SlowSink {
    async fn post(&self, channel: &str, text: &str) -> Result<(), AlertError> {
        tokio::time::sleep(Duration::from_secs(1)).await;
        self.inner.post(channel, text).await
    }
}

/// Let spawned loops run up to their next sleep.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn unresolvable_target_keeps_loop_alive() {
    let gw = Arc::new(FakeGateway::new());
    let sink = Arc::new(RecordingSink::new());
    let sched = HealthScheduler::new(gw.clone(), sink.clone());

    sched.start(task(1, "blog/web")).unwrap();
    settle().await;
    assert_eq!(gw.calls(), 1);

    tokio::time::sleep(PER_TASK_INTERVAL).await;
    assert_eq!(gw.calls(), 2);
    assert!(sink.posts().is_empty());
    assert!(sched.is_running(TaskId::new(1)));
}

#[tokio::test(start_paused = true)]
async fn unhealthy_service_alerts_every_tick() {
    let gw = Arc::new(shop("degraded"));
    let sink = Arc::new(RecordingSink::new());
    let sched = HealthScheduler::new(gw.clone(), sink.clone());

    sched.start(task(1, "shop/api")).unwrap();
    settle().await;
    tokio::time::sleep(PER_TASK_INTERVAL).await;

    let posts = sink.posts();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].0, "ops-alerts");
    assert_eq!(
        posts[0].1,
        "Please, check the containers health, the service `shop/api` actually is `degraded` with `1` up containers and `1` down containers\n\n`shop-api-1` - `healthy`\n`shop-api-2` - `initializing`\n"
    );
    assert_eq!(posts[0], posts[1]);
}

#[tokio::test(start_paused = true)]
async fn healthy_service_stays_quiet() {
    let gw = Arc::new(shop("healthy"));
    let sink = Arc::new(RecordingSink::new());
    let sched = HealthScheduler::new(gw.clone(), sink.clone());

    sched.start(task(1, "shop/api")).unwrap();
    settle().await;
    tokio::time::sleep(PER_TASK_INTERVAL * 3).await;
    assert!(sink.posts().is_empty());
    assert!(gw.calls() >= 3);
}

#[tokio::test(start_paused = true)]
async fn stop_halts_ticks_and_is_idempotent() {
    let gw = Arc::new(shop("degraded"));
    let sink = Arc::new(RecordingSink::new());
    let sched = HealthScheduler::new(gw.clone(), sink.clone());
    let id = TaskId::new(7);

    sched.start(task(7, "shop/api")).unwrap();
    settle().await;
    let calls = gw.calls();

    assert!(sched.stop(id));
    assert!(!sched.stop(id));
    tokio::time::sleep(PER_TASK_INTERVAL * 4).await;

    assert_eq!(gw.calls(), calls);
    assert_eq!(sink.posts().len(), 1);
    assert!(!sched.is_running(id));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_stops_succeed_once() {
    let gw = Arc::new(shop("healthy"));
    let sched = Arc::new(HealthScheduler::new(gw, Arc::new(RecordingSink::new())));
    sched.start(task(3, "shop/api")).unwrap();

    let a = tokio::spawn({
        let sched = sched.clone();
        async move { sched.stop(TaskId::new(3)) }
    });
    let b = tokio::spawn({
        let sched = sched.clone();
        async move { sched.stop(TaskId::new(3)) }
    });
    let (a, b) = (a.await.unwrap(), b.await.unwrap());

    assert!(a ^ b, "exactly one stop must win: {a} {b}");
    assert!(sched.running_ids().is_empty());
}

#[tokio::test(start_paused = true)]
async fn duplicate_start_is_rejected() {
    let sched = HealthScheduler::new(Arc::new(shop("healthy")), Arc::new(RecordingSink::new()));
    sched.start(task(1, "shop/api")).unwrap();

    let err = sched.start(task(1, "shop/api")).unwrap_err();
    assert!(matches!(err, WatchError::AlreadyRunning(id) if id == TaskId::new(1)));
    sched.start(task(2, "shop/api")).unwrap();
    assert_eq!(sched.running_ids(), vec![TaskId::new(1), TaskId::new(2)]);
}

#[tokio::test(start_paused = true)]
async fn malformed_target_is_rejected_at_start() {
    let sched = HealthScheduler::new(Arc::new(shop("healthy")), Arc::new(RecordingSink::new()));
    let err = sched.start(task(1, "no-slash")).unwrap_err();
    assert!(matches!(err, WatchError::Validation(_)));
    assert!(!sched.is_running(TaskId::new(1)));
}

#[tokio::test(start_paused = true)]
async fn loop_survives_upstream_and_sink_failures() {
    let gw = Arc::new(shop("degraded"));
    let sink = Arc::new(RecordingSink::new());
    let sched = HealthScheduler::new(gw.clone(), sink.clone()).with_interval(Duration::from_secs(30));

    gw.set_failing(true);
    sink.set_failing(true);
    sched.start(task(1, "shop/api")).unwrap();
    settle().await;
    assert_eq!(gw.calls(), 1);

    gw.set_failing(false);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(sink.posts().is_empty());

    sink.set_failing(false);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(sink.posts().len(), 1);
    assert!(sched.is_running(TaskId::new(1)));
}

#[tokio::test(start_paused = true)]
async fn missing_channel_skips_alert() {
    let gw = Arc::new(shop("degraded"));
    let sink = Arc::new(RecordingSink::new());
    let sched = HealthScheduler::new(gw, sink.clone());

    let mut t = task(1, "shop/api");
    t.spec.channel.clear();
    assert_eq!(sched.check(&t).await.unwrap(), TickOutcome::Unhealthy);
    assert!(sink.posts().is_empty());
}

#[tokio::test]
async fn sweep_counts_outcomes() {
    let gw = Arc::new(shop("degraded").with_service("1st1", Resource::new("1s11", "web").with_health("healthy")));
    let sink = Arc::new(RecordingSink::new());
    let sched = HealthScheduler::new(gw, sink.clone()).with_interval(BATCH_INTERVAL);

    let tasks = [
        task(1, "shop/api"),
        task(2, "shop/web"),
        task(3, "blog/web"),
        task(4, "broken"),
    ];
    let report = sched.sweep(&tasks).await;

    assert_eq!(
        report,
        SweepReport {
            healthy: 1,
            unhealthy: 1,
            failed: 2
        }
    );
    assert_eq!(sink.posts().len(), 1);
    assert!(sched.running_ids().is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_every_loop() {
    let gw = Arc::new(shop("healthy"));
    let sched = HealthScheduler::new(gw.clone(), Arc::new(RecordingSink::new()));
    sched.start(task(1, "shop/api")).unwrap();
    sched.start(task(2, "shop/api")).unwrap();
    settle().await;

    sched.shutdown().await;
    let calls = gw.calls();
    tokio::time::sleep(PER_TASK_INTERVAL * 3).await;

    assert!(sched.running_ids().is_empty());
    assert_eq!(gw.calls(), calls);
    assert!(matches!(sched.start(task(3, "shop/api")), Err(WatchError::ShutDown)));
}

#[tokio::test(start_paused = true)]
async fn stop_lets_in_flight_alert_finish() {
    let gw = Arc::new(shop("degraded"));
    let sink = Arc::new(SlowSink::default());
    let sched = HealthScheduler::new(gw.clone(), sink.clone());

    sched.start(task(1, "shop/api")).unwrap();
    settle().await;
    assert!(sink.inner.posts().is_empty());

    assert!(sched.stop(TaskId::new(1)));
    tokio::time::sleep(PER_TASK_INTERVAL * 2).await;

    assert_eq!(sink.inner.posts().len(), 1);
    assert_eq!(gw.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn recovered_service_stops_alerting() {
    let gw = Arc::new(shop("degraded"));
    let sink = Arc::new(RecordingSink::new());
    let sched = HealthScheduler::new(gw.clone(), sink.clone());

    sched.start(task(1, "shop/api")).unwrap();
    settle().await;
    assert_eq!(sink.posts().len(), 1);

    gw.set_service_health("1s10", "healthy");
    tokio::time::sleep(PER_TASK_INTERVAL * 3).await;
    assert_eq!(sink.posts().len(), 1);
    assert!(sched.is_running(TaskId::new(1)));
}
