use std::sync::Arc;

use canary_model::{Endpoint, Weights};
use serde_json::json;

use super::*;
use crate::error::ErrorKind;
use crate::testing::{FakeGateway, RecordingSink};

const BODY: &str = "backend api\n  server new-api 10.0.0.1:8080 check weight 80\n  server old-api 10.0.0.2:8080 check weight 20\n";

fn ep() -> Endpoint {
    Endpoint::new("https://rancher.local/v2-beta/projects", "ak", "sk", "1a5")
}

fn controller(gw: &Arc<FakeGateway>) -> CanaryController {
    CanaryController::new(gw.clone())
}

#[tokio::test]
async fn update_weights_stores_once() {
    let gw = Arc::new(FakeGateway::new().with_lb("1s5", "web-lb", BODY));
    let update = controller(&gw).update_weights(&ep(), "1s5", 70, 30).await.unwrap();

    assert_eq!(update.weights, Some(Weights::new(70, 30).unwrap()));
    assert!(update.body.contains("check weight 70\n"));
    assert!(update.body.contains("check weight 30\n"));
    let stores = gw.stores();
    assert_eq!(stores.len(), 1);
    assert_eq!(stores[0], ("1s5".to_string(), update.body));
}

#[tokio::test]
async fn invalid_sum_makes_no_gateway_call() {
    let gw = Arc::new(FakeGateway::new().with_lb("1s5", "web-lb", BODY));
    let err = controller(&gw).update_weights(&ep(), "1s5", 60, 60).await.unwrap_err();

    assert!(matches!(err, CanaryError::InvalidWeightSum { new: 60, old: 60 }));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(gw.calls(), 0);
}

#[tokio::test]
async fn missing_lb_is_config_not_found() {
    let gw = Arc::new(FakeGateway::new());
    let err = controller(&gw).update_weights(&ep(), "1s9", 50, 50).await.unwrap_err();
    assert!(matches!(err, CanaryError::ConfigNotFound { ref lb } if lb == "1s9"));
    assert!(gw.stores().is_empty());
}

#[tokio::test]
async fn empty_body_is_config_not_found() {
    let gw = Arc::new(FakeGateway::new().with_raw_lb("1s5", json!({"id": "1s5"})));
    let err = controller(&gw).set_canary_enabled(&ep(), "1s5", false).await.unwrap_err();
    assert!(matches!(err, CanaryError::ConfigNotFound { .. }));
    assert!(gw.stores().is_empty());
}

#[tokio::test]
async fn mutation_failure_skips_store() {
    let body = "backend api\n  server only 10.0.0.1:8080 weight 100\n";
    let gw = Arc::new(FakeGateway::new().with_lb("1s5", "web-lb", body));
    let err = controller(&gw).update_weights(&ep(), "1s5", 50, 50).await.unwrap_err();
    assert!(matches!(err, CanaryError::MissingWeightedLines { found: 0 }));
    assert!(gw.stores().is_empty());
}

#[tokio::test]
async fn upstream_failure_is_reported_as_unavailable() {
    let gw = Arc::new(FakeGateway::new().with_lb("1s5", "web-lb", BODY));
    gw.set_failing(true);
    let err = controller(&gw).bump_by_ten(&ep(), "1s5").await.unwrap_err();
    assert!(matches!(err, CanaryError::UpstreamUnavailable(_)));
    assert_eq!(err.kind(), ErrorKind::Upstream);
}

#[tokio::test]
async fn bump_moves_ten_points_to_new() {
    let gw = Arc::new(FakeGateway::new().with_lb("1s5", "web-lb", BODY));
    let update = controller(&gw).bump_by_ten(&ep(), "1s5").await.unwrap();
    assert_eq!(update.weights, Some(Weights::new(90, 10).unwrap()));
    assert_eq!(controller(&gw).current_weights(&ep(), "1s5").await.unwrap(), (90, 10));
}

#[tokio::test]
async fn bump_past_full_is_rejected_without_store() {
    let body = BODY.replace("weight 80", "weight 100").replace("weight 20", "weight 0");
    let gw = Arc::new(FakeGateway::new().with_lb("1s5", "web-lb", &body));
    let err = controller(&gw).bump_by_ten(&ep(), "1s5").await.unwrap_err();
    assert!(matches!(err, CanaryError::InvalidWeightSum { new: 110, old: -10 }));
    assert!(gw.stores().is_empty());
}

#[tokio::test]
async fn bump_rejects_weights_beyond_i32() {
    for (new, old) in [("2147483647", "0"), ("4294967290", "106")] {
        let body = BODY
            .replace("weight 80", &format!("weight {new}"))
            .replace("weight 20", &format!("weight {old}"));
        let gw = Arc::new(FakeGateway::new().with_lb("1s5", "web-lb", &body));
        let err = controller(&gw).bump_by_ten(&ep(), "1s5").await.unwrap_err();
        assert!(matches!(err, CanaryError::InvalidWeightSum { .. }), "{new}/{old}: {err:?}");
        assert!(gw.stores().is_empty());
    }
}

#[tokio::test]
async fn bump_rejects_malformed_current_pair() {
    let body = BODY.replace("weight 20", "weight 30");
    let gw = Arc::new(FakeGateway::new().with_lb("1s5", "web-lb", &body));
    let err = controller(&gw).bump_by_ten(&ep(), "1s5").await.unwrap_err();
    assert!(matches!(err, CanaryError::InvalidWeightSum { new: 80, old: 30 }));
    assert!(gw.stores().is_empty());
}

#[tokio::test]
async fn disable_then_enable_round_trips_body() {
    let gw = Arc::new(FakeGateway::new().with_lb("1s5", "web-lb", BODY));
    let ctl = controller(&gw);

    let off = ctl.set_canary_enabled(&ep(), "1s5", false).await.unwrap();
    assert_eq!(off.weights, None);
    assert_eq!(ctl.info(&ep(), "1s5").await.unwrap().state, CommentState::Disabled);

    ctl.set_canary_enabled(&ep(), "1s5", true).await.unwrap();
    assert_eq!(gw.lb_body("1s5").as_deref(), Some(BODY));
    assert_eq!(gw.stores().len(), 2);
}

#[tokio::test]
async fn store_preserves_other_envelope_fields() {
    let gw = Arc::new(FakeGateway::new().with_raw_lb(
        "1s5",
        json!({"id": "1s5", "name": "web-lb", "lbConfig": {"config": BODY, "certificateIds": ["1c1"]}}),
    ));
    controller(&gw).update_weights(&ep(), "1s5", 50, 50).await.unwrap();
    let stored = gw.lb_value("1s5").unwrap();
    assert_eq!(stored["name"], "web-lb");
    assert_eq!(stored["lbConfig"]["certificateIds"], json!(["1c1"]));
}

#[tokio::test]
async fn info_reports_state_and_weights() {
    let gw = Arc::new(FakeGateway::new().with_lb("1s5", "web-lb", BODY));
    let info = controller(&gw).info(&ep(), "1s5").await.unwrap();
    assert_eq!(info.lb_id, "1s5");
    assert_eq!(info.body, BODY);
    assert_eq!(info.state, CommentState::Enabled);
    assert_eq!(info.weights, Some((80, 20)));
}

#[tokio::test]
async fn concurrent_updates_on_same_lb_are_serialized() {
    let body = BODY.replace("weight 80", "weight 50").replace("weight 20", "weight 50");
    let gw = Arc::new(FakeGateway::new().with_lb("1s5", "web-lb", &body));
    let ctl = Arc::new(controller(&gw));

    let mut handles = Vec::new();
    for _ in 0..5 {
        let ctl = ctl.clone();
        handles.push(tokio::spawn(async move { ctl.bump_by_ten(&ep(), "1s5").await }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    // No lost update: every bump read the previous bump's store.
    assert_eq!(gw.stores().len(), 5);
    let last = gw.lb_body("1s5").unwrap();
    assert_eq!(mutator::current_weights(&last).unwrap(), (100, 0));
}

#[tokio::test]
async fn announce_uses_service_name() {
    let gw = Arc::new(FakeGateway::new().with_lb("1s5", "web-lb", BODY));
    let sink = RecordingSink::new();
    controller(&gw)
        .announce(&ep(), "1s5", Weights::new(70, 30).unwrap(), "#deploys", &sink)
        .await
        .unwrap();

    assert_eq!(
        sink.posts(),
        vec![(
            "#deploys".to_string(),
            "Canary of `web-lb` has been updated.\nNew version: `70`\nOld version: `30`".to_string()
        )]
    );
}

#[tokio::test]
async fn announce_falls_back_to_id_and_surfaces_sink_failure() {
    let gw = Arc::new(FakeGateway::new());
    let sink = RecordingSink::new();
    controller(&gw)
        .announce(&ep(), "1s7", Weights::new(50, 50).unwrap(), "ops", &sink)
        .await
        .unwrap();
    assert!(sink.posts()[0].1.starts_with("Canary of `1s7`"));

    sink.set_failing(true);
    let err = controller(&gw)
        .announce(&ep(), "1s7", Weights::new(50, 50).unwrap(), "ops", &sink)
        .await
        .unwrap_err();
    assert!(matches!(err, CanaryError::Alert(_)));
}
