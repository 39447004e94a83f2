use async_trait::async_trait;
use routemap::config::ViewportConfig;
use routemap::coordinator::MapCoordinator;
use routemap::models::{Route, RouteRequest, Span, ViewMode, Viewport};
use routemap::render::{OverlayStyle, RecordingRenderer, RenderCommand};
use routemap::services::RouteService;
use routemap::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

mod common;

use common::{c, next_request, setup_coordinator};

#[tokio::test]
async fn test_newest_route_wins_when_responses_reorder() {
    let (mut coordinator, mut h) = setup_coordinator();

    h.handle.location_updated(c(0.0, 0.0)).unwrap();
    assert!(coordinator.step().await);

    h.handle.destination_selected(c(10.0, 10.0), "D1").unwrap();
    assert!(coordinator.step().await);
    let first = next_request(&mut h.requests).await;

    h.handle.destination_selected(c(20.0, 20.0), "D2").unwrap();
    assert!(coordinator.step().await);
    let second = next_request(&mut h.requests).await;
    assert_eq!(coordinator.in_flight(), 2);

    let r2 = second.succeed();
    assert!(coordinator.step().await);
    assert_eq!(coordinator.state().route(), Some(&r2));

    first.succeed();
    assert!(coordinator.step().await);

    let state = coordinator.state();
    assert_eq!(state.mode(), ViewMode::DestinationSelected);
    assert_eq!(state.destination().unwrap().coordinates, c(20.0, 20.0));
    assert_eq!(state.route(), Some(&r2));
    assert_eq!(coordinator.in_flight(), 0);
}

#[tokio::test]
async fn test_superseded_route_arriving_first_is_ignored() {
    let (mut coordinator, mut h) = setup_coordinator();

    h.handle.location_updated(c(0.0, 0.0)).unwrap();
    h.handle.destination_selected(c(10.0, 10.0), "D1").unwrap();
    assert!(coordinator.step().await);
    assert!(coordinator.step().await);
    let first = next_request(&mut h.requests).await;

    h.handle.destination_selected(c(20.0, 20.0), "D2").unwrap();
    assert!(coordinator.step().await);
    let second = next_request(&mut h.requests).await;
    h.renderer.take();

    first.succeed();
    assert!(coordinator.step().await);
    assert!(coordinator.state().route().is_none());
    assert!(h.renderer.take().is_empty());

    let r2 = second.succeed();
    assert!(coordinator.step().await);
    assert_eq!(coordinator.state().route(), Some(&r2));
}

#[tokio::test]
async fn test_reselecting_same_point_discards_earlier_request() {
    let (mut coordinator, mut h) = setup_coordinator();

    h.handle.location_updated(c(0.0, 0.0)).unwrap();
    h.handle.destination_selected(c(5.0, 5.0), "Cafe").unwrap();
    assert!(coordinator.step().await);
    assert!(coordinator.step().await);
    let first = next_request(&mut h.requests).await;

    h.handle.destination_selected(c(5.0, 5.0), "Cafe").unwrap();
    assert!(coordinator.step().await);
    let second = next_request(&mut h.requests).await;
    assert_eq!(first.request, second.request);

    first.succeed();
    assert!(coordinator.step().await);
    assert!(coordinator.state().route().is_none());

    second.succeed();
    assert!(coordinator.step().await);
    assert!(coordinator.state().route().is_some());
}

#[tokio::test]
async fn test_clear_before_response_leaves_map_idle() {
    let (mut coordinator, mut h) = setup_coordinator();

    h.handle.location_updated(c(0.0, 0.0)).unwrap();
    h.handle.destination_selected(c(10.0, 10.0), "D1").unwrap();
    h.handle.destination_cleared().unwrap();
    for _ in 0..3 {
        assert!(coordinator.step().await);
    }
    let pending = next_request(&mut h.requests).await;
    h.renderer.take();

    pending.succeed();
    assert!(coordinator.step().await);

    let state = coordinator.state();
    assert_eq!(state.mode(), ViewMode::Idle);
    assert!(state.destination().is_none());
    assert!(state.route().is_none());
    assert!(h.renderer.take().is_empty());
}

#[tokio::test]
async fn test_selection_waits_for_first_location() {
    let (mut coordinator, mut h) = setup_coordinator();

    h.handle.destination_selected(c(10.0, 10.0), "D1").unwrap();
    h.handle.destination_selected(c(20.0, 20.0), "D2").unwrap();
    assert!(coordinator.step().await);
    assert!(coordinator.step().await);

    assert_eq!(coordinator.in_flight(), 0);
    assert_eq!(coordinator.pending_destination().unwrap().label, "D2");
    assert!(h.requests.try_recv().is_err());

    h.handle.location_updated(c(1.0, 1.0)).unwrap();
    assert!(coordinator.step().await);

    let request = next_request(&mut h.requests).await;
    assert_eq!(request.request.from, c(1.0, 1.0));
    assert_eq!(request.request.to, c(20.0, 20.0));
    assert!(coordinator.pending_destination().is_none());

    // Later fixes do not issue another request
    h.handle.location_updated(c(1.5, 1.5)).unwrap();
    assert!(coordinator.step().await);
    tokio::task::yield_now().await;
    assert!(h.requests.try_recv().is_err());
}

#[tokio::test]
async fn test_clear_is_idempotent() {
    let (mut coordinator, mut h) = setup_coordinator();

    h.handle.location_updated(c(3.0, 4.0)).unwrap();
    h.handle.destination_selected(c(10.0, 10.0), "D1").unwrap();
    h.handle.destination_cleared().unwrap();
    for _ in 0..3 {
        assert!(coordinator.step().await);
    }
    let after_once = (coordinator.state().mode(), coordinator.state().viewport().copied());
    h.renderer.take();

    h.handle.destination_cleared().unwrap();
    assert!(coordinator.step().await);
    let after_twice = (coordinator.state().mode(), coordinator.state().viewport().copied());

    assert_eq!(after_once, after_twice);
    assert_eq!(
        h.renderer.take(),
        vec![
            RenderCommand::HideRouteOverlay,
            RenderCommand::HideAllAnnotations,
            RenderCommand::SetViewport(Viewport {
                center: c(3.0, 4.0),
                span: Span::uniform(0.05),
            }),
        ]
    );
}

#[tokio::test]
async fn test_failed_route_keeps_annotation() {
    let (mut coordinator, mut h) = setup_coordinator();

    h.handle.location_updated(c(0.0, 0.0)).unwrap();
    h.handle.destination_selected(c(10.0, 10.0), "Harbour").unwrap();
    assert!(coordinator.step().await);
    assert!(coordinator.step().await);
    let viewport_before = coordinator.state().viewport().copied();
    h.renderer.take();

    next_request(&mut h.requests).await.fail("No routes found");
    assert!(coordinator.step().await);

    let state = coordinator.state();
    assert_eq!(state.mode(), ViewMode::DestinationSelected);
    assert_eq!(state.destination().unwrap().label, "Harbour");
    assert!(state.route().is_none());
    assert_eq!(state.viewport().copied(), viewport_before);
    assert!(h.renderer.take().is_empty());
    assert_eq!(coordinator.in_flight(), 0);
}

#[tokio::test]
async fn test_route_overlay_and_fit_rendered() {
    let (mut coordinator, mut h) = setup_coordinator();

    h.handle.location_updated(c(48.8566, 2.3522)).unwrap();
    h.handle.destination_selected(c(48.8584, 2.2945), "").unwrap();
    assert!(coordinator.step().await);
    assert!(coordinator.step().await);

    assert_eq!(
        h.renderer.take(),
        vec![
            RenderCommand::SetViewport(Viewport {
                center: c(48.8566, 2.3522),
                span: Span::uniform(0.05),
            }),
            RenderCommand::HideRouteOverlay,
            RenderCommand::HideAllAnnotations,
            RenderCommand::ShowAnnotation {
                coordinates: c(48.8584, 2.2945),
                title: "Destination".to_string(),
            },
        ]
    );

    let route = next_request(&mut h.requests).await.succeed();
    assert!(coordinator.step().await);

    let commands = h.renderer.take();
    assert_eq!(commands.len(), 2);
    assert_eq!(
        commands[0],
        RenderCommand::ShowRouteOverlay {
            polyline: route.path.clone(),
            style: OverlayStyle::default(),
        }
    );
    let RenderCommand::SetViewport(viewport) = commands[1] else {
        panic!("expected a viewport change, got {:?}", commands[1]);
    };
    assert!(route.path.iter().all(|p| viewport.contains(p)));
    assert_eq!(coordinator.state().viewport(), Some(&viewport));
}

#[tokio::test]
async fn test_location_updates_do_not_move_selected_viewport() {
    let (mut coordinator, mut h) = setup_coordinator();

    h.handle.location_updated(c(0.0, 0.0)).unwrap();
    h.handle.destination_selected(c(0.1, 0.1), "D").unwrap();
    assert!(coordinator.step().await);
    assert!(coordinator.step().await);
    next_request(&mut h.requests).await.succeed();
    assert!(coordinator.step().await);

    let fitted = coordinator.state().viewport().copied();
    h.renderer.take();

    for point in [c(0.01, 0.01), c(0.02, 0.02)] {
        h.handle.location_updated(point).unwrap();
        assert!(coordinator.step().await);
    }

    assert_eq!(coordinator.state().viewport().copied(), fitted);
    assert_eq!(coordinator.state().user_location(), Some(c(0.02, 0.02)));
    assert!(h.renderer.take().is_empty());

    // Back to following once cleared
    h.handle.destination_cleared().unwrap();
    assert!(coordinator.step().await);
    assert_eq!(
        coordinator.state().viewport().copied(),
        Some(Viewport::follow_user(c(0.02, 0.02), &ViewportConfig::default()))
    );
}

#[tokio::test]
async fn test_run_drains_in_flight_after_handles_drop() {
    let (coordinator, mut h) = setup_coordinator();
    let snapshots = coordinator.subscribe();
    let running = tokio::spawn(coordinator.run());

    h.handle.location_updated(c(0.0, 0.0)).unwrap();
    h.handle.destination_selected(c(1.0, 1.0), "D").unwrap();
    let pending = next_request(&mut h.requests).await;
    drop(h.handle);

    // Still running: a request is outstanding
    tokio::task::yield_now().await;
    assert!(!running.is_finished());

    let route = pending.succeed();
    let joined = tokio::time::timeout(Duration::from_secs(2), running).await;
    assert_ok!(assert_ok!(joined));

    let state = snapshots.borrow();
    assert_eq!(state.route(), Some(&route));
}

#[tokio::test]
async fn test_step_returns_false_when_idle_and_closed() {
    let (mut coordinator, h) = setup_coordinator();
    drop(h.handle);
    assert!(!coordinator.step().await);
}

#[tokio::test]
async fn test_concurrent_answers_apply_only_latest() {
    let (coordinator, mut h) = setup_coordinator();
    let snapshots = coordinator.subscribe();
    let running = tokio::spawn(coordinator.run());

    h.handle.location_updated(c(0.0, 0.0)).unwrap();
    let targets = [c(1.0, 1.0), c(2.0, 2.0), c(3.0, 3.0), c(4.0, 4.0)];
    let mut pending = Vec::new();
    for (i, target) in targets.iter().enumerate() {
        h.handle
            .destination_selected(*target, format!("D{}", i + 1))
            .unwrap();
        pending.push(next_request(&mut h.requests).await);
    }
    drop(h.handle);

    // Answer newest first, all at once
    pending.reverse();
    let answers = pending.into_iter().map(|p| async move { p.succeed() });
    let routes = futures::future::join_all(answers).await;

    tokio::time::timeout(Duration::from_secs(2), running)
        .await
        .unwrap()
        .unwrap();

    let state = snapshots.borrow();
    assert_eq!(state.destination().unwrap().label, "D4");
    assert_eq!(state.route(), Some(&routes[0]));
}

#[tokio::test]
async fn test_deferred_selection_then_reselection_scenario() {
    let (mut coordinator, mut h) = setup_coordinator();

    h.handle.destination_selected(c(10.0, 10.0), "D1").unwrap();
    assert!(coordinator.step().await);
    h.handle.location_updated(c(0.0, 0.0)).unwrap();
    assert!(coordinator.step().await);

    let first = next_request(&mut h.requests).await;
    assert_eq!(first.request.from, c(0.0, 0.0));
    assert_eq!(first.request.to, c(10.0, 10.0));
    let r1 = first.succeed();
    assert!(coordinator.step().await);

    let state = coordinator.state();
    assert_eq!(state.destination().unwrap().coordinates, c(10.0, 10.0));
    assert_eq!(state.route(), Some(&r1));
    assert_eq!(
        state.viewport().copied(),
        Some(Viewport::fit_route(&r1.extent, &ViewportConfig::default()))
    );

    h.handle.destination_selected(c(20.0, 20.0), "D2").unwrap();
    assert!(coordinator.step().await);
    assert!(coordinator.state().route().is_none());

    let second = next_request(&mut h.requests).await;
    assert_eq!(second.request.from, c(0.0, 0.0));
    assert_eq!(second.request.to, c(20.0, 20.0));

    let r2 = second.succeed();
    assert!(coordinator.step().await);
    assert_eq!(coordinator.state().route(), Some(&r2));
}

struct PanickingRouteService;

#[async_trait]
impl RouteService for PanickingRouteService {
    async fn compute_route(&self, _request: &RouteRequest) -> Result<Route> {
        panic!("routing backend crashed");
    }

    fn backend_name(&self) -> &'static str {
        "panicking"
    }
}

#[tokio::test]
async fn test_panicking_route_task_counts_as_failure() {
    let renderer = RecordingRenderer::new();
    let (coordinator, handle) = MapCoordinator::new(
        ViewportConfig::default(),
        Arc::new(PanickingRouteService),
        renderer.clone(),
    );
    let snapshots = coordinator.subscribe();
    let running = tokio::spawn(coordinator.run());

    handle.location_updated(c(0.0, 0.0)).unwrap();
    handle.destination_selected(c(1.0, 1.0), "D").unwrap();
    drop(handle);

    let joined = tokio::time::timeout(Duration::from_secs(3), running).await;
    assert_ok!(assert_ok!(joined));

    let state = snapshots.borrow();
    assert_eq!(state.mode(), ViewMode::DestinationSelected);
    assert_eq!(state.destination().unwrap().coordinates, c(1.0, 1.0));
    assert!(state.route().is_none());
    assert!(!renderer
        .commands()
        .iter()
        .any(|cmd| matches!(cmd, RenderCommand::ShowRouteOverlay { .. })));
}
