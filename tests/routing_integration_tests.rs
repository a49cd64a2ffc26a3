use std::time::Duration;

use wayfinder::app;
use wayfinder::core::route::{
    DismissPresented, SetLoadingOverlay, ShowCitySearch, ShowErrorAlert, ShowSplash, ShowToast,
    ShowWeatherHome, ToastKind,
};
use wayfinder::core::{Reporter, RouteFailure, Router, Surface};
use wayfinder::stage::overlay::Eviction;
use wayfinder::stage::{
    Content, HeadlessWindow, OverlayClass, OverlayEvent, OverlayRequest, OverlayTimings,
    PresentationState, Screen, Shell, WindowEvent,
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Creates a router over a headless shell, without any handlers.
fn bare_router() -> Router<Shell<HeadlessWindow>> {
    let reporter = Reporter::new();
    let shell = Shell::new(HeadlessWindow::new(), OverlayTimings::default(), reporter.clone());
    Router::spawn(shell, reporter)
}

/// Creates a router with the app's handlers installed and the home screen up.
async fn home_router() -> Router<Shell<HeadlessWindow>> {
    let router = bare_router();
    app::install(&router);
    router.dispatch(ShowWeatherHome);
    router.flush().await;
    router
}

async fn window_events(router: &Router<Shell<HeadlessWindow>>) -> Vec<WindowEvent> {
    router
        .inspect(|shell| shell.navigator().window().events().to_vec())
        .await
        .unwrap()
}

fn evictions(events: &[WindowEvent]) -> Vec<Eviction> {
    events
        .iter()
        .filter_map(|e| match e {
            WindowEvent::Overlay(OverlayEvent::Detached { reason, .. }) => Some(*reason),
            _ => None,
        })
        .collect()
}

/// Minimal surface for observing handler order.
#[derive(Default)]
struct Trace(Vec<String>);

impl Surface for Trace {}

// ============================================================================
// Dispatch
// ============================================================================

#[tokio::test]
async fn test_unregistered_alert_reports_once_without_ui_mutation() {
    let router = bare_router();
    let mut failures = router.failures();

    router.dispatch(ShowErrorAlert::new("Network", "Timeout"));
    router.flush().await;

    assert_eq!(
        failures.try_recv().unwrap(),
        RouteFailure::UnregisteredRoute { route: "ShowErrorAlert" }
    );
    assert!(failures.try_recv().is_err());
    assert!(window_events(&router).await.is_empty());
    let state = router.inspect(|shell| shell.navigator().state()).await;
    assert_eq!(state, Some(PresentationState::NoRoot));
}

#[tokio::test(start_paused = true)]
async fn test_back_to_back_dispatch_runs_sequentially() {
    let router = Router::spawn(Trace::default(), Reporter::new());
    router.register(|_: ShowWeatherHome, trace: &mut Trace| {
        Box::pin(async move {
            let n = trace.0.len() / 2;
            trace.0.push(format!("begin {n}"));
            tokio::time::sleep(Duration::from_millis(100)).await;
            trace.0.push(format!("finish {n}"));
        })
    });

    router.dispatch(ShowWeatherHome);
    router.dispatch(ShowWeatherHome);

    let trace = router.inspect(|t| t.0.clone()).await.unwrap();
    assert_eq!(trace, vec!["begin 0", "finish 0", "begin 1", "finish 1"]);
}

#[tokio::test]
async fn test_second_registration_wins() {
    let router = Router::spawn(Trace::default(), Reporter::new());
    router.register(|_: ShowSplash, trace: &mut Trace| {
        Box::pin(async move { trace.0.push("h1".to_string()) })
    });
    router.register(|_: ShowSplash, trace: &mut Trace| {
        Box::pin(async move { trace.0.push("h2".to_string()) })
    });

    router.dispatch(ShowSplash);
    router.dispatch(ShowSplash);

    let trace = router.inspect(|t| t.0.clone()).await.unwrap();
    assert_eq!(trace, vec!["h2", "h2"]);
}

#[tokio::test]
async fn test_concurrent_producers_each_delivered_once() {
    let router = Router::spawn(Trace::default(), Reporter::new());
    router.register(|route: ShowToast, trace: &mut Trace| {
        Box::pin(async move { trace.0.push(route.message) })
    });

    let mut producers = Vec::new();
    for task in 0..4 {
        let router = router.clone();
        producers.push(tokio::spawn(async move {
            for i in 0..5 {
                router.dispatch(ShowToast::new(format!("{task}-{i}"), ToastKind::Info));
            }
        }));
    }
    for producer in producers {
        producer.await.unwrap();
    }

    let mut trace = router.inspect(|t| t.0.clone()).await.unwrap();
    assert_eq!(trace.len(), 20);
    // Per-producer order survives interleaving.
    for task in 0..4 {
        let prefix = format!("{task}-");
        let mine: Vec<_> = trace.iter().filter(|m| m.starts_with(&prefix)).cloned().collect();
        let expected: Vec<_> = (0..5).map(|i| format!("{task}-{i}")).collect();
        assert_eq!(mine, expected);
    }
    trace.sort();
    trace.dedup();
    assert_eq!(trace.len(), 20);
}

// ============================================================================
// Presentation
// ============================================================================

#[tokio::test]
async fn test_nested_present_then_dismiss_restores_state() {
    let router = home_router().await;
    let before = router
        .inspect(|shell| shell.navigator().presentation().clone())
        .await
        .unwrap();

    // present(A): search sheet; present(B): alert above it.
    router.dispatch(ShowCitySearch);
    router.dispatch(ShowErrorAlert::new("Search", "No results"));
    let state = router.inspect(|shell| shell.navigator().state()).await;
    assert_eq!(state, Some(PresentationState::RootWithModalChain(2)));

    router.dispatch(DismissPresented);
    router.dispatch(DismissPresented);
    let after = router
        .inspect(|shell| shell.navigator().presentation().clone())
        .await
        .unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_alert_dismiss_round_trip_through_routes() {
    let router = home_router().await;
    let before = router
        .inspect(|shell| shell.navigator().presentation().clone())
        .await
        .unwrap();

    router.dispatch(ShowErrorAlert::new("Network", "Timeout"));
    let depth = router.inspect(|shell| shell.navigator().state()).await;
    assert_eq!(depth, Some(PresentationState::RootWithModalChain(1)));

    router.dispatch(DismissPresented);
    let after = router
        .inspect(|shell| shell.navigator().presentation().clone())
        .await
        .unwrap();
    assert_eq!(after, before);
    assert_eq!(after.root, Some(Content::stack(Screen::new(app::WEATHER_HOME))));
}

// ============================================================================
// Overlays
// ============================================================================

#[tokio::test]
async fn test_loading_overlay_shown_twice_is_single_instance() {
    let router = home_router().await;
    router.dispatch(SetLoadingOverlay { visible: true });
    router.dispatch(SetLoadingOverlay { visible: true });

    let live = router.inspect(|shell| shell.overlays().live_count()).await;
    assert_eq!(live, Some(1));
    assert_eq!(evictions(&window_events(&router).await), vec![Eviction::Replaced]);
}

#[tokio::test(start_paused = true)]
async fn test_toast_auto_evicts() {
    let router = home_router().await;
    router.dispatch(ShowToast::new("X", ToastKind::Info));
    router.flush().await;
    let live = router
        .inspect(|shell| shell.overlays().live(OverlayClass::Toast).is_some())
        .await;
    assert_eq!(live, Some(true));

    tokio::time::sleep(Duration::from_millis(2700)).await;

    let live = router
        .inspect(|shell| shell.overlays().live(OverlayClass::Toast).is_some())
        .await;
    assert_eq!(live, Some(false));
    assert_eq!(evictions(&window_events(&router).await), vec![Eviction::Expired]);
}

#[tokio::test(start_paused = true)]
async fn test_hidden_toast_never_expires_late() {
    let router = home_router().await;
    router.dispatch(ShowToast::new("X", ToastKind::Info));
    router.flush().await;
    tokio::time::sleep(Duration::from_millis(500)).await;

    router.set_overlay(OverlayRequest::hide_toast());
    router.flush().await;
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(evictions(&window_events(&router).await), vec![Eviction::Hidden]);
}
