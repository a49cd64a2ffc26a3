//! # Composition Root
//!
//! Binds every route type to the stage operation that fulfils it. This is
//! the only place that knows both sides; producers only know routes, and
//! the stage only knows screens.

use std::time::Duration;

use log::{debug, info};

use crate::core::HandlerFuture;
use crate::core::dispatcher::Router;
use crate::core::route::{
    DismissPresented, SetLoadingOverlay, ShowCitySearch, ShowErrorAlert, ShowSplash, ShowToast,
    ShowWeatherDetails, ShowWeatherHome,
};
use crate::stage::{Alert, Content, ModalStyle, OverlayRequest, Screen, Shell, Transition, Window};

pub const SPLASH: &str = "splash";
pub const WEATHER_HOME: &str = "weather_home";
pub const CITY_SEARCH: &str = "city_search";
pub const WEATHER_DETAILS: &str = "weather_details";

/// Register one handler per route type.
pub fn install<W: Window>(router: &Router<Shell<W>>) {
    router.register(show_splash::<W>);
    router.register(show_weather_home::<W>);
    router.register(show_error_alert::<W>);
    router.register(show_toast::<W>);
    router.register(set_loading_overlay::<W>);
    router.register(show_city_search::<W>);
    router.register(show_weather_details::<W>);
    router.register(dismiss_presented::<W>);
    info!("Installed route handlers");
}

/// Show the splash, hold it for `splash`, then move on to the home screen.
pub async fn start<W: Window>(router: &Router<Shell<W>>, splash: Duration) {
    router.dispatch(ShowSplash);
    tokio::time::sleep(splash).await;
    router.dispatch(ShowWeatherHome);
}

fn show_splash<W: Window>(_: ShowSplash, shell: &mut Shell<W>) -> HandlerFuture<'_> {
    Box::pin(async move {
        shell
            .navigator_mut()
            .set_root(Content::stack(Screen::new(SPLASH)), None);
    })
}

fn show_weather_home<W: Window>(_: ShowWeatherHome, shell: &mut Shell<W>) -> HandlerFuture<'_> {
    Box::pin(async move {
        shell
            .navigator_mut()
            .set_root(Content::stack(Screen::new(WEATHER_HOME)), Some(Transition::Fade));
    })
}

fn show_error_alert<W: Window>(route: ShowErrorAlert, shell: &mut Shell<W>) -> HandlerFuture<'_> {
    Box::pin(async move {
        let alert = Alert::error(route.title, route.message);
        match shell.navigator_mut().present_alert_if_possible(alert) {
            Ok(true) => {}
            Ok(false) => debug!("Error alert not presented: another alert is showing"),
            Err(failure) => shell.report(failure),
        }
    })
}

fn show_toast<W: Window>(route: ShowToast, shell: &mut Shell<W>) -> HandlerFuture<'_> {
    Box::pin(async move {
        shell.set_overlay(OverlayRequest::toast(route.message, route.kind));
    })
}

fn set_loading_overlay<W: Window>(route: SetLoadingOverlay, shell: &mut Shell<W>) -> HandlerFuture<'_> {
    Box::pin(async move {
        shell.set_overlay(OverlayRequest::loading(route.visible));
    })
}

fn show_city_search<W: Window>(_: ShowCitySearch, shell: &mut Shell<W>) -> HandlerFuture<'_> {
    Box::pin(async move {
        let sheet = Content::stack(Screen::new(CITY_SEARCH));
        if let Err(failure) = shell.navigator_mut().present(sheet, Some(ModalStyle::PageSheet)) {
            shell.report(failure);
        }
    })
}

fn show_weather_details<W: Window>(route: ShowWeatherDetails, shell: &mut Shell<W>) -> HandlerFuture<'_> {
    Box::pin(async move {
        let screen = Screen::new(format!("{WEATHER_DETAILS}:{}", route.city));
        if let Err(failure) = shell.navigator_mut().push(screen) {
            shell.report(failure);
        }
    })
}

fn dismiss_presented<W: Window>(_: DismissPresented, shell: &mut Shell<W>) -> HandlerFuture<'_> {
    Box::pin(async move {
        let dismissal = shell.navigator_mut().dismiss();
        debug!("Dismiss result: {:?}", dismissal);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::failure::RouteFailure;
    use crate::core::route::ToastKind;
    use crate::stage::{OverlayClass, PresentationState};
    use crate::test_support::test_router;

    #[tokio::test(start_paused = true)]
    async fn test_start_shows_splash_then_home() {
        let router = test_router();
        install(&router);

        start(&router, Duration::from_millis(500)).await;

        let root = router
            .inspect(|shell| shell.navigator().presentation().root.clone())
            .await
            .unwrap();
        assert_eq!(root, Some(Content::stack(Screen::new(WEATHER_HOME))));
    }

    #[tokio::test]
    async fn test_error_alert_is_guarded() {
        let router = test_router();
        install(&router);
        router.dispatch(ShowWeatherHome);
        router.dispatch(ShowErrorAlert::new("Network", "Timeout"));
        router.dispatch(ShowErrorAlert::new("Network", "Timeout again"));

        let state = router.inspect(|shell| shell.navigator().state()).await;
        assert_eq!(state, Some(PresentationState::RootWithModalChain(1)));
    }

    #[tokio::test]
    async fn test_search_details_and_dismiss() {
        let router = test_router();
        install(&router);
        router.dispatch(ShowWeatherHome);
        router.dispatch(ShowWeatherDetails { city: "Izmir".into() });
        router.dispatch(ShowCitySearch);

        let top = router
            .inspect(|shell| shell.navigator().top().map(Content::label))
            .await
            .unwrap();
        assert_eq!(top, Some(format!("stack[{CITY_SEARCH}]")));

        router.dispatch(DismissPresented);
        router.dispatch(DismissPresented);
        let root = router
            .inspect(|shell| shell.navigator().presentation().clone())
            .await
            .unwrap();
        assert!(root.modals.is_empty());
        assert_eq!(root.root, Some(Content::stack(Screen::new(WEATHER_HOME))));
    }

    #[tokio::test]
    async fn test_error_alert_without_root_reports_precondition() {
        let router = test_router();
        install(&router);
        let mut failures = router.failures();

        router.dispatch(ShowErrorAlert::new("Network", "Timeout"));
        router.flush().await;

        assert!(matches!(
            failures.try_recv(),
            Ok(RouteFailure::PreconditionViolation { operation: "present", .. })
        ));
        assert!(failures.try_recv().is_err());
        let state = router.inspect(|shell| shell.navigator().state()).await;
        assert_eq!(state, Some(PresentationState::NoRoot));
    }

    #[tokio::test]
    async fn test_details_without_root_reports_precondition() {
        let router = test_router();
        install(&router);
        let mut failures = router.failures();

        router.dispatch(ShowWeatherDetails { city: "Ankara".into() });
        router.flush().await;

        assert!(matches!(
            failures.try_recv(),
            Ok(RouteFailure::PreconditionViolation { operation: "push", .. })
        ));
    }

    #[tokio::test]
    async fn test_overlay_routes() {
        let router = test_router();
        install(&router);
        router.dispatch(SetLoadingOverlay { visible: true });
        router.dispatch(ShowToast::new("Saved", ToastKind::Success));

        let (loading, toast) = router
            .inspect(|shell| {
                (
                    shell.overlays().live(OverlayClass::Loading).is_some(),
                    shell.overlays().live(OverlayClass::Toast).is_some(),
                )
            })
            .await
            .unwrap();
        assert!(loading);
        assert!(toast);

        router.dispatch(SetLoadingOverlay { visible: false });
        let loading = router
            .inspect(|shell| shell.overlays().live(OverlayClass::Loading).is_some())
            .await
            .unwrap();
        assert!(!loading);
    }
}
