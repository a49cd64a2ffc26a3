use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use clap::Parser;
use serde::Deserialize;
use simplelog::{ConfigBuilder, WriteLogger};

use wayfinder::Scenario;
use wayfinder::app;
use wayfinder::core::config::{self, ResolvedConfig, WayfinderConfig};
use wayfinder::core::route::{
    DismissPresented, ShowCitySearch, ShowErrorAlert, ShowToast, ShowWeatherDetails, ToastKind,
};
use wayfinder::core::{Reporter, Router};
use wayfinder::network::{self, NetworkClient, NetworkError, Request};
use wayfinder::stage::{HeadlessWindow, Shell, TerminalWindow, Window};

#[derive(Parser)]
#[command(name = "wayfinder", about = "In-process navigation and overlay dispatch demo")]
struct Args {
    /// Flow to run
    #[arg(short, long, default_value_t, value_enum)]
    scenario: Scenario,

    /// Config file (defaults to ~/.wayfinder/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level override: off, error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<String>,

    /// Record window events instead of printing them
    #[arg(long)]
    headless: bool,

    /// Print the final presentation as JSON
    #[arg(long)]
    json: bool,
}

/// Stands in for the weather API.
struct DemoClient {
    online: bool,
}

#[async_trait]
impl NetworkClient for DemoClient {
    fn name(&self) -> &str {
        "demo"
    }

    async fn perform(&self, _request: &Request) -> Result<serde_json::Value, NetworkError> {
        tokio::time::sleep(Duration::from_millis(400)).await;
        if self.online {
            Ok(serde_json::json!({ "temperature": 21.5, "city": "Istanbul" }))
        } else {
            Err(NetworkError::Network("The request timed out.".to_string()))
        }
    }
}

#[derive(Deserialize)]
struct Forecast {
    temperature: f64,
    city: String,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let file_config = match &args.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    };
    let file_config = file_config.unwrap_or_else(|e| {
        eprintln!("Ignoring config: {e}");
        WayfinderConfig::default()
    });
    let resolved = config::resolve(&file_config, args.log_level.as_deref());

    // Initialize file logger
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    log::info!("Wayfinder starting with scenario: {:?}", args.scenario);

    if args.headless {
        run(HeadlessWindow::new(), &args, &resolved).await
    } else {
        run(TerminalWindow::new(resolved.transition), &args, &resolved).await
    }
}

async fn run<W: Window>(window: W, args: &Args, config: &ResolvedConfig) -> std::io::Result<()> {
    let reporter = Reporter::new();
    let shell = Shell::new(window, config.overlay_timings, reporter.clone());
    let router = Router::spawn(shell, reporter);
    app::install(&router);

    app::start(&router, config.splash).await;

    match args.scenario {
        Scenario::Startup | Scenario::Offline => {
            let client = DemoClient {
                online: matches!(args.scenario, Scenario::Startup),
            };
            let request = Request::get("/v1/forecast")
                .query("latitude", 41.01)
                .query("longitude", 28.97);
            match network::fetch::<Forecast, _>(&router, &client, &request).await {
                Ok(forecast) => router.dispatch(ShowToast::new(
                    format!("{}: {:.1}°", forecast.city, forecast.temperature),
                    ToastKind::Success,
                )),
                Err(_) => router.dispatch(ShowToast::new("Showing cached weather", ToastKind::Error)),
            }
        }
        Scenario::Modal => {
            router.dispatch(ShowWeatherDetails {
                city: "Ankara".to_string(),
            });
            router.dispatch(ShowCitySearch);
            router.dispatch(ShowErrorAlert::new("Search", "No results"));
            router.dispatch(ShowErrorAlert::new("Search", "Still no results"));
            let dismiss = router.action(DismissPresented);
            for _ in 0..3 {
                dismiss();
            }
        }
    }

    // Let any toast run its course before reading the final state.
    let timings = config.overlay_timings;
    tokio::time::sleep(timings.fade * 2 + timings.visible + Duration::from_millis(100)).await;

    let presentation = router
        .inspect(|shell| shell.navigator().presentation().clone())
        .await;

    if args.json {
        if let Some(presentation) = presentation {
            let json = serde_json::to_string_pretty(&presentation).map_err(std::io::Error::other)?;
            println!("{json}");
        }
    }

    log::info!("Wayfinder finished");
    Ok(())
}
