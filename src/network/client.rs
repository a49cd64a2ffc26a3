use std::fmt;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use crate::core::dispatcher::{Router, Surface};
use crate::core::route::{SetLoadingOverlay, ShowErrorAlert};

/// Why a request did not produce a value. `fetch` turns any of these into
/// an error alert.
#[derive(Debug)]
pub enum NetworkError {
    /// The client could not build the request (missing key, bad base URL).
    Config(String),
    /// The request never got a response.
    Network(String),
    /// The server answered with a non-success status.
    Api { status: u16, message: String },
    /// The body did not decode into the requested type.
    Parse(String),
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::Config(msg) => write!(f, "config error: {msg}"),
            NetworkError::Network(msg) => write!(f, "network error: {msg}"),
            NetworkError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            NetworkError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for NetworkError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Everything a client needs to perform one call. The wire format is the client's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }
}

#[async_trait]
pub trait NetworkClient: Send + Sync {
    /// Returns the name of the client.
    fn name(&self) -> &str;

    /// Performs the request and returns the decoded response body.
    async fn perform(&self, request: &Request) -> Result<serde_json::Value, NetworkError>;
}

/// Run a request with the loading overlay up, decode the body into `T`.
///
/// The overlay is lowered whether or not the call succeeds. On failure an
/// error alert is dispatched before the error is handed back, so callers
/// only need to handle the happy path.
pub async fn fetch<T, S>(router: &Router<S>, client: &dyn NetworkClient, request: &Request) -> Result<T, NetworkError>
where
    T: DeserializeOwned,
    S: Surface,
{
    info!("Fetching {} via {}", request.path, client.name());
    router.dispatch(SetLoadingOverlay { visible: true });
    let result = client
        .perform(request)
        .await
        .and_then(|value| serde_json::from_value::<T>(value).map_err(|e| NetworkError::Parse(e.to_string())));
    router.dispatch(SetLoadingOverlay { visible: false });

    match result {
        Ok(value) => {
            debug!("Fetched {}", request.path);
            Ok(value)
        }
        Err(e) => {
            warn!("Request {} failed: {}", request.path, e);
            router.dispatch(ShowErrorAlert::new("Error", e.to_string()));
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::failure::Reporter;
    use crate::test_support::Recorder;
    use serde::Deserialize;
    use tokio_test::{assert_err, assert_ok};

    struct CannedClient(Result<serde_json::Value, u16>);

    #[async_trait]
    impl NetworkClient for CannedClient {
        fn name(&self) -> &str {
            "canned"
        }

        async fn perform(&self, _request: &Request) -> Result<serde_json::Value, NetworkError> {
            match &self.0 {
                Ok(value) => Ok(value.clone()),
                Err(status) => Err(NetworkError::Api {
                    status: *status,
                    message: "unavailable".into(),
                }),
            }
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Current {
        temperature: f64,
    }

    fn recording_router() -> Router<Recorder> {
        let router = Router::spawn(Recorder::default(), Reporter::new());
        router.register(|route: SetLoadingOverlay, rec: &mut Recorder| {
            Box::pin(async move { rec.log.push(format!("loading:{}", route.visible)) })
        });
        router.register(|route: ShowErrorAlert, rec: &mut Recorder| {
            Box::pin(async move {
                rec.log.push(format!("alert:{}", route.message.unwrap_or_default()))
            })
        });
        router
    }

    #[test]
    fn test_request_builder() {
        let request = Request::get("/forecast").query("latitude", 41.0).query("longitude", 29);
        assert_eq!(request.method, Method::Get);
        assert_eq!(
            request.query,
            vec![
                ("latitude".to_string(), "41".to_string()),
                ("longitude".to_string(), "29".to_string())
            ]
        );
    }

    #[test]
    fn test_network_error_display() {
        let e = NetworkError::Api { status: 503, message: "down".into() };
        assert_eq!(e.to_string(), "API error (HTTP 503): down");
    }

    #[tokio::test]
    async fn test_fetch_success_toggles_overlay() {
        let router = recording_router();
        let client = CannedClient(Ok(serde_json::json!({ "temperature": 21.5 })));

        let current: Current = assert_ok!(fetch(&router, &client, &Request::get("/forecast")).await);

        assert_eq!(current, Current { temperature: 21.5 });
        let log = router.inspect(|r| r.log.clone()).await.unwrap();
        assert_eq!(log, vec!["loading:true", "loading:false"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_raises_alert_after_overlay() {
        let router = recording_router();
        let client = CannedClient(Err(503));

        let result: Result<Current, _> = fetch(&router, &client, &Request::get("/forecast")).await;
        assert_err!(&result);

        let log = router.inspect(|r| r.log.clone()).await.unwrap();
        assert_eq!(
            log,
            vec![
                "loading:true",
                "loading:false",
                "alert:API error (HTTP 503): unavailable"
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_decode_failure_is_parse_error() {
        let router = recording_router();
        let client = CannedClient(Ok(serde_json::json!({ "temp": "warm" })));

        let result: Result<Current, _> = fetch(&router, &client, &Request::get("/forecast")).await;

        assert!(matches!(result, Err(NetworkError::Parse(_))));
    }
}
