//! HTTP route layer for the carbon relay
//!
//! A thin hyper server that maps paths onto the calculation pipeline, the
//! traffic counters, and the health prober, and serializes their results
//! to clients. It supplies no business logic of its own.

use crate::cache::ResultCache;
use crate::client::CarbonClient;
use crate::counter::CounterStore;
use crate::error::{RelayError, Result};
use crate::health::HealthProber;
use crate::metrics::{self, RelayMetrics};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Shared handles the route layer dispatches into
pub struct RelayState {
    pub client: CarbonClient,
    pub counters: CounterStore,
    pub cache: Arc<ResultCache>,
    pub metrics: Arc<RelayMetrics>,
    pub prober: HealthProber,
}

/// Request body for the batch-recording route
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchRequest {
    count: u64,
    #[serde(default)]
    is_simulation: bool,
}

/// Relay HTTP server
pub struct RelayServer {
    state: Arc<RelayState>,
    addr: SocketAddr,
}

impl RelayServer {
    /// Create a server for the given state and bind address
    pub fn new(state: Arc<RelayState>, addr: SocketAddr) -> Self {
        Self { state, addr }
    }

    /// Start serving requests.
    ///
    /// Runs until the process is terminated.
    pub async fn start(self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(self.addr).await?;
        info!("Carbon relay listening on http://{}", self.addr);

        loop {
            let (stream, _) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let state = self.state.clone();

            tokio::task::spawn(async move {
                let result = http1::Builder::new()
                    .serve_connection(
                        io,
                        service_fn(move |req| {
                            let state = state.clone();
                            handle_request(state, req)
                        }),
                    )
                    .await;

                if let Err(err) = result {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }
}

/// Dispatch a request to the matching handler
async fn handle_request(
    state: Arc<RelayState>,
    req: Request<hyper::body::Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, hyper::http::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(|q| q.to_string());

    match (&method, path.as_str()) {
        (&Method::POST, "/api/carbon/discord/batch") => {
            let body = match read_json_body::<BatchRequest>(req).await {
                Ok(body) => body,
                Err(e) => return error_response(&e),
            };
            respond(handle_batch(&state, body).await)
        }
        (&Method::GET, "/api/carbon/live") => respond(handle_live(&state).await),
        (&Method::GET, "/api/carbon/public") => respond(handle_public(&state).await),
        (&Method::POST, "/api/carbon/simulation/reset") => respond(handle_reset(&state).await),
        (&Method::GET, "/api/carbon/calculate/single") => {
            respond(handle_single(&state, query.as_deref()).await)
        }
        (&Method::GET, "/api/carbon/health") => {
            state.metrics.record_health_probe();
            let report = state.prober.check_health().await;
            json_response(StatusCode::OK, &json!(report))
        }
        (&Method::GET, "/api/carbon/global-context") => {
            json_response(StatusCode::OK, &global_context())
        }
        (&Method::GET, "/metrics") => {
            let output =
                metrics::render_prometheus(&state.metrics.snapshot(), &state.cache.stats());
            Response::builder()
                .status(StatusCode::OK)
                .header("Content-Type", "text/plain; version=0.0.4")
                .body(Full::new(Bytes::from(output)))
        }
        _ => json_response(StatusCode::NOT_FOUND, &json!({"error": "not found"})),
    }
}

/// Record a traffic batch and report batch plus aggregate impact
async fn handle_batch(state: &RelayState, body: BatchRequest) -> Result<serde_json::Value> {
    if body.is_simulation {
        let total = state.counters.add_simulated(body.count);
        info!(
            "Simulation: added {} messages (simulation total: {})",
            body.count, total
        );
    } else {
        let total = state.counters.add_real(body.count);
        info!(
            "Real bot data: added {} messages (real total: {})",
            body.count, total
        );
    }
    state.metrics.record_batch(body.is_simulation);

    let batch_calculation = state.client.calculate(body.count as i64).await?;

    let snapshot = state.counters.snapshot();
    let combined = snapshot.combined();
    let total_calculation = state.client.calculate(combined as i64).await?;

    Ok(json!({
        "batch": {
            "messages": body.count,
            "carbon": batch_calculation.carbon,
            "equivalents": batch_calculation.equivalents,
            "isSimulation": body.is_simulation,
        },
        "aggregate": {
            "totalMessages": combined,
            "realMessages": snapshot.real,
            "simulatedMessages": snapshot.simulated,
            "totalCarbon": total_calculation.carbon,
            "totalEquivalents": total_calculation.equivalents,
            "lastUpdated": chrono::Utc::now(),
        },
    }))
}

/// Report live combined totals, skipping the remote call while empty
async fn handle_live(state: &RelayState) -> Result<serde_json::Value> {
    let snapshot = state.counters.snapshot();
    let combined = snapshot.combined();

    if combined == 0 {
        return Ok(json!({
            "totalMessages": 0,
            "realMessages": 0,
            "simulatedMessages": 0,
            "carbonImpact": {"grams": 0, "kilograms": 0},
            "equivalents": {"carMiles": 0, "treeDays": 0},
            "lastUpdated": chrono::Utc::now(),
            "message": "No data yet. Send your first batch!",
        }));
    }

    let calculation = state.client.calculate(combined as i64).await?;
    Ok(json!({
        "totalMessages": combined,
        "realMessages": snapshot.real,
        "simulatedMessages": snapshot.simulated,
        "carbonImpact": calculation.carbon,
        "equivalents": calculation.equivalents,
        "lastUpdated": chrono::Utc::now(),
    }))
}

/// Shareable summary of the combined impact with a phrased statement
async fn handle_public(state: &RelayState) -> Result<serde_json::Value> {
    let combined = state.counters.snapshot().combined();
    let calculation = state.client.calculate(combined as i64).await?;

    let statement = format!(
        "Our {} Discord messages generated {:.3} kg CO₂, equivalent to driving {:.1} miles.",
        combined, calculation.carbon.kilograms, calculation.equivalents.car_miles
    );

    Ok(json!({
        "description": "Live digital carbon footprint of tracked Discord traffic",
        "metrics": {
            "discordMessages": combined,
            "carbonKg": calculation.carbon.kilograms,
            "equivalentCarMiles": calculation.equivalents.car_miles,
        },
        "impactStatement": statement,
        "generatedAt": chrono::Utc::now(),
    }))
}

/// Zero the simulated counter and report the remaining real impact
async fn handle_reset(state: &RelayState) -> Result<serde_json::Value> {
    let removed = state.counters.reset_simulated();
    state.metrics.record_simulation_reset();
    let remaining = state.counters.snapshot().real;

    info!(
        "Reset simulations: removed {} simulation messages, {} real messages remain",
        removed, remaining
    );

    let calculation = state.client.calculate(remaining as i64).await?;
    Ok(json!({
        "success": true,
        "removedSimulations": removed,
        "remainingRealMessages": remaining,
        "currentCarbon": calculation.carbon,
        "message": "Simulation data reset successfully",
    }))
}

/// One-off calculation passthrough, `?messages=N`, default 1500
async fn handle_single(state: &RelayState, query: Option<&str>) -> Result<serde_json::Value> {
    let messages = match query_param(query, "messages") {
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|e| RelayError::Validation(format!("Invalid messages parameter: {}", e)))?,
        None => 1500,
    };

    let calculation = state.client.calculate(messages).await?;
    Ok(json!(calculation))
}

/// Static informational context served to clients
fn global_context() -> serde_json::Value {
    json!({
        "articles": [
            {
                "id": "iea-datacenter-2024",
                "title": "Data Centers to Use 8% of Global Electricity by 2030",
                "description": "Latest IEA report shows AI and cloud computing driving unprecedented energy demand in data centers worldwide.",
                "source": "International Energy Agency (IEA)",
                "date": "2024-09",
                "url": "https://www.iea.org/reports/electricity-2024",
                "category": "energy",
                "impact": "critical",
            },
            {
                "id": "nature-streaming-2024",
                "title": "Streaming Video Emissions Lower Than Previously Thought",
                "description": "New peer-reviewed research shows streaming's carbon footprint is 0.05-0.2kg CO₂/hour, emphasizing network efficiency improvements.",
                "source": "Nature Climate Change",
                "date": "2024-06",
                "url": "https://www.nature.com/articles/s41558-024-01949-0",
                "category": "research",
                "impact": "moderate",
            },
            {
                "id": "w3c-sustainability-2024",
                "title": "Web Sustainability Guidelines 1.0 Published",
                "description": "W3C releases first official standard for sustainable web design and development practices.",
                "source": "World Wide Web Consortium (W3C)",
                "date": "2024-08",
                "url": "https://www.w3.org/TR/wsg/",
                "category": "standards",
                "impact": "high",
            },
            {
                "id": "google-carbon-2024",
                "title": "Google's AI Increases Data Center Emissions by 48%",
                "description": "Google's 2024 environmental report reveals AI training and inference drove significant increases in carbon emissions.",
                "source": "Google Environmental Report",
                "date": "2024-07",
                "url": "https://sustainability.google/reports/",
                "category": "industry",
                "impact": "critical",
            },
            {
                "id": "greenpeace-cloud-2024",
                "title": "Major Cloud Providers Commit to 100% Renewable Energy",
                "description": "AWS, Azure, and Google Cloud announce accelerated timelines for renewable energy adoption across global data centers.",
                "source": "Greenpeace East Asia",
                "date": "2024-10",
                "url": "https://www.greenpeace.org/eastasia/publication/",
                "category": "sustainability",
                "impact": "high",
            },
        ],
        "lastUpdated": chrono::Utc::now(),
        "totalArticles": 5,
    })
}

fn query_param<'a>(query: Option<&'a str>, name: &str) -> Option<&'a str> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

async fn read_json_body<T: serde::de::DeserializeOwned>(
    req: Request<hyper::body::Incoming>,
) -> Result<T> {
    let bytes = req
        .into_body()
        .collect()
        .await
        .map_err(|e| RelayError::Validation(format!("Unreadable request body: {}", e)))?
        .to_bytes();

    serde_json::from_slice(&bytes)
        .map_err(|e| RelayError::Validation(format!("Invalid request body: {}", e)))
}

fn respond(
    result: Result<serde_json::Value>,
) -> std::result::Result<Response<Full<Bytes>>, hyper::http::Error> {
    match result {
        Ok(value) => json_response(StatusCode::OK, &value),
        Err(e) => error_response(&e),
    }
}

fn json_response(
    status: StatusCode,
    value: &serde_json::Value,
) -> std::result::Result<Response<Full<Bytes>>, hyper::http::Error> {
    let body = serde_json::to_vec(value).unwrap_or_else(|_| b"{}".to_vec());
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
}

fn error_response(
    error: &RelayError,
) -> std::result::Result<Response<Full<Bytes>>, hyper::http::Error> {
    let status =
        StatusCode::from_u16(error.to_http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_response(status, &json!({"error": error.to_string()}))
}
