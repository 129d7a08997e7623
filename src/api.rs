//! REST API for the bound service.
//!
//! Exposes property inference, bound queries and streamed bound sweeps over HTTP.
//! Uses Axum as the web framework and supports CORS.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use std::sync::OnceLock;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use utoipa::{OpenApi, ToSchema};

use crate::benchmark::{Benchmark, BenchmarkError, BenchmarkParams};
use crate::bounds::{BoundEvent, StackedCeiling, SweepRange};
use crate::config::{ApiConfig, InstanceConfig};
use crate::dims::DimsFunctor;
use crate::instance::{Instance, SortOrder};
use crate::model::{Box3D, BoxSpec, Orientation, ValidationError};
use crate::properties::{Extrema, InstanceProperties};
use crate::rational::Rational;
use crate::types::{Dims3, validation};

#[derive(Clone)]
struct ApiState {
    instance_config: InstanceConfig,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>boxbound API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                window.ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                });
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Benchmark family and its integer parameters.
#[derive(Deserialize, Clone, ToSchema)]
pub struct BenchmarkRequest {
    /// Family id between 1 and 8.
    pub id: u8,
    #[serde(flatten)]
    pub params: BenchmarkParams,
}

/// Where the boxes of an instance come from, plus per-request policy overrides.
///
/// Exactly one of `boxes` and `benchmark` must be given.
#[derive(Deserialize, Clone, ToSchema)]
#[schema(
    example = json!({
        "boxes": [
            { "width": "3/2", "height": 2, "length": "1.25" },
            { "width": 1, "height": 1, "length": 4, "orientation": "oriented" }
        ],
        "unoriented": true
    })
)]
pub struct InstanceRequest {
    #[serde(default)]
    pub boxes: Vec<BoxSpec>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub benchmark: Option<BenchmarkRequest>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub unoriented: Option<bool>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub ordering: Option<SortOrder>,
}

#[derive(Debug)]
enum InstanceRequestError {
    MissingSource,
    AmbiguousSource,
    InvalidBox(ValidationError),
    InvalidBenchmark(BenchmarkError),
}

impl InstanceRequest {
    /// Builds the instance, applying the configured defaults for anything the
    /// request leaves open.
    fn into_instance(self, defaults: &InstanceConfig) -> Result<Instance, InstanceRequestError> {
        let mut instance = match (self.benchmark, self.boxes.is_empty()) {
            (Some(_), false) => return Err(InstanceRequestError::AmbiguousSource),
            (None, true) => return Err(InstanceRequestError::MissingSource),
            (Some(benchmark), true) => {
                let family =
                    Benchmark::from_id(benchmark.id).map_err(InstanceRequestError::InvalidBenchmark)?;
                Instance::from_benchmark(family, &benchmark.params)
                    .map_err(InstanceRequestError::InvalidBenchmark)?
            }
            (None, false) => {
                let boxes = self
                    .boxes
                    .into_iter()
                    .map(Box3D::try_from)
                    .collect::<Result<Vec<_>, ValidationError>>()
                    .map_err(InstanceRequestError::InvalidBox)?;
                Instance::with_boxes(boxes)
            }
        };

        instance.set_unoriented(self.unoriented.unwrap_or(defaults.unoriented()));
        instance.sort(self.ordering.unwrap_or(defaults.ordering()));
        Ok(instance)
    }
}

#[derive(Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    #[serde(flatten)]
    pub instance: InstanceRequest,
    /// Rescale the sides to coprime integers before inference.
    #[serde(default)]
    pub normalize: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct BoundsRequest {
    #[serde(flatten)]
    pub instance: InstanceRequest,
    /// Ceiling on the first role of `functor`.
    #[schema(value_type = String, example = "10")]
    pub n_max: Rational,
    #[serde(default)]
    pub functor: DimsFunctor,
}

#[derive(Deserialize, ToSchema)]
pub struct SweepRequest {
    #[serde(flatten)]
    pub instance: InstanceRequest,
    #[serde(flatten)]
    pub range: SweepRange,
    #[serde(default)]
    pub functor: DimsFunctor,
}

/// Inferred properties of an instance.
#[derive(Serialize, ToSchema)]
pub struct AnalyzeResponse {
    /// Boxes in their final order, comma separated.
    pub instance: String,
    pub box_count: usize,
    pub unoriented: bool,
    pub benchmark: Option<Benchmark>,
    /// Current sides times `scale` give the submitted sides.
    #[schema(value_type = String)]
    pub scale: Rational,
    pub properties: InstanceProperties,
}

/// One bound family evaluated on the second role, the third role and the better of both.
#[derive(Serialize, ToSchema)]
pub struct BoundTriple {
    #[schema(value_type = String)]
    pub second: Rational,
    #[schema(value_type = String)]
    pub third: Rational,
    #[schema(value_type = String)]
    pub either: Rational,
}

#[derive(Serialize, ToSchema)]
pub struct CeilingTriple {
    pub second: StackedCeiling,
    pub third: StackedCeiling,
    pub either: StackedCeiling,
}

#[derive(Serialize, ToSchema)]
pub struct BoundsResponse {
    #[schema(value_type = String)]
    pub n_max: Rational,
    pub functor: DimsFunctor,
    pub pairs: BoundTriple,
    pub stacked: BoundTriple,
    pub stacked_ceiling: CeilingTriple,
}

impl BoundsResponse {
    fn compute(instance: &Instance, n_max: Rational, functor: DimsFunctor) -> Self {
        Self {
            pairs: BoundTriple {
                second: instance.min_dim_pairs2(&n_max, functor),
                third: instance.min_dim_pairs3(&n_max, functor),
                either: instance.min_dim_pairs23(&n_max, functor),
            },
            stacked: BoundTriple {
                second: instance.min_dim2_stacked(&n_max, functor),
                third: instance.min_dim3_stacked(&n_max, functor),
                either: instance.min_dim23_stacked(&n_max, functor),
            },
            stacked_ceiling: CeilingTriple {
                second: instance.min_dim2_stacked2(&n_max, functor),
                third: instance.min_dim3_stacked2(&n_max, functor),
                either: instance.min_dim23_stacked2(&n_max, functor),
            },
            n_max,
            functor,
        }
    }
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn validation_error(details: impl Into<String>) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid input data",
        details,
    )
}

fn benchmark_error(details: impl Into<String>) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid benchmark configuration",
        details,
    )
}

fn parse_payload<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    match payload {
        Ok(Json(payload)) => Ok(payload),
        Err(err) => Err(json_deserialize_error(err)),
    }
}

fn build_instance(request: InstanceRequest, defaults: &InstanceConfig) -> Result<Instance, Response> {
    match request.into_instance(defaults) {
        Ok(instance) => Ok(instance),
        Err(InstanceRequestError::MissingSource) => Err(validation_error(
            "Either boxes or a benchmark must be specified",
        )),
        Err(InstanceRequestError::AmbiguousSource) => Err(validation_error(
            "Boxes and a benchmark cannot be combined",
        )),
        Err(InstanceRequestError::InvalidBox(err)) => Err(validation_error(err.to_string())),
        Err(InstanceRequestError::InvalidBenchmark(err)) => Err(benchmark_error(err.to_string())),
    }
}

fn validate_sweep_range(range: &SweepRange) -> Result<(), String> {
    validation::validate_side(&range.from, "from")?;
    validation::validate_side(&range.step, "step")?;
    if range.to < range.from {
        return Err(format!(
            "to must not be below from, got: {} < {}",
            range.to, range.from
        ));
    }
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_analyze, handle_bounds, handle_sweep_stream),
    components(
        schemas(
            InstanceRequest,
            AnalyzeRequest,
            BoundsRequest,
            SweepRequest,
            BenchmarkRequest,
            BenchmarkParams,
            Benchmark,
            BoxSpec,
            Orientation,
            SortOrder,
            DimsFunctor,
            SweepRange,
            AnalyzeResponse,
            InstanceProperties,
            Extrema,
            Dims3,
            BoundsResponse,
            BoundTriple,
            CeilingTriple,
            StackedCeiling,
            BoundEvent,
            ErrorResponse
        )
    ),
    tags((name = "bounds", description = "Endpoints for instance analysis and lower bounds"))
)]
struct ApiDoc;

/// Starts the API server on the configured address.
///
/// Configures CORS for cross-origin requests.
/// Blocks until the server is terminated.
pub async fn start_api_server(config: ApiConfig, instance_config: InstanceConfig) {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let state = ApiState { instance_config };

    let app = Router::new()
        .route("/analyze", post(handle_analyze))
        .route("/bounds", post(handle_bounds))
        .route("/sweep_stream", post(handle_sweep_stream))
        // API documentation
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(cors)
        .with_state(state);

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("❌ Could not bind API server to {}: {}", addr, err);
            return;
        }
    };

    println!(
        "🚀 Server running on http://{}:{}",
        config.display_host(),
        config.port()
    );
    if config.binds_to_all_interfaces() && config.uses_default_host() {
        println!("💡 Local access: http://localhost:{}", config.port());
    }
    println!("📦 API Endpoints:");
    println!("   - POST /analyze");
    println!("   - POST /bounds");
    println!("   - POST /sweep_stream");
    println!("📑 Documentation:");
    println!("   - GET /docs");
    println!("   - GET /docs/openapi.json");

    if let Err(err) = axum::serve(listener, app).await {
        eprintln!("❌ API server terminated with an error: {err}");
    }
}

/// Handler for POST /analyze.
///
/// Builds the instance, optionally rescales it to coprime integer sides, and
/// returns its inferred properties.
#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Inferred instance properties", body = AnalyzeResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid boxes or benchmark configuration",
            body = ErrorResponse
        )
    ),
    tag = "bounds"
)]
async fn handle_analyze(
    State(state): State<ApiState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match parse_payload(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let mut instance = match build_instance(request.instance, &state.instance_config) {
        Ok(instance) => instance,
        Err(response) => return response,
    };

    println!("📥 New analyze request: {} boxes", instance.len());
    if request.normalize {
        let multiplier = instance.scale_discrete();
        let divisor = instance.scale_divisor();
        println!(
            "📐 Normalized sides: multiplied by {}, divided by {}",
            multiplier, divisor
        );
    }

    let properties = instance.infer_properties().clone();
    println!(
        "📦 Result: unique = {}, all squares = {}, diagonal symmetry = {}",
        properties.unique, properties.all_squares, properties.diagonal_symmetry
    );

    let response = AnalyzeResponse {
        instance: instance.to_string(),
        box_count: instance.len(),
        unoriented: instance.unoriented(),
        benchmark: instance.benchmark(),
        scale: instance.scale().clone(),
        properties,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// Handler for POST /bounds.
///
/// Evaluates every bound family for one ceiling and functor.
#[utoipa::path(
    post,
    path = "/bounds",
    request_body = BoundsRequest,
    responses(
        (status = 200, description = "All lower bounds for the ceiling", body = BoundsResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid boxes, benchmark or ceiling",
            body = ErrorResponse
        )
    ),
    tag = "bounds"
)]
async fn handle_bounds(
    State(state): State<ApiState>,
    payload: Result<Json<BoundsRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match parse_payload(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if let Err(details) = validation::validate_side(&request.n_max, "n_max") {
        return validation_error(details);
    }
    let mut instance = match build_instance(request.instance, &state.instance_config) {
        Ok(instance) => instance,
        Err(response) => return response,
    };

    println!(
        "📥 New bounds request: {} boxes, n_max = {}, functor = {:?}",
        instance.len(),
        request.n_max,
        request.functor
    );
    instance.infer_properties();
    let response = BoundsResponse::compute(&instance, request.n_max, request.functor);
    println!(
        "📦 Result: pairs = {}, stacked = {}",
        response.pairs.either, response.stacked.either
    );
    (StatusCode::OK, Json(response)).into_response()
}

/// Handler for POST /sweep_stream (SSE).
///
/// Streams one event per ceiling of the sweep as Server-Sent Events
/// (text/event-stream), followed by a final summary event.
#[utoipa::path(
    post,
    path = "/sweep_stream",
    request_body = SweepRequest,
    responses(
        (
            status = 200,
            description = "Streams stacked bounds per ceiling in real-time",
            content_type = "text/event-stream",
            body = String
        ),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid boxes, benchmark or sweep range",
            body = ErrorResponse
        )
    ),
    tag = "bounds"
)]
async fn handle_sweep_stream(
    State(state): State<ApiState>,
    payload: Result<Json<SweepRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match parse_payload(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if let Err(details) = validate_sweep_range(&request.range) {
        return validation_error(details);
    }
    let mut instance = match build_instance(request.instance, &state.instance_config) {
        Ok(instance) => instance,
        Err(response) => return response,
    };

    let SweepRequest { range, functor, .. } = request;
    let max_samples = state.instance_config.sweep_max_samples();
    println!(
        "📥 New sweep request: {} boxes, n_max from {} to {} by {}",
        instance.len(),
        range.from,
        range.to,
        range.step
    );

    let (tx, rx) = mpsc::channel::<String>(32);

    tokio::task::spawn_blocking(move || {
        instance.infer_properties();
        let samples = instance.sweep_stacked_bounds(&range, functor, max_samples, |evt| {
            if let Ok(json) = serde_json::to_string(evt) {
                // A closed receiver only discards the remaining events.
                let _ = tx.blocking_send(json);
            }
        });
        println!("📦 Sweep finished after {} samples", samples);
    });

    let stream = ReceiverStream::new(rx)
        .map(|msg| Ok::<_, std::convert::Infallible>(Event::default().data(msg)));
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(std::time::Duration::from_secs(10))
                .text("keep-alive"),
        )
        .into_response()
}

async fn serve_openapi_json(State(_state): State<ApiState>) -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui(State(_state): State<ApiState>) -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}
