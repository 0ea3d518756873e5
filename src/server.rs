//! Web server for the QuakeAware dashboard.
//!
//! Provides the dashboard UI and its JSON API using:
//! - Axum for the HTTP server
//! - SSE (Server-Sent Events) for toast notifications
//! - Leaflet (client-side) for the interactive map
//!
//! The server owns the glue between the data sources and the dashboard
//! controller: the initial parallel load, the recurring poll task, and the
//! notification broadcast channel.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;
use tokio::sync::{broadcast, RwLock};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::client::UsgsClient;
use crate::dashboard::{Dashboard, Notification};
use crate::models::MapLayer;
use crate::scene;
use crate::sources::{DataSources, RecentQuery};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub query: RecentQuery,
    pub poll_interval: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            query: RecentQuery::default(),
            poll_interval: 60,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The dashboard controller
    dashboard: Arc<RwLock<Dashboard>>,
    /// Data access layer
    sources: Arc<DataSources>,
    /// Channel broadcasting JSON-encoded notifications to SSE clients
    tx: broadcast::Sender<String>,
    /// Server configuration
    config: ServerConfig,
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/stream", get(sse_handler))
        .route("/api/state", get(state_handler))
        .route("/api/earthquakes", get(earthquakes_handler))
        .route("/api/predictions", get(predictions_handler))
        .route("/api/historical", get(historical_handler))
        .route("/api/risk-zones", get(risk_zones_handler))
        .route("/api/scene", get(scene_handler))
        .route("/api/layers/{layer}", post(toggle_layer_handler))
        .route(
            "/api/select/earthquake/{id}",
            post(select_earthquake_handler),
        )
        .route("/api/select/earthquake", delete(clear_earthquake_handler))
        .route(
            "/api/select/prediction/{index}",
            post(select_prediction_handler),
        )
        .route("/api/select/prediction", delete(clear_prediction_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Start the web server.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let client = UsgsClient::new()?;
    let (tx, _rx) = broadcast::channel::<String>(100);

    let state = AppState {
        dashboard: Arc::new(RwLock::new(Dashboard::new())),
        sources: Arc::new(DataSources::new(client)),
        tx,
        config: config.clone(),
    };

    // Initial parallel load
    let load_state = state.clone();
    let load_handle = tokio::spawn(async move {
        initial_load(load_state).await;
    });

    // Recurring recent-earthquake poll
    let poll_state = state.clone();
    let poll_handle = tokio::spawn(async move {
        poll_earthquakes(poll_state).await;
    });

    let app = create_router(state.clone());

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("QuakeAware dashboard starting at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Teardown: stop the background tasks; any in-flight fetch result is
    // ignored by the controller after shutdown
    load_handle.abort();
    poll_handle.abort();
    state.dashboard.write().await.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down");
}

/// Issue the four initial fetches concurrently and commit them together.
async fn initial_load(state: AppState) {
    state.dashboard.write().await.begin_load();

    let snapshot = state.sources.snapshot(state.config.query).await;

    let note = state
        .dashboard
        .write()
        .await
        .commit_initial_load(snapshot);
    broadcast_notification(&state.tx, &note);
}

/// Background task that re-polls the recent-earthquake feed.
///
/// Other collections are not re-polled in current scope. Ticks that would
/// overlap an in-flight refresh, or land before the initial load finishes,
/// are skipped by the controller's gate.
async fn poll_earthquakes(state: AppState) {
    let period = Duration::from_secs(state.config.poll_interval);
    let mut interval = tokio::time::interval(period);
    // The first tick fires immediately; the initial load covers that
    interval.tick().await;

    loop {
        interval.tick().await;

        if !state.dashboard.write().await.begin_refresh() {
            tracing::debug!("skipping poll tick: dashboard not ready for refresh");
            continue;
        }

        // Fail-soft fetch: resolves to empty on error, which the diff
        // treats as no growth, so transient blips never reach the user
        let fetched = state.sources.recent_earthquakes(state.config.query).await;

        let note = state.dashboard.write().await.apply_poll_result(fetched);
        if let Some(note) = note {
            tracing::info!("{}", note.description);
            broadcast_notification(&state.tx, &note);
        }
    }
}

fn broadcast_notification(tx: &broadcast::Sender<String>, note: &Notification) {
    match serde_json::to_string(note) {
        // Send only fails when no client is subscribed
        Ok(payload) => {
            let _ = tx.send(payload);
        }
        Err(e) => tracing::warn!("failed to encode notification: {e}"),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Main page handler - serves the HTML UI.
async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// SSE stream handler for toast notifications.
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let rx = state.tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(payload) => Some(Ok(Event::default().event("notification").data(payload))),
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Dashboard status, counts, layer visibility, selections and banner.
async fn state_handler(State(state): State<AppState>) -> impl IntoResponse {
    let dash = state.dashboard.read().await;
    Json(json!({
        "status": dash.status(),
        "counts": {
            "earthquakes": dash.recent_earthquakes().len(),
            "predictions": dash.predictions().len(),
            "historical": dash.historical_earthquakes().len(),
            "riskZones": dash.risk_zones().len(),
        },
        "visibleLayers": dash.visible_layers(),
        "activeEarthquake": dash.active_earthquake(),
        "activePrediction": dash.active_prediction(),
        "highRiskAlert": dash.high_risk_alert(),
    }))
}

async fn earthquakes_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.read().await.recent_earthquakes().to_vec())
}

async fn predictions_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.read().await.predictions().to_vec())
}

async fn historical_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.read().await.historical_earthquakes().to_vec())
}

async fn risk_zones_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.read().await.risk_zones().to_vec())
}

/// Composed map scene for the client-side renderer.
async fn scene_handler(State(state): State<AppState>) -> impl IntoResponse {
    let dash = state.dashboard.read().await;
    Json(scene::compose_scene(&dash))
}

/// Toggle a layer; returns the new visible set.
async fn toggle_layer_handler(
    State(state): State<AppState>,
    Path(layer): Path<String>,
) -> Result<Json<Vec<MapLayer>>, (StatusCode, String)> {
    let layer: MapLayer = layer
        .parse()
        .map_err(|e: String| (StatusCode::BAD_REQUEST, e))?;

    let mut dash = state.dashboard.write().await;
    dash.toggle_layer(layer);
    Ok(Json(dash.visible_layers().to_vec()))
}

async fn select_earthquake_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> StatusCode {
    state.dashboard.write().await.select_earthquake(Some(id));
    StatusCode::NO_CONTENT
}

async fn clear_earthquake_handler(State(state): State<AppState>) -> StatusCode {
    state.dashboard.write().await.select_earthquake(None);
    StatusCode::NO_CONTENT
}

async fn select_prediction_handler(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> StatusCode {
    state.dashboard.write().await.select_prediction(Some(index));
    StatusCode::NO_CONTENT
}

async fn clear_prediction_handler(State(state): State<AppState>) -> StatusCode {
    state.dashboard.write().await.select_prediction(None);
    StatusCode::NO_CONTENT
}

/// Health check endpoint.
async fn health_handler() -> &'static str {
    "OK"
}

// ============================================================================
// HTML Template (embedded for single-binary deployment)
// ============================================================================

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>QuakeAware — Predictive Risk Dashboard</title>

    <!-- Leaflet -->
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>

    <style>
        :root {
            --bg: #09090b;
            --bg-panel: #18181b;
            --bg-hover: #27272a;
            --text: #fafafa;
            --text-dim: #a1a1aa;
            --border: #27272a;
            --accent: #818cf8;
            --warning: #f59e0b;
            --danger: #ef4444;
            --radius: 10px;
        }

        * { margin: 0; padding: 0; box-sizing: border-box; }

        body {
            font-family: 'Inter', -apple-system, sans-serif;
            background: var(--bg);
            color: var(--text);
            min-height: 100vh;
            display: flex;
            flex-direction: column;
        }

        .banner {
            display: none;
            align-items: center;
            justify-content: space-between;
            gap: 1rem;
            padding: 0.625rem 1.25rem;
            background: rgba(245, 158, 11, 0.15);
            border-bottom: 1px solid var(--warning);
            color: var(--warning);
            font-size: 0.875rem;
        }

        .banner.visible { display: flex; }

        .banner button {
            background: none;
            border: none;
            color: var(--warning);
            cursor: pointer;
            font-size: 1rem;
        }

        .header {
            display: flex;
            justify-content: space-between;
            align-items: center;
            padding: 0.875rem 1.25rem;
            border-bottom: 1px solid var(--border);
        }

        .header h1 { font-size: 1.125rem; font-weight: 600; }
        .header .status { font-size: 0.8125rem; color: var(--text-dim); }

        .grid {
            flex: 1;
            display: grid;
            grid-template-columns: 280px 1fr 300px;
            gap: 1rem;
            padding: 1rem 1.25rem;
            min-height: 0;
        }

        .panel {
            background: var(--bg-panel);
            border: 1px solid var(--border);
            border-radius: var(--radius);
            overflow-y: auto;
            padding: 0.75rem;
        }

        .panel h2 {
            font-size: 0.8125rem;
            text-transform: uppercase;
            letter-spacing: 0.05em;
            color: var(--text-dim);
            margin-bottom: 0.625rem;
        }

        .item {
            padding: 0.5rem;
            border-radius: 6px;
            cursor: pointer;
            font-size: 0.8125rem;
            border: 1px solid transparent;
        }

        .item:hover { background: var(--bg-hover); }
        .item.active { border-color: var(--accent); }
        .item .meta { color: var(--text-dim); font-size: 0.75rem; }
        .item .mag { font-weight: 700; margin-right: 0.375rem; }

        .map-column { display: flex; flex-direction: column; gap: 0.75rem; min-height: 0; }
        #map { flex: 1; border-radius: var(--radius); border: 1px solid var(--border); }

        .controls { display: flex; gap: 0.5rem; }

        .controls button {
            padding: 0.375rem 0.875rem;
            border-radius: 999px;
            border: 1px solid var(--border);
            background: var(--bg-panel);
            color: var(--text-dim);
            font-size: 0.8125rem;
            cursor: pointer;
        }

        .controls button.on { border-color: var(--accent); color: var(--accent); }

        .toast-stack {
            position: fixed;
            bottom: 1rem;
            right: 1rem;
            display: flex;
            flex-direction: column;
            gap: 0.5rem;
            z-index: 2000;
        }

        .toast {
            background: var(--bg-panel);
            border: 1px solid var(--border);
            border-left: 3px solid var(--accent);
            border-radius: var(--radius);
            padding: 0.75rem 1rem;
            min-width: 260px;
            font-size: 0.8125rem;
            animation: slide 0.3s ease-out;
        }

        .toast.destructive { border-left-color: var(--danger); }
        .toast .title { font-weight: 600; margin-bottom: 0.125rem; }
        .toast .desc { color: var(--text-dim); }

        @keyframes slide {
            from { opacity: 0; transform: translateX(16px); }
            to { opacity: 1; transform: translateX(0); }
        }

        .loading {
            display: flex;
            align-items: center;
            justify-content: center;
            height: 100%;
            color: var(--text-dim);
            font-size: 0.875rem;
        }
    </style>
</head>
<body>
    <div id="banner" class="banner">
        <span id="banner-text"></span>
        <button onclick="dismissBanner()" title="Dismiss">✕</button>
    </div>

    <header class="header">
        <h1>QuakeAware</h1>
        <span id="status" class="status">loading…</span>
    </header>

    <div class="grid">
        <div class="panel">
            <h2>Recent Earthquakes</h2>
            <div id="recent-list"><div class="loading">Loading…</div></div>
            <h2 style="margin-top:1rem">Historical</h2>
            <div id="historical-list"></div>
        </div>

        <div class="map-column">
            <div id="map"></div>
            <div class="controls">
                <button id="layer-riskZones" class="on" onclick="toggleLayer('riskZones')">Risk Zones</button>
                <button id="layer-predictions" class="on" onclick="toggleLayer('predictions')">Predictions</button>
            </div>
        </div>

        <div class="panel">
            <h2>Predictions</h2>
            <div id="prediction-list"></div>
        </div>
    </div>

    <div id="toasts" class="toast-stack"></div>

    <script>
        let map = null;
        let markerGroups = [];
        let bannerDismissed = false;

        function renderScene(scene) {
            if (!map) {
                map = L.map('map').setView([scene.view.latitude, scene.view.longitude], scene.view.zoom);
                L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
                    attribution: '&copy; OpenStreetMap contributors'
                }).addTo(map);
            } else {
                map.setView([scene.view.latitude, scene.view.longitude], scene.view.zoom);
            }

            markerGroups.forEach(g => g.remove());
            markerGroups = scene.layers.map(layer => {
                const group = L.layerGroup(layer.markers.map(m => {
                    const marker = L.circleMarker([m.latitude, m.longitude], {
                        radius: m.radius,
                        fillColor: m.fillColor,
                        color: m.selected ? '#ffffff' : m.strokeColor,
                        fillOpacity: m.fillOpacity,
                        weight: m.selected ? m.weight + 2 : m.weight,
                        dashArray: m.dashArray || null
                    });
                    let html = '<b>' + m.popup.title + '</b>';
                    m.popup.lines.forEach(l => { html += '<br>' + l; });
                    if (m.popup.url) html += '<br><a href="' + m.popup.url + '" target="_blank" rel="noreferrer">More details</a>';
                    marker.bindPopup(html);
                    return marker;
                }));
                group.addTo(map);
                return group;
            });
        }

        function renderLists(earthquakes, historical, predictions, appState) {
            const recent = document.getElementById('recent-list');
            recent.innerHTML = '';
            earthquakes.forEach(eq => {
                const div = document.createElement('div');
                div.className = 'item' + (appState.activeEarthquake === eq.id ? ' active' : '');
                div.innerHTML = '<span class="mag">M' + eq.magnitude.toFixed(1) + '</span>' +
                    (eq.place || 'Unknown location') +
                    '<div class="meta">' + new Date(eq.time).toLocaleString() + '</div>';
                div.onclick = () => select('earthquake/' + eq.id);
                recent.appendChild(div);
            });

            const hist = document.getElementById('historical-list');
            hist.innerHTML = '';
            historical.forEach(h => {
                const div = document.createElement('div');
                div.className = 'item';
                div.innerHTML = '<span class="mag">M' + h.magnitude.toFixed(1) + '</span>' + h.location +
                    '<div class="meta">' + h.year + ' · ' + h.impact + '</div>';
                hist.appendChild(div);
            });

            const preds = document.getElementById('prediction-list');
            preds.innerHTML = '';
            predictions.forEach((p, idx) => {
                const div = document.createElement('div');
                div.className = 'item' + (appState.activePrediction === idx ? ' active' : '');
                div.innerHTML = '<b>' + p.location + '</b>, ' + p.region +
                    '<div class="meta">M' + p.magnitude.min + '-' + p.magnitude.max +
                    ' · ' + p.probability + '% in ' + p.timeframe +
                    ' · risk: ' + p.risk + '</div>';
                div.onclick = () => select('prediction/' + idx);
                preds.appendChild(div);
            });
        }

        function renderBanner(appState) {
            const banner = document.getElementById('banner');
            if (appState.highRiskAlert && !bannerDismissed) {
                document.getElementById('banner-text').textContent = appState.highRiskAlert.message;
                banner.classList.add('visible');
            } else {
                banner.classList.remove('visible');
            }
        }

        function dismissBanner() {
            bannerDismissed = true;
            document.getElementById('banner').classList.remove('visible');
        }

        async function refresh() {
            const [appState, scene, earthquakes, historical, predictions] = await Promise.all([
                fetch('/api/state').then(r => r.json()),
                fetch('/api/scene').then(r => r.json()),
                fetch('/api/earthquakes').then(r => r.json()),
                fetch('/api/historical').then(r => r.json()),
                fetch('/api/predictions').then(r => r.json())
            ]);

            document.getElementById('status').textContent =
                appState.status + ' · ' + appState.counts.earthquakes + ' events';
            ['riskZones', 'predictions'].forEach(l => {
                document.getElementById('layer-' + l).classList.toggle('on', appState.visibleLayers.includes(l));
            });
            renderScene(scene);
            renderLists(earthquakes, historical, predictions, appState);
            renderBanner(appState);
        }

        async function toggleLayer(layer) {
            await fetch('/api/layers/' + layer, { method: 'POST' });
            refresh();
        }

        async function select(pathSuffix) {
            await fetch('/api/select/' + pathSuffix, { method: 'POST' });
            refresh();
        }

        function toast(note) {
            const div = document.createElement('div');
            div.className = 'toast' + (note.severity === 'destructive' ? ' destructive' : '');
            div.innerHTML = '<div class="title"></div><div class="desc"></div>';
            div.querySelector('.title').textContent = note.title;
            div.querySelector('.desc').textContent = note.description;
            if (note.action && note.action.kind === 'focusEarthquake') {
                div.style.cursor = 'pointer';
                div.onclick = () => select('earthquake/' + note.action.id);
            }
            document.getElementById('toasts').appendChild(div);
            setTimeout(() => div.remove(), 8000);
        }

        const events = new EventSource('/stream');
        events.addEventListener('notification', e => {
            toast(JSON.parse(e.data));
            // A new-data notification means the banner may apply again
            bannerDismissed = false;
            refresh();
        });

        refresh();
        setInterval(refresh, 30000);
    </script>
</body>
</html>
"##;
