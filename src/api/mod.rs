/*
 * HTTP surface of the application shell
 */

use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{get, post, routes, State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::error;

use crate::config::Config;
use crate::models::{BaseSwapError, SwapDirection, TxView};
use crate::service::{SwapApp, Tab};
use crate::session::{SessionContext, SessionView};
use crate::views::{LiquidityView, PoolTab, PoolView, SwapView};

pub struct ApiState {
    pub config: Config,
    pub app: Arc<RwLock<SwapApp>>,
    /// Session updates, readable while a block refresh holds the app lock.
    pub session: watch::Receiver<SessionContext>,
}

impl ApiState {
    #[must_use]
    pub fn new(config: Config, app: SwapApp) -> Self {
        let session = app.session().subscribe();
        Self {
            config,
            app: Arc::new(RwLock::new(app)),
            session,
        }
    }
}

type ApiResult<T> = std::result::Result<Json<T>, Custom<String>>;

fn to_response(e: BaseSwapError) -> Custom<String> {
    let status = match e {
        BaseSwapError::InvalidAmount(_) | BaseSwapError::ConfigError(_) => Status::BadRequest,
        BaseSwapError::NoWalletSession => Status::Unauthorized,
        BaseSwapError::UserRejected => Status::Forbidden,
        BaseSwapError::ContractError(_) | BaseSwapError::WrongNetwork { .. } => Status::Conflict,
        BaseSwapError::TransportFailure(_) => Status::BadGateway,
        BaseSwapError::SerializationError(_) => Status::InternalServerError,
    };
    if status.code >= 500 {
        error!("Request failed: {}", e);
    }
    Custom(status, e.to_string())
}

#[derive(Debug, Serialize)]
pub struct TabView {
    pub active: Tab,
    pub block: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SwapRequest {
    pub direction: SwapDirection,
    pub amount: String,
    pub slippage: Option<String>,
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Deserialize)]
pub struct LiquidityRequest {
    pub usdc_amount: String,
    pub eth_amount: String,
}

#[get("/health")]
pub async fn health_check() -> &'static str {
    "OK"
}

#[get("/api/v1/session")]
pub async fn get_session(state: &State<ApiState>) -> Json<SessionView> {
    let view = state.session.borrow().view();
    Json(view)
}

#[post("/api/v1/session/connect")]
pub async fn connect(state: &State<ApiState>) -> ApiResult<SessionView> {
    let mut app = state.app.write().await;
    let ctx = app.connect().await.map_err(to_response)?;
    Ok(Json(ctx.view()))
}

#[post("/api/v1/session/disconnect")]
pub async fn disconnect(state: &State<ApiState>) -> Json<SessionView> {
    let mut app = state.app.write().await;
    app.disconnect();
    Json(app.context().view())
}

#[get("/api/v1/tab")]
pub async fn get_tab(state: &State<ApiState>) -> Json<TabView> {
    let app = state.app.read().await;
    Json(TabView {
        active: app.active_tab(),
        block: app.block(),
    })
}

#[post("/api/v1/tab/<tab>")]
pub async fn select_tab(tab: &str, state: &State<ApiState>) -> ApiResult<TabView> {
    let tab: Tab = tab.parse().map_err(to_response)?;
    let mut app = state.app.write().await;
    app.select_tab(tab).await;
    Ok(Json(TabView {
        active: app.active_tab(),
        block: app.block(),
    }))
}

#[get("/api/v1/swap?<direction>&<amount>&<slippage>")]
pub async fn get_swap(
    direction: Option<&str>,
    amount: Option<&str>,
    slippage: Option<&str>,
    state: &State<ApiState>,
) -> ApiResult<SwapView> {
    let mut app = state.app.write().await;
    let mut input_changed = false;
    if let Some(direction) = direction {
        let direction: SwapDirection = direction.parse().map_err(to_response)?;
        input_changed |= app.swap().direction() != direction;
        app.swap_mut().set_direction(direction);
    }
    if let Some(amount) = amount {
        let before = app.swap().from_amount().to_string();
        if amount.eq_ignore_ascii_case("max") {
            let network = app.context().network;
            app.swap_mut().set_max(&network);
        } else {
            app.swap_mut().set_from_amount(amount);
        }
        input_changed |= app.swap().from_amount() != before;
    }
    if let Some(slippage) = slippage {
        app.swap_mut().set_slippage(slippage).map_err(to_response)?;
    }
    if input_changed {
        app.requote().await;
    }
    let ctx = app.context();
    Ok(Json(app.swap().render(&ctx)))
}

#[post("/api/v1/swap", data = "<request>")]
pub async fn post_swap(request: Json<SwapRequest>, state: &State<ApiState>) -> ApiResult<TxView> {
    let request = request.into_inner();
    let pending = {
        let mut app = state.app.write().await;
        app.swap_mut().set_direction(request.direction);
        app.swap_mut().set_from_amount(&request.amount);
        if let Some(slippage) = request.slippage.as_deref() {
            app.swap_mut().set_slippage(slippage).map_err(to_response)?;
        }
        app.requote().await;

        let ctx = app.context();
        let adapter = app.adapter().clone();
        let view = app
            .swap_mut()
            .swap(&ctx, &adapter)
            .await
            .map_err(to_response)?;
        if !request.wait {
            return Ok(Json(view));
        }
        app.swap().last_transaction().cloned()
    };

    // wait without holding the app lock so block refreshes keep running
    match pending {
        Some(mut handle) => {
            handle
                .wait(state.config.trading.confirmation_poll_interval())
                .await;
            Ok(Json(handle.view()))
        }
        None => Err(to_response(BaseSwapError::ContractError(
            "swap was not recorded".to_string(),
        ))),
    }
}

#[get("/api/v1/pool?<tab>")]
pub async fn get_pool(tab: Option<&str>, state: &State<ApiState>) -> ApiResult<PoolView> {
    let mut app = state.app.write().await;
    if let Some(tab) = tab {
        let tab: PoolTab = tab.parse().map_err(to_response)?;
        app.pool_mut().select_tab(tab);
    }
    let ctx = app.context();
    Ok(Json(app.pool().render(&ctx)))
}

#[post("/api/v1/liquidity", data = "<request>")]
pub async fn post_liquidity(
    request: Json<LiquidityRequest>,
    state: &State<ApiState>,
) -> ApiResult<LiquidityView> {
    let request = request.into_inner();
    let mut app = state.app.write().await;
    let ctx = app.context();
    let adapter = app.adapter().clone();

    let panel = app.pool_mut().liquidity_mut();
    panel.reset();
    if request.usdc_amount.eq_ignore_ascii_case("max") {
        panel.set_max_usdc(&ctx.network);
    } else {
        panel.set_usdc_amount(&request.usdc_amount);
    }
    if request.eth_amount.eq_ignore_ascii_case("max") {
        panel.set_max_eth(&ctx.network);
    } else {
        panel.set_eth_amount(&request.eth_amount);
    }
    panel.submit(&ctx, &adapter).await.map_err(to_response)?;
    Ok(Json(panel.render(&ctx)))
}

/// Builds the server. `SERVER_HOST` is passed through unchanged, so a bad
/// value fails at ignition instead of falling back to another address.
#[must_use]
pub fn create_rocket(state: ApiState) -> rocket::Rocket<rocket::Build> {
    let figment = rocket::Config::figment()
        .merge(("address", state.config.server.host.trim().to_string()))
        .merge(("port", state.config.server.port));

    rocket::custom(figment).manage(state).mount(
        "/",
        routes![
            health_check,
            get_session,
            connect,
            disconnect,
            get_tab,
            select_tab,
            get_swap,
            post_swap,
            get_pool,
            post_liquidity
        ],
    )
}
