//! Application shell: context, routing, and boot.
//!
//! # Design
//! - Exactly one `AccessGate` per boot, shared through context.
//! - The root component mirrors pushed auth events into the yewdux store and
//!   drops its subscription on unmount.
//! - Boundary routes are compiled into the router; a configuration naming
//!   other paths is brought back in line at boot.

use std::rc::Rc;

use reclaim_gate::{AccessGate, GateConfig, KeyValueStore, Subscription};
use reclaim_telemetry::{LogFormat, LoggingConfig, init_logging_with_writer};
use tracing::{info, warn};
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::Dispatch;

use crate::components::guard::{MaintenanceRouteGuard, ProtectedRoute};
use crate::components::home::HomePage;
use crate::components::login::LoginPage;
use crate::components::maintenance::MaintenancePage;
use crate::config::AppConfig;
use crate::services::browser::{BrowserClock, BrowserStorage};
use crate::services::identity::HttpIdentityClient;
use crate::store::{GateStore, apply_auth_event};
use logging::ConsoleWriter;
pub(crate) use routes::Route;

mod logging;
mod routes;

/// Shared gate handle for components.
#[derive(Clone)]
pub(crate) struct GateCtx {
    /// The application's single access gate.
    pub(crate) gate: Rc<AccessGate>,
}

impl PartialEq for GateCtx {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.gate, &other.gate)
    }
}

#[derive(Properties, PartialEq)]
struct AppProps {
    ctx: GateCtx,
}

#[function_component(ReclaimApp)]
fn reclaim_app(props: &AppProps) -> Html {
    let subscription = use_mut_ref(|| None as Option<Subscription>);

    {
        let gate = Rc::clone(&props.ctx.gate);
        use_effect_with_deps(
            move |_| {
                let dispatch = Dispatch::<GateStore>::new();
                *subscription.borrow_mut() = Some(gate.subscribe(move |event| {
                    dispatch.reduce_mut(|store| apply_auth_event(store, event));
                }));
                move || {
                    subscription.borrow_mut().take();
                }
            },
            (),
        );
    }

    html! {
        <ContextProvider<GateCtx> context={props.ctx.clone()}>
            <BrowserRouter>
                <main class="reclaim-shell">
                    <Switch<Route> render={switch} />
                </main>
            </BrowserRouter>
        </ContextProvider<GateCtx>>
    }
}

fn switch(route: Route) -> Html {
    match route {
        Route::Home => html! {
            <MaintenanceRouteGuard>
                <ProtectedRoute>
                    <HomePage />
                </ProtectedRoute>
            </MaintenanceRouteGuard>
        },
        Route::Login => html! { <LoginPage /> },
        Route::Maintenance => html! { <MaintenancePage /> },
        Route::NotFound => html! {
            <section class="not-found">
                <h1>{"Page not found"}</h1>
                <Link<Route> to={Route::Home}>{"Back to the console"}</Link<Route>>
            </section>
        },
    }
}

fn align_boundaries(mut config: GateConfig) -> GateConfig {
    let login = Route::Login.to_path();
    let maintenance = Route::Maintenance.to_path();
    if config.login_path != login || config.maintenance_path != maintenance {
        warn!(
            login_path = %config.login_path,
            maintenance_path = %config.maintenance_path,
            "boundary paths differ from the router; using the router paths"
        );
        config.login_path = login;
        config.maintenance_path = maintenance;
    }
    config
}

/// Boot the console into `document.body`.
pub fn run_app() {
    console_error_panic_hook::set_once();

    let config = AppConfig::load();
    let logging = LoggingConfig {
        format: LogFormat::from_name(&config.log_format),
        ..LoggingConfig::browser(&config.log_level)
    };
    if let Err(err) = init_logging_with_writer(&logging, ConsoleWriter::default) {
        gloo::console::error!(format!("{err:#}"));
    }

    let gate_config = config.gate_config().unwrap_or_else(|err| {
        warn!(error = %err, "invalid gate configuration; using defaults");
        GateConfig::default()
    });
    let gate_config = align_boundaries(gate_config);

    let storage: Rc<dyn KeyValueStore> = Rc::new(BrowserStorage);
    let identity = Rc::new(HttpIdentityClient::new(
        config.api_base_url.clone(),
        gate_config.keys.clone(),
        Rc::clone(&storage),
    ));
    let gate = AccessGate::new(storage, identity, Rc::new(BrowserClock), gate_config);
    info!(bypass = ?gate.config().maintenance_bypass, "access gate ready");

    yew::Renderer::<ReclaimApp>::with_props(AppProps {
        ctx: GateCtx {
            gate: Rc::new(gate),
        },
    })
    .render();
}
