//! Maintenance boundary page.

use tracing::warn;
use yew::prelude::*;
use yew_router::prelude::Link;

use crate::app::{GateCtx, Route};
use crate::store::MaintenanceNotice;

#[function_component(MaintenancePage)]
pub(crate) fn maintenance_page() -> Html {
    let ctx = use_context::<GateCtx>();
    let notice = use_memo(
        move |_| {
            ctx.and_then(|ctx| match ctx.gate.maintenance_state() {
                Ok(state) => Some(MaintenanceNotice::from(&state)),
                Err(err) => {
                    warn!(error = %err, "maintenance settings unreadable");
                    None
                }
            })
            .unwrap_or_default()
        },
        (),
    );

    html! {
        <section class="maintenance-page">
            <h1>{"Reclaim is under maintenance"}</h1>
            <p>
                {notice.message.clone().unwrap_or_else(|| {
                    "We are making improvements and will be back shortly.".to_string()
                })}
            </p>
            {if let Some(end) = &notice.end_date {
                html! { <p class="muted">{format!("Expected back: {end}")}</p> }
            } else { html! {} }}
            <Link<Route> to={Route::Login}>{"Operator sign-in"}</Link<Route>>
        </section>
    }
}
