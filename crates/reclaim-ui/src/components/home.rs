//! Console landing view behind both guards.

use reclaim_gate::Verdict;
use yew::prelude::*;
use yew_router::prelude::use_navigator;
use yewdux::prelude::use_selector;

use crate::app::{GateCtx, Route};
use crate::store::GateStore;

#[function_component(HomePage)]
pub(crate) fn home_page() -> Html {
    let ctx = use_context::<GateCtx>();
    let navigator = use_navigator();
    let verdict = use_selector(|store: &GateStore| store.verdict);
    let operator = ctx
        .as_ref()
        .is_some_and(|ctx| ctx.gate.credentials().is_operator());

    let on_sign_out = Callback::from(move |_: MouseEvent| {
        let Some(ctx) = ctx.clone() else {
            return;
        };
        let navigator = navigator.clone();
        yew::platform::spawn_local(async move {
            ctx.gate.sign_out().await;
            // The provider may be down and never push signed-out.
            if let Some(navigator) = navigator {
                navigator.push(&Route::Login);
            }
        });
    });

    let status = match *verdict {
        Verdict::Pending | Verdict::Authenticated => "Signed in",
        Verdict::Unauthenticated => "Session ended",
    };

    html! {
        <section class="home-page">
            <header class="row">
                <h1>{"Reclaim console"}</h1>
                <span class="badge">{status}</span>
                {if operator { html! { <span class="badge">{"Operator"}</span> } } else { html! {} }}
                <button class="ghost" onclick={on_sign_out}>{"Sign out"}</button>
            </header>
        </section>
    }
}
