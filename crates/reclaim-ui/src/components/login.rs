//! Login boundary page.
//!
//! # Design
//! - Form input is local state; progress and errors live in the store.
//! - Provider rejections are shown verbatim; anything else gets a generic
//!   message and a log line.

use reclaim_gate::{GateError, IdentityError, SignInRequest};
use tracing::warn;
use yew::prelude::*;
use yew_router::prelude::use_navigator;
use yewdux::prelude::{Dispatch, use_selector};

use crate::app::{GateCtx, Route};
use crate::store::{GateStore, begin_sign_in, finish_sign_in};

fn describe_failure(err: &GateError) -> String {
    match err {
        GateError::SignIn {
            source: IdentityError::Rejected { message },
        } => message.clone(),
        GateError::SignIn { .. } => {
            "The sign-in service is unreachable. Try again shortly.".to_string()
        }
        _ => "Signed in, but this browser could not store the session.".to_string(),
    }
}

#[function_component(LoginPage)]
pub(crate) fn login_page() -> Html {
    let ctx = use_context::<GateCtx>();
    let navigator = use_navigator();
    let dispatch = Dispatch::<GateStore>::new();
    let busy = use_selector(|store: &GateStore| store.login.busy);
    let error = use_selector(|store: &GateStore| store.login.error.clone());
    let email = use_state(String::new);
    let password = use_state(String::new);
    let remember = use_state(|| false);

    let on_email = {
        let email = email.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<web_sys::HtmlInputElement>() {
                email.set(input.value());
            }
        })
    };
    let on_password = {
        let password = password.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<web_sys::HtmlInputElement>() {
                password.set(input.value());
            }
        })
    };
    let on_remember = {
        let remember = remember.clone();
        Callback::from(move |e: Event| {
            if let Some(input) = e.target_dyn_into::<web_sys::HtmlInputElement>() {
                remember.set(input.checked());
            }
        })
    };

    let on_submit = {
        let email = email.clone();
        let password = password.clone();
        let remember = remember.clone();
        let busy = *busy;
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let Some(ctx) = ctx.clone() else {
                warn!("login page mounted without an access gate");
                return;
            };
            if busy || email.trim().is_empty() || password.is_empty() {
                return;
            }
            let request = SignInRequest {
                email: (*email).clone(),
                password: (*password).clone(),
                remember: *remember,
            };
            let dispatch = dispatch.clone();
            let navigator = navigator.clone();
            dispatch.reduce_mut(begin_sign_in);
            yew::platform::spawn_local(async move {
                match ctx.gate.sign_in(&request).await {
                    Ok(()) => {
                        dispatch.reduce_mut(|store| finish_sign_in(store, None));
                        if let Some(navigator) = navigator {
                            navigator.push(&Route::Home);
                        }
                    }
                    Err(err) => {
                        if !matches!(
                            err,
                            GateError::SignIn {
                                source: IdentityError::Rejected { .. }
                            }
                        ) {
                            warn!(error = %err, "sign-in failed");
                        }
                        let message = describe_failure(&err);
                        dispatch.reduce_mut(|store| finish_sign_in(store, Some(message)));
                    }
                }
            });
        })
    };

    html! {
        <section class="login-page">
            <form class="card stack" onsubmit={on_submit}>
                <h1>{"Sign in to Reclaim"}</h1>
                <label class="stack">
                    <span>{"Email"}</span>
                    <input type="email" autocomplete="username" value={(*email).clone()} oninput={on_email} />
                </label>
                <label class="stack">
                    <span>{"Password"}</span>
                    <input type="password" autocomplete="current-password" value={(*password).clone()} oninput={on_password} />
                </label>
                <label class="inline">
                    <input type="checkbox" checked={*remember} onchange={on_remember} />
                    <span>{"Keep me signed in for 30 days"}</span>
                </label>
                {if let Some(message) = &*error {
                    html! { <p class="error-text" role="alert">{message.clone()}</p> }
                } else { html! {} }}
                <button class="solid" type="submit" disabled={*busy}>
                    {if *busy { "Signing in…" } else { "Sign in" }}
                </button>
            </form>
        </section>
    }
}
