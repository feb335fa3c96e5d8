//! Route guard components.
//!
//! # Design
//! - Each mount owns a `RouteGuard` state machine; evaluation results carry a
//!   ticket and are dropped once the mount is gone or superseded.
//! - The auth subscription lives exactly as long as the mount.
//! - Without a gate in context the guard denies.

use std::cell::RefCell;
use std::rc::Rc;

use reclaim_gate::{GuardDecision, GuardKind, GuardReaction, RouteGuard, Ticket};
use tracing::warn;
use yew::prelude::*;
use yew_router::prelude::Redirect;

use crate::app::{GateCtx, Route};

#[derive(Properties, PartialEq)]
pub(crate) struct GuardProps {
    #[prop_or_default]
    pub(crate) children: Children,
}

/// Renders its children only for an authenticated visitor.
#[function_component(ProtectedRoute)]
pub(crate) fn protected_route(props: &GuardProps) -> Html {
    let ctx = use_context::<GateCtx>();
    guarded(ctx, GuardKind::Protected, &props.children)
}

/// Renders its children unless maintenance mode is on and not bypassed.
#[function_component(MaintenanceRouteGuard)]
pub(crate) fn maintenance_route_guard(props: &GuardProps) -> Html {
    let ctx = use_context::<GateCtx>();
    guarded(ctx, GuardKind::Maintenance, &props.children)
}

fn guarded(ctx: Option<GateCtx>, kind: GuardKind, children: &Children) -> Html {
    match ctx {
        Some(ctx) => html! {
            <GuardedView ctx={ctx} kind={kind}>
                { for children.iter() }
            </GuardedView>
        },
        None => {
            warn!(guard = kind.as_str(), "route guard mounted without an access gate");
            html! { <Redirect<Route> to={Route::from(kind.boundary())} /> }
        }
    }
}

#[derive(Properties, PartialEq)]
struct GuardedViewProps {
    ctx: GateCtx,
    kind: GuardKind,
    #[prop_or_default]
    children: Children,
}

#[function_component(GuardedView)]
fn guarded_view(props: &GuardedViewProps) -> Html {
    let guard = {
        let kind = props.kind;
        use_mut_ref(move || RouteGuard::new(kind))
    };
    let decision = use_state_eq(|| GuardDecision::Loading);

    {
        let gate = Rc::clone(&props.ctx.gate);
        let guard = guard.clone();
        let decision = decision.clone();
        use_effect_with_deps(
            move |_| {
                let run = {
                    let gate = Rc::clone(&gate);
                    let guard = guard.clone();
                    let decision = decision.clone();
                    move |ticket: Ticket| {
                        let gate = Rc::clone(&gate);
                        let guard: Rc<RefCell<RouteGuard>> = guard.clone();
                        let decision = decision.clone();
                        yew::platform::spawn_local(async move {
                            if let Some(next) = gate.run_guard(&guard, ticket).await {
                                decision.set(next);
                            }
                        });
                    }
                };

                let subscription = {
                    let guard = guard.clone();
                    let decision = decision.clone();
                    let run = run.clone();
                    gate.subscribe(move |event| {
                        let reaction = guard.borrow_mut().on_event(event);
                        match reaction {
                            GuardReaction::Ignore => {}
                            GuardReaction::Transition(next) => decision.set(next),
                            GuardReaction::Reevaluate(ticket) => {
                                decision.set(GuardDecision::Loading);
                                run(ticket);
                            }
                        }
                    })
                };

                let ticket = guard.borrow_mut().mount();
                decision.set(GuardDecision::Loading);
                run(ticket);

                move || {
                    guard.borrow_mut().unmount();
                    drop(subscription);
                }
            },
            props.kind,
        );
    }

    match *decision {
        GuardDecision::Loading => html! {
            <div class="guard-loading" role="status" aria-live="polite">
                <span class="spinner" aria-hidden="true"></span>
                <span class="sr-only">{"Checking access"}</span>
            </div>
        },
        GuardDecision::Render => html! { <>{ for props.children.iter() }</> },
        GuardDecision::Redirect(boundary) => html! {
            <Redirect<Route> to={Route::from(boundary)} />
        },
    }
}
