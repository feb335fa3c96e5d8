//! Routing definitions for the reclaim console.
use reclaim_gate::Boundary;
use yew_router::prelude::*;

#[derive(Clone, Routable, PartialEq, Eq, Debug)]
pub(crate) enum Route {
    #[at("/")]
    Home,
    #[at("/login")]
    Login,
    #[at("/maintenance")]
    Maintenance,
    #[not_found]
    #[at("/404")]
    NotFound,
}

impl From<Boundary> for Route {
    fn from(boundary: Boundary) -> Self {
        match boundary {
            Boundary::Login => Self::Login,
            Boundary::Maintenance => Self::Maintenance,
        }
    }
}
