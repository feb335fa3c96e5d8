//! Yew components for the console shell.

pub(crate) mod guard;
pub(crate) mod home;
pub(crate) mod login;
pub(crate) mod maintenance;
