//! Browser-backed collaborators for the gate.

pub(crate) mod browser;
pub(crate) mod identity;
