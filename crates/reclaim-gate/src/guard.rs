//! Per-mount route guard state machine.
//!
//! States: `Pending -> {Authenticated, Unauthenticated}`, terminal per mount,
//! re-entered on remount or when an auth event forces re-evaluation. For the
//! maintenance guard `Authenticated` means the visitor cleared the gate.
//!
//! Every evaluation is tagged with a [`Ticket`]. A result whose ticket is no
//! longer current (the guard unmounted, remounted, or was overtaken by an auth
//! event) is discarded instead of applied.

use crate::config::GateConfig;
use crate::identity::AuthEvent;
use crate::resolver::Verdict;

/// Which guard a mount represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardKind {
    /// Requires an authenticated visitor.
    Protected,
    /// Requires maintenance mode to be off or bypassed.
    Maintenance,
}

impl GuardKind {
    /// Stable label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Protected => "protected",
            Self::Maintenance => "maintenance",
        }
    }

    /// Where a denied visitor is sent.
    #[must_use]
    pub const fn boundary(self) -> Boundary {
        match self {
            Self::Protected => Boundary::Login,
            Self::Maintenance => Boundary::Maintenance,
        }
    }
}

/// Redirect targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    /// Login screen.
    Login,
    /// Maintenance page.
    Maintenance,
}

impl Boundary {
    /// Route path for this boundary under `config`.
    #[must_use]
    pub fn path(self, config: &GateConfig) -> &str {
        match self {
            Self::Login => &config.login_path,
            Self::Maintenance => &config.maintenance_path,
        }
    }
}

/// What the guard should render right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Neutral loading indicator.
    Loading,
    /// The wrapped view.
    Render,
    /// Navigate away.
    Redirect(Boundary),
}

/// Identifies one evaluation pass of one mount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
}

/// Response to an auth event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardReaction {
    /// Nothing changes.
    Ignore,
    /// State changed synchronously; render this.
    Transition(GuardDecision),
    /// State reset to `Pending`; run a fresh evaluation with this ticket.
    Reevaluate(Ticket),
}

/// State machine owned by one guard instance.
#[derive(Clone, Debug)]
pub struct RouteGuard {
    kind: GuardKind,
    state: Verdict,
    epoch: u64,
    mounted: bool,
}

impl RouteGuard {
    /// Unmounted guard of `kind`.
    #[must_use]
    pub const fn new(kind: GuardKind) -> Self {
        Self {
            kind,
            state: Verdict::Pending,
            epoch: 0,
            mounted: false,
        }
    }

    /// Guard kind.
    #[must_use]
    pub const fn kind(&self) -> GuardKind {
        self.kind
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> Verdict {
        self.state
    }

    /// Whether the guard is mounted.
    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Enter `Pending` for a new mount and issue its evaluation ticket.
    pub const fn mount(&mut self) -> Ticket {
        self.mounted = true;
        self.restart()
    }

    /// Leave the mount; later results are discarded.
    pub const fn unmount(&mut self) {
        self.mounted = false;
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Apply the result of the evaluation identified by `ticket`.
    ///
    /// Returns the new decision, or `None` when the result is stale.
    pub fn complete(&mut self, ticket: Ticket, verdict: Verdict) -> Option<GuardDecision> {
        if !self.accepts(ticket) || !verdict.is_settled() {
            return None;
        }
        self.state = verdict;
        Some(self.decision())
    }

    /// React to a pushed auth event.
    ///
    /// Signed-out always forces a decision, even over a rendered view.
    /// Signed-in only acts while `Pending`; a settled render is never revoked
    /// or granted retroactively by it.
    pub fn on_event(&mut self, event: &AuthEvent) -> GuardReaction {
        if !self.mounted {
            return GuardReaction::Ignore;
        }
        match (event, self.kind) {
            (AuthEvent::SignedOut, GuardKind::Protected) => {
                self.settle(Verdict::Unauthenticated);
                GuardReaction::Transition(GuardDecision::Redirect(Boundary::Login))
            }
            (AuthEvent::SignedOut, GuardKind::Maintenance) => {
                GuardReaction::Reevaluate(self.restart())
            }
            (AuthEvent::SignedIn(_), GuardKind::Protected)
                if matches!(self.state, Verdict::Pending) =>
            {
                self.settle(Verdict::Authenticated);
                GuardReaction::Transition(GuardDecision::Render)
            }
            (AuthEvent::SignedIn(_), GuardKind::Maintenance)
                if matches!(self.state, Verdict::Pending) =>
            {
                GuardReaction::Reevaluate(self.restart())
            }
            (AuthEvent::SignedIn(_), _) => GuardReaction::Ignore,
        }
    }

    /// What to render in the current state.
    #[must_use]
    pub const fn decision(&self) -> GuardDecision {
        match self.state {
            Verdict::Pending => GuardDecision::Loading,
            Verdict::Authenticated => GuardDecision::Render,
            Verdict::Unauthenticated => GuardDecision::Redirect(self.kind.boundary()),
        }
    }

    const fn accepts(&self, ticket: Ticket) -> bool {
        self.mounted && ticket.epoch == self.epoch
    }

    const fn restart(&mut self) -> Ticket {
        self.state = Verdict::Pending;
        self.epoch = self.epoch.wrapping_add(1);
        Ticket { epoch: self.epoch }
    }

    const fn settle(&mut self, verdict: Verdict) {
        self.state = verdict;
        // Invalidate whatever evaluation is still in flight.
        self.epoch = self.epoch.wrapping_add(1);
    }
}
