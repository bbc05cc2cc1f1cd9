use habitsync_domain::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAction {
    Stay,
    RedirectToSignIn,
    RedirectToHome,
}

/// Navigation policy over session state. Pure and level-triggered: the
/// host re-evaluates on every (state, section) change, and re-entering
/// the same state yields the same action.
pub struct RouteGuard;

impl RouteGuard {
    pub fn decide(state: &SessionState, in_auth_section: bool) -> RouteAction {
        // No decision until the session resolves, else the first render
        // flickers through a redirect.
        if state.is_loading() {
            return RouteAction::Stay;
        }

        match (state.is_authenticated(), in_auth_section) {
            (false, false) => RouteAction::RedirectToSignIn,
            (true, true) => RouteAction::RedirectToHome,
            _ => RouteAction::Stay,
        }
    }
}
