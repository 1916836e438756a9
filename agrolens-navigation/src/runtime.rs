//! Navigation runtime
//!
//! Interprets the route tree: one outer stack plus, while `MainApp` is on top
//! of it, one stack per tab and an active tab.

use crate::topology::{
    routes, Access, BackAction, NavigatorNode, Route, StackNavigator, TabSet, Topology,
};
use agrolens_core::{
    navigation_error, AccessGate, AgroError, AgroResult, DenyAll, ErrorContext, Navigator,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Push,
    Replace,
    Back,
}

/// One applied transition; `route` is the route on screen afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub route: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Outer,
    Tab(usize),
}

struct TabState {
    name: &'static str,
    initial: &'static str,
    stack: Vec<&'static str>,
}

impl TabState {
    fn reset(&mut self) {
        self.stack.clear();
        self.stack.push(self.initial);
    }
}

struct NavState {
    outer: Vec<&'static str>,
    tabs: Vec<TabState>,
    active_tab: usize,
    history: Vec<Transition>,
}

impl NavState {
    fn in_main_app(&self) -> bool {
        self.outer.last() == Some(&routes::MAIN_APP)
    }

    fn reset_tabs(&mut self) {
        for tab in &mut self.tabs {
            tab.reset();
        }
        self.active_tab = 0;
    }

    fn current(&self) -> Option<&'static str> {
        if self.in_main_app() {
            self.tabs
                .get(self.active_tab)
                .and_then(|tab| tab.stack.last().copied())
        } else {
            self.outer.last().copied()
        }
    }

    fn record(&mut self, kind: TransitionKind) {
        if let Some(route) = self.current() {
            self.history.push(Transition { kind, route });
        }
    }
}

/// Stateful interpreter over the process-wide [`Topology`]
pub struct NavigationRuntime {
    index: HashMap<&'static str, (Placement, Route)>,
    state: Mutex<NavState>,
    gate: RwLock<Arc<dyn AccessGate>>,
}

impl NavigationRuntime {
    /// Runtime positioned on the initial splash route, with protected routes
    /// closed until a gate is attached with [`attach_gate`](Self::attach_gate)
    pub fn new(topology: &Topology) -> Self {
        Self::with_gate(topology, Arc::new(DenyAll))
    }

    pub fn with_gate(topology: &Topology, gate: Arc<dyn AccessGate>) -> Self {
        let mut index = HashMap::new();
        let mut tabs = Vec::new();

        for route in &topology.root.routes {
            index.insert(route.name, (Placement::Outer, route.clone()));
            if let Some(NavigatorNode::TabSet(tab_set)) = route.nested() {
                Self::index_tabs(tab_set, &mut index, &mut tabs);
            }
        }

        let state = NavState {
            outer: vec![topology.root.initial_route().name],
            tabs,
            active_tab: 0,
            history: Vec::new(),
        };

        Self {
            index,
            state: Mutex::new(state),
            gate: RwLock::new(gate),
        }
    }

    fn index_tabs(
        tab_set: &TabSet,
        index: &mut HashMap<&'static str, (Placement, Route)>,
        tabs: &mut Vec<TabState>,
    ) {
        for tab in &tab_set.tabs {
            let NavigatorNode::Stack(stack) = &tab.node else {
                warn!(tab = tab.name, "Nested tab sets are not supported, skipping");
                continue;
            };
            let position = tabs.len();
            for route in &stack.routes {
                index.insert(route.name, (Placement::Tab(position), route.clone()));
            }
            tabs.push(Self::tab_state(tab.name, stack));
        }
    }

    fn tab_state(name: &'static str, stack: &StackNavigator) -> TabState {
        let initial = stack.initial_route().name;
        TabState {
            name,
            initial,
            stack: vec![initial],
        }
    }

    fn lock(&self) -> AgroResult<MutexGuard<'_, NavState>> {
        self.state.lock().map_err(|_| AgroError::Internal {
            message: "Navigation state lock poisoned".to_string(),
            context: ErrorContext::new("navigation_runtime"),
        })
    }

    fn resolve(&self, name: &str) -> AgroResult<(Placement, &Route)> {
        let (placement, route) = self
            .index
            .get(name)
            .ok_or_else(|| navigation_error!("Unknown route", name, "navigation_runtime"))?;

        if route.access == Access::Protected && !self.gate_open()? {
            return Err(navigation_error!(
                "Route requires an authenticated session",
                name,
                "navigation_runtime"
            ));
        }

        Ok((*placement, route))
    }

    fn gate_open(&self) -> AgroResult<bool> {
        let gate = self.gate.read().map_err(|_| AgroError::Internal {
            message: "Access gate lock poisoned".to_string(),
            context: ErrorContext::new("navigation_runtime"),
        })?;
        Ok(gate.is_authenticated())
    }

    fn enter_tab(state: &mut NavState, tab: usize, name: &str) -> AgroResult<()> {
        if !state.in_main_app() {
            return Err(navigation_error!(
                "Route is not reachable from the current screen",
                name,
                "navigation_runtime"
            ));
        }
        state.active_tab = tab;
        Ok(())
    }

    /// Swap the access gate, typically for a session controller's state
    /// receiver once the controller exists
    pub fn attach_gate(&self, gate: Arc<dyn AccessGate>) -> AgroResult<()> {
        let mut slot = self.gate.write().map_err(|_| AgroError::Internal {
            message: "Access gate lock poisoned".to_string(),
            context: ErrorContext::new("navigation_runtime"),
        })?;
        *slot = gate;
        debug!("Attached access gate");
        Ok(())
    }

    /// Route currently on screen
    pub fn current(&self) -> AgroResult<Route> {
        let state = self.lock()?;
        let name = state.current().ok_or_else(|| AgroError::Internal {
            message: "Navigation state has no current route".to_string(),
            context: ErrorContext::new("navigation_runtime"),
        })?;
        self.index
            .get(name)
            .map(|(_, route)| route.clone())
            .ok_or_else(|| navigation_error!("Unknown route", name, "navigation_runtime"))
    }

    /// Name of the active tab while inside MainApp
    pub fn active_tab(&self) -> AgroResult<Option<&'static str>> {
        let state = self.lock()?;
        Ok(state
            .in_main_app()
            .then(|| state.tabs.get(state.active_tab).map(|tab| tab.name))
            .flatten())
    }

    /// Switch tabs without touching any stack
    pub fn select_tab(&self, name: &str) -> AgroResult<()> {
        let mut state = self.lock()?;
        let position = state
            .tabs
            .iter()
            .position(|tab| tab.name == name)
            .ok_or_else(|| navigation_error!("Unknown tab", name, "navigation_runtime"))?;
        Self::enter_tab(&mut state, position, name)?;
        debug!(tab = name, "Selected tab");
        Ok(())
    }

    /// Apply a route's back control
    pub fn perform(&self, action: BackAction) -> AgroResult<bool> {
        match action {
            BackAction::Pop => self.go_back(),
        }
    }

    /// Depth of the outer stack
    pub fn outer_depth(&self) -> AgroResult<usize> {
        Ok(self.lock()?.outer.len())
    }

    pub fn history(&self) -> AgroResult<Vec<Transition>> {
        Ok(self.lock()?.history.clone())
    }
}

impl Navigator for NavigationRuntime {
    fn push(&self, route: &str) -> AgroResult<()> {
        let (placement, target) = self.resolve(route)?;
        let name = target.name;
        let mut state = self.lock()?;

        // Pushing the route already on top of its stack leaves the stack as is
        match placement {
            Placement::Outer => {
                if state.outer.last() == Some(&name) {
                    debug!(route = name, "Route already on top, push ignored");
                    return Ok(());
                }
                if name == routes::MAIN_APP {
                    state.reset_tabs();
                }
                state.outer.push(name);
            }
            Placement::Tab(tab) => {
                Self::enter_tab(&mut state, tab, name)?;
                if state.tabs[tab].stack.last() == Some(&name) {
                    debug!(route = name, "Route already on top, push ignored");
                    return Ok(());
                }
                state.tabs[tab].stack.push(name);
            }
        }

        state.record(TransitionKind::Push);
        debug!(route = name, "Pushed route");
        Ok(())
    }

    fn replace(&self, route: &str) -> AgroResult<()> {
        let (placement, target) = self.resolve(route)?;
        let name = target.name;
        let mut state = self.lock()?;

        match placement {
            Placement::Outer => {
                let leaving_main_app = state.in_main_app();
                state.outer.pop();
                // Replacing down onto the entry beneath collapses instead of duplicating it
                if state.outer.last() != Some(&name) {
                    state.outer.push(name);
                }
                if leaving_main_app || name == routes::MAIN_APP {
                    state.reset_tabs();
                }
            }
            Placement::Tab(tab) => {
                Self::enter_tab(&mut state, tab, name)?;
                let stack = &mut state.tabs[tab].stack;
                stack.pop();
                stack.push(name);
            }
        }

        state.record(TransitionKind::Replace);
        debug!(route = name, "Replaced route");
        Ok(())
    }

    fn go_back(&self) -> AgroResult<bool> {
        let mut state = self.lock()?;

        let popped = if state.in_main_app() && state.tabs[state.active_tab].stack.len() > 1 {
            let active = state.active_tab;
            state.tabs[active].stack.pop();
            true
        } else if state.outer.len() > 1 {
            let leaving_main_app = state.in_main_app();
            state.outer.pop();
            if leaving_main_app {
                state.reset_tabs();
            }
            true
        } else {
            false
        };

        if popped {
            state.record(TransitionKind::Back);
        }
        Ok(popped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrolens_core::SessionState;
    use tokio::sync::watch;

    fn runtime_with_state(state: SessionState) -> (NavigationRuntime, watch::Sender<SessionState>) {
        let (tx, rx) = watch::channel(state);
        (
            NavigationRuntime::with_gate(Topology::global(), Arc::new(rx)),
            tx,
        )
    }

    fn current_name(runtime: &NavigationRuntime) -> &'static str {
        runtime.current().unwrap().name
    }

    #[test]
    fn test_starts_on_splash() {
        let runtime = NavigationRuntime::new(Topology::global());
        assert_eq!(current_name(&runtime), routes::SPLASH);
        assert_eq!(runtime.active_tab().unwrap(), None);
        assert!(!runtime.go_back().unwrap());
    }

    #[test]
    fn test_replace_removes_back_navigability() {
        let runtime = NavigationRuntime::new(Topology::global());
        runtime.replace(routes::LOGIN).unwrap();
        assert_eq!(current_name(&runtime), routes::LOGIN);
        assert_eq!(runtime.outer_depth().unwrap(), 1);
        assert!(!runtime.go_back().unwrap());
        assert_eq!(current_name(&runtime), routes::LOGIN);
    }

    #[test]
    fn test_push_is_back_navigable() {
        let runtime = NavigationRuntime::new(Topology::global());
        runtime.replace(routes::LOGIN).unwrap();
        runtime.push(routes::SIGN_UP).unwrap();
        assert_eq!(current_name(&runtime), routes::SIGN_UP);
        assert!(runtime.go_back().unwrap());
        assert_eq!(current_name(&runtime), routes::LOGIN);
    }

    #[test]
    fn test_entering_main_app_lands_on_main_menu() {
        let runtime = NavigationRuntime::new(Topology::global());
        runtime.replace(routes::LOGIN).unwrap();
        runtime.push(routes::MAIN_APP).unwrap();
        assert_eq!(current_name(&runtime), routes::MAIN_MENU);
        assert_eq!(runtime.active_tab().unwrap(), Some(routes::TAB_HOME));
    }

    #[test]
    fn test_protected_routes_closed_when_anonymous() {
        let (runtime, _tx) = runtime_with_state(SessionState::Anonymous);
        runtime.push(routes::MAIN_APP).unwrap();

        let err = runtime.push(routes::HEALTH_MODEL).unwrap_err();
        assert!(matches!(err, AgroError::Navigation { .. }));
        assert_eq!(current_name(&runtime), routes::MAIN_MENU);
    }

    #[test]
    fn test_protected_routes_follow_session_state() {
        let (runtime, tx) = runtime_with_state(SessionState::Hydrating);
        runtime.push(routes::MAIN_APP).unwrap();
        assert!(runtime.push(routes::DISEASE_MODEL).is_err());

        tx.send(SessionState::Authenticated).unwrap();
        runtime.push(routes::DISEASE_MODEL).unwrap();
        let route = runtime.current().unwrap();
        assert_eq!(route.name, routes::DISEASE_MODEL);
        assert_eq!(route.presentation.title, Some("Disease Check"));

        // Shared back action pops one level inside the tab
        assert!(runtime.perform(BackAction::Pop).unwrap());
        assert_eq!(current_name(&runtime), routes::MAIN_MENU);
    }

    #[test]
    fn test_tab_routes_unreachable_outside_main_app() {
        let (runtime, _tx) = runtime_with_state(SessionState::Authenticated);
        let err = runtime.push(routes::ABOUT).unwrap_err();
        assert!(matches!(err, AgroError::Navigation { .. }));
        assert!(runtime.select_tab(routes::TAB_ABOUT).is_err());
    }

    #[test]
    fn test_tabs_keep_independent_stacks() {
        let (runtime, _tx) = runtime_with_state(SessionState::Authenticated);
        runtime.push(routes::MAIN_APP).unwrap();
        runtime.push(routes::HEALTH_MODEL).unwrap();

        runtime.push(routes::EDIT_PROFILE).unwrap();
        assert_eq!(runtime.active_tab().unwrap(), Some(routes::TAB_PROFILE));

        runtime.select_tab(routes::TAB_HOME).unwrap();
        assert_eq!(current_name(&runtime), routes::HEALTH_MODEL);

        runtime.select_tab(routes::TAB_ABOUT).unwrap();
        assert_eq!(current_name(&runtime), routes::ABOUT);
    }

    #[test]
    fn test_replace_to_login_from_deep_tab_resets_tabs() {
        let (runtime, _tx) = runtime_with_state(SessionState::Authenticated);
        runtime.replace(routes::LOGIN).unwrap();
        runtime.push(routes::MAIN_APP).unwrap();
        runtime.push(routes::RICE_CLASSIFICATION_MODEL).unwrap();

        runtime.replace(routes::LOGIN).unwrap();
        assert_eq!(current_name(&runtime), routes::LOGIN);
        assert_eq!(runtime.active_tab().unwrap(), None);

        // MainApp collapsed onto the Login beneath it, no duplicate entry
        assert_eq!(runtime.outer_depth().unwrap(), 1);
        assert!(!runtime.go_back().unwrap());

        runtime.push(routes::MAIN_APP).unwrap();
        assert_eq!(current_name(&runtime), routes::MAIN_MENU);
    }

    #[test]
    fn test_repushing_current_route_keeps_stack() {
        let (runtime, _tx) = runtime_with_state(SessionState::Authenticated);
        runtime.replace(routes::LOGIN).unwrap();
        runtime.push(routes::MAIN_APP).unwrap();
        runtime.push(routes::HEALTH_MODEL).unwrap();

        runtime.push(routes::MAIN_APP).unwrap();
        assert_eq!(runtime.outer_depth().unwrap(), 2);
        assert_eq!(current_name(&runtime), routes::HEALTH_MODEL);

        runtime.push(routes::HEALTH_MODEL).unwrap();
        assert!(runtime.go_back().unwrap());
        assert_eq!(current_name(&runtime), routes::MAIN_MENU);
        assert_eq!(runtime.history().unwrap().len(), 4);
    }

    #[test]
    fn test_attached_gate_opens_protected_routes() {
        let runtime = NavigationRuntime::new(Topology::global());
        runtime.replace(routes::LOGIN).unwrap();
        runtime.push(routes::MAIN_APP).unwrap();
        assert!(runtime.push(routes::HEALTH_MODEL).is_err());

        let (tx, rx) = watch::channel(SessionState::Authenticated);
        runtime.attach_gate(Arc::new(rx)).unwrap();
        runtime.push(routes::HEALTH_MODEL).unwrap();
        assert_eq!(current_name(&runtime), routes::HEALTH_MODEL);

        tx.send(SessionState::Anonymous).unwrap();
        runtime.go_back().unwrap();
        assert!(runtime.push(routes::HEALTH_MODEL).is_err());
    }

    #[test]
    fn test_unknown_route_is_rejected() {
        let runtime = NavigationRuntime::new(Topology::global());
        assert!(matches!(
            runtime.push("Nowhere"),
            Err(AgroError::Navigation { .. })
        ));
        assert!(runtime.replace("Nowhere").is_err());
    }

    #[test]
    fn test_history_records_transitions() {
        let runtime = NavigationRuntime::new(Topology::global());
        runtime.replace(routes::LOGIN).unwrap();
        runtime.push(routes::SIGN_UP).unwrap();
        runtime.go_back().unwrap();

        let history = runtime.history().unwrap();
        assert_eq!(
            history,
            vec![
                Transition {
                    kind: TransitionKind::Replace,
                    route: routes::LOGIN
                },
                Transition {
                    kind: TransitionKind::Push,
                    route: routes::SIGN_UP
                },
                Transition {
                    kind: TransitionKind::Back,
                    route: routes::LOGIN
                },
            ]
        );
    }
}
