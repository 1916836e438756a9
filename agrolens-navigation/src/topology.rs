//! Static route tree
//!
//! Outer stack: SplashScreen, Login, SignUp, MainApp. MainApp hosts the
//! Home / Profile / About tab set, each tab being its own stack.

use std::fmt::Write as _;
use std::sync::OnceLock;

/// Route names used across the client
pub mod routes {
    pub const SPLASH: &str = "SplashScreen";
    pub const LOGIN: &str = "Login";
    pub const SIGN_UP: &str = "SignUp";
    pub const MAIN_APP: &str = "MainApp";

    pub const MAIN_MENU: &str = "MainMenu";
    pub const HEALTH_MODEL: &str = "Health_Model";
    pub const DISEASE_MODEL: &str = "Disease_Model";
    pub const RICE_CLASSIFICATION_MODEL: &str = "Rice_Classification_Model";
    pub const DISEASE_SOLUTIONS: &str = "Disease_Solutions";

    pub const PROFILE: &str = "Profile";
    pub const EDIT_PROFILE: &str = "EditProfile";

    pub const ABOUT: &str = "About";

    pub const TAB_HOME: &str = "Home";
    pub const TAB_PROFILE: &str = "Profile";
    pub const TAB_ABOUT: &str = "About";
}

/// Opaque handle to a screen component, resolved by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenRef(&'static str);

impl ScreenRef {
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    pub fn id(&self) -> &'static str {
        self.0
    }
}

/// The one back control every headed route shares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackAction {
    /// Pop one level off the owning stack
    Pop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Reachable only with an authenticated session
    Protected,
}

/// Header chrome for a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub header_shown: bool,
    pub title: Option<&'static str>,
    pub back_action: Option<BackAction>,
    pub header_background: Option<&'static str>,
}

impl Presentation {
    /// Full-screen route without header
    pub const fn headerless() -> Self {
        Self {
            header_shown: false,
            title: None,
            back_action: None,
            header_background: None,
        }
    }

    /// Header with a fixed title and the shared back action
    pub const fn titled(title: &'static str) -> Self {
        Self {
            header_shown: true,
            title: Some(title),
            back_action: Some(BackAction::Pop),
            header_background: None,
        }
    }

    pub fn with_background(mut self, color: &'static str) -> Self {
        self.header_background = Some(color);
        self
    }
}

#[derive(Debug, Clone)]
pub enum RouteContent {
    Screen(ScreenRef),
    Nested(Box<NavigatorNode>),
}

/// A named, navigable destination
#[derive(Debug, Clone)]
pub struct Route {
    pub name: &'static str,
    pub content: RouteContent,
    pub presentation: Presentation,
    pub access: Access,
}

impl Route {
    fn screen(name: &'static str, screen: &'static str, presentation: Presentation) -> Self {
        Self {
            name,
            content: RouteContent::Screen(ScreenRef::new(screen)),
            presentation,
            access: Access::Public,
        }
    }

    fn protected(mut self) -> Self {
        self.access = Access::Protected;
        self
    }

    pub fn screen_ref(&self) -> Option<ScreenRef> {
        match &self.content {
            RouteContent::Screen(screen) => Some(*screen),
            RouteContent::Nested(_) => None,
        }
    }

    pub fn nested(&self) -> Option<&NavigatorNode> {
        match &self.content {
            RouteContent::Nested(node) => Some(node),
            RouteContent::Screen(_) => None,
        }
    }
}

/// Ordered routes, one of them initial
#[derive(Debug, Clone)]
pub struct StackNavigator {
    pub routes: Vec<Route>,
    pub initial: usize,
}

impl StackNavigator {
    pub fn initial_route(&self) -> &Route {
        &self.routes[self.initial]
    }

    pub fn find(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.name == name)
    }
}

/// Tab icon identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabIcon {
    Home,
    Person,
    Info,
    /// Unmapped tab name
    Unknown,
}

impl TabIcon {
    pub fn identifier(&self) -> &'static str {
        match self {
            TabIcon::Home => "home",
            TabIcon::Person => "person",
            TabIcon::Info => "info",
            TabIcon::Unknown => "help",
        }
    }
}

/// Icon rule for the main tab bar
pub fn tab_icon(name: &str) -> TabIcon {
    match name {
        routes::TAB_HOME => TabIcon::Home,
        routes::TAB_PROFILE => TabIcon::Person,
        routes::TAB_ABOUT => TabIcon::Info,
        _ => TabIcon::Unknown,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabBarChrome {
    pub active_tint: &'static str,
    pub inactive_tint: &'static str,
    pub header_shown: bool,
}

#[derive(Debug, Clone)]
pub struct Tab {
    pub name: &'static str,
    pub node: NavigatorNode,
}

/// Parallel, independently navigable sections
#[derive(Debug, Clone)]
pub struct TabSet {
    pub tabs: Vec<Tab>,
    pub icon_rule: fn(&str) -> TabIcon,
    pub chrome: TabBarChrome,
}

impl TabSet {
    pub fn icon_for(&self, name: &str) -> TabIcon {
        (self.icon_rule)(name)
    }
}

#[derive(Debug, Clone)]
pub enum NavigatorNode {
    Stack(StackNavigator),
    TabSet(TabSet),
}

/// The complete route tree
#[derive(Debug, Clone)]
pub struct Topology {
    pub root: StackNavigator,
}

impl Topology {
    /// Process-wide instance
    pub fn global() -> &'static Topology {
        static TOPOLOGY: OnceLock<Topology> = OnceLock::new();
        TOPOLOGY.get_or_init(Topology::build)
    }

    pub fn build() -> Self {
        const MODEL_HEADER: &str = "lightblue";

        let home = StackNavigator {
            routes: vec![
                Route::screen(routes::MAIN_MENU, "main_menu", Presentation::headerless()),
                Route::screen(
                    routes::HEALTH_MODEL,
                    "health_model",
                    Presentation::titled("Health Status").with_background(MODEL_HEADER),
                )
                .protected(),
                Route::screen(
                    routes::DISEASE_MODEL,
                    "disease_model",
                    Presentation::titled("Disease Check").with_background(MODEL_HEADER),
                )
                .protected(),
                Route::screen(
                    routes::RICE_CLASSIFICATION_MODEL,
                    "rice_classification_model",
                    Presentation::titled("Rice Classification").with_background(MODEL_HEADER),
                )
                .protected(),
                Route::screen(
                    routes::DISEASE_SOLUTIONS,
                    "disease_solutions",
                    Presentation::titled("Disease Solutions").with_background(MODEL_HEADER),
                )
                .protected(),
            ],
            initial: 0,
        };

        let profile = StackNavigator {
            routes: vec![
                Route::screen(routes::PROFILE, "profile", Presentation::headerless()),
                Route::screen(
                    routes::EDIT_PROFILE,
                    "edit_profile",
                    Presentation::titled("Edit Profile"),
                )
                .protected(),
            ],
            initial: 0,
        };

        let about = StackNavigator {
            routes: vec![Route::screen(
                routes::ABOUT,
                "about",
                Presentation::headerless(),
            )],
            initial: 0,
        };

        let tabs = TabSet {
            tabs: vec![
                Tab {
                    name: routes::TAB_HOME,
                    node: NavigatorNode::Stack(home),
                },
                Tab {
                    name: routes::TAB_PROFILE,
                    node: NavigatorNode::Stack(profile),
                },
                Tab {
                    name: routes::TAB_ABOUT,
                    node: NavigatorNode::Stack(about),
                },
            ],
            icon_rule: tab_icon,
            chrome: TabBarChrome {
                active_tint: "green",
                inactive_tint: "gray",
                header_shown: false,
            },
        };

        let root = StackNavigator {
            routes: vec![
                Route::screen(routes::SPLASH, "splash_screen", Presentation::headerless()),
                Route::screen(routes::LOGIN, "login", Presentation::headerless()),
                Route::screen(routes::SIGN_UP, "sign_up", Presentation::headerless()),
                Route {
                    name: routes::MAIN_APP,
                    content: RouteContent::Nested(Box::new(NavigatorNode::TabSet(tabs))),
                    presentation: Presentation::headerless(),
                    access: Access::Public,
                },
            ],
            initial: 0,
        };

        Self { root }
    }

    /// Every route in the tree, depth first
    pub fn all_routes(&self) -> Vec<&Route> {
        fn collect<'a>(stack: &'a StackNavigator, out: &mut Vec<&'a Route>) {
            for route in &stack.routes {
                out.push(route);
                if let Some(node) = route.nested() {
                    collect_node(node, out);
                }
            }
        }

        fn collect_node<'a>(node: &'a NavigatorNode, out: &mut Vec<&'a Route>) {
            match node {
                NavigatorNode::Stack(stack) => collect(stack, out),
                NavigatorNode::TabSet(tabs) => {
                    for tab in &tabs.tabs {
                        collect_node(&tab.node, out);
                    }
                }
            }
        }

        let mut out = Vec::new();
        collect(&self.root, &mut out);
        out
    }

    pub fn find(&self, name: &str) -> Option<&Route> {
        self.all_routes().into_iter().find(|route| route.name == name)
    }

    /// Indented, human-readable rendering of the tree
    pub fn outline(&self) -> String {
        fn stack_outline(out: &mut String, stack: &StackNavigator, depth: usize) {
            for (index, route) in stack.routes.iter().enumerate() {
                let pad = "  ".repeat(depth);
                let mut flags = Vec::new();
                if index == stack.initial {
                    flags.push("initial".to_string());
                }
                if route.presentation.header_shown {
                    flags.push("header".to_string());
                }
                if let Some(title) = route.presentation.title {
                    flags.push(format!("title=\"{}\"", title));
                }
                if route.presentation.back_action.is_some() {
                    flags.push("back".to_string());
                }
                if route.access == Access::Protected {
                    flags.push("protected".to_string());
                }
                let _ = writeln!(out, "{}{} [{}]", pad, route.name, flags.join(", "));
                if let Some(node) = route.nested() {
                    node_outline(out, node, depth + 1);
                }
            }
        }

        fn node_outline(out: &mut String, node: &NavigatorNode, depth: usize) {
            match node {
                NavigatorNode::Stack(s) => stack_outline(out, s, depth),
                NavigatorNode::TabSet(tabs) => {
                    for tab in &tabs.tabs {
                        let pad = "  ".repeat(depth);
                        let _ = writeln!(
                            out,
                            "{}<tab {} icon={}>",
                            pad,
                            tab.name,
                            tabs.icon_for(tab.name).identifier()
                        );
                        node_outline(out, &tab.node, depth + 1);
                    }
                }
            }
        }

        let mut out = String::new();
        stack_outline(&mut out, &self.root, 0);
        out
    }
}
