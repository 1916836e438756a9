//! Agrolens Navigation - Route tree and navigation runtime
//!
//! The route tree is pure data built once per process ([`Topology::global`]).
//! A [`NavigationRuntime`] interprets it: outer auth stack, a tab set nested
//! under `MainApp`, and one stack per tab.

pub mod menu;
pub mod runtime;
pub mod topology;

pub use menu::{MenuOption, MAIN_MENU};
pub use runtime::{NavigationRuntime, Transition, TransitionKind};
pub use topology::{
    routes, tab_icon, Access, BackAction, NavigatorNode, Presentation, Route, RouteContent,
    ScreenRef, StackNavigator, Tab, TabBarChrome, TabIcon, TabSet, Topology,
};
