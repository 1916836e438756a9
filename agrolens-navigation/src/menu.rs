//! Main menu entries shown on the Home tab's initial screen

use crate::topology::routes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuOption {
    pub id: u8,
    pub title: &'static str,
    /// Route pushed when the entry is selected
    pub target: &'static str,
}

pub const MAIN_MENU: [MenuOption; 4] = [
    MenuOption {
        id: 1,
        title: "Rice Classification",
        target: routes::RICE_CLASSIFICATION_MODEL,
    },
    MenuOption {
        id: 2,
        title: "Check Plant Disease",
        target: routes::DISEASE_MODEL,
    },
    MenuOption {
        id: 3,
        title: "Check Plant Health",
        target: routes::HEALTH_MODEL,
    },
    MenuOption {
        id: 4,
        title: "Disease Solutions",
        target: routes::DISEASE_SOLUTIONS,
    },
];
