pub mod analytics;
pub mod manager;

use crate::models::ContentKind;

/// The dashboard's tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    News,
    Events,
    Resources,
    Analytics,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::News, Tab::Events, Tab::Resources, Tab::Analytics];

    pub fn label(self) -> &'static str {
        match self {
            Tab::News => "News",
            Tab::Events => "Events",
            Tab::Resources => "Resources",
            Tab::Analytics => "Analytics",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Tab::News => "/dashboard/news",
            Tab::Events => "/dashboard/events",
            Tab::Resources => "/dashboard/resources",
            Tab::Analytics => "/dashboard/analytics",
        }
    }
}

impl From<ContentKind> for Tab {
    fn from(kind: ContentKind) -> Self {
        match kind {
            ContentKind::News => Tab::News,
            ContentKind::Event => Tab::Events,
            ContentKind::Resource => Tab::Resources,
        }
    }
}
