//! Client-visible routes, page titles and sidebar navigation.

use uuid::Uuid;

use crate::APP_NAME;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppRoute {
    Auth,
    Stories,
    StoryEditor { id: Uuid },
    Goals,
    Characters,
    Plot,
    World,
    Oracle,
    Settings,
}

impl AppRoute {
    /// Resolve a path (with or without a leading `#` / `/`). `/` and unknown
    /// paths land on the story list.
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim_start_matches('#').trim_matches('/');
        let mut segments = trimmed.split('/').filter(|s| !s.is_empty());
        match (segments.next(), segments.next(), segments.next()) {
            (Some("auth"), None, _) => AppRoute::Auth,
            (Some("stories"), None, _) => AppRoute::Stories,
            (Some("stories"), Some(id), None) => match Uuid::parse_str(id) {
                Ok(id) => AppRoute::StoryEditor { id },
                Err(_) => AppRoute::Stories,
            },
            (Some("goals"), None, _) => AppRoute::Goals,
            (Some("characters"), None, _) => AppRoute::Characters,
            (Some("plot"), None, _) => AppRoute::Plot,
            (Some("world"), None, _) => AppRoute::World,
            (Some("ai"), None, _) => AppRoute::Oracle,
            (Some("settings"), None, _) => AppRoute::Settings,
            _ => AppRoute::Stories,
        }
    }

    pub fn path(&self) -> String {
        match self {
            AppRoute::Auth => "/auth".to_string(),
            AppRoute::Stories => "/stories".to_string(),
            AppRoute::StoryEditor { id } => format!("/stories/{id}"),
            AppRoute::Goals => "/goals".to_string(),
            AppRoute::Characters => "/characters".to_string(),
            AppRoute::Plot => "/plot".to_string(),
            AppRoute::World => "/world".to_string(),
            AppRoute::Oracle => "/ai".to_string(),
            AppRoute::Settings => "/settings".to_string(),
        }
    }

    /// Everything except the auth page sits behind a session.
    pub fn requires_session(&self) -> bool {
        !matches!(self, AppRoute::Auth)
    }

    /// Title segment for static pages. The editor and the auth page compute
    /// theirs from state.
    pub fn title(&self) -> Option<&'static str> {
        match self {
            AppRoute::Auth | AppRoute::StoryEditor { .. } => None,
            AppRoute::Stories => Some("Stories"),
            AppRoute::Goals => Some("Writing Goals"),
            AppRoute::Characters => Some("Characters"),
            AppRoute::Plot => Some("Plot"),
            AppRoute::World => Some("World"),
            AppRoute::Oracle => Some("Oracle"),
            AppRoute::Settings => Some("Settings"),
        }
    }

    /// Sidebar entry this route highlights.
    pub fn nav_section(&self) -> Option<AppRoute> {
        match self {
            AppRoute::Auth => None,
            AppRoute::StoryEditor { .. } => Some(AppRoute::Stories),
            other => Some(*other),
        }
    }
}

/// `"{title} - Mystical Quill"`, or the bare name without a title.
pub fn page_title(title: Option<&str>) -> String {
    match title {
        Some(title) if !title.trim().is_empty() => format!("{title} - {APP_NAME}"),
        _ => APP_NAME.to_string(),
    }
}

/// Title of the story editor page.
pub fn editor_title(story_title: Option<&str>) -> String {
    match story_title {
        Some(title) => format!("Editing: {title}"),
        None => "Story Editor".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub name: &'static str,
    pub runic_name: &'static str,
    pub route: AppRoute,
}

pub const NAVIGATION: [NavItem; 7] = [
    NavItem {
        name: "Grimoire",
        runic_name: "Chronicles",
        route: AppRoute::Stories,
    },
    NavItem {
        name: "Writing Sanctum",
        runic_name: "Vows",
        route: AppRoute::Goals,
    },
    NavItem {
        name: "Personas",
        runic_name: "Souls",
        route: AppRoute::Characters,
    },
    NavItem {
        name: "Fate Weaver",
        runic_name: "Destiny",
        route: AppRoute::Plot,
    },
    NavItem {
        name: "Realm Forge",
        runic_name: "Worlds",
        route: AppRoute::World,
    },
    NavItem {
        name: "Oracle",
        runic_name: "Wisdom",
        route: AppRoute::Oracle,
    },
    NavItem {
        name: "Arcane",
        runic_name: "Runes",
        route: AppRoute::Settings,
    },
];
