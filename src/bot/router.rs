use crate::bot::state::SessionState;
use crate::db::models::Category;

pub const LATER_BUTTON: &str = "Позже";
pub const CREATE_PROFILE_BUTTON: &str = "Создать профиль";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Start,
    Users,
    CreateProfileCommand,
    Category(Category),
    Later,
    CreateProfile,
    Description,
    Website,
}

struct RouteEntry {
    name: &'static str,
    matches: fn(&str, &SessionState) -> Option<Route>,
}

// Evaluated top to bottom, first match wins.
const ROUTES: [RouteEntry; 8] = [
    RouteEntry { name: "start", matches: match_start },
    RouteEntry { name: "users", matches: match_users },
    RouteEntry { name: "create_profile_command", matches: match_create_profile_command },
    RouteEntry { name: "category", matches: match_category },
    RouteEntry { name: "later", matches: match_later },
    RouteEntry { name: "create_profile", matches: match_create_profile },
    RouteEntry { name: "description", matches: match_description },
    RouteEntry { name: "website", matches: match_website },
];

fn match_start(text: &str, _: &SessionState) -> Option<Route> {
    (command(text) == Some("start")).then_some(Route::Start)
}

fn match_users(text: &str, _: &SessionState) -> Option<Route> {
    (command(text) == Some("users")).then_some(Route::Users)
}

fn match_create_profile_command(text: &str, _: &SessionState) -> Option<Route> {
    (command(text) == Some("create_profile")).then_some(Route::CreateProfileCommand)
}

fn match_category(text: &str, state: &SessionState) -> Option<Route> {
    if !state.accepts_category() {
        return None;
    }
    Category::from_label(text).map(Route::Category)
}

fn awaiting_decision(state: &SessionState) -> bool {
    matches!(state, SessionState::AwaitingProfileDecision { .. })
}

fn match_later(text: &str, state: &SessionState) -> Option<Route> {
    (text == LATER_BUTTON && awaiting_decision(state)).then_some(Route::Later)
}

fn match_create_profile(text: &str, state: &SessionState) -> Option<Route> {
    (text == CREATE_PROFILE_BUTTON && awaiting_decision(state)).then_some(Route::CreateProfile)
}

fn match_description(_: &str, state: &SessionState) -> Option<Route> {
    matches!(state, SessionState::AwaitingDescription { .. }).then_some(Route::Description)
}

fn match_website(_: &str, state: &SessionState) -> Option<Route> {
    matches!(state, SessionState::AwaitingWebsite { .. }).then_some(Route::Website)
}

/// Returns the first route whose predicate accepts the input, if any.
pub fn resolve(text: &str, state: &SessionState) -> Option<Route> {
    ROUTES.iter().find_map(|entry| {
        let route = (entry.matches)(text, state)?;
        tracing::debug!("Routed input to {}", entry.name);
        Some(route)
    })
}

/// Extracts a bot command name, dropping any `@botname` suffix.
pub fn command(text: &str) -> Option<&str> {
    let word = text.trim().split_whitespace().next()?;
    let name = word.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or(name);
    (!name.is_empty()).then_some(name)
}
