//! crates/deep_purple_core/src/routes.rs
//!
//! Maps paths to views and decides, from the session, which of them are
//! reachable and which navigation items to offer.

use serde::Serialize;

use crate::domain::Role;
use crate::session::AuthState;

/// Where every rejected navigation ends up.
pub const PUBLIC_ENTRY: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Login/register forms plus the public landing content.
    Entry,
    Analysis,
    EmotionManager,
    AdminDashboard,
    UserDashboard,
}

const USER_ONLY: &[Role] = &[Role::User];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

impl View {
    pub const ALL: [View; 5] = [
        View::Entry,
        View::Analysis,
        View::EmotionManager,
        View::AdminDashboard,
        View::UserDashboard,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            View::Entry => PUBLIC_ENTRY,
            View::Analysis => "/analysis",
            View::EmotionManager => "/emotion",
            View::AdminDashboard => "/admin",
            View::UserDashboard => "/user",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Entry => "Welcome to DeepPurple",
            View::Analysis => "Analysis",
            View::EmotionManager => "Emotion Model Manager",
            View::AdminDashboard => "Admin Dashboard",
            View::UserDashboard => "User Dashboard",
        }
    }

    /// Roles allowed to render this view; `None` means public.
    pub fn allowed_roles(&self) -> Option<&'static [Role]> {
        match self {
            View::Entry => None,
            View::Analysis | View::EmotionManager | View::UserDashboard => Some(USER_ONLY),
            View::AdminDashboard => Some(ADMIN_ONLY),
        }
    }

    /// Finds the view mounted at `path`. Dashboards also own their sub-paths.
    pub fn from_path(path: &str) -> Option<View> {
        let normalized = normalize(path);
        View::ALL.into_iter().find(|view| {
            let base = view.path();
            if *view == View::Entry {
                return normalized == base;
            }
            normalized == base
                || (matches!(view, View::AdminDashboard | View::UserDashboard)
                    && normalized
                        .strip_prefix(base)
                        .is_some_and(|rest| rest.starts_with('/')))
        })
    }

    pub fn is_reachable(&self, auth: &AuthState) -> bool {
        match self.allowed_roles() {
            None => true,
            Some(allowed) => auth.permits(allowed),
        }
    }
}

fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        PUBLIC_ENTRY.to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// The outcome of navigating to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render(View),
    Redirect(&'static str),
}

/// Applies the role gate: unknown paths and views outside the role's allowed
/// set both send the client back to the public entry.
pub fn resolve(path: &str, auth: &AuthState) -> RouteDecision {
    match View::from_path(path) {
        Some(view) if view.is_reachable(auth) => RouteDecision::Render(view),
        _ => RouteDecision::Redirect(PUBLIC_ENTRY),
    }
}

/// The view a freshly logged-in role is sent to.
pub fn landing_path(role: Role) -> &'static str {
    match role {
        Role::Admin => View::AdminDashboard.path(),
        Role::User => View::UserDashboard.path(),
    }
}

//=========================================================================================
// Navigation
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub title: &'static str,
    pub path: &'static str,
}

const NAV_ORDER: [View; 4] = [
    View::EmotionManager,
    View::Analysis,
    View::AdminDashboard,
    View::UserDashboard,
];

/// Sidebar items reachable with the current session, in display order.
pub fn navigation(auth: &AuthState) -> Vec<NavItem> {
    NAV_ORDER
        .iter()
        .filter(|view| view.is_reachable(auth))
        .map(|view| NavItem {
            title: view.title(),
            path: view.path(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn every_auth_state() -> Vec<AuthState> {
        vec![
            AuthState::anonymous(),
            AuthState::for_role(Role::User),
            AuthState::for_role(Role::Admin),
        ]
    }

    #[test]
    fn gated_views_never_render_for_disallowed_roles() {
        for auth in every_auth_state() {
            for view in View::ALL {
                let decision = resolve(view.path(), &auth);
                let allowed = match view.allowed_roles() {
                    None => true,
                    Some(roles) => auth.role.is_some_and(|role| roles.contains(&role)),
                };
                if allowed {
                    assert_eq!(decision, RouteDecision::Render(view));
                } else {
                    assert_eq!(decision, RouteDecision::Redirect(PUBLIC_ENTRY));
                }
            }
        }
    }

    #[test]
    fn dashboard_sub_paths_share_the_gate() {
        let admin = AuthState::for_role(Role::Admin);
        let user = AuthState::for_role(Role::User);

        assert_eq!(
            resolve("/admin/users/", &admin),
            RouteDecision::Render(View::AdminDashboard)
        );
        assert_eq!(resolve("/admin/users", &user), RouteDecision::Redirect(PUBLIC_ENTRY));
        assert_eq!(resolve("/administrator", &admin), RouteDecision::Redirect(PUBLIC_ENTRY));
    }

    #[test]
    fn unknown_paths_redirect_to_entry() {
        let user = AuthState::for_role(Role::User);
        assert_eq!(resolve("/nowhere", &user), RouteDecision::Redirect(PUBLIC_ENTRY));
        assert_eq!(resolve("", &user), RouteDecision::Render(View::Entry));
        assert_eq!(resolve("analysis?x=1", &user), RouteDecision::Render(View::Analysis));
    }

    #[test]
    fn navigation_is_filtered_by_role() {
        assert!(navigation(&AuthState::anonymous()).is_empty());

        let admin: Vec<_> = navigation(&AuthState::for_role(Role::Admin))
            .into_iter()
            .map(|item| item.path)
            .collect();
        assert_eq!(admin, vec!["/admin"]);

        let user: Vec<_> = navigation(&AuthState::for_role(Role::User))
            .into_iter()
            .map(|item| item.path)
            .collect();
        assert_eq!(user, vec!["/emotion", "/analysis", "/user"]);
    }

    #[test]
    fn landing_follows_role() {
        assert_eq!(landing_path(Role::Admin), "/admin");
        assert_eq!(landing_path(Role::User), "/user");
    }
}
