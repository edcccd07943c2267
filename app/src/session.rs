//! Signed-in user state and page navigation.
//!
//! A `SessionContext` is created once at startup and handed to every screen.
//! The page a user was heading to when sent to login travels as a
//! `NavigationIntent` value through the login flow.

use tracing::{info, warn};
use uuid::Uuid;

use crate::accessor::IdentityProvider;
use crate::types::Profile;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    user: Option<Profile>,
    loading: bool,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub const fn new() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    pub const fn user(&self) -> Option<&Profile> {
        self.user.as_ref()
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn populate(&mut self, user: Profile) {
        self.user = Some(user);
        self.loading = false;
    }

    pub fn clear(&mut self) {
        self.user = None;
        self.loading = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Courses,
    MyBookings,
    Profile,
    Login,
    CourseDetail { course_id: Uuid },
}

impl Page {
    pub fn path(&self) -> String {
        match self {
            Self::Courses => "pages/courses/index".to_string(),
            Self::MyBookings => "pages/my-bookings/index".to_string(),
            Self::Profile => "pages/profile/index".to_string(),
            Self::Login => "pages/login/index".to_string(),
            Self::CourseDetail { course_id } => {
                format!("pages/course-detail/index?id={course_id}")
            }
        }
    }

    /// Accepts paths with or without a leading slash.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim().trim_start_matches('/');
        let (route, query) = path.split_once('?').unwrap_or((path, ""));
        match route {
            "pages/courses/index" => Some(Self::Courses),
            "pages/my-bookings/index" => Some(Self::MyBookings),
            "pages/profile/index" => Some(Self::Profile),
            "pages/login/index" => Some(Self::Login),
            "pages/course-detail/index" => query
                .split('&')
                .find_map(|pair| pair.strip_prefix("id="))
                .and_then(|id| Uuid::parse_str(id).ok())
                .map(|course_id| Self::CourseDetail { course_id }),
            _ => None,
        }
    }

    /// Pages reachable from the bottom tab bar.
    pub const fn is_tab(&self) -> bool {
        matches!(self, Self::Courses | Self::MyBookings | Self::Profile)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    SwitchTab(Page),
    NavigateTo(Page),
    Back,
}

impl Navigation {
    /// Tab pages are switched to, everything else is pushed.
    pub const fn to(page: Page) -> Self {
        if page.is_tab() {
            Self::SwitchTab(page)
        } else {
            Self::NavigateTo(page)
        }
    }
}

/// Where the user wanted to go before being sent to the login page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationIntent {
    pub target: Page,
}

impl NavigationIntent {
    pub const fn new(target: Page) -> Self {
        Self { target }
    }

    /// Where to land after a successful login.
    pub fn resume(intent: Option<Self>) -> Navigation {
        match intent {
            Some(intent) if intent.target != Page::Login => Navigation::to(intent.target),
            _ => Navigation::SwitchTab(Page::Courses),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthGate {
    Authorized(Profile),
    RedirectToLogin(NavigationIntent),
}

/// Check the session on screen entry. A missing or unreadable session sends
/// the user to login with `intended` kept for afterwards.
pub async fn require_user<I: IdentityProvider>(
    identity: &I,
    session: &mut SessionContext,
    intended: Page,
) -> AuthGate {
    match identity.current_user().await {
        Ok(Some(user)) => {
            session.populate(user.clone());
            AuthGate::Authorized(user)
        }
        Ok(None) => {
            info!("No session, redirecting to login from {}", intended.path());
            session.clear();
            AuthGate::RedirectToLogin(NavigationIntent::new(intended))
        }
        Err(e) => {
            warn!("Failed to read current user: {}", e);
            session.clear();
            AuthGate::RedirectToLogin(NavigationIntent::new(intended))
        }
    }
}
