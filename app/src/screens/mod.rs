//! View-model controllers for the client's pages.
//!
//! Each screen fetches through the accessor traits, derives its verdicts via
//! `eligibility`, and hands back plain data plus toasts and navigation for
//! the front end to render.

pub mod course_detail;
pub mod courses;
pub mod my_bookings;
pub mod profile;

use crate::accessor::IdentityProvider;
use crate::session::{AuthGate, NavigationIntent, Page, SessionContext, require_user};

/// Result of entering a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowOutcome {
    /// The screen loaded; the toast reports a load failure, if any.
    Shown(Option<Toast>),
    RedirectToLogin(NavigationIntent),
}

/// Resolve the session for a screen, or the redirect to login.
async fn enter<I: IdentityProvider>(
    identity: &I,
    session: &mut SessionContext,
    page: Page,
) -> Result<(), NavigationIntent> {
    match require_user(identity, session, page).await {
        AuthGate::Authorized(_) => Ok(()),
        AuthGate::RedirectToLogin(intent) => Err(intent),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Info,
}

/// Short transient message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Info,
        }
    }
}
