use super::{ShowOutcome, enter};
use crate::accessor::IdentityProvider;
use crate::auth::{self, AuthOutcome};
use crate::labels;
use crate::session::{Page, SessionContext};
use crate::types::{Profile, UserRole};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub display_name: String,
    pub is_admin: bool,
    pub username: Option<String>,
    /// Hidden for synthetic login addresses.
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileView {
    pub fn from_profile(profile: &Profile) -> Self {
        let display_name = profile
            .nickname
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| profile.username.clone().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| labels::DEFAULT_DISPLAY_NAME.to_string());

        let email = profile.email.clone().filter(|email| {
            !labels::SYNTHETIC_EMAIL_DOMAINS
                .iter()
                .any(|domain| email.contains(domain))
        });

        Self {
            display_name,
            is_admin: profile.role == UserRole::Admin,
            username: profile.username.clone(),
            email,
            phone: profile.phone.clone(),
            avatar_url: profile.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ProfileScreen;

impl ProfileScreen {
    pub async fn show<I: IdentityProvider>(
        &self,
        identity: &I,
        session: &mut SessionContext,
    ) -> ShowOutcome {
        match enter(identity, session, Page::Profile).await {
            Ok(()) => ShowOutcome::Shown(None),
            Err(intent) => ShowOutcome::RedirectToLogin(intent),
        }
    }

    pub fn view(&self, session: &SessionContext) -> Option<ProfileView> {
        session.user().map(ProfileView::from_profile)
    }

    pub const fn booking_rules(&self) -> (&'static str, &'static str) {
        (labels::BOOKING_RULES_TITLE, labels::BOOKING_RULES)
    }

    pub const fn about(&self) -> &'static str {
        labels::ABOUT
    }

    pub const fn logout_prompt(&self) -> (&'static str, &'static str) {
        (labels::LOGOUT_CONFIRM_TITLE, labels::LOGOUT_CONFIRM_PROMPT)
    }

    pub async fn logout<I: IdentityProvider>(
        &self,
        identity: &I,
        session: &mut SessionContext,
    ) -> AuthOutcome {
        auth::logout(identity, session).await
    }
}
