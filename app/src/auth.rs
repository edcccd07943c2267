//! Login, registration and logout.

use regex::Regex;
use tracing::{error, info, warn};

use crate::accessor::IdentityProvider;
use crate::error::BookingError;
use crate::labels;
use crate::screens::Toast;
use crate::session::{Navigation, NavigationIntent, Page, SessionContext};

const USERNAME_PATTERN: &str = r"^[a-zA-Z0-9_]+$";

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub agreed: bool,
}

impl LoginForm {
    /// Returns the message to show when the form cannot be submitted.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.agreed {
            return Err(labels::LOGIN_AGREEMENT_REQUIRED);
        }
        if self.username.trim().is_empty() || self.password.trim().is_empty() {
            return Err(labels::LOGIN_FIELDS_REQUIRED);
        }
        let valid = Regex::new(USERNAME_PATTERN).is_ok_and(|re| re.is_match(&self.username));
        if !valid {
            return Err(labels::LOGIN_USERNAME_INVALID);
        }
        Ok(())
    }
}

/// Accounts are keyed by a synthetic email derived from the username.
pub fn login_email(username: &str, domain: &str) -> String {
    format!("{username}@{domain}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub toast: Toast,
    /// Set only when the user should leave the current page.
    pub navigation: Option<Navigation>,
}

impl AuthOutcome {
    fn stay(message: impl Into<String>) -> Self {
        Self {
            toast: Toast::info(message),
            navigation: None,
        }
    }
}

fn failure_message(e: &BookingError) -> String {
    match e {
        BookingError::Auth(msg) => msg.clone(),
        other => {
            error!("Login request failed: {}", other);
            labels::LOGIN_FAILED.to_string()
        }
    }
}

/// Sign in with username and password, registering the account on first use.
pub async fn login_with_password<I: IdentityProvider>(
    identity: &I,
    session: &mut SessionContext,
    form: &LoginForm,
    email_domain: &str,
    intent: Option<NavigationIntent>,
) -> AuthOutcome {
    if let Err(message) = form.validate() {
        return AuthOutcome::stay(message);
    }

    let email = login_email(&form.username, email_domain);

    let registered = match identity.sign_in_with_password(&email, &form.password).await {
        Ok(()) => false,
        Err(e) if e.is_invalid_credentials() => {
            info!("Unknown credentials for {}, registering", email);
            if let Err(e) = identity
                .sign_up(&email, &form.password, &form.username)
                .await
            {
                return AuthOutcome::stay(failure_message(&e));
            }
            true
        }
        Err(e) => return AuthOutcome::stay(failure_message(&e)),
    };

    let success = if registered {
        labels::SIGNUP_SUCCESS
    } else {
        labels::LOGIN_SUCCESS
    };
    finish_login(identity, session, success, intent).await
}

/// Sign in with a code obtained from the mini-program host.
pub async fn login_with_wechat<I: IdentityProvider>(
    identity: &I,
    session: &mut SessionContext,
    code: &str,
    agreed: bool,
    intent: Option<NavigationIntent>,
) -> AuthOutcome {
    if !agreed {
        return AuthOutcome::stay(labels::LOGIN_AGREEMENT_REQUIRED);
    }

    if let Err(e) = identity.exchange_wechat_code(code).await {
        return AuthOutcome::stay(failure_message(&e));
    }

    finish_login(identity, session, labels::LOGIN_SUCCESS, intent).await
}

async fn finish_login<I: IdentityProvider>(
    identity: &I,
    session: &mut SessionContext,
    success: &str,
    intent: Option<NavigationIntent>,
) -> AuthOutcome {
    match identity.current_user().await {
        Ok(Some(user)) => {
            info!("Session established for user {}", user.id);
            session.populate(user);
            AuthOutcome {
                toast: Toast::success(success),
                navigation: Some(NavigationIntent::resume(intent)),
            }
        }
        Ok(None) => {
            warn!("Signed in but no profile is available");
            AuthOutcome::stay(labels::LOGIN_FAILED)
        }
        Err(e) => {
            error!("Failed to load profile after login: {}", e);
            AuthOutcome::stay(labels::LOGIN_FAILED)
        }
    }
}

pub async fn logout<I: IdentityProvider>(identity: &I, session: &mut SessionContext) -> AuthOutcome {
    match identity.sign_out().await {
        Ok(()) => {
            session.clear();
            AuthOutcome {
                toast: Toast::success(labels::LOGOUT_SUCCESS),
                navigation: Some(Navigation::NavigateTo(Page::Login)),
            }
        }
        Err(e) => {
            error!("Logout failed: {}", e);
            AuthOutcome::stay(labels::LOGOUT_FAILED)
        }
    }
}
