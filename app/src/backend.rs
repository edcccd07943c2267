use crate::accessor::{DataAccessor, IdentityProvider};
use crate::config::Config;
use crate::error::{BookingError, Result};
use crate::labels;
use crate::types::{
    BookCourseResult, Booking, BookingStatus, BookingWithCourse, CancelBookingResult, Course,
    Profile,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const BOOKING_WITH_COURSE: &str = "*,course:courses(*)";

/// Client for the hosted backend: table reads, the two booking procedures
/// and the auth endpoints. The access token obtained at login is kept here
/// and attached to every later request.
pub struct BackendClient {
    client: Client,
    base_url: String,
    anon_key: String,
    access_token: RwLock<Option<String>>,
}

#[derive(Deserialize)]
struct AuthUser {
    id: Uuid,
}

#[derive(Deserialize)]
struct SportTypeRow {
    sport_type: String,
}

#[derive(Deserialize)]
struct WechatLoginResponse {
    token: String,
}

impl BackendClient {
    pub fn new(base_url: String, anon_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(BookingError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            access_token: RwLock::new(None),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.backend_url.clone(),
            config.anon_key.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub async fn has_session(&self) -> bool {
        self.access_token.read().await.is_some()
    }

    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .access_token
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.anon_key.clone());
        request
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(bearer)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let url = format!("{}/rest/v1/{table}", self.base_url);
        let response = self
            .authorize(self.client.get(&url).query(query))
            .await
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BookingError::from_status(status, &format!("table={table}")));
        }

        let body = response.text().await?;
        debug!("Fetched {} bytes from table {}", body.len(), table);
        Ok(serde_json::from_str(&body)?)
    }

    async fn rpc<T: DeserializeOwned>(&self, function: &str, args: Value) -> Result<T> {
        let url = format!("{}/rest/v1/rpc/{function}", self.base_url);
        let response = self
            .authorize(self.client.post(&url).json(&args))
            .await
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BookingError::from_status(status, &format!("rpc={function}")));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn auth_post(&self, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .authorize(self.client.post(&url).json(body))
            .await
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(BookingError::Auth(error_message(&text, status)));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Keep the access token from a session payload. Returns whether one was
    /// present.
    async fn store_session(&self, session: &Value) -> bool {
        match session.get("access_token").and_then(Value::as_str) {
            Some(token) => {
                *self.access_token.write().await = Some(token.to_string());
                true
            }
            None => false,
        }
    }

    pub async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let rows: Vec<Profile> = self
            .select(
                "profiles",
                &[("select", "*".to_string()), ("id", format!("eq.{user_id}"))],
            )
            .await?;
        Ok(rows.into_iter().next())
    }
}

fn error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["msg", "error_description", "message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("HTTP {status}")
            } else {
                trimmed.to_string()
            }
        })
}

fn report_overbooked<'a>(courses: impl IntoIterator<Item = &'a Course>) {
    for course in courses {
        if course.is_overbooked() {
            warn!(
                "Course {} has {} booked of {} total slots",
                course.id, course.booked_slots, course.total_slots
            );
        }
    }
}

impl DataAccessor for BackendClient {
    async fn fetch_courses(&self, sport_type: Option<&str>) -> Result<Vec<Course>> {
        let mut query = vec![
            ("select", "*".to_string()),
            ("order", "start_time.asc".to_string()),
        ];
        if let Some(sport) = sport_type {
            query.push(("sport_type", format!("eq.{sport}")));
        }

        let courses: Vec<Course> = self.select("courses", &query).await?;
        report_overbooked(&courses);
        Ok(courses)
    }

    async fn fetch_sport_types(&self) -> Result<Vec<String>> {
        let rows: Vec<SportTypeRow> = self
            .select(
                "courses",
                &[
                    ("select", "sport_type".to_string()),
                    ("order", "sport_type.asc".to_string()),
                ],
            )
            .await?;

        let mut seen = HashSet::new();
        Ok(rows
            .into_iter()
            .map(|row| row.sport_type)
            .filter(|sport| seen.insert(sport.clone()))
            .collect())
    }

    async fn fetch_course(&self, course_id: Uuid) -> Result<Option<Course>> {
        let rows: Vec<Course> = self
            .select(
                "courses",
                &[("select", "*".to_string()), ("id", format!("eq.{course_id}"))],
            )
            .await?;
        report_overbooked(&rows);
        Ok(rows.into_iter().next())
    }

    async fn fetch_user_booking(&self, user_id: Uuid, course_id: Uuid) -> Result<Option<Booking>> {
        let rows: Vec<Booking> = self
            .select(
                "bookings",
                &[
                    ("select", "*".to_string()),
                    ("user_id", format!("eq.{user_id}")),
                    ("course_id", format!("eq.{course_id}")),
                    ("status", "in.(confirmed,pending)".to_string()),
                ],
            )
            .await?;

        if rows.len() > 1 {
            warn!(
                "User {} holds {} active bookings for course {}",
                user_id,
                rows.len(),
                course_id
            );
        }
        Ok(rows.into_iter().next())
    }

    async fn fetch_user_bookings(&self, user_id: Uuid) -> Result<Vec<BookingWithCourse>> {
        let rows: Vec<BookingWithCourse> = self
            .select(
                "bookings",
                &[
                    ("select", BOOKING_WITH_COURSE.to_string()),
                    ("user_id", format!("eq.{user_id}")),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await?;
        report_overbooked(rows.iter().map(|row| &row.course));
        Ok(rows)
    }

    async fn fetch_user_bookings_by_status(
        &self,
        user_id: Uuid,
        status: BookingStatus,
    ) -> Result<Vec<BookingWithCourse>> {
        self.select(
            "bookings",
            &[
                ("select", BOOKING_WITH_COURSE.to_string()),
                ("user_id", format!("eq.{user_id}")),
                ("status", format!("eq.{status}")),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn create_booking(&self, user_id: Uuid, course_id: Uuid) -> BookCourseResult {
        let args = json!({ "p_user_id": user_id, "p_course_id": course_id });
        match self.rpc::<BookCourseResult>("book_course", args).await {
            Ok(result) => {
                info!(
                    "book_course for course {}: success={} ({})",
                    course_id, result.success, result.message
                );
                result
            }
            Err(e) => {
                error!("Failed to book course {}: {}", course_id, e);
                BookCourseResult::failure(labels::BOOK_FAILED)
            }
        }
    }

    async fn cancel_booking(&self, booking_id: Uuid, user_id: Uuid) -> CancelBookingResult {
        let args = json!({ "p_booking_id": booking_id, "p_user_id": user_id });
        match self
            .rpc::<CancelBookingResult>("cancel_booking", args)
            .await
        {
            Ok(result) => {
                info!(
                    "cancel_booking for booking {}: success={} ({})",
                    booking_id, result.success, result.message
                );
                result
            }
            Err(e) => {
                error!("Failed to cancel booking {}: {}", booking_id, e);
                CancelBookingResult::failure(labels::CANCEL_FAILED)
            }
        }
    }
}

impl IdentityProvider for BackendClient {
    async fn current_user(&self) -> Result<Option<Profile>> {
        let Some(token) = self.access_token.read().await.clone() else {
            return Ok(None);
        };

        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!("Session rejected by backend ({}), dropping access token", status);
            *self.access_token.write().await = None;
            return Ok(None);
        }
        if !status.is_success() {
            return Err(BookingError::from_status(status, "auth user"));
        }

        let user: AuthUser = serde_json::from_str(&response.text().await?)?;
        self.fetch_profile(user.id).await
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<()> {
        let session = self
            .auth_post(
                "/auth/v1/token?grant_type=password",
                &json!({ "email": email, "password": password }),
            )
            .await?;

        if self.store_session(&session).await {
            info!("Signed in as {}", email);
            Ok(())
        } else {
            Err(BookingError::InvalidResponse(
                "sign-in response carried no access token".to_string(),
            ))
        }
    }

    async fn sign_up(&self, email: &str, password: &str, username: &str) -> Result<()> {
        let session = self
            .auth_post(
                "/auth/v1/signup",
                &json!({
                    "email": email,
                    "password": password,
                    "data": { "username": username }
                }),
            )
            .await?;

        if self.store_session(&session).await {
            info!("Registered new account {}", email);
        } else {
            warn!("Account {} registered without a session", email);
        }
        Ok(())
    }

    async fn exchange_wechat_code(&self, code: &str) -> Result<()> {
        let login = self
            .auth_post(
                "/functions/v1/wechat-miniprogram-login",
                &json!({ "code": code }),
            )
            .await?;
        let login: WechatLoginResponse = serde_json::from_value(login)?;

        let session = self
            .auth_post(
                "/auth/v1/verify",
                &json!({ "token_hash": login.token, "type": "email" }),
            )
            .await?;

        if self.store_session(&session).await {
            info!("Signed in through mini-program login");
            Ok(())
        } else {
            Err(BookingError::Auth(
                "verification returned no session".to_string(),
            ))
        }
    }

    async fn sign_out(&self) -> Result<()> {
        let token = self.access_token.write().await.take();
        let Some(token) = token else {
            return Ok(());
        };

        let url = format!("{}/auth/v1/logout", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Logout returned {}", response.status());
        }
        Ok(())
    }
}
