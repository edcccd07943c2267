//! In-memory stand-in for the hosted backend.
//!
//! Applies the same rules the remote `book_course` / `cancel_booking`
//! procedures enforce so screens can be driven end to end without a server.
#![allow(dead_code, clippy::unwrap_used, clippy::missing_const_for_fn)]

use app::accessor::{DataAccessor, IdentityProvider};
use app::error::{BookingError, Result};
use app::types::{
    BookCourseResult, Booking, BookingStatus, BookingWithCourse, CancelBookingResult, Course,
    Profile, UserRole,
};
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 1, 0, 0).unwrap()
}

pub fn beijing() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

pub fn course(name: &str, sport: &str, total: u32, booked: u32, deadline: DateTime<Utc>) -> Course {
    Course {
        id: Uuid::new_v4(),
        name: name.to_string(),
        sport_type: sport.to_string(),
        teacher: "陈教练".to_string(),
        location: "东区体育馆".to_string(),
        start_time: deadline + Duration::hours(12),
        end_time: deadline + Duration::hours(13),
        total_slots: total,
        booked_slots: booked,
        image_url: None,
        description: Some("适合初学者".to_string()),
        booking_deadline: deadline,
        created_at: t0() - Duration::days(30),
    }
}

pub fn profile(username: &str) -> Profile {
    Profile {
        id: Uuid::new_v4(),
        username: Some(username.to_string()),
        email: Some(format!("{username}@miaoda.com")),
        phone: None,
        openid: None,
        nickname: None,
        avatar_url: None,
        role: UserRole::User,
        created_at: t0() - Duration::days(10),
    }
}

struct Account {
    password: String,
    user_id: Uuid,
}

#[derive(Default)]
struct State {
    courses: Vec<Course>,
    bookings: Vec<Booking>,
    profiles: Vec<Profile>,
    accounts: HashMap<String, Account>,
    current: Option<Uuid>,
    fail_reads: bool,
    fail_sign_out: bool,
}

pub struct InMemoryBackend {
    state: Mutex<State>,
    now: DateTime<Utc>,
}

impl InMemoryBackend {
    /// `now` is the instant the fake "server" checks deadlines against.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: Mutex::new(State::default()),
            now,
        }
    }

    pub fn add_course(&self, course: Course) -> Uuid {
        let id = course.id;
        self.state.lock().unwrap().courses.push(course);
        id
    }

    pub fn add_booking(&self, user_id: Uuid, course_id: Uuid, status: BookingStatus) -> Uuid {
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            status,
            created_at: self.now - Duration::hours(1),
            cancelled_at: None,
        };
        let id = booking.id;
        self.state.lock().unwrap().bookings.push(booking);
        id
    }

    pub fn add_account(&self, username: &str, email_domain: &str, password: &str) -> Profile {
        let profile = profile(username);
        let mut state = self.state.lock().unwrap();
        state.accounts.insert(
            format!("{username}@{email_domain}"),
            Account {
                password: password.to_string(),
                user_id: profile.id,
            },
        );
        state.profiles.push(profile.clone());
        profile
    }

    /// Register an account and start a session for it.
    pub fn sign_in_as(&self, username: &str) -> Profile {
        let profile = self.add_account(username, "miaoda.com", "password");
        self.state.lock().unwrap().current = Some(profile.id);
        profile
    }

    pub fn course(&self, id: Uuid) -> Course {
        let state = self.state.lock().unwrap();
        state.courses.iter().find(|c| c.id == id).cloned().unwrap()
    }

    pub fn booking(&self, id: Uuid) -> Booking {
        let state = self.state.lock().unwrap();
        state.bookings.iter().find(|b| b.id == id).cloned().unwrap()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    pub fn set_fail_sign_out(&self, fail: bool) {
        self.state.lock().unwrap().fail_sign_out = fail;
    }

    pub fn current_user_id(&self) -> Uuid {
        self.state.lock().unwrap().current.unwrap()
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.lock().unwrap().current.is_some()
    }

    fn check_reads(&self) -> Result<()> {
        if self.state.lock().unwrap().fail_reads {
            return Err(BookingError::InvalidResponse(
                "HTTP 500 Internal Server Error".to_string(),
            ));
        }
        Ok(())
    }

    fn join(state: &State, booking: &Booking) -> BookingWithCourse {
        let course = state
            .courses
            .iter()
            .find(|c| c.id == booking.course_id)
            .cloned()
            .unwrap();
        BookingWithCourse {
            booking: booking.clone(),
            course,
        }
    }
}

impl DataAccessor for InMemoryBackend {
    async fn fetch_courses(&self, sport_type: Option<&str>) -> Result<Vec<Course>> {
        self.check_reads()?;
        let state = self.state.lock().unwrap();
        let mut courses: Vec<Course> = state
            .courses
            .iter()
            .filter(|c| sport_type.is_none_or(|s| c.sport_type == s))
            .cloned()
            .collect();
        courses.sort_by_key(|c| c.start_time);
        Ok(courses)
    }

    async fn fetch_sport_types(&self) -> Result<Vec<String>> {
        self.check_reads()?;
        let state = self.state.lock().unwrap();
        let mut types: Vec<String> = state.courses.iter().map(|c| c.sport_type.clone()).collect();
        types.sort();
        types.dedup();
        Ok(types)
    }

    async fn fetch_course(&self, course_id: Uuid) -> Result<Option<Course>> {
        self.check_reads()?;
        let state = self.state.lock().unwrap();
        Ok(state.courses.iter().find(|c| c.id == course_id).cloned())
    }

    async fn fetch_user_booking(&self, user_id: Uuid, course_id: Uuid) -> Result<Option<Booking>> {
        self.check_reads()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .bookings
            .iter()
            .find(|b| b.user_id == user_id && b.course_id == course_id && b.status.is_active())
            .cloned())
    }

    async fn fetch_user_bookings(&self, user_id: Uuid) -> Result<Vec<BookingWithCourse>> {
        self.check_reads()?;
        let state = self.state.lock().unwrap();
        let mut rows: Vec<BookingWithCourse> = state
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .map(|b| Self::join(&state, b))
            .collect();
        rows.sort_by(|a, b| b.booking.created_at.cmp(&a.booking.created_at));
        Ok(rows)
    }

    async fn fetch_user_bookings_by_status(
        &self,
        user_id: Uuid,
        status: BookingStatus,
    ) -> Result<Vec<BookingWithCourse>> {
        let rows = self.fetch_user_bookings(user_id).await?;
        Ok(rows
            .into_iter()
            .filter(|row| row.booking.status == status)
            .collect())
    }

    async fn create_booking(&self, user_id: Uuid, course_id: Uuid) -> BookCourseResult {
        let mut state = self.state.lock().unwrap();
        let already = state
            .bookings
            .iter()
            .any(|b| b.user_id == user_id && b.course_id == course_id && b.status.is_active());
        let Some(course) = state.courses.iter_mut().find(|c| c.id == course_id) else {
            return BookCourseResult::failure("课程不存在");
        };
        if already {
            return BookCourseResult::failure("您已预约该课程");
        }
        if course.booked_slots >= course.total_slots {
            return BookCourseResult::failure("名额已满");
        }
        if self.now > course.booking_deadline {
            return BookCourseResult::failure("预约已截止");
        }
        course.booked_slots += 1;

        let booking = Booking {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            status: BookingStatus::Confirmed,
            created_at: self.now,
            cancelled_at: None,
        };
        let booking_id = booking.id;
        state.bookings.push(booking);
        BookCourseResult {
            success: true,
            message: "预约成功".to_string(),
            booking_id: Some(booking_id),
        }
    }

    async fn cancel_booking(&self, booking_id: Uuid, user_id: Uuid) -> CancelBookingResult {
        let mut state = self.state.lock().unwrap();
        let now = self.now;
        let Some(index) = state
            .bookings
            .iter()
            .position(|b| b.id == booking_id && b.user_id == user_id)
        else {
            return CancelBookingResult::failure("预约不存在");
        };
        let course_id = state.bookings[index].course_id;
        if !state.bookings[index].status.is_active() {
            return CancelBookingResult::failure("该预约无法取消");
        }
        let Some(course) = state.courses.iter_mut().find(|c| c.id == course_id) else {
            return CancelBookingResult::failure("课程不存在");
        };
        if now > course.booking_deadline {
            return CancelBookingResult::failure("已超过截止时间");
        }
        course.booked_slots = course.booked_slots.saturating_sub(1);
        let booking = &mut state.bookings[index];
        booking.status = BookingStatus::Cancelled;
        booking.cancelled_at = Some(now);
        CancelBookingResult {
            success: true,
            message: "取消成功".to_string(),
        }
    }
}

impl IdentityProvider for InMemoryBackend {
    async fn current_user(&self) -> Result<Option<Profile>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .current
            .and_then(|id| state.profiles.iter().find(|p| p.id == id).cloned()))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let user_id = match state.accounts.get(email) {
            Some(account) if account.password == password => account.user_id,
            _ => {
                return Err(BookingError::Auth(
                    "Invalid login credentials".to_string(),
                ));
            }
        };
        state.current = Some(user_id);
        Ok(())
    }

    async fn sign_up(&self, email: &str, password: &str, username: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.accounts.contains_key(email) {
            return Err(BookingError::Auth("User already registered".to_string()));
        }
        let mut new_profile = profile(username);
        new_profile.email = Some(email.to_string());
        state.accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user_id: new_profile.id,
            },
        );
        state.current = Some(new_profile.id);
        state.profiles.push(new_profile);
        Ok(())
    }

    async fn exchange_wechat_code(&self, code: &str) -> Result<()> {
        if code != "valid-code" {
            return Err(BookingError::Auth("invalid login code".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        let mut new_profile = profile("wx_user");
        new_profile.email = Some("wx_user@wechat.login".to_string());
        new_profile.nickname = Some("微信用户".to_string());
        state.current = Some(new_profile.id);
        state.profiles.push(new_profile);
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_sign_out {
            return Err(BookingError::InvalidResponse(
                "HTTP 502 Bad Gateway".to_string(),
            ));
        }
        state.current = None;
        Ok(())
    }
}
