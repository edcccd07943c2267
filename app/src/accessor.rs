//! Collaborator interfaces the screens are written against.
//!
//! Reads return `Result` so a screen can tell "nothing there" (`None`, empty
//! list) apart from "the request failed". The two booking procedures never
//! fail: problems come back as `success: false` with a message for the user.

use uuid::Uuid;

use crate::error::Result;
use crate::types::{
    BookCourseResult, Booking, BookingStatus, BookingWithCourse, CancelBookingResult, Course,
    Profile,
};

#[allow(async_fn_in_trait)]
pub trait DataAccessor {
    /// Courses ordered by start time, optionally restricted to one sport.
    async fn fetch_courses(&self, sport_type: Option<&str>) -> Result<Vec<Course>>;

    /// Distinct sport categories in ascending order.
    async fn fetch_sport_types(&self) -> Result<Vec<String>>;

    async fn fetch_course(&self, course_id: Uuid) -> Result<Option<Course>>;

    /// The user's `confirmed` or `pending` booking for a course, if any.
    async fn fetch_user_booking(&self, user_id: Uuid, course_id: Uuid) -> Result<Option<Booking>>;

    /// All of the user's bookings, newest first.
    async fn fetch_user_bookings(&self, user_id: Uuid) -> Result<Vec<BookingWithCourse>>;

    async fn fetch_user_bookings_by_status(
        &self,
        user_id: Uuid,
        status: BookingStatus,
    ) -> Result<Vec<BookingWithCourse>>;

    async fn create_booking(&self, user_id: Uuid, course_id: Uuid) -> BookCourseResult;

    async fn cancel_booking(&self, booking_id: Uuid, user_id: Uuid) -> CancelBookingResult;
}

#[allow(async_fn_in_trait)]
pub trait IdentityProvider {
    /// Profile of the signed-in user, `None` without a valid session.
    async fn current_user(&self) -> Result<Option<Profile>>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<()>;

    async fn sign_up(&self, email: &str, password: &str, username: &str) -> Result<()>;

    /// Trade a mini-program login code for a session.
    async fn exchange_wechat_code(&self, code: &str) -> Result<()>;

    async fn sign_out(&self) -> Result<()>;
}
