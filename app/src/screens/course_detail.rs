use chrono::FixedOffset;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{ShowOutcome, Toast, enter};
use crate::accessor::{DataAccessor, IdentityProvider};
use crate::clock::Clock;
use crate::eligibility::{ButtonState, SlotStatus, button_state, can_book, slot_badge};
use crate::labels;
use crate::session::{Page, SessionContext};
use crate::time_format::{TimeFormat, format_time};
use crate::types::{Booking, Course};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDetailView {
    pub name: String,
    pub sport_type: String,
    pub seats: String,
    pub badge: SlotStatus,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub teacher: String,
    pub booking_deadline: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub button: ButtonState,
}

pub struct CourseDetailScreen {
    course_id: Uuid,
    offset: FixedOffset,
    course: Option<Course>,
    booking: Option<Booking>,
    busy: bool,
}

impl CourseDetailScreen {
    pub fn new(course_id: Uuid, offset: FixedOffset) -> Self {
        Self {
            course_id,
            offset,
            course: None,
            booking: None,
            busy: false,
        }
    }

    pub const fn course(&self) -> Option<&Course> {
        self.course.as_ref()
    }

    pub const fn booking(&self) -> Option<&Booking> {
        self.booking.as_ref()
    }

    pub async fn show<B>(&mut self, backend: &B, session: &mut SessionContext) -> ShowOutcome
    where
        B: DataAccessor + IdentityProvider,
    {
        let page = Page::CourseDetail {
            course_id: self.course_id,
        };
        if let Err(intent) = enter(backend, session, page).await {
            return ShowOutcome::RedirectToLogin(intent);
        }
        ShowOutcome::Shown(self.load(backend, session).await)
    }

    async fn load<A: DataAccessor>(&mut self, backend: &A, session: &SessionContext) -> Option<Toast> {
        let user = session.user()?;

        let course = match backend.fetch_course(self.course_id).await {
            Ok(course) => course,
            Err(e) => {
                error!("Failed to load course {}: {}", self.course_id, e);
                return Some(Toast::info(labels::LOAD_FAILED));
            }
        };
        if course.is_none() {
            warn!("Course {} not found", self.course_id);
        }
        self.course = course;

        match backend.fetch_user_booking(user.id, self.course_id).await {
            Ok(booking) => {
                self.booking = booking;
                None
            }
            Err(e) => {
                error!("Failed to check booking for course {}: {}", self.course_id, e);
                Some(Toast::info(labels::LOAD_FAILED))
            }
        }
    }

    pub fn button<C: Clock>(&self, clock: &C) -> ButtonState {
        if self.busy {
            return ButtonState {
                label: labels::BUTTON_PROCESSING,
                disabled: true,
            };
        }
        button_state(self.course.as_ref(), self.booking.as_ref(), clock.now())
    }

    /// `None` while the course has not loaded.
    pub fn view<C: Clock>(&self, clock: &C) -> Option<CourseDetailView> {
        let course = self.course.as_ref()?;
        let format = |instant| format_time(instant, TimeFormat::Detail, self.offset);

        Some(CourseDetailView {
            name: course.name.clone(),
            sport_type: course.sport_type.clone(),
            seats: labels::seat_count(course.booked_slots, course.total_slots),
            badge: slot_badge(course),
            start_time: format(course.start_time),
            end_time: format(course.end_time),
            location: course.location.clone(),
            teacher: course.teacher.clone(),
            booking_deadline: format(course.booking_deadline),
            description: course.description.clone(),
            image_url: course.image_url.clone(),
            button: self.button(clock),
        })
    }

    /// Book the course for the signed-in user. Returns `None` when the button
    /// is not actionable.
    pub async fn book<A, C>(
        &mut self,
        backend: &A,
        session: &SessionContext,
        clock: &C,
    ) -> Option<Toast>
    where
        A: DataAccessor,
        C: Clock,
    {
        let user_id = session.user()?.id;
        let course_id = {
            let course = self.course.as_ref()?;
            if self.busy || !can_book(Some(course), self.booking.as_ref(), clock.now()) {
                return None;
            }
            course.id
        };

        self.busy = true;
        let result = backend.create_booking(user_id, course_id).await;
        let toast = if result.success {
            info!("Booked course {} as {:?}", self.course_id, result.booking_id);
            let reload = self.load(backend, session).await;
            reload.unwrap_or_else(|| Toast::success(labels::BOOK_SUCCESS))
        } else {
            Toast::info(result.message)
        };
        self.busy = false;
        Some(toast)
    }
}
