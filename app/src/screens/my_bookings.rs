use chrono::FixedOffset;
use tracing::{error, info};
use uuid::Uuid;

use super::{ShowOutcome, Toast, enter};
use crate::accessor::{DataAccessor, IdentityProvider};
use crate::clock::Clock;
use crate::eligibility::{CancelBlock, StatusTag, can_cancel, cancel_block_reason, status_tag};
use crate::labels;
use crate::session::{Page, SessionContext};
use crate::time_format::{TimeFormat, format_range};
use crate::types::{BookingStatus, BookingWithCourse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingTab {
    All,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingTab {
    pub const ALL: [Self; 4] = [Self::All, Self::Confirmed, Self::Completed, Self::Cancelled];

    pub const fn key(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => labels::TAB_ALL,
            Self::Confirmed => labels::TAB_CONFIRMED,
            Self::Completed => labels::TAB_COMPLETED,
            Self::Cancelled => labels::TAB_CANCELLED,
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.key() == key)
    }

    const fn status(self) -> Option<BookingStatus> {
        match self {
            Self::All => None,
            Self::Confirmed => Some(BookingStatus::Confirmed),
            Self::Completed => Some(BookingStatus::Completed),
            Self::Cancelled => Some(BookingStatus::Cancelled),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingCard {
    pub booking_id: Uuid,
    pub course_id: Uuid,
    pub course_name: String,
    pub sport_type: String,
    pub location: String,
    pub teacher: String,
    pub time_range: String,
    pub status: StatusTag,
    pub can_cancel: bool,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MyBookingsView {
    pub selected: BookingTab,
    pub cards: Vec<BookingCard>,
    pub empty_message: Option<&'static str>,
}

/// First step of a cancellation: either refuse outright or ask to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelRequest {
    Refused(Toast),
    Confirm {
        booking_id: Uuid,
        title: &'static str,
        prompt: String,
    },
}

pub struct MyBookingsScreen {
    offset: FixedOffset,
    bookings: Vec<BookingWithCourse>,
    selected: BookingTab,
    loading: bool,
}

impl MyBookingsScreen {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            bookings: Vec::new(),
            selected: BookingTab::All,
            loading: false,
        }
    }

    pub async fn show<B>(&mut self, backend: &B, session: &mut SessionContext) -> ShowOutcome
    where
        B: DataAccessor + IdentityProvider,
    {
        if let Err(intent) = enter(backend, session, Page::MyBookings).await {
            return ShowOutcome::RedirectToLogin(intent);
        }
        ShowOutcome::Shown(self.load(backend, session).await)
    }

    async fn load<A: DataAccessor>(&mut self, backend: &A, session: &SessionContext) -> Option<Toast> {
        let user = session.user()?;
        self.loading = true;
        let result = backend.fetch_user_bookings(user.id).await;
        self.loading = false;

        match result {
            Ok(bookings) => {
                self.bookings = bookings;
                None
            }
            Err(e) => {
                error!("Failed to load bookings for user {}: {}", user.id, e);
                Some(Toast::info(labels::LOAD_FAILED))
            }
        }
    }

    pub fn select_tab(&mut self, tab: BookingTab) {
        self.selected = tab;
    }

    fn visible(&self) -> impl Iterator<Item = &BookingWithCourse> {
        let status = self.selected.status();
        self.bookings
            .iter()
            .filter(move |row| status.is_none_or(|s| row.booking.status == s))
    }

    pub fn view<C: Clock>(&self, clock: &C) -> MyBookingsView {
        let now = clock.now();
        let cards: Vec<BookingCard> = self
            .visible()
            .map(|row| BookingCard {
                booking_id: row.booking.id,
                course_id: row.course.id,
                course_name: row.course.name.clone(),
                sport_type: row.course.sport_type.clone(),
                location: row.course.location.clone(),
                teacher: row.course.teacher.clone(),
                time_range: format_range(
                    row.course.start_time,
                    row.course.end_time,
                    TimeFormat::BookingList,
                    self.offset,
                ),
                status: status_tag(row.booking.status),
                can_cancel: can_cancel(&row.booking, &row.course, now),
                image_url: row.course.image_url.clone(),
            })
            .collect();

        let empty_message = (cards.is_empty() && !self.loading).then_some(labels::NO_BOOKINGS);

        MyBookingsView {
            selected: self.selected,
            cards,
            empty_message,
        }
    }

    /// `None` when the booking is unknown or its status cannot be cancelled.
    pub fn request_cancel<C: Clock>(&self, booking_id: Uuid, clock: &C) -> Option<CancelRequest> {
        let row = self.bookings.iter().find(|row| row.booking.id == booking_id)?;
        match cancel_block_reason(&row.booking, &row.course, clock.now()) {
            None => Some(CancelRequest::Confirm {
                booking_id,
                title: labels::CANCEL_CONFIRM_TITLE,
                prompt: labels::cancel_confirm_prompt(&row.course.name),
            }),
            Some(CancelBlock::DeadlinePassed) => {
                Some(CancelRequest::Refused(Toast::info(labels::CANCEL_AFTER_DEADLINE)))
            }
            Some(CancelBlock::Inactive(_)) => None,
        }
    }

    /// Run a confirmed cancellation. The deadline is checked again since time
    /// may have passed while the prompt was open.
    pub async fn confirm_cancel<A, C>(
        &mut self,
        backend: &A,
        session: &SessionContext,
        booking_id: Uuid,
        clock: &C,
    ) -> Option<Toast>
    where
        A: DataAccessor,
        C: Clock,
    {
        let user_id = session.user()?.id;
        if let CancelRequest::Refused(toast) = self.request_cancel(booking_id, clock)? {
            return Some(toast);
        }

        let result = backend.cancel_booking(booking_id, user_id).await;
        if result.success {
            info!("Cancelled booking {}", booking_id);
            let reload = self.load(backend, session).await;
            Some(reload.unwrap_or_else(|| Toast::success(labels::CANCEL_SUCCESS)))
        } else {
            Some(Toast::info(result.message))
        }
    }
}
