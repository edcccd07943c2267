//! Booking eligibility and slot status derivation.
//!
//! Every screen recomputes these verdicts from a `Course`, an optional
//! `Booking` and the current instant. Nothing here holds state, so the same
//! inputs always produce the same output.

use chrono::{DateTime, Utc};

use crate::labels;
use crate::types::{Booking, BookingStatus, Course};

/// Remaining seats under which a course is flagged as running low.
pub const LOW_SLOT_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotTier {
    Full,
    Low,
    Available,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotStatus {
    pub label: String,
    pub tier: SlotTier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    pub label: &'static str,
    pub disabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagTone {
    Success,
    Info,
    Muted,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTag {
    pub label: &'static str,
    pub tone: TagTone,
}

/// Unbooked capacity of a course.
///
/// Clamped at zero: an upstream row with more booked than total seats reads
/// as full instead of producing a negative count.
pub const fn remaining_slots(course: &Course) -> u32 {
    course.total_slots.saturating_sub(course.booked_slots)
}

pub fn slot_tier(remaining: u32) -> SlotTier {
    match remaining {
        0 => SlotTier::Full,
        1..=LOW_SLOT_THRESHOLD => SlotTier::Low,
        _ => SlotTier::Available,
    }
}

pub fn slot_status(course: &Course) -> SlotStatus {
    let remaining = remaining_slots(course);
    let tier = slot_tier(remaining);
    let label = match tier {
        SlotTier::Full => labels::SLOTS_FULL.to_string(),
        SlotTier::Low => labels::slots_low(remaining),
        SlotTier::Available => labels::slots_available(remaining),
    };
    SlotStatus { label, tier }
}

/// Compact badge shown on the course detail screen.
pub fn slot_badge(course: &Course) -> SlotStatus {
    let remaining = remaining_slots(course);
    let tier = slot_tier(remaining);
    let label = match tier {
        SlotTier::Full => labels::SLOTS_FULL.to_string(),
        SlotTier::Low => labels::slots_low_short(remaining),
        SlotTier::Available => labels::slots_available_short(remaining),
    };
    SlotStatus { label, tier }
}

fn deadline_passed(course: &Course, now: DateTime<Utc>) -> bool {
    now > course.booking_deadline
}

/// Whether a new booking may be requested. Any existing booking row blocks,
/// whatever its status; callers decide which rows they pass in.
pub fn can_book(course: Option<&Course>, existing: Option<&Booking>, now: DateTime<Utc>) -> bool {
    let Some(course) = course else {
        return false;
    };
    existing.is_none() && remaining_slots(course) > 0 && !deadline_passed(course, now)
}

pub fn can_cancel(booking: &Booking, course: &Course, now: DateTime<Utc>) -> bool {
    cancel_block_reason(booking, course, now).is_none()
}

/// Reason a cancellation is refused, or `None` when it is allowed.
pub fn cancel_block_reason(
    booking: &Booking,
    course: &Course,
    now: DateTime<Utc>,
) -> Option<CancelBlock> {
    if !booking.status.is_active() {
        return Some(CancelBlock::Inactive(booking.status));
    }
    if deadline_passed(course, now) {
        return Some(CancelBlock::DeadlinePassed);
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelBlock {
    Inactive(BookingStatus),
    DeadlinePassed,
}

/// First matching rule wins: seat exhaustion is reported before the deadline.
pub fn button_state(
    course: Option<&Course>,
    existing: Option<&Booking>,
    now: DateTime<Utc>,
) -> ButtonState {
    let (label, disabled) = match course {
        None => (labels::BUTTON_LOADING, true),
        Some(_) if existing.is_some() => (labels::BUTTON_ALREADY_BOOKED, true),
        Some(course) if remaining_slots(course) == 0 => (labels::BUTTON_FULL, true),
        Some(course) if deadline_passed(course, now) => (labels::BUTTON_DEADLINE_PASSED, true),
        Some(_) => (labels::BUTTON_BOOK_NOW, false),
    };
    ButtonState { label, disabled }
}

pub const fn status_tag(status: BookingStatus) -> StatusTag {
    match status {
        BookingStatus::Confirmed => StatusTag {
            label: labels::STATUS_CONFIRMED,
            tone: TagTone::Success,
        },
        BookingStatus::Completed => StatusTag {
            label: labels::STATUS_COMPLETED,
            tone: TagTone::Info,
        },
        BookingStatus::Cancelled => StatusTag {
            label: labels::STATUS_CANCELLED,
            tone: TagTone::Muted,
        },
        BookingStatus::Pending => StatusTag {
            label: labels::STATUS_PENDING,
            tone: TagTone::Warning,
        },
    }
}

/// Everything a screen needs to render one course for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub remaining_slots: u32,
    pub can_book: bool,
    pub can_cancel: bool,
    pub label: String,
    pub tier: SlotTier,
}

impl Verdict {
    pub fn evaluate(course: &Course, booking: Option<&Booking>, now: DateTime<Utc>) -> Self {
        let status = slot_status(course);
        Self {
            remaining_slots: remaining_slots(course),
            can_book: can_book(Some(course), booking, now),
            can_cancel: booking.is_some_and(|b| can_cancel(b, course, now)),
            label: status.label,
            tier: status.tier,
        }
    }
}
