use chrono::FixedOffset;
use tracing::{debug, error};
use uuid::Uuid;

use super::{ShowOutcome, Toast, enter};
use crate::accessor::{DataAccessor, IdentityProvider};
use crate::eligibility::{SlotStatus, slot_status};
use crate::error::Result;
use crate::labels;
use crate::session::{Page, SessionContext};
use crate::time_format::{TimeFormat, format_range};
use crate::types::Course;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCard {
    pub id: Uuid,
    pub name: String,
    pub sport_type: String,
    pub teacher: String,
    pub location: String,
    pub time_range: String,
    pub seats: String,
    pub slot: SlotStatus,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoursesView {
    pub sport_types: Vec<String>,
    pub selected: String,
    pub cards: Vec<CourseCard>,
    pub empty_message: Option<&'static str>,
}

/// Course list with a sport filter.
pub struct CoursesScreen {
    offset: FixedOffset,
    sport_types: Vec<String>,
    selected: String,
    courses: Vec<Course>,
    loading: bool,
}

impl CoursesScreen {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            sport_types: Vec::new(),
            selected: labels::SPORT_ALL.to_string(),
            courses: Vec::new(),
            loading: false,
        }
    }

    pub async fn show<B>(&mut self, backend: &B, session: &mut SessionContext) -> ShowOutcome
    where
        B: DataAccessor + IdentityProvider,
    {
        if let Err(intent) = enter(backend, session, Page::Courses).await {
            return ShowOutcome::RedirectToLogin(intent);
        }
        ShowOutcome::Shown(self.load(backend).await.err())
    }

    /// Pull-to-refresh.
    pub async fn refresh<A: DataAccessor>(&mut self, backend: &A) -> Toast {
        match self.load(backend).await {
            Ok(()) => Toast::success(labels::REFRESHED),
            Err(toast) => toast,
        }
    }

    pub async fn select_sport<A: DataAccessor>(
        &mut self,
        backend: &A,
        sport_type: &str,
    ) -> Option<Toast> {
        self.selected = sport_type.to_string();
        self.loading = true;
        let result = backend.fetch_courses(self.filter()).await;
        self.loading = false;
        self.apply_courses(result).err()
    }

    pub fn view(&self) -> CoursesView {
        let cards: Vec<CourseCard> = self
            .courses
            .iter()
            .map(|course| CourseCard {
                id: course.id,
                name: course.name.clone(),
                sport_type: course.sport_type.clone(),
                teacher: course.teacher.clone(),
                location: course.location.clone(),
                time_range: format_range(
                    course.start_time,
                    course.end_time,
                    TimeFormat::CourseList,
                    self.offset,
                ),
                seats: labels::seat_count(course.booked_slots, course.total_slots),
                slot: slot_status(course),
                image_url: course.image_url.clone(),
            })
            .collect();

        let empty_message = (cards.is_empty() && !self.loading).then_some(labels::NO_COURSES);

        CoursesView {
            sport_types: self.sport_types.clone(),
            selected: self.selected.clone(),
            cards,
            empty_message,
        }
    }

    fn filter(&self) -> Option<&str> {
        (self.selected != labels::SPORT_ALL).then_some(self.selected.as_str())
    }

    async fn load<A: DataAccessor>(&mut self, backend: &A) -> std::result::Result<(), Toast> {
        self.loading = true;
        let (types, courses) = futures::join!(
            backend.fetch_sport_types(),
            backend.fetch_courses(self.filter())
        );
        self.loading = false;

        match types {
            Ok(types) => {
                self.sport_types = std::iter::once(labels::SPORT_ALL.to_string())
                    .chain(types)
                    .collect();
            }
            Err(e) => {
                error!("Failed to load sport types: {}", e);
                return Err(Toast::info(labels::LOAD_FAILED));
            }
        }

        self.apply_courses(courses)
    }

    fn apply_courses(&mut self, result: Result<Vec<Course>>) -> std::result::Result<(), Toast> {
        match result {
            Ok(courses) => {
                debug!("Showing {} course(s) for {}", courses.len(), self.selected);
                self.courses = courses;
                Ok(())
            }
            Err(e) => {
                error!("Failed to load courses: {}", e);
                Err(Toast::info(labels::LOAD_FAILED))
            }
        }
    }
}
