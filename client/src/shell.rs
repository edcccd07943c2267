//! Page state and command dispatch for the terminal client.

use chrono::FixedOffset;
use tracing::{debug, info};
use uuid::Uuid;

use app::accessor::{DataAccessor, IdentityProvider};
use app::auth::{self, AuthOutcome, LoginForm};
use app::clock::Clock;
use app::labels;
use app::screens::course_detail::CourseDetailScreen;
use app::screens::courses::CoursesScreen;
use app::screens::my_bookings::{CancelRequest, MyBookingsScreen};
use app::screens::profile::ProfileScreen;
use app::screens::{ShowOutcome, Toast};
use app::session::{Navigation, NavigationIntent, Page, SessionContext};

use crate::command::{CardRef, Command, ParseError};
use crate::render;

/// A yes/no dialog waiting for an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Cancel(Uuid),
    Logout,
}

/// Output of one command.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

pub struct Shell<B, C> {
    backend: B,
    clock: C,
    offset: FixedOffset,
    email_domain: String,
    session: SessionContext,
    page: Page,
    history: Vec<Page>,
    intent: Option<NavigationIntent>,
    agreed: bool,
    pending: Option<Pending>,
    courses: CoursesScreen,
    detail: Option<CourseDetailScreen>,
    bookings: MyBookingsScreen,
    profile: ProfileScreen,
    out: Vec<String>,
}

impl<B, C> Shell<B, C>
where
    B: DataAccessor + IdentityProvider,
    C: Clock,
{
    pub fn new(backend: B, clock: C, offset: FixedOffset, email_domain: String) -> Self {
        Self {
            backend,
            clock,
            offset,
            email_domain,
            session: SessionContext::new(),
            page: Page::Courses,
            history: Vec::new(),
            intent: None,
            agreed: false,
            pending: None,
            courses: CoursesScreen::new(offset),
            detail: None,
            bookings: MyBookingsScreen::new(offset),
            profile: ProfileScreen,
            out: Vec::new(),
        }
    }

    pub const fn page(&self) -> Page {
        self.page
    }

    pub const fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Open the landing tab.
    pub async fn start(&mut self) -> Reply {
        self.go(Navigation::SwitchTab(Page::Courses)).await;
        self.reply(false)
    }

    pub async fn handle(&mut self, line: &str) -> Reply {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(ParseError::Empty) => return self.reply(false),
            Err(e) => {
                self.say(e.to_string());
                return self.reply(false);
            }
        };
        debug!("{:?} on {}", command, self.page.path());

        // Any other command dismisses an open dialog.
        if let Some(pending) = self.pending.take() {
            match command {
                Command::Yes => {
                    self.confirm(pending).await;
                    return self.reply(false);
                }
                Command::No => return self.reply(false),
                _ => {}
            }
        }

        let quit = command == Command::Quit;
        self.run(command).await;
        self.reply(quit)
    }

    async fn run(&mut self, command: Command) {
        match command {
            Command::Courses => self.go(Navigation::SwitchTab(Page::Courses)).await,
            Command::Sport(sport) => {
                if self.page != Page::Courses {
                    self.say(render::NOT_ON_THIS_PAGE);
                    return;
                }
                let toast = self.courses.select_sport(&self.backend, &sport).await;
                self.render_page();
                self.toast(toast);
            }
            Command::Refresh => self.refresh().await,
            Command::Open(card) => match self.course_id(card) {
                Some(course_id) => {
                    self.go(Navigation::NavigateTo(Page::CourseDetail { course_id }))
                        .await;
                }
                None => self.say(render::NO_SUCH_ENTRY),
            },
            Command::Book => self.book().await,
            Command::Back => self.go(Navigation::Back).await,
            Command::Bookings(tab) => {
                if let Some(tab) = tab {
                    self.bookings.select_tab(tab);
                }
                self.go(Navigation::SwitchTab(Page::MyBookings)).await;
            }
            Command::Cancel(card) => self.request_cancel(card),
            Command::Profile => self.go(Navigation::SwitchTab(Page::Profile)).await,
            Command::Rules => {
                let (title, rules) = self.profile.booking_rules();
                self.say(title);
                self.out.extend(rules.lines().map(|line| format!("  {line}")));
            }
            Command::About => {
                let about = self.profile.about();
                self.say(about);
            }
            Command::Agree => {
                self.agreed = !self.agreed;
                self.out.extend(render::login(self.agreed));
            }
            Command::Login { username, password } => {
                let form = LoginForm {
                    username,
                    password,
                    agreed: self.agreed,
                };
                let outcome = auth::login_with_password(
                    &self.backend,
                    &mut self.session,
                    &form,
                    &self.email_domain,
                    self.intent,
                )
                .await;
                self.apply_auth(outcome).await;
            }
            Command::Wechat(code) => {
                let outcome = auth::login_with_wechat(
                    &self.backend,
                    &mut self.session,
                    &code,
                    self.agreed,
                    self.intent,
                )
                .await;
                self.apply_auth(outcome).await;
            }
            Command::Logout => {
                if self.session.user().is_none() {
                    self.say(render::NOT_ON_THIS_PAGE);
                    return;
                }
                let (title, prompt) = self.profile.logout_prompt();
                self.pending = Some(Pending::Logout);
                self.say(render::confirm(title, prompt));
            }
            Command::Yes | Command::No => self.say(render::NOTHING_TO_CONFIRM),
            Command::Help => self.out.extend(render::HELP.lines().map(str::to_string)),
            Command::Quit => {}
        }
    }

    async fn refresh(&mut self) {
        match self.page {
            Page::Courses => {
                let toast = self.courses.refresh(&self.backend).await;
                self.render_page();
                self.toast(Some(toast));
            }
            Page::Login => self.render_page(),
            page => self.show(page).await,
        }
    }

    async fn book(&mut self) {
        if !matches!(self.page, Page::CourseDetail { .. }) {
            self.say(render::NOT_ON_THIS_PAGE);
            return;
        }
        let Some(screen) = self.detail.as_mut() else {
            self.say(render::NOT_ON_THIS_PAGE);
            return;
        };
        let toast = screen.book(&self.backend, &self.session, &self.clock).await;
        self.render_page();
        self.toast(toast);
    }

    fn request_cancel(&mut self, card: CardRef) {
        if self.page != Page::MyBookings {
            self.say(render::NOT_ON_THIS_PAGE);
            return;
        }
        let booking_id = match card {
            CardRef::Id(id) => Some(id),
            CardRef::Index(n) => self
                .bookings
                .view(&self.clock)
                .cards
                .get(n - 1)
                .map(|card| card.booking_id),
        };
        let Some(booking_id) = booking_id else {
            self.say(render::NO_SUCH_ENTRY);
            return;
        };

        match self.bookings.request_cancel(booking_id, &self.clock) {
            None => self.say(labels::NOT_CANCELLABLE),
            Some(CancelRequest::Refused(toast)) => self.toast(Some(toast)),
            Some(CancelRequest::Confirm {
                booking_id,
                title,
                prompt,
            }) => {
                self.pending = Some(Pending::Cancel(booking_id));
                self.say(render::confirm(title, &prompt));
            }
        }
    }

    async fn confirm(&mut self, pending: Pending) {
        match pending {
            Pending::Cancel(booking_id) => {
                let toast = self
                    .bookings
                    .confirm_cancel(&self.backend, &self.session, booking_id, &self.clock)
                    .await;
                self.render_page();
                self.toast(toast);
            }
            Pending::Logout => {
                let outcome = self.profile.logout(&self.backend, &mut self.session).await;
                self.apply_auth(outcome).await;
            }
        }
    }

    async fn apply_auth(&mut self, outcome: AuthOutcome) {
        self.toast(Some(outcome.toast));
        if let Some(navigation) = outcome.navigation {
            self.intent = None;
            self.go(navigation).await;
        }
    }

    fn course_id(&self, card: CardRef) -> Option<Uuid> {
        match card {
            CardRef::Id(id) => Some(id),
            CardRef::Index(n) if self.page == Page::Courses => {
                self.courses.view().cards.get(n - 1).map(|card| card.id)
            }
            CardRef::Index(_) => None,
        }
    }

    async fn go(&mut self, navigation: Navigation) {
        let target = match navigation {
            Navigation::SwitchTab(page) => {
                self.history.clear();
                page
            }
            Navigation::NavigateTo(page) => {
                self.history.push(self.page);
                page
            }
            Navigation::Back => self.history.pop().unwrap_or(Page::Courses),
        };
        info!("Navigating to {}", target.path());
        self.show(target).await;
    }

    async fn show(&mut self, page: Page) {
        self.page = page;
        let outcome = match page {
            Page::Courses => self.courses.show(&self.backend, &mut self.session).await,
            Page::MyBookings => self.bookings.show(&self.backend, &mut self.session).await,
            Page::Profile => self.profile.show(&self.backend, &mut self.session).await,
            Page::CourseDetail { course_id } => {
                let screen = self
                    .detail
                    .insert(CourseDetailScreen::new(course_id, self.offset));
                screen.show(&self.backend, &mut self.session).await
            }
            Page::Login => ShowOutcome::Shown(None),
        };

        match outcome {
            ShowOutcome::Shown(toast) => {
                self.render_page();
                self.toast(toast);
            }
            ShowOutcome::RedirectToLogin(intent) => {
                self.intent = Some(intent);
                self.history.clear();
                self.page = Page::Login;
                self.render_page();
            }
        }
    }

    fn render_page(&mut self) {
        let lines = match self.page {
            Page::Courses => render::courses(&self.courses.view()),
            Page::MyBookings => render::bookings(&self.bookings.view(&self.clock)),
            Page::Profile => self
                .profile
                .view(&self.session)
                .map(|view| render::profile(&view))
                .unwrap_or_default(),
            Page::CourseDetail { .. } => self
                .detail
                .as_ref()
                .and_then(|screen| screen.view(&self.clock))
                .map_or_else(
                    || vec![labels::BUTTON_LOADING.to_string()],
                    |view| render::detail(&view),
                ),
            Page::Login => render::login(self.agreed),
        };
        self.out.extend(lines);
    }

    fn say(&mut self, line: impl Into<String>) {
        self.out.push(line.into());
    }

    fn toast(&mut self, toast: Option<Toast>) {
        if let Some(toast) = toast {
            self.out.push(render::toast(&toast));
        }
    }

    fn reply(&mut self, quit: bool) -> Reply {
        Reply {
            lines: std::mem::take(&mut self.out),
            quit,
        }
    }
}
