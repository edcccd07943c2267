//! Plain-text rendering of the screen view models.

use app::eligibility::{SlotTier, TagTone};
use app::labels;
use app::screens::course_detail::CourseDetailView;
use app::screens::courses::CoursesView;
use app::screens::my_bookings::{BookingTab, MyBookingsView};
use app::screens::profile::ProfileView;
use app::screens::{Toast, ToastKind};

pub const NOT_ON_THIS_PAGE: &str = "当前页面无法执行该操作";
pub const NO_SUCH_ENTRY: &str = "找不到对应的条目";
pub const NOTHING_TO_CONFIRM: &str = "没有需要确认的操作";
pub const LOGIN_PAGE_TITLE: &str = "登录 / 注册";

pub const HELP: &str = "\
commands:
  courses | c              course list
  sport <name>             filter the course list (全部 for all)
  open <n|id>              course details
  book                     book the open course
  back                     previous page
  bookings [tab]           my bookings (all, confirmed, completed, cancelled)
  cancel <n|id>            cancel a booking
  refresh | r              reload the current page
  profile | p              my profile
  rules | about            booking rules / about
  agree                    toggle consent to the user agreement
  login <user> <password>  sign in, registering on first use
  wechat <code>            sign in with a mini-program code
  logout                   sign out
  y | n                    answer a confirmation
  help | quit";

pub fn toast(toast: &Toast) -> String {
    match toast.kind {
        ToastKind::Success => format!("[ok] {}", toast.message),
        ToastKind::Info => format!("[!] {}", toast.message),
    }
}

fn tabs<'a>(items: impl IntoIterator<Item = &'a str>, selected: &str) -> String {
    items
        .into_iter()
        .map(|item| {
            if item == selected {
                format!("[{item}]")
            } else {
                item.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

const fn tier_marker(tier: SlotTier) -> &'static str {
    match tier {
        SlotTier::Full => "x",
        SlotTier::Low => "!",
        SlotTier::Available => " ",
    }
}

pub fn courses(view: &CoursesView) -> Vec<String> {
    let mut lines = vec![tabs(view.sport_types.iter().map(String::as_str), &view.selected)];
    if let Some(message) = view.empty_message {
        lines.push(format!("  {message}"));
        return lines;
    }
    for (i, card) in view.cards.iter().enumerate() {
        lines.push(format!(
            "{:>2}. {} [{}]  {}",
            i + 1,
            card.name,
            card.sport_type,
            card.time_range
        ));
        lines.push(format!(
            "    {}  {}  {} {}  {}",
            card.teacher,
            card.location,
            tier_marker(card.slot.tier),
            card.slot.label,
            card.seats
        ));
    }
    lines
}

pub fn detail(view: &CourseDetailView) -> Vec<String> {
    let mut lines = vec![
        format!("{} [{}]  {}", view.name, view.sport_type, view.badge.label),
        format!("  时间: {} - {}", view.start_time, view.end_time),
        format!("  地点: {}", view.location),
        format!("  教练: {}", view.teacher),
        format!("  名额: {}", view.seats),
        format!("  截止: {}", view.booking_deadline),
    ];
    if let Some(description) = &view.description {
        lines.push(format!("  {description}"));
    }
    let action = if view.button.disabled {
        format!("<{}>", view.button.label)
    } else {
        format!("[{}] (book)", view.button.label)
    };
    lines.push(action);
    lines
}

const fn tone_marker(tone: TagTone) -> &'static str {
    match tone {
        TagTone::Success => "+",
        TagTone::Info => "=",
        TagTone::Warning => "?",
        TagTone::Muted => "-",
    }
}

pub fn bookings(view: &MyBookingsView) -> Vec<String> {
    let mut lines = vec![tabs(
        BookingTab::ALL.iter().map(|tab| tab.label()),
        view.selected.label(),
    )];
    if let Some(message) = view.empty_message {
        lines.push(format!("  {message}"));
        return lines;
    }
    for (i, card) in view.cards.iter().enumerate() {
        let cancel = if card.can_cancel { "  (cancel)" } else { "" };
        lines.push(format!(
            "{:>2}. {} {} [{}]  {}{}",
            i + 1,
            tone_marker(card.status.tone),
            card.course_name,
            card.status.label,
            card.time_range,
            cancel
        ));
        lines.push(format!("    {}  {}", card.teacher, card.location));
    }
    lines
}

pub fn profile(view: &ProfileView) -> Vec<String> {
    let mut title = view.display_name.clone();
    if view.is_admin {
        title.push_str(&format!(" ({})", labels::ADMIN_BADGE));
    }
    let mut lines = vec![title];
    if let Some(username) = &view.username {
        lines.push(format!("  用户名: {username}"));
    }
    if let Some(email) = &view.email {
        lines.push(format!("  邮箱: {email}"));
    }
    if let Some(phone) = &view.phone {
        lines.push(format!("  手机: {phone}"));
    }
    lines.push("  rules | about | logout".to_string());
    lines
}

pub fn login(agreed: bool) -> Vec<String> {
    let consent = if agreed { "[x]" } else { "[ ]" };
    vec![
        LOGIN_PAGE_TITLE.to_string(),
        format!("  {consent} 同意用户协议和隐私政策 (agree)"),
        "  login <username> <password> | wechat <code>".to_string(),
    ]
}

pub fn confirm(title: &str, prompt: &str) -> String {
    format!("{title}: {prompt} (y/n)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabs_mark_selection() {
        assert_eq!(tabs(["全部", "游泳", "篮球"], "游泳"), "全部  [游泳]  篮球");
        assert_eq!(tabs(["全部"], "瑜伽"), "全部");
    }

    #[test]
    fn test_toast_prefix() {
        assert_eq!(toast(&Toast::success("预约成功")), "[ok] 预约成功");
        assert_eq!(toast(&Toast::info("名额已满")), "[!] 名额已满");
    }

    #[test]
    fn test_login_consent_box() {
        assert!(login(false)[1].contains("[ ]"));
        assert!(login(true)[1].contains("[x]"));
    }
}
