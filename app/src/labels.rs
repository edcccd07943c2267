//! User-facing strings shown by the booking screens.

// Booking button
pub const BUTTON_LOADING: &str = "加载中...";
pub const BUTTON_ALREADY_BOOKED: &str = "已预约";
pub const BUTTON_FULL: &str = "名额已满";
pub const BUTTON_DEADLINE_PASSED: &str = "预约已截止";
pub const BUTTON_BOOK_NOW: &str = "立即预约";
pub const BUTTON_PROCESSING: &str = "处理中...";

// Slot status
pub const SLOTS_FULL: &str = "已满员";

pub fn slots_low(remaining: u32) -> String {
    format!("仅剩{remaining}个名额")
}

pub fn slots_available(remaining: u32) -> String {
    format!("剩余{remaining}个名额")
}

pub fn slots_low_short(remaining: u32) -> String {
    format!("仅剩{remaining}个")
}

pub fn slots_available_short(remaining: u32) -> String {
    format!("剩余{remaining}个")
}

pub fn seat_count(booked: u32, total: u32) -> String {
    format!("{booked}/{total}人")
}

// Booking status tags
pub const STATUS_CONFIRMED: &str = "已预约";
pub const STATUS_COMPLETED: &str = "已完成";
pub const STATUS_CANCELLED: &str = "已取消";
pub const STATUS_PENDING: &str = "待确认";

// Filters and tabs
pub const SPORT_ALL: &str = "全部";
pub const TAB_ALL: &str = "全部";
pub const TAB_CONFIRMED: &str = "已预约";
pub const TAB_COMPLETED: &str = "已完成";
pub const TAB_CANCELLED: &str = "已取消";
pub const NO_COURSES: &str = "暂无课程";
pub const NO_BOOKINGS: &str = "暂无预约记录";

// Toasts
pub const LOAD_FAILED: &str = "加载失败，请稍后重试";
pub const REFRESHED: &str = "刷新成功";
pub const BOOK_SUCCESS: &str = "预约成功";
pub const BOOK_FAILED: &str = "预约失败，请稍后重试";
pub const CANCEL_SUCCESS: &str = "取消成功";
pub const CANCEL_FAILED: &str = "取消失败，请稍后重试";
pub const CANCEL_AFTER_DEADLINE: &str = "已超过预约截止时间，无法取消";
pub const NOT_CANCELLABLE: &str = "该预约无法取消";
pub const CANCEL_CONFIRM_TITLE: &str = "确认取消";

pub fn cancel_confirm_prompt(course_name: &str) -> String {
    format!("确定要取消预约\"{course_name}\"吗？")
}

// Login
pub const LOGIN_AGREEMENT_REQUIRED: &str = "请先同意用户协议和隐私政策";
pub const LOGIN_FIELDS_REQUIRED: &str = "请输入用户名和密码";
pub const LOGIN_USERNAME_INVALID: &str = "用户名只能包含字母、数字和下划线";
pub const LOGIN_SUCCESS: &str = "登录成功";
pub const SIGNUP_SUCCESS: &str = "注册成功";
pub const LOGIN_FAILED: &str = "登录失败，请稍后重试";

// Profile
pub const DEFAULT_DISPLAY_NAME: &str = "用户";
pub const ADMIN_BADGE: &str = "管理员";
pub const LOGOUT_CONFIRM_TITLE: &str = "确认退出";
pub const LOGOUT_CONFIRM_PROMPT: &str = "确定要退出登录吗？";
pub const LOGOUT_SUCCESS: &str = "已退出登录";
pub const LOGOUT_FAILED: &str = "退出失败，请稍后重试";
pub const BOOKING_RULES_TITLE: &str = "预约规则说明";
pub const BOOKING_RULES: &str = "1. 每个课程需在预约截止时间前完成预约\n2. 预约成功后可在截止时间前取消\n3. 超过截止时间无法取消预约\n4. 课程名额有限，先到先得\n5. 请准时参加已预约的课程";
pub const ABOUT: &str = "为您提供便捷的体育课程预约服务，让运动成为生活的一部分。支持多种运动类型，专业教练指导，助您健康生活每一天。";

/// Email domains used for synthetic accounts; never shown on the profile.
pub const SYNTHETIC_EMAIL_DOMAINS: [&str; 2] = ["@miaoda.com", "@wechat.login"];
