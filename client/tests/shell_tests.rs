//! End-to-end terminal sessions against a mock backend.
#![allow(clippy::unwrap_used, clippy::too_many_lines)]

use app::backend::BackendClient;
use app::clock::FixedClock;
use app::session::Page;
use chrono::{FixedOffset, TimeZone, Utc};
use client_lib::shell::{Reply, Shell};
use serde_json::{Value, json};
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Fixture {
    server: MockServer,
    user_id: Uuid,
    course_id: Uuid,
}

fn course_json(id: Uuid) -> Value {
    json!({
        "id": id,
        "name": "羽毛球入门",
        "sport_type": "羽毛球",
        "teacher": "陈教练",
        "location": "东区体育馆",
        "start_time": "2025-03-05T00:00:00Z",
        "end_time": "2025-03-05T01:30:00Z",
        "total_slots": 10,
        "booked_slots": 4,
        "image_url": null,
        "description": "握拍与步法",
        "booking_deadline": "2025-03-04T12:00:00Z",
        "created_at": "2025-02-01T00:00:00Z"
    })
}

fn booking_json(id: Uuid, user_id: Uuid, course_id: Uuid, status: &str) -> Value {
    json!({
        "id": id,
        "user_id": user_id,
        "course_id": course_id,
        "status": status,
        "created_at": "2025-03-01T02:00:00Z",
        "cancelled_at": null
    })
}

async fn fixture() -> Fixture {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();
    let course_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok",
            "user": { "id": user_id }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": user_id })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": user_id,
            "username": "alice",
            "email": "alice@miaoda.com",
            "phone": null,
            "openid": null,
            "nickname": "小爱",
            "avatar_url": null,
            "role": "user",
            "created_at": "2025-01-01T00:00:00Z"
        }])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/courses"))
        .and(query_param("select", "sport_type"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "sport_type": "羽毛球" }])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/courses"))
        .and(query_param("select", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([course_json(course_id)])))
        .mount(&server)
        .await;

    Fixture {
        server,
        user_id,
        course_id,
    }
}

fn shell(server: &MockServer) -> Shell<BackendClient, FixedClock> {
    let backend =
        BackendClient::new(server.uri(), "anon".to_string(), Duration::from_secs(5)).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
    Shell::new(
        backend,
        FixedClock(now),
        FixedOffset::east_opt(8 * 3600).unwrap(),
        "miaoda.com".to_string(),
    )
}

fn contains(reply: &Reply, needle: &str) -> bool {
    reply.lines.iter().any(|line| line.contains(needle))
}

async fn signed_in(fx: &Fixture) -> Shell<BackendClient, FixedClock> {
    let mut shell = shell(&fx.server);
    shell.start().await;
    shell.handle("agree").await;
    let reply = shell.handle("login alice secret").await;
    assert!(contains(&reply, "[ok] 登录成功"), "{reply:?}");
    shell
}

#[tokio::test]
async fn test_login_redirect_and_resume() {
    let fx = fixture().await;
    let mut shell = shell(&fx.server);

    let reply = shell.start().await;
    assert_eq!(shell.page(), Page::Login);
    assert!(contains(&reply, "登录 / 注册"));

    let reply = shell.handle("login alice secret").await;
    assert!(contains(&reply, "[!] 请先同意用户协议和隐私政策"));
    assert_eq!(shell.page(), Page::Login);

    let reply = shell.handle("agree").await;
    assert!(contains(&reply, "[x]"));

    let reply = shell.handle("login alice secret").await;
    assert!(contains(&reply, "[ok] 登录成功"));
    assert_eq!(shell.page(), Page::Courses);
    assert!(contains(&reply, "[全部]  羽毛球"));
    assert!(contains(&reply, " 1. 羽毛球入门 [羽毛球]  3月5日 08:00 - 3月5日 09:30"));
    assert!(contains(&reply, "剩余6个名额"));
    assert_eq!(
        shell.session().user().unwrap().username.as_deref(),
        Some("alice")
    );
}

#[tokio::test]
async fn test_open_and_book_course() {
    let fx = fixture().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("course_id", format!("eq.{}", fx.course_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&fx.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("course_id", format!("eq.{}", fx.course_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([booking_json(
            Uuid::new_v4(),
            fx.user_id,
            fx.course_id,
            "confirmed"
        )])))
        .mount(&fx.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/book_course"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "预约成功"
        })))
        .expect(1)
        .mount(&fx.server)
        .await;

    let mut shell = signed_in(&fx).await;

    let reply = shell.handle("open 1").await;
    assert_eq!(
        shell.page(),
        Page::CourseDetail {
            course_id: fx.course_id
        }
    );
    assert!(contains(&reply, "  时间: 2025-03-05 08:00 - 2025-03-05 09:30"));
    assert!(contains(&reply, "  截止: 2025-03-04 20:00"));
    assert!(contains(&reply, "[立即预约] (book)"));

    let reply = shell.handle("book").await;
    assert!(contains(&reply, "<已预约>"));
    assert!(contains(&reply, "[ok] 预约成功"));

    // Already booked: nothing is sent.
    let reply = shell.handle("book").await;
    assert!(contains(&reply, "<已预约>"));
    assert!(!contains(&reply, "[ok]"));

    shell.handle("back").await;
    assert_eq!(shell.page(), Page::Courses);
}

#[tokio::test]
async fn test_cancel_booking_with_confirmation() {
    let fx = fixture().await;
    let booking_id = Uuid::new_v4();

    let mut active = booking_json(booking_id, fx.user_id, fx.course_id, "confirmed");
    active["course"] = course_json(fx.course_id);
    let mut cancelled = booking_json(booking_id, fx.user_id, fx.course_id, "cancelled");
    cancelled["course"] = course_json(fx.course_id);

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([active])))
        .up_to_n_times(1)
        .mount(&fx.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([cancelled])))
        .mount(&fx.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/cancel_booking"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "message": "取消成功" })),
        )
        .expect(1)
        .mount(&fx.server)
        .await;

    let mut shell = signed_in(&fx).await;

    let reply = shell.handle("bookings").await;
    assert_eq!(shell.page(), Page::MyBookings);
    assert!(contains(&reply, "[全部]  已预约  已完成  已取消"));
    assert!(contains(&reply, "羽毛球入门 [已预约]  03-05 08:00 - 03-05 09:30  (cancel)"));

    let reply = shell.handle("cancel 1").await;
    assert!(contains(&reply, "确认取消: 确定要取消预约\"羽毛球入门\"吗？ (y/n)"));

    // Declining leaves everything as it was.
    let reply = shell.handle("n").await;
    assert!(reply.lines.is_empty());

    shell.handle("cancel 1").await;
    let reply = shell.handle("y").await;
    assert!(contains(&reply, "[ok] 取消成功"));
    assert!(contains(&reply, "[已取消]"));

    let reply = shell.handle("cancel 1").await;
    assert!(contains(&reply, "该预约无法取消"));

    let reply = shell.handle("y").await;
    assert!(contains(&reply, "没有需要确认的操作"));
}

#[tokio::test]
async fn test_profile_and_logout() {
    let fx = fixture().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&fx.server)
        .await;

    let mut shell = signed_in(&fx).await;

    let reply = shell.handle("profile").await;
    assert_eq!(reply.lines[0], "小爱");
    assert!(contains(&reply, "  用户名: alice"));
    assert!(!contains(&reply, "邮箱"));

    let reply = shell.handle("rules").await;
    assert_eq!(reply.lines[0], "预约规则说明");

    let reply = shell.handle("logout").await;
    assert!(contains(&reply, "确认退出: 确定要退出登录吗？ (y/n)"));

    let reply = shell.handle("y").await;
    assert!(contains(&reply, "[ok] 已退出登录"));
    assert_eq!(shell.page(), Page::Login);
    assert!(shell.session().user().is_none());
}

#[tokio::test]
async fn test_misplaced_and_unknown_commands() {
    let fx = fixture().await;
    let mut shell = signed_in(&fx).await;

    let reply = shell.handle("book").await;
    assert_eq!(reply.lines, vec!["当前页面无法执行该操作"]);

    let reply = shell.handle("cancel 1").await;
    assert_eq!(reply.lines, vec!["当前页面无法执行该操作"]);

    let reply = shell.handle("open 9").await;
    assert_eq!(reply.lines, vec!["找不到对应的条目"]);

    let reply = shell.handle("jump").await;
    assert_eq!(reply.lines, vec!["unknown command 'jump', type 'help'"]);

    assert!(shell.handle("").await.lines.is_empty());
    assert!(shell.handle("quit").await.quit);
}
