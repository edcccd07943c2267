pub mod accessor;
pub mod auth;
pub mod backend;
pub mod clock;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod labels;
pub mod screens;
pub mod session;
pub mod time_format;
pub mod types;
