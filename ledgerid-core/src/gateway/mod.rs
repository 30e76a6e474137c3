mod connection;
pub mod dispatch;
pub mod invoke;
mod onboarding;
pub mod types;
