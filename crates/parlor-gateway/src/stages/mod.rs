//! The built-in pipeline stages.
//!
//! Execution order: RequestLog → TimeOfDay → RateLimit → RoleCheck → terminal
//! handler. The request log never rejects; each gate after it may.

pub mod rate_limit;
pub mod request_log;
pub mod role_check;
pub mod time_of_day;

pub use rate_limit::RateLimitStage;
pub use request_log::RequestLogStage;
pub use role_check::RoleCheckStage;
pub use time_of_day::TimeOfDayStage;
