pub mod auth;
pub mod body;
pub mod rate_limit;
pub mod response;

pub use auth::{authentication_middleware, JwtSessionResolver, Session, SessionResolver};
pub use body::{body_parser_middleware, ParsedBody};
pub use rate_limit::{rate_limit_middleware, NoopRateLimiter, RateLimitDecision, RateLimiter, WindowRateLimiter};
pub use response::ApiResponse;
