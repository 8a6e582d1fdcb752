pub mod payload;
pub mod user;

pub use payload::UserPayload;
pub use user::UserState;
