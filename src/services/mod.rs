pub mod accounts;
pub mod ideas;
pub mod messages;

pub use accounts::Accounts;
pub use ideas::Ideas;
pub use messages::Messages;
