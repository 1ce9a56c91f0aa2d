pub mod message_params;
pub mod messages_service;
pub mod messages_shared;

pub use message_params::{Direction, MessageFilter};
pub use messages_service::MessagesService;
