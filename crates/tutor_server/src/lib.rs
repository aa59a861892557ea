mod routes;

pub use routes::{chat, parse_image, router, AppState, ChatBody, ChatReply, ParseImageBody, ParseImageReply};
