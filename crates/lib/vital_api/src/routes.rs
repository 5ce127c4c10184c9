//! Route paths.

pub const API_CHAT: &str = "/api/chat";
pub const API_HEALTH: &str = "/api/health";
