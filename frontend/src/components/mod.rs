pub mod chat;
pub mod sidebar;
pub mod typing;
