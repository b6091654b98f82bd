pub mod conversation;
pub mod requests;
