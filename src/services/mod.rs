pub mod chat;
pub mod completion;
pub mod storage;
