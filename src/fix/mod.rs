//! FIX field dictionary and message representation

pub mod dictionary;
pub mod message;
pub mod tags;

pub use message::FixMessage;
pub use tags::Tag;
