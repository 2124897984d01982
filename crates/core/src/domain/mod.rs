pub mod build;
pub mod message;
pub mod response;
