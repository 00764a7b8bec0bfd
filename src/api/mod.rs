pub mod consumer;
pub mod health;
pub mod producer;
pub mod request_id;
