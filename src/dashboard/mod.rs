pub mod client;
pub mod view;
