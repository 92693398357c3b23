pub mod api;
pub mod events;
pub mod html;
pub mod models;
pub mod time;
