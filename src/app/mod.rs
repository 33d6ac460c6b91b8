pub mod controller;
pub mod entity;
pub mod response;
pub mod state;
pub mod uploads;
