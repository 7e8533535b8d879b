pub mod admin;
pub mod api;
pub mod desert_storm;
pub mod hub;
pub mod roster;
