pub mod auth;
pub mod dashboard;
pub mod entries;
pub mod profile;
pub mod projects;
