//! HTTP handlers

pub mod auth;
pub mod health;
pub mod history;
pub mod predict;
pub mod sensors;
