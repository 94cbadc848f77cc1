//! Domain logic: inference, risk tiers and alert rules

pub mod alerts;
pub mod model;
pub mod risk;
