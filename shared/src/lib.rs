//! Types shared between the bowling session and its displays: scoring, pin
//! masks, lane geometry, configuration and HUD snapshots.

pub mod config;
pub mod pins;
pub mod protocol;
pub mod scoring;
pub mod vec3;
