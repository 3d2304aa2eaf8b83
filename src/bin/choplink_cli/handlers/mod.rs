#![deny(clippy::all, clippy::pedantic)]

pub mod menu;
pub mod restaurants;
