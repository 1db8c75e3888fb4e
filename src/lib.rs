#![recursion_limit = "256"]
#![warn(clippy::all)]

pub mod config;
pub mod constants;
pub mod context;
pub mod economy;
pub mod error;
pub mod findnearest;
pub mod game_loop;
pub mod geometry;
pub mod logging;
pub mod movement;
pub mod objective;
pub mod objectives;
pub mod panic;
pub mod pathing;
pub mod protocol;
pub mod scoring;
pub mod spawnsystem;
#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
pub mod world;
