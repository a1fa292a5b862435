#![allow(clippy::new_without_default)]

pub mod actor;
pub mod error;
pub mod item;
pub mod loader;
pub mod page;
pub mod report;
pub mod source;
pub mod util;
pub mod webapi;
