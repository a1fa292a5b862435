mod client;
mod model;
mod request;

pub use client::{WebApi, WebApiConfig};
