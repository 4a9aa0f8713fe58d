pub mod capture_loop;
pub mod controllers;
pub mod dto;
pub mod notify;
pub mod poll;
pub mod ports;
pub mod preferences;
pub mod render;
pub mod services;
pub mod session;
pub mod view_store;

#[cfg(test)]
pub mod testing;
