pub mod config;
pub mod credentials;
pub mod db;
pub mod dispatch;
pub mod dto;
pub mod error;
pub mod gateway;
pub mod models;
pub mod request;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod token;
