pub mod auth;
pub mod cache;
pub mod configuration;
pub mod controllers;
pub mod db;
pub mod error;
pub mod feed;
pub mod library;
pub mod metadata;
pub mod middlewares;
pub mod model;
pub mod routes;
pub mod startup;
pub mod state;
pub mod telemetry;
