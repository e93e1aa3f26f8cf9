pub mod core;
pub mod db;
pub mod models;
pub mod routes;
pub mod seed;
pub mod university_web_server;
