pub mod configuration;
pub mod dal;
pub mod domain;
pub mod logger;
pub mod services;
pub mod startup;
