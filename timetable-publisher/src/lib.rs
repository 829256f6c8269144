//! Bus timetable publisher.
//!
//! Scrapes stop timetables from schedule pages, keeps them on disk, and
//! publishes the current and next departure of every configured stop to
//! Home Assistant over MQTT.

pub mod clock;
pub mod config;
pub mod domain;
pub mod engine;
pub mod publish;
pub mod runner;
pub mod scrape;
pub mod service;
pub mod store;
