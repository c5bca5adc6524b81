//! Services layer (ports + adapters).
//!
//! - `ports`: contracts the widget core relies on (editor host, settings shape).
//! - `adapters`: concrete implementations (headless host, settings file IO).

pub mod adapters;
pub mod ports;
