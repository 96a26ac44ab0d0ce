//! Headless client core for Valentine requests.
//!
//! Each screen of the application is a component here: the creation wizard
//! ([`builder`]), the recipient view ([`renderer`]), the sender's status page
//! ([`status`]) and the share page ([`share`]). Components talk to the Record
//! Store through the [`store::RecordStore`] trait and hand every side effect
//! (navigation, notifications, confetti, external links) to the front-end as
//! [`ui::UiEvent`]s.

pub mod builder;
pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod player;
pub mod renderer;
pub mod routes;
pub mod share;
pub mod status;
pub mod store;
pub mod ui;

pub use valentine_types::catalog;
