//! Headless browser session.
//!
//! A presentation layer sends [`Command`]s and renders the [`Event`]s that
//! come back; no store or file I/O happens on the caller's side.

mod listings;
pub mod selection;
mod session;
mod types;

pub use session::{Browser, BrowserHandle};
pub use types::{Command, Event, TransferId};
