//! MovieBox download relay.
//!
//! Serves `GET /direct-download`, which opens the requested MovieBox title
//! page in a fresh headless browser and fetches the title's download
//! listing from inside that page, so the request carries the site's own
//! cookies and referer.

pub mod browser;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod server;
