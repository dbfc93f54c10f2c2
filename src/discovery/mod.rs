//! Feed discovery: finding, checking and reading RSS/Atom feeds.
//!
//! # Submodules
//!
//! - [`feed`]: streaming RSS 2.0 / RSS 1.0 (RDF) / Atom parser
//! - [`locator`]: finds a candidate feed URL for a site root
//! - [`validator`]: decides whether a candidate is a usable feed
//! - [`extractor`]: turns feed entries into article records

pub mod extractor;
pub mod feed;
pub mod locator;
pub mod validator;
