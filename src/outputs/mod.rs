//! Output generation for terminal cards and JSON exports.
//!
//! - [`cards`]: renders articles and highlight tags as plain-text cards
//! - [`json`]: writes the bookmark set to a JSON file

pub mod cards;
pub mod json;
