//! Source plugins for the two external catalog metadata providers

pub mod google_books;
pub mod open_library;
pub mod traits;

pub use google_books::*;
pub use open_library::*;
pub use traits::*;
