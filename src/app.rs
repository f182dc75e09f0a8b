//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the registry view,
//! search state, playlist cursor and input modes.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
