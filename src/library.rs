//! Track and collection model: tracks, playlists, favorites and their
//! on-disk representation.

mod collections;
mod display;
mod model;
mod store;

pub use collections::Library;
pub use display::{DisplayItem, duration_label, format_mss, home_items};
pub use model::{Playlist, StreamLocator, Track};
pub use store::StorePaths;

#[cfg(test)]
mod tests;
