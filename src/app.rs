//! Application module: the view model the UI draws and the runtime drives.
//!
//! `App` turns key presses into `Effect`s for the runtime and folds
//! `WorkerEvent`s from background work back into its state.

mod editor;
mod input;
mod model;
mod viewport;

pub use editor::{EditorPhase, EditorTarget};
pub use model::{App, Effect, Mode, WorkerEvent};

#[cfg(test)]
mod tests;
