//! Application layer: view state, reducer, and controller loop.
//!
//! # Architecture
//!
//! The application layer follows a unidirectional data flow pattern:
//!
//! ```text
//! User Input → Events → Reducer → New ViewState → Actions → Side Effects
//!                          ↑                                    ↓
//!                          └──── Upload / Submission Results ───┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effect commands emitted by the reducer
//! - [`controller`]: Event loop owning the state and executing actions
//! - [`handler`]: Event reduction and commit-cycle transitions
//! - [`state`]: Form snapshot and derived selectors
//!
//! # Example
//!
//! ```rust
//! use feedback_form::app::{handle_event, Event, ViewState};
//!
//! let state = ViewState::default();
//! let (state, actions) = handle_event(&state, &Event::TitleChanged("Hi".into()));
//! assert_eq!(state.title, "Hi");
//! assert!(actions.is_empty());
//! ```

pub mod actions;
pub mod controller;
pub mod handler;
pub mod state;

pub use actions::Action;
pub use controller::{FeedbackController, FeedbackHandle};
pub use handler::{handle_event, Event};
pub use state::{ViewState, MAX_IMAGES};
