//! `am-mobility` — trip composition, movement, and per-agent trip control.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                          |
//! |--------------|-------------------------------------------------------------------|
//! | [`compose`]  | `TripRequest`, `MapView`, waypoint composition                    |
//! | [`engine`]   | `MobilityEngine<R>`: `schedule_trip`, `advance`, leg transitions  |
//! | [`control`]  | pause / resume / reset, `set_speed` / `multiply_speed` / `increase_speed` |
//! | [`observer`] | `StepObserver` sub-step callbacks                                 |
//! | [`error`]    | `MobilityError`, `MobilityResult<T>`                              |
//!
//! # Movement model (sub-stepped interpolation)
//!
//! Each tick the engine receives the elapsed time in ticks and splits it
//! into `floor(elapsed / step_precision)` sub-steps plus one partial step.
//! Every sub-step moves the agent `speed × interval` toward the active
//! leg's goal point:
//!
//! 1. The increment is bounded by the distance left on the leg.
//! 2. Within `arrival_epsilon` of the goal the agent snaps to it, takes the
//!    leg's place, and begins the next leg.
//! 3. Time left over after an arrival is spent on the next leg in the same
//!    sub-step, so short legs never cost speed.
//!
//! Sampling (`StepObserver::on_sample` every `sampling_interval` sub-steps)
//! is for observers only and never changes the arithmetic.

pub mod compose;
pub mod control;
pub mod engine;
pub mod error;
pub mod observer;


pub use compose::{MapView, TripRequest};
pub use control::{increase_speed, multiply_speed, pause_trip, reset_trip, resume_trip, set_speed};
pub use engine::MobilityEngine;
pub use error::{MobilityError, MobilityResult};
pub use observer::{NoopStepObserver, StepObserver};
