#![deny(warnings)]

//! Agronomic models: yield response, supply/demand trajectories and
//! post-harvest losses.
//!
//! Every function is pure: identical inputs give bit-identical outputs.

pub mod loss;
pub mod trajectory;
pub mod yield_model;
