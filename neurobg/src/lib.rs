//! A self-driving layered spiking-network animation.
//!
//! Neurons leak and fire, signals travel along synapses, and every few
//! seconds an inference cycle feeds a cluster of input neurons and lets the
//! activity ripple through to a winner in the output layer. None of it is a
//! real model; the dynamics only have to look plausible at 60 fps.
//!
//! The host owns a [`Simulation`], calls [`Simulation::step`] once per
//! display refresh with its latest [`FrameInput`], and supplies a
//! [`Renderer`] to draw on.

pub mod config;
pub mod error;
pub mod export;
pub mod inference;
pub mod neuron;
pub mod particle;
pub mod render;
pub mod signal;
pub mod simulation;
pub mod synapse;
pub mod topology;
pub mod winner;

pub use config::{Config, DeviceClass, Palette};
pub use error::{Error, Result};
pub use inference::{InferenceState, Phase};
pub use render::{CircleStyle, DrawCommand, DrawList, GradientStop, Point, Renderer, Rgb, Rgba};
pub use simulation::{FrameInput, Simulation, Stats, StepOutcome};
pub use topology::Topology;
