//! The autonomous inference cycle: `idle → input → propagating → prediction → idle`.
//!
//! The orchestrator only injects charge through input particles. Everything
//! downstream (firing, signals, the winner) comes out of the ordinary
//! neuron and synapse dynamics.

use std::fmt;

use rand::Rng;

use crate::{config::Config, particle::InputParticle, render::Point, topology::Topology};

const PARTICLES_PER_INPUT: usize = 2;
/// Particles start left of the canvas, each one further out than the last.
const PARTICLE_START_X: f32 = -60.0;
const PARTICLE_STAGGER_X: f32 = 40.0;
/// Vertical spread of the particle origins around the target.
const PARTICLE_SPREAD_Y: f32 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Input,
    Propagating,
    Prediction,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Idle => "idle",
            Phase::Input => "input",
            Phase::Propagating => "propagating",
            Phase::Prediction => "prediction",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InferenceState {
    pub phase: Phase,
    /// Frames left in the current phase
    pub timer: u32,
    /// Input neurons fed by the current cycle
    pub active_inputs: Vec<usize>,
}

impl InferenceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn should_start(&self, frame: u64, config: &Config) -> bool {
        self.is_idle() && frame % config.inference_interval == 0
    }

    /// Pick a random contiguous cluster of input neurons and aim two
    /// particles at each. Does nothing unless idle.
    pub fn start_cycle(
        &mut self,
        topology: &Topology,
        config: &Config,
        rng: &mut impl Rng,
    ) -> Vec<InputParticle> {
        if !self.is_idle() {
            return Vec::new();
        }

        let inputs = topology.input_range();
        let cluster = config.input_cluster_size.min(inputs.len());
        let first = inputs.start + rng.random_range(0..=inputs.len() - cluster);

        self.active_inputs = (first..first + cluster).collect();

        let mut particles = Vec::with_capacity(cluster * PARTICLES_PER_INPUT);
        for &target in &self.active_inputs {
            let target_pos = topology.neurons[target].pos;
            for p in 0..PARTICLES_PER_INPUT {
                let origin = Point::new(
                    PARTICLE_START_X - p as f32 * PARTICLE_STAGGER_X,
                    target_pos.y + (rng.random::<f32>() - 0.5) * PARTICLE_SPREAD_Y,
                );
                particles.push(InputParticle::new(origin, target, target_pos, config));
            }
        }

        self.phase = Phase::Input;
        self.timer = config.input_phase_duration;
        tracing::debug!(inputs = ?self.active_inputs, "inference cycle started");
        particles
    }

    /// Count down one frame, moving to the next phase when the timer runs
    /// out. Returns the phase entered, if any.
    pub fn advance(&mut self, topology: &mut Topology, config: &Config) -> Option<Phase> {
        if self.is_idle() {
            return None;
        }

        self.timer = self.timer.saturating_sub(1);
        if self.timer > 0 {
            return None;
        }

        let next = match self.phase {
            Phase::Input => {
                for &i in &self.active_inputs {
                    topology.neurons[i].is_input_active = false;
                }
                self.timer = config.propagation_delay;
                Phase::Propagating
            }
            Phase::Propagating => {
                self.timer = config.prediction_duration;
                Phase::Prediction
            }
            Phase::Prediction => {
                topology.clear_winners();
                self.active_inputs.clear();
                Phase::Idle
            }
            Phase::Idle => return None,
        };

        tracing::debug!(from = %self.phase, to = %next, "inference phase");
        self.phase = next;
        Some(next)
    }

    /// Back to idle without touching any neuron, for a rebuilt topology.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
