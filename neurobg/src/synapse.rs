use crate::{
    config::Config,
    neuron::Neuron,
    render::{GradientStop, Renderer},
};

/// Directed connection between neurons of adjacent layers.
#[derive(Debug, Clone, PartialEq)]
pub struct Synapse {
    /// Sending neuron index
    pub source: u32,
    /// Receiving neuron index, always in the next layer
    pub target: u32,
    /// In `base_weight..=1.0`
    pub weight: f32,
    /// 1.0 right after a delivery, decays towards 0
    pub activity: f32,
}

impl Synapse {
    pub fn new(source: u32, target: u32, config: &Config) -> Self {
        Self {
            source,
            target,
            weight: config.base_weight,
            activity: 0.0,
        }
    }

    pub fn update(&mut self, config: &Config) {
        self.weight = (self.weight * config.weight_decay).max(config.base_weight);
        self.activity *= config.activity_decay;
    }

    pub fn strengthen(&mut self, config: &Config) {
        self.weight = (self.weight + config.learning_rate).min(1.0);
        self.activity = 1.0;
    }

    /// Static background line, barely visible.
    pub fn draw(&self, neurons: &[Neuron], renderer: &mut impl Renderer, config: &Config) {
        let color = config.palette.connection.alpha(0.015);
        renderer.draw_line_gradient(
            neurons[self.source as usize].pos,
            neurons[self.target as usize].pos,
            0.3,
            &[GradientStop::new(0.0, color), GradientStop::new(1.0, color)],
        );
    }
}
