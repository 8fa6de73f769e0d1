use std::f32::consts::TAU;

use rand::Rng;

use crate::{
    config::{Config, Palette},
    render::{CircleStyle, GradientStop, Point, Renderer, Rgba},
};

/// Idle float offset in px.
const FLOAT_AMPLITUDE: f32 = 2.0;
const FLOAT_SPEED_MIN: f32 = 0.005;
const FLOAT_SPEED_SPREAD: f32 = 0.003;
/// Below this share of the threshold no charge glow is drawn.
const CHARGE_GLOW_MIN: f32 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Input,
    Hidden,
    Output,
}

impl LayerKind {
    pub fn of(layer: usize, layer_count: usize) -> Self {
        if layer == 0 {
            LayerKind::Input
        } else if layer + 1 == layer_count {
            LayerKind::Output
        } else {
            LayerKind::Hidden
        }
    }
}

/// What a neuron looks like this frame, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NeuronVisual {
    InputActive,
    Hovered(f32),
    Winner,
    Refractory,
    Charging(f32),
    Idle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Neuron {
    pub pos: Point,
    /// Anchor the idle float moves around
    pub origin: Point,
    pub layer: usize,
    pub index_in_layer: usize,
    pub kind: LayerKind,

    /// Leaky potential, fires at the threshold
    pub potential: f32,
    /// Slow-decaying sum of inputs, only used to pick the winner
    pub accumulated_charge: f32,
    /// Frames left before the neuron accepts input again; 0 means active
    pub refractory: u32,

    pub is_winner: bool,
    pub is_input_active: bool,
    /// 0..=1, from pointer proximity
    pub hover: f32,

    float_phase: f32,
    float_speed: f32,
}

impl Neuron {
    pub fn new(
        origin: Point,
        layer: usize,
        index_in_layer: usize,
        kind: LayerKind,
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            pos: origin,
            origin,
            layer,
            index_in_layer,
            kind,
            potential: 0.0,
            accumulated_charge: 0.0,
            refractory: 0,
            is_winner: false,
            is_input_active: false,
            hover: 0.0,
            float_phase: rng.random::<f32>() * TAU,
            float_speed: FLOAT_SPEED_MIN + rng.random::<f32>() * FLOAT_SPEED_SPREAD,
        }
    }

    pub fn is_refractory(&self) -> bool {
        self.refractory > 0
    }

    /// Dropped while refractory.
    pub fn receive_input(&mut self, amount: f32) {
        if self.is_refractory() {
            return;
        }
        self.potential += amount;
        self.accumulated_charge += amount;
    }

    /// Linear falloff inside the pointer radius, zero outside or without a pointer.
    pub fn set_hover(&mut self, pointer: Option<Point>, config: &Config) {
        self.hover = match pointer {
            Some(pointer) => {
                let dist = self.pos.distance(pointer);
                if dist < config.pointer_radius {
                    ((1.0 - dist / config.pointer_radius) * config.pointer_influence)
                        .clamp(0.0, 1.0)
                } else {
                    0.0
                }
            }
            None => 0.0,
        };
    }

    /// Advance one frame. Returns true if the neuron fired.
    ///
    /// Output neurons never fire here, they only accumulate charge.
    pub fn update(&mut self, config: &Config) -> bool {
        if self.is_refractory() {
            self.refractory -= 1;
            self.potential = 0.0;
            return false;
        }

        self.potential *= config.potential_leak;
        self.accumulated_charge *= config.charge_decay;

        self.float_phase += self.float_speed;
        self.pos = Point {
            x: self.origin.x + self.float_phase.sin() * FLOAT_AMPLITUDE,
            y: self.origin.y + (self.float_phase * 0.8).cos() * FLOAT_AMPLITUDE,
        };

        if self.kind != LayerKind::Output && self.potential >= config.firing_threshold {
            self.fire(config);
            return true;
        }
        false
    }

    pub fn fire(&mut self, config: &Config) {
        self.potential = 0.0;
        self.refractory = config.refractory_period;
    }

    pub fn visual(&self, config: &Config) -> NeuronVisual {
        let charge = (self.potential / config.firing_threshold).min(1.0);

        if self.is_input_active {
            NeuronVisual::InputActive
        } else if self.hover > 0.0 {
            NeuronVisual::Hovered(self.hover)
        } else if self.is_winner {
            NeuronVisual::Winner
        } else if self.is_refractory() {
            NeuronVisual::Refractory
        } else if charge > CHARGE_GLOW_MIN {
            NeuronVisual::Charging(charge)
        } else {
            NeuronVisual::Idle
        }
    }

    pub fn draw(&self, renderer: &mut impl Renderer, config: &Config) {
        let p = &config.palette;
        let at = self.pos;

        // Base presence, drawn under every state
        renderer.draw_radial_glow(
            at,
            12.0,
            &[
                GradientStop::new(0.0, p.node_idle.alpha(0.15)),
                GradientStop::new(0.7, p.node_idle.alpha(0.05)),
                GradientStop::new(1.0, Rgba::TRANSPARENT),
            ],
        );
        renderer.draw_circle(at, 1.2, p.node_idle.alpha(0.4), CircleStyle::Fill);

        match self.visual(config) {
            NeuronVisual::InputActive => draw_input_active(renderer, at, p),
            NeuronVisual::Hovered(h) => {
                renderer.draw_radial_glow(
                    at,
                    30.0,
                    &[
                        GradientStop::new(0.0, p.node_highlight.alpha(h * 0.2)),
                        GradientStop::new(0.5, p.node_highlight.alpha(h * 0.1)),
                        GradientStop::new(1.0, Rgba::TRANSPARENT),
                    ],
                );
                renderer.draw_circle(at, 3.0, p.node_highlight.alpha(h * 0.5), CircleStyle::Fill);
            }
            NeuronVisual::Winner => {
                renderer.draw_radial_glow(
                    at,
                    18.0,
                    &[
                        GradientStop::new(0.0, p.accent.alpha(0.3)),
                        GradientStop::new(0.6, p.accent.alpha(0.08)),
                        GradientStop::new(1.0, Rgba::TRANSPARENT),
                    ],
                );
                renderer.draw_circle(
                    at,
                    6.0,
                    p.accent.alpha(0.5),
                    CircleStyle::Stroke { width: 0.5 },
                );
                renderer.draw_circle(at, 2.5, p.accent.alpha(0.9), CircleStyle::Fill);
            }
            NeuronVisual::Refractory => {
                renderer.draw_radial_glow(
                    at,
                    8.0,
                    &[
                        GradientStop::new(0.0, p.signal.alpha(0.4)),
                        GradientStop::new(1.0, Rgba::TRANSPARENT),
                    ],
                );
                renderer.draw_circle(at, 2.0, p.accent.alpha(0.8), CircleStyle::Fill);
            }
            NeuronVisual::Charging(charge) => {
                renderer.draw_radial_glow(
                    at,
                    6.0,
                    &[
                        GradientStop::new(0.0, p.node_active.alpha(charge * 0.3)),
                        GradientStop::new(1.0, Rgba::TRANSPARENT),
                    ],
                );
            }
            NeuronVisual::Idle => {}
        }
    }
}

fn draw_input_active(renderer: &mut impl Renderer, at: Point, p: &Palette) {
    let ring = CircleStyle::Stroke { width: 0.5 };
    renderer.draw_circle(at, 22.0, p.node_active.alpha(0.2), ring);
    renderer.draw_circle(at, 14.0, p.node_active.alpha(0.3), ring);
    renderer.draw_radial_glow(
        at,
        8.0,
        &[
            GradientStop::new(0.0, p.node_highlight.alpha(0.6)),
            GradientStop::new(1.0, Rgba::TRANSPARENT),
        ],
    );
    renderer.draw_circle(at, 2.5, p.accent.alpha(0.8), CircleStyle::Fill);
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::render::{DrawCommand, DrawList};

    fn neuron(kind: LayerKind) -> Neuron {
        let mut rng = StdRng::seed_from_u64(7);
        Neuron::new(Point::new(100.0, 100.0), 0, 0, kind, &mut rng)
    }

    #[test]
    fn fires_at_threshold() {
        // Powers of two keep the leaked potential exactly on the threshold
        let config = Config {
            firing_threshold: 0.5,
            potential_leak: 0.5,
            ..Config::default()
        };
        let mut n = neuron(LayerKind::Hidden);
        n.potential = 1.0;

        assert!(n.update(&config));
        assert_eq!(n.potential, 0.0);
        assert_eq!(n.refractory, config.refractory_period);
    }

    #[test]
    fn fire_resets_potential() {
        let config = Config::default();
        let mut n = neuron(LayerKind::Hidden);
        n.potential = config.firing_threshold;
        n.fire(&config);
        assert_eq!(n.potential, 0.0);
        assert_eq!(n.refractory, config.refractory_period);
    }

    #[test]
    fn output_neurons_never_self_fire() {
        let config = Config::default();
        let mut n = neuron(LayerKind::Output);
        n.receive_input(10.0);
        assert!(!n.update(&config));
        assert!(n.accumulated_charge > 9.0);
        assert_eq!(n.refractory, 0);
    }

    #[test]
    fn refractory_drops_input_and_counts_down() {
        let config = Config::default();
        let mut n = neuron(LayerKind::Input);
        n.receive_input(1.0);
        assert!(n.update(&config));

        for left in (0..config.refractory_period).rev() {
            n.receive_input(5.0);
            assert!(!n.update(&config));
            assert_eq!(n.potential, 0.0);
            assert_eq!(n.refractory, left);
        }

        n.receive_input(0.2);
        assert_eq!(n.potential, 0.2);
    }

    #[test]
    fn refractory_neuron_holds_still() {
        let config = Config::default();
        let mut n = neuron(LayerKind::Hidden);
        n.update(&config);
        let before = n.pos;
        n.refractory = 3;
        n.update(&config);
        assert_eq!(n.pos, before);
    }

    #[test]
    fn float_stays_near_origin() {
        let config = Config::default();
        let mut n = neuron(LayerKind::Hidden);
        for _ in 0..1_000 {
            n.update(&config);
            assert!((n.pos.x - n.origin.x).abs() <= FLOAT_AMPLITUDE + 1e-4);
            assert!((n.pos.y - n.origin.y).abs() <= FLOAT_AMPLITUDE + 1e-4);
        }
    }

    #[test]
    fn hover_falloff() {
        let config = Config::default();
        let mut n = neuron(LayerKind::Hidden);

        n.set_hover(Some(n.pos), &config);
        assert!((n.hover - config.pointer_influence).abs() < 1e-6);

        let half = Point::new(n.pos.x + config.pointer_radius / 2.0, n.pos.y);
        n.set_hover(Some(half), &config);
        assert!((n.hover - config.pointer_influence / 2.0).abs() < 1e-5);

        let outside = Point::new(n.pos.x + config.pointer_radius, n.pos.y);
        n.set_hover(Some(outside), &config);
        assert_eq!(n.hover, 0.0);

        n.set_hover(None, &config);
        assert_eq!(n.hover, 0.0);
    }

    #[test]
    fn visual_priority() {
        let config = Config::default();
        let mut n = neuron(LayerKind::Output);
        assert_eq!(n.visual(&config), NeuronVisual::Idle);

        n.potential = config.firing_threshold / 2.0;
        assert!(matches!(n.visual(&config), NeuronVisual::Charging(_)));

        n.refractory = 1;
        assert_eq!(n.visual(&config), NeuronVisual::Refractory);

        n.is_winner = true;
        assert_eq!(n.visual(&config), NeuronVisual::Winner);

        n.hover = 0.5;
        assert_eq!(n.visual(&config), NeuronVisual::Hovered(0.5));

        n.is_input_active = true;
        assert_eq!(n.visual(&config), NeuronVisual::InputActive);
    }

    #[test]
    fn draw_does_not_mutate() {
        let config = Config::default();
        let mut n = neuron(LayerKind::Hidden);
        n.is_input_active = true;
        n.potential = 0.3;
        let before = n.clone();

        let mut list = DrawList::new();
        n.draw(&mut list, &config);

        assert_eq!(n, before);
        // base glow + core, two rings, core glow, center dot
        assert_eq!(list.len(), 6);
        assert!(matches!(
            list.commands()[2],
            DrawCommand::Circle {
                style: CircleStyle::Stroke { .. },
                ..
            }
        ));
    }

    #[test]
    fn idle_draws_base_only() {
        let config = Config::default();
        let n = neuron(LayerKind::Hidden);
        let mut list = DrawList::new();
        n.draw(&mut list, &config);
        assert_eq!(list.len(), 2);
    }
}
