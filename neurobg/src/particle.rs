use crate::{
    config::Config,
    neuron::Neuron,
    render::{CircleStyle, GradientStop, Point, Renderer, Rgba},
};

/// A data point flying in from off-canvas towards one input neuron.
#[derive(Debug, Clone, PartialEq)]
pub struct InputParticle {
    pub origin: Point,
    /// Target neuron index
    pub target: usize,
    /// Target position when the particle was spawned
    pub target_pos: Point,
    /// 0 at the origin, 100 on the target
    pub progress: f32,
    pub speed: f32,
    pub has_hit: bool,
}

impl InputParticle {
    pub fn new(origin: Point, target: usize, target_pos: Point, config: &Config) -> Self {
        Self {
            origin,
            target,
            target_pos,
            progress: 0.0,
            speed: 100.0 / config.particle_frames_to_impact,
            has_hit: false,
        }
    }

    /// Advance one frame. Returns true on the single frame the particle
    /// hits, after charging its target and marking it input-active.
    ///
    /// The hit lands slightly before arrival so the neuron lights up as the
    /// particle reaches it.
    pub fn update(&mut self, neurons: &mut [Neuron], config: &Config) -> bool {
        self.progress += self.speed;

        if self.has_hit || self.progress < config.particle_hit_progress {
            return false;
        }
        self.has_hit = true;

        let neuron = &mut neurons[self.target];
        neuron.receive_input(config.particle_charge);
        neuron.is_input_active = true;
        true
    }

    pub fn is_done(&self) -> bool {
        self.progress >= 100.0
    }

    pub fn position(&self) -> Point {
        self.origin
            .lerp(self.target_pos, (self.progress / 100.0).min(1.0))
    }

    pub fn draw(&self, renderer: &mut impl Renderer, config: &Config) {
        let p = &config.palette;
        let at = self.position();
        renderer.draw_radial_glow(
            at,
            4.0,
            &[
                GradientStop::new(0.0, p.node_active.alpha(0.6)),
                GradientStop::new(1.0, Rgba::TRANSPARENT),
            ],
        );
        renderer.draw_circle(at, 0.8, p.accent.alpha(0.8), CircleStyle::Fill);
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::neuron::LayerKind;

    fn target() -> Vec<Neuron> {
        let mut rng = StdRng::seed_from_u64(5);
        vec![Neuron::new(
            Point::new(100.0, 50.0),
            0,
            0,
            LayerKind::Input,
            &mut rng,
        )]
    }

    #[test]
    fn hits_exactly_once_before_arrival() {
        let config = Config::default();
        let mut neurons = target();
        let mut particle =
            InputParticle::new(Point::new(-60.0, 40.0), 0, neurons[0].pos, &config);

        let mut hits = 0;
        let mut hit_frame = None;
        let mut frame = 0;
        while !particle.is_done() {
            frame += 1;
            if particle.update(&mut neurons, &config) {
                hits += 1;
                hit_frame = Some(frame);
                assert!(!particle.is_done());
            }
        }

        assert_eq!(hits, 1);
        // 95 / (100 / 70) = 66.5
        assert_eq!(hit_frame, Some(67));
        assert_eq!(neurons[0].potential, config.particle_charge);
        assert!(neurons[0].is_input_active);

        // updates past completion stay idempotent
        assert!(!particle.update(&mut neurons, &config));
        assert_eq!(neurons[0].potential, config.particle_charge);
    }

    #[test]
    fn position_is_clamped_to_target() {
        let config = Config::default();
        let mut particle = InputParticle::new(
            Point::new(0.0, 0.0),
            0,
            Point::new(100.0, 0.0),
            &config,
        );
        assert_eq!(particle.position(), Point::new(0.0, 0.0));
        particle.progress = 50.0;
        assert_eq!(particle.position(), Point::new(50.0, 0.0));
        particle.progress = 101.0;
        assert_eq!(particle.position(), Point::new(100.0, 0.0));
    }
}
