use rand::Rng;

use crate::{
    config::Config,
    render::{CircleStyle, GradientStop, Renderer, Rgba},
    topology::Topology,
    winner::select_winner,
};

/// An action potential traveling along one synapse.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub synapse: usize,
    /// 0 at the source, 100 at the target
    pub progress: f32,
    pub speed: f32,
    pub alive: bool,
    /// Frames travelled so far
    frames: u32,
    /// Frame on which the signal lands, `ceil(100 / speed)`
    arrival: u32,
}

/// What a completed signal did on arrival.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delivery {
    pub target: usize,
    pub charge: f32,
    pub reached_output: bool,
    /// Winner after re-selection, index within the output layer
    pub winner: Option<usize>,
}

impl Signal {
    pub fn new(synapse: usize, config: &Config) -> Self {
        Self {
            synapse,
            progress: 0.0,
            speed: config.signal_speed,
            alive: true,
            frames: 0,
            arrival: frames_to_arrival(config.signal_speed),
        }
    }

    /// Advance one frame. On arrival the target is charged, the synapse
    /// strengthened and, for output targets, the winner re-picked.
    pub fn update(
        &mut self,
        topology: &mut Topology,
        config: &Config,
        rng: &mut impl Rng,
    ) -> Option<Delivery> {
        if !self.alive {
            return None;
        }

        self.frames += 1;
        if self.frames < self.arrival {
            self.progress = self.frames as f32 * self.speed;
            return None;
        }
        self.progress = 100.0;
        self.alive = false;

        let synapse = &topology.synapses[self.synapse];
        let target = synapse.target as usize;
        let charge = config.signal_charge_factor * synapse.weight;
        topology.neurons[target].receive_input(charge);
        topology.synapses[self.synapse].strengthen(config);

        let reached_output = topology.is_output(target);
        let winner = if reached_output {
            select_winner(
                topology.output_neurons_mut(),
                config.winner_charge_threshold,
                rng,
            )
        } else {
            None
        };

        Some(Delivery {
            target,
            charge,
            reached_output,
            winner,
        })
    }

    /// Bright head with a fading trail behind it.
    pub fn draw(&self, topology: &Topology, renderer: &mut impl Renderer, config: &Config) {
        let synapse = &topology.synapses[self.synapse];
        let from = topology.neurons[synapse.source as usize].pos;
        let to = topology.neurons[synapse.target as usize].pos;
        let p = &config.palette;

        let head = from.lerp(to, self.progress / 100.0);
        let tail = from.lerp(to, ((self.progress - config.signal_trail) / 100.0).max(0.0));

        renderer.draw_line_gradient(
            tail,
            head,
            1.0,
            &[
                GradientStop::new(0.0, Rgba::TRANSPARENT),
                GradientStop::new(0.5, p.signal.alpha(0.2)),
                GradientStop::new(1.0, p.accent.alpha(0.4)),
            ],
        );
        renderer.draw_circle(head, 1.5, p.accent.alpha(0.7), CircleStyle::Fill);
    }
}

/// Frames needed to cover 100 at `speed`.
fn frames_to_arrival(speed: f32) -> u32 {
    (100.0 / speed as f64).ceil() as u32
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::config::DeviceClass;

    fn setup(speed: f32) -> (Config, Topology, StdRng) {
        let config = Config {
            layers: vec![2, 3, 2],
            input_cluster_size: 1,
            signal_speed: speed,
            ..Config::default()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let topology = Topology::build(&config, 800.0, 600.0, DeviceClass::Desktop, &mut rng);
        (config, topology, rng)
    }

    fn count_frames(speed: f32) -> usize {
        let (config, mut topology, mut rng) = setup(speed);
        let mut signal = Signal::new(0, &config);
        let mut frames = 0;
        while signal.alive {
            signal.update(&mut topology, &config, &mut rng);
            frames += 1;
        }
        frames
    }

    #[test]
    fn arrives_after_ceil_frames() {
        assert_eq!(count_frames(2.5), 40);
        assert_eq!(count_frames(0.6), 167);
        assert_eq!(count_frames(3.0), 34);
        assert_eq!(count_frames(0.1), 1_000);
        assert_eq!(count_frames(0.2), 500);
    }

    #[test]
    fn arrival_matches_ceil_across_speeds() {
        for step in 1..=400u32 {
            let speed = step as f32 * 0.05;
            let expected = (100.0 / speed as f64).ceil() as usize;
            assert_eq!(count_frames(speed), expected, "speed {speed}");
        }
    }

    #[test]
    fn progress_tracks_frames_in_flight() {
        let (config, mut topology, mut rng) = setup(0.1);
        let mut signal = Signal::new(0, &config);
        for _ in 0..999 {
            signal.update(&mut topology, &config, &mut rng);
            assert!(signal.alive);
            assert!(signal.progress < 100.0);
        }
        assert!((signal.progress - 99.9).abs() < 1e-3);
        assert!(signal.update(&mut topology, &config, &mut rng).is_some());
        assert!(!signal.alive);
    }

    #[test]
    fn delivery_charges_and_strengthens() {
        let (config, mut topology, mut rng) = setup(50.0);
        let synapse = topology.outgoing(0).start;
        let target = topology.synapses[synapse].target as usize;

        let mut signal = Signal::new(synapse, &config);
        assert_eq!(signal.update(&mut topology, &config, &mut rng), None);
        let delivery = signal.update(&mut topology, &config, &mut rng).unwrap();

        let expected = config.signal_charge_factor * config.base_weight;
        assert_eq!(delivery.target, target);
        assert_eq!(delivery.charge, expected);
        assert!(!delivery.reached_output);
        assert_eq!(delivery.winner, None);
        assert_eq!(topology.neurons[target].potential, expected);
        assert_eq!(
            topology.synapses[synapse].weight,
            config.base_weight + config.learning_rate
        );
        assert_eq!(topology.synapses[synapse].activity, 1.0);

        // dead signals are inert
        assert_eq!(signal.update(&mut topology, &config, &mut rng), None);
        assert_eq!(topology.neurons[target].potential, expected);
    }

    #[test]
    fn refractory_target_drops_charge() {
        let (config, mut topology, mut rng) = setup(100.0);
        let synapse = topology.outgoing(0).start;
        let target = topology.synapses[synapse].target as usize;
        topology.neurons[target].refractory = 5;

        let mut signal = Signal::new(synapse, &config);
        assert!(signal.update(&mut topology, &config, &mut rng).is_some());
        assert_eq!(topology.neurons[target].potential, 0.0);
        // the synapse still learns
        assert!(topology.synapses[synapse].weight > config.base_weight);
    }

    #[test]
    fn output_delivery_picks_winner() {
        let (config, mut topology, mut rng) = setup(100.0);
        let synapse = topology.outgoing(2).start;
        let target = topology.synapses[synapse].target as usize;
        assert!(topology.is_output(target));
        topology.neurons[target].accumulated_charge = 1.0;

        let mut signal = Signal::new(synapse, &config);
        let delivery = signal.update(&mut topology, &config, &mut rng).unwrap();

        let local = target - topology.output_start();
        assert!(delivery.reached_output);
        assert_eq!(delivery.winner, Some(local));
        assert!(topology.neurons[target].is_winner);
    }

    #[test]
    fn trail_is_clamped_to_source() {
        let (config, topology, _) = setup(1.0);
        let mut signal = Signal::new(0, &config);
        signal.progress = 10.0;

        let mut list = crate::render::DrawList::new();
        signal.draw(&topology, &mut list, &config);

        let synapse = &topology.synapses[0];
        let source = topology.neurons[synapse.source as usize].pos;
        match &list.commands()[0] {
            crate::render::DrawCommand::Line { from, .. } => assert_eq!(*from, source),
            other => panic!("expected trail line, got {other:?}"),
        }
    }
}
