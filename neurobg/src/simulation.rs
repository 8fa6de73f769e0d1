use rand::{SeedableRng, rngs::StdRng};

use crate::{
    config::{Config, DeviceClass},
    error::Result,
    inference::{InferenceState, Phase},
    particle::InputParticle,
    render::{Point, Renderer},
    signal::Signal,
    topology::Topology,
};

/// The host's latest view of the outside world, read once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// Last known pointer position, `None` when there is no pointer over the surface
    pub pointer: Option<Point>,
    /// Set by the host, e.g. while an overlay covers the surface
    pub paused: bool,
    /// Vertical scroll of the hosting view; past one viewport height the
    /// surface is out of view
    pub scroll_offset: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing was simulated or drawn
    Skipped,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub frame: u64,
    pub phase: Phase,
    pub neurons: usize,
    pub synapses: usize,
    pub signals: usize,
    pub particles: usize,
    pub winner: Option<usize>,
    /// Signals that reached the output layer since the simulation started
    pub output_deliveries: u64,
}

/// Everything one running visualization owns.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    config: Config,
    device: DeviceClass,
    width: f32,
    height: f32,
    topology: Topology,
    signals: Vec<Signal>,
    particles: Vec<InputParticle>,
    inference: InferenceState,
    frame: u64,
    output_deliveries: u64,
    rng: StdRng,
}

impl Simulation {
    pub fn new(config: Config, device: DeviceClass, width: f32, height: f32) -> Result<Self> {
        Self::with_rng(config, device, width, height, StdRng::from_os_rng())
    }

    /// Same as [`Simulation::new`] with reproducible randomness.
    pub fn with_seed(
        config: Config,
        device: DeviceClass,
        width: f32,
        height: f32,
        seed: u64,
    ) -> Result<Self> {
        Self::with_rng(config, device, width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        config: Config,
        device: DeviceClass,
        width: f32,
        height: f32,
        mut rng: StdRng,
    ) -> Result<Self> {
        config.validate()?;
        let topology = Topology::build(&config, width, height, device, &mut rng);
        tracing::info!(
            ?device,
            width,
            height,
            neurons = topology.neurons.len(),
            synapses = topology.synapses.len(),
            "network built"
        );

        Ok(Self {
            config,
            device,
            width,
            height,
            topology,
            signals: Vec::new(),
            particles: Vec::new(),
            inference: InferenceState::new(),
            frame: 0,
            output_deliveries: 0,
            rng,
        })
    }

    /// Rebuild the whole network for a new viewport.
    ///
    /// Nothing survives: in-flight signals and particles are dropped and a
    /// running cycle is abandoned.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.topology = Topology::build(&self.config, width, height, self.device, &mut self.rng);
        self.signals.clear();
        self.particles.clear();
        self.inference.reset();
        tracing::info!(width, height, "network rebuilt");
    }

    pub fn is_visible(&self, input: &FrameInput) -> bool {
        !input.paused && input.scroll_offset <= self.height
    }

    /// Run one frame and draw it back to front: connections, signals,
    /// particles, neurons.
    pub fn step(&mut self, input: &FrameInput, renderer: &mut impl Renderer) -> StepOutcome {
        if !self.is_visible(input) {
            return StepOutcome::Skipped;
        }
        self.frame += 1;

        let config = &self.config;
        let topology = &mut self.topology;

        if self.inference.should_start(self.frame, config) {
            let particles = self.inference.start_cycle(topology, config, &mut self.rng);
            self.particles.extend(particles);
        } else {
            self.inference.advance(topology, config);
        }

        for i in 0..topology.neurons.len() {
            let neuron = &mut topology.neurons[i];
            neuron.set_hover(input.pointer, config);
            if neuron.update(config) {
                spawn_signals(topology, i, config, &mut self.signals);
            }
        }

        for synapse in &mut topology.synapses {
            synapse.update(config);
            synapse.draw(&topology.neurons, renderer, config);
        }

        for signal in &mut self.signals {
            if let Some(delivery) = signal.update(topology, config, &mut self.rng) {
                if delivery.reached_output {
                    self.output_deliveries += 1;
                }
            }
        }
        self.signals.retain(|s| s.alive);
        for signal in &self.signals {
            signal.draw(topology, renderer, config);
        }

        let mut hits = Vec::new();
        for particle in &mut self.particles {
            if particle.update(&mut topology.neurons, config) {
                hits.push(particle.target);
            }
            particle.draw(renderer, config);
        }
        self.particles.retain(|p| !p.is_done());
        for target in hits {
            spawn_signals(topology, target, config, &mut self.signals);
        }

        for neuron in &topology.neurons {
            neuron.draw(renderer, config);
        }

        StepOutcome::Advanced
    }

    pub fn stats(&self) -> Stats {
        Stats {
            frame: self.frame,
            phase: self.inference.phase,
            neurons: self.topology.neurons.len(),
            synapses: self.topology.synapses.len(),
            signals: self.signals.len(),
            particles: self.particles.len(),
            output_deliveries: self.output_deliveries,
            winner: self.topology.neurons[self.topology.output_range()]
                .iter()
                .position(|n| n.is_winner),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    pub fn viewport(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn topology_mut(&mut self) -> &mut Topology {
        &mut self.topology
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn particles(&self) -> &[InputParticle] {
        &self.particles
    }

    pub fn inference(&self) -> &InferenceState {
        &self.inference
    }
}

/// One new signal per outgoing synapse of `neuron`.
fn spawn_signals(topology: &Topology, neuron: usize, config: &Config, signals: &mut Vec<Signal>) {
    signals.extend(
        topology
            .outgoing(neuron)
            .map(|synapse| Signal::new(synapse, config)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, DrawList};

    fn small() -> Simulation {
        let config = Config {
            layers: vec![2, 3, 2],
            input_cluster_size: 1,
            ..Config::default()
        };
        Simulation::with_seed(config, DeviceClass::Desktop, 800.0, 600.0, 42).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let config = Config {
            layers: vec![2, 0, 2],
            ..Config::default()
        };
        assert!(Simulation::with_seed(config, DeviceClass::Desktop, 800.0, 600.0, 0).is_err());
    }

    #[test]
    fn paused_frames_change_nothing() {
        let mut sim = small();
        let mut list = DrawList::new();
        for _ in 0..250 {
            sim.step(&FrameInput::default(), &mut list);
        }

        let before = sim.clone();
        list.clear();
        let paused = FrameInput {
            paused: true,
            pointer: Some(Point::new(400.0, 300.0)),
            ..FrameInput::default()
        };
        for _ in 0..100 {
            assert_eq!(sim.step(&paused, &mut list), StepOutcome::Skipped);
        }
        assert_eq!(sim, before);
        assert!(list.is_empty());
    }

    #[test]
    fn scrolled_out_of_view_is_paused() {
        let mut sim = small();
        let mut list = DrawList::new();
        let scrolled = FrameInput {
            scroll_offset: 601.0,
            ..FrameInput::default()
        };
        assert_eq!(sim.step(&scrolled, &mut list), StepOutcome::Skipped);
        assert_eq!(sim.frame(), 0);

        let at_edge = FrameInput {
            scroll_offset: 600.0,
            ..FrameInput::default()
        };
        assert_eq!(sim.step(&at_edge, &mut list), StepOutcome::Advanced);
        assert_eq!(sim.frame(), 1);
    }

    #[test]
    fn firing_fans_out_one_signal_per_synapse() {
        let mut sim = small();
        let mut list = DrawList::new();
        sim.topology_mut().neurons[0].potential = 10.0;

        sim.step(&FrameInput::default(), &mut list);

        let fan_out = sim.topology().outgoing(0);
        assert_eq!(sim.signals().len(), fan_out.len());
        let mut synapses: Vec<_> = sim.signals().iter().map(|s| s.synapse).collect();
        synapses.sort();
        assert_eq!(synapses, fan_out.collect::<Vec<_>>());
    }

    #[test]
    fn draw_order_is_back_to_front() {
        let mut sim = small();
        let mut list = DrawList::new();
        sim.topology_mut().neurons[0].potential = 10.0;
        sim.step(&FrameInput::default(), &mut list);

        let commands = list.commands();
        // 12 connection lines first
        assert!(
            commands[..12]
                .iter()
                .all(|c| matches!(c, DrawCommand::Line { width, .. } if *width == 0.3))
        );
        // then 3 signals (trail + head)
        assert!(matches!(commands[12], DrawCommand::Line { width, .. } if width == 1.0));
        assert!(matches!(commands[13], DrawCommand::Circle { .. }));
        // neurons last, each starting with its base glow
        assert!(matches!(commands[18], DrawCommand::Glow { radius, .. } if radius == 12.0));
        assert!(matches!(
            commands.last(),
            Some(DrawCommand::Circle { .. } | DrawCommand::Glow { .. })
        ));
    }

    #[test]
    fn hover_follows_pointer() {
        let mut sim = small();
        let mut list = DrawList::new();
        let target = sim.topology().neurons[3].pos;

        sim.step(
            &FrameInput {
                pointer: Some(target),
                ..FrameInput::default()
            },
            &mut list,
        );
        assert!(sim.topology().neurons[3].hover > 0.7);
        assert_eq!(sim.topology().neurons[0].hover, 0.0);

        sim.step(&FrameInput::default(), &mut list);
        assert!(sim.topology().neurons.iter().all(|n| n.hover == 0.0));
    }

    #[test]
    fn resize_rebuilds_everything() {
        let mut sim = small();
        let mut list = DrawList::new();
        for _ in 1..sim.config().inference_interval {
            sim.step(&FrameInput::default(), &mut list);
        }
        sim.topology_mut().neurons[0].potential = 10.0;
        sim.step(&FrameInput::default(), &mut list);
        assert!(!sim.signals().is_empty());
        assert!(!sim.particles().is_empty());
        assert_ne!(sim.inference().phase, Phase::Idle);

        sim.resize(400.0, 300.0);
        assert!(sim.signals().is_empty());
        assert!(sim.particles().is_empty());
        assert_eq!(sim.inference().phase, Phase::Idle);
        assert_eq!(sim.viewport(), (400.0, 300.0));
        assert_eq!(sim.topology().neurons.len(), 7);
        assert!(sim.topology().neurons.iter().all(|n| n.potential == 0.0));
        assert_eq!(sim.topology().neurons[0].origin, Point::new(100.0, 100.0));
    }

    #[test]
    fn stats_report_counts() {
        let sim = small();
        let stats = sim.stats();
        assert_eq!(stats.frame, 0);
        assert_eq!(stats.phase, Phase::Idle);
        assert_eq!(stats.neurons, 7);
        assert_eq!(stats.synapses, 12);
        assert_eq!(stats.signals, 0);
        assert_eq!(stats.winner, None);
        assert_eq!(stats.output_deliveries, 0);
    }

    #[test]
    fn particle_hit_fans_out_once() {
        let mut sim = small();
        let mut list = DrawList::new();
        let config = sim.config().clone();
        let target = 1;
        let target_pos = sim.topology().neurons[target].pos;

        let mut particle = InputParticle::new(Point::new(-60.0, 0.0), target, target_pos, &config);
        particle.progress = config.particle_hit_progress - particle.speed / 2.0;
        sim.particles.push(particle);

        sim.step(&FrameInput::default(), &mut list);
        let fan_out = sim.topology().outgoing(target);
        assert_eq!(sim.signals().len(), fan_out.len());
        assert!(sim.signals().iter().all(|s| fan_out.contains(&s.synapse)));
        assert!(sim.particles()[0].has_hit);
        assert!(sim.topology().neurons[target].is_input_active);

        // keep the charged neuron from firing on its own
        sim.topology_mut().neurons[target].potential = 0.0;
        sim.step(&FrameInput::default(), &mut list);
        assert_eq!(sim.signals().len(), fan_out.len());
        assert_eq!(sim.particles().len(), 1);
    }

    #[test]
    fn output_deliveries_are_counted() {
        let mut sim = small();
        let mut list = DrawList::new();
        let config = sim.config().clone();

        // hidden neuron 2 feeds both output neurons
        sim.topology_mut().neurons[2].potential = 10.0;
        let frames = (100.0 / config.signal_speed as f64).ceil() as usize;
        for _ in 0..=frames {
            sim.step(&FrameInput::default(), &mut list);
        }

        assert_eq!(sim.stats().output_deliveries, 2);
    }
}
