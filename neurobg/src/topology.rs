use std::ops::Range;

use rand::Rng;

use crate::{
    config::{Config, DeviceClass},
    neuron::{LayerKind, Neuron},
    render::Point,
    synapse::Synapse,
};

/// Neurons laid out in layers, fully connected layer to layer.
///
/// Synapses are stored grouped by source (CSR), so the outgoing synapses of
/// neuron `i` are `synapses[out_offset[i]..out_offset[i + 1]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    pub neurons: Vec<Neuron>,
    pub synapses: Vec<Synapse>,
    out_offset: Vec<u32>,
    /// Input layer is `0..input_end`
    input_end: usize,
    /// Output layer is `output_start..`
    output_start: usize,
}

impl Topology {
    /// Lay out `config.layers` over a `width × height` viewport.
    ///
    /// Layers are spread evenly across the width, neurons evenly down a
    /// vertically centered band. On mobile the band is capped so tall
    /// screens don't stretch the network.
    pub fn build(
        config: &Config,
        width: f32,
        height: f32,
        device: DeviceClass,
        rng: &mut impl Rng,
    ) -> Self {
        let layers = &config.layers;
        let layer_count = layers.len();
        let n = config.neuron_count();

        let mut usable_height = height;
        let mut y_start = 0.0;
        if device == DeviceClass::Mobile {
            let ideal_height = width * config.mobile_max_aspect;
            if height > ideal_height {
                usable_height = ideal_height;
                y_start = (height - ideal_height) / 2.0;
            }
        }

        let x_step = width / (layer_count + 1) as f32;
        let mut neurons = Vec::with_capacity(n);
        let mut layer_start = Vec::with_capacity(layer_count);
        for (layer, &count) in layers.iter().enumerate() {
            layer_start.push(neurons.len());
            let kind = LayerKind::of(layer, layer_count);
            let x = x_step * (layer + 1) as f32;
            let y_step = usable_height / (count + 1) as f32;
            for i in 0..count {
                let y = y_start + y_step * (i + 1) as f32;
                neurons.push(Neuron::new(Point::new(x, y), layer, i, kind, rng));
            }
        }

        // CSR: neurons are visited in index order, each one closes its range
        let mut out_offset = Vec::with_capacity(n + 1);
        let mut synapses = Vec::with_capacity(config.synapse_count());
        out_offset.push(0);
        for (layer, &count) in layers.iter().enumerate() {
            for i in 0..count {
                let source = layer_start[layer] + i;
                if layer + 1 < layer_count {
                    let next = layer_start[layer + 1];
                    for j in 0..layers[layer + 1] {
                        synapses.push(Synapse::new(source as u32, (next + j) as u32, config));
                    }
                }
                out_offset.push(synapses.len() as u32);

                debug_assert_eq!(out_offset.len(), source + 2);
            }
        }

        Self {
            neurons,
            synapses,
            out_offset,
            input_end: layers.first().copied().unwrap_or(0),
            output_start: layer_start.last().copied().unwrap_or(0),
        }
    }

    pub fn input_range(&self) -> Range<usize> {
        0..self.input_end
    }

    pub fn output_start(&self) -> usize {
        self.output_start
    }

    pub fn output_range(&self) -> Range<usize> {
        self.output_start..self.neurons.len()
    }

    pub fn is_output(&self, neuron: usize) -> bool {
        neuron >= self.output_start
    }

    /// Synapse indices leaving `neuron`.
    pub fn outgoing(&self, neuron: usize) -> Range<usize> {
        self.out_offset[neuron] as usize..self.out_offset[neuron + 1] as usize
    }

    pub fn output_neurons_mut(&mut self) -> &mut [Neuron] {
        let start = self.output_start;
        &mut self.neurons[start..]
    }

    pub fn clear_winners(&mut self) {
        for n in self.output_neurons_mut() {
            n.is_winner = false;
        }
    }
}
