use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    render::Rgb,
};

/// Viewports narrower than this (logical px) get the mobile preset.
pub const MOBILE_BREAKPOINT: f32 = 768.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

impl DeviceClass {
    pub fn from_viewport_width(width: f32) -> Self {
        if width < MOBILE_BREAKPOINT {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }
}

/// Monochrome palette, all colors as plain RGB triplets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub background: Rgb,
    pub node_idle: Rgb,
    pub node_active: Rgb,
    pub node_highlight: Rgb,
    pub connection: Rgb,
    pub signal: Rgb,
    pub accent: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgb(0, 0, 0),
            node_idle: Rgb(40, 40, 40),
            node_active: Rgb(180, 180, 180),
            node_highlight: Rgb(240, 240, 240),
            connection: Rgb(40, 40, 40),
            signal: Rgb(200, 200, 200),
            accent: Rgb(255, 255, 255),
        }
    }
}

/// Everything that stays fixed for one simulation run.
/// All durations are in frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Neurons per layer, input layer first
    pub layers: Vec<usize>,

    // ----------------------- Neurons
    pub firing_threshold: f32,
    /// Potential multiplier per frame
    pub potential_leak: f32,
    /// Accumulated charge multiplier per frame, slower than the leak
    pub charge_decay: f32,
    pub refractory_period: u32,

    // ----------------------- Synapses
    pub base_weight: f32,
    /// Weight added per delivered signal
    pub learning_rate: f32,
    pub weight_decay: f32,
    pub activity_decay: f32,

    // ----------------------- Pointer
    pub pointer_radius: f32,
    /// Hover intensity right under the pointer
    pub pointer_influence: f32,

    // ----------------------- Inference cycle
    pub inference_interval: u64,
    pub input_cluster_size: usize,
    pub input_phase_duration: u32,
    pub propagation_delay: u32,
    pub prediction_duration: u32,
    pub winner_charge_threshold: f32,

    // ----------------------- Transients
    /// Signal progress per frame, out of 100
    pub signal_speed: f32,
    pub signal_trail: f32,
    /// Share of the synapse weight delivered as charge
    pub signal_charge_factor: f32,
    pub particle_frames_to_impact: f32,
    /// Progress at which a particle delivers, slightly before arrival
    pub particle_hit_progress: f32,
    pub particle_charge: f32,

    // ----------------------- Layout & look
    /// Mobile only: cap the vertical band to width * this
    pub mobile_max_aspect: f32,
    pub palette: Palette,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_device(DeviceClass::Desktop)
    }
}

impl Config {
    pub fn for_device(device: DeviceClass) -> Self {
        let (layers, input_cluster_size) = match device {
            DeviceClass::Mobile => (vec![3, 6, 8, 6, 3], 2),
            DeviceClass::Desktop => (vec![4, 8, 12, 12, 8, 4], 3),
        };

        Self {
            layers,
            firing_threshold: 0.6,
            potential_leak: 0.88,
            charge_decay: 0.985,
            refractory_period: 18,
            base_weight: 0.45,
            learning_rate: 0.08,
            weight_decay: 0.9996,
            activity_decay: 0.9,
            pointer_radius: 120.0,
            pointer_influence: 0.8,
            inference_interval: 200,
            input_cluster_size,
            input_phase_duration: 110,
            propagation_delay: 140,
            prediction_duration: 80,
            winner_charge_threshold: 0.15,
            signal_speed: 0.6,
            signal_trail: 25.0,
            signal_charge_factor: 0.65,
            particle_frames_to_impact: 70.0,
            particle_hit_progress: 95.0,
            particle_charge: 1.0,
            mobile_max_aspect: 1.3,
            palette: Palette::default(),
        }
    }

    /// Parse a TOML document on top of the preset for `device`.
    /// Keys missing from the document keep their preset value.
    pub fn from_toml_str(s: &str, device: DeviceClass) -> Result<Self> {
        let overrides: toml::Table = toml::from_str(s)?;
        let mut merged = toml::Value::try_from(Self::for_device(device))?;
        if let toml::Value::Table(table) = &mut merged {
            merge_tables(table, overrides);
        }

        let config: Self = merged.try_into()?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>, device: DeviceClass) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content, device)
    }

    pub fn validate(&self) -> Result<()> {
        match self.layers.len() {
            0 => return Err(Error::NoLayers),
            1 => return Err(Error::TooFewLayers(1)),
            _ => {}
        }
        if let Some(layer) = self.layers.iter().position(|&n| n == 0) {
            return Err(Error::EmptyLayer(layer));
        }

        let input = self.layers[0];
        if self.input_cluster_size == 0 || self.input_cluster_size > input {
            return Err(Error::ClusterSize {
                cluster: self.input_cluster_size,
                input,
            });
        }

        if self.inference_interval == 0 {
            return Err(Error::NonPositive("inference_interval"));
        }
        if self.signal_speed <= 0.0 {
            return Err(Error::NonPositive("signal_speed"));
        }
        if self.particle_frames_to_impact <= 0.0 {
            return Err(Error::NonPositive("particle_frames_to_impact"));
        }
        if self.firing_threshold <= 0.0 {
            return Err(Error::NonPositive("firing_threshold"));
        }
        if self.pointer_radius <= 0.0 {
            return Err(Error::NonPositive("pointer_radius"));
        }
        Ok(())
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn neuron_count(&self) -> usize {
        self.layers.iter().sum()
    }

    /// Fully connected adjacent layers: sum of n_c * n_(c+1).
    pub fn synapse_count(&self) -> usize {
        self.layers.windows(2).map(|w| w[0] * w[1]).sum()
    }
}

/// Nested tables merge key by key, everything else is replaced.
fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        if let toml::Value::Table(value) = value {
            if let Some(toml::Value::Table(inner)) = base.get_mut(&key) {
                merge_tables(inner, value);
                continue;
            }
            base.insert(key, toml::Value::Table(value));
        } else {
            base.insert(key, value);
        }
    }
}
