use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("layer configuration is empty")]
    NoLayers,

    #[error("need at least an input and an output layer, got {0} layer(s)")]
    TooFewLayers(usize),

    #[error("layer {0} has no neurons")]
    EmptyLayer(usize),

    #[error("input cluster size {cluster} does not fit an input layer of {input} neurons")]
    ClusterSize { cluster: usize, input: usize },

    #[error("`{0}` must be positive")]
    NonPositive(&'static str),

    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("serializing config: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
