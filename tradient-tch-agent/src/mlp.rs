//! Multilayer perceptron.
use serde::{Deserialize, Serialize};
use tch::nn;

/// Configuration of a multilayer perceptron.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MlpConfig {
    /// Input dimension.
    pub in_dim: i64,

    /// Units of the hidden layers.
    pub units: Vec<i64>,

    /// Output dimension.
    pub out_dim: i64,
}

impl MlpConfig {
    /// Constructs a configuration.
    pub fn new(in_dim: i64, units: Vec<i64>, out_dim: i64) -> Self {
        Self {
            in_dim,
            units,
            out_dim,
        }
    }
}

/// Builds the hidden stack of an MLP: a Linear/ReLU pair per entry of
/// `config.units`, with variables registered as `(prefix)(i)` (1-based)
/// under the root of `var_store`. The output layer is the caller's
/// business; `config.out_dim` is not consumed here.
pub fn mlp(prefix: &str, var_store: &nn::VarStore, config: &MlpConfig) -> nn::Sequential {
    let root = var_store.root();
    let mut seq = nn::seq();
    let mut in_dim = config.in_dim;

    for (i, &out_dim) in config.units.iter().enumerate() {
        let vs = &root / format!("{}{}", prefix, i + 1);
        seq = seq
            .add(nn::linear(vs, in_dim, out_dim, Default::default()))
            .add_fn(|x| x.relu());
        in_dim = out_dim;
    }

    seq
}
