//! Interfaces of neural networks.
use anyhow::Result;
use std::path::Path;
use tch::{nn, Tensor};

/// Base interface of a trainable network.
pub trait ModelBase {
    /// Trains the network given a loss.
    fn backward_step(&mut self, loss: &Tensor);

    /// Returns the variable store.
    fn get_var_store(&self) -> &nn::VarStore;

    /// Returns the variable store as a mutable reference.
    fn get_var_store_mut(&mut self) -> &mut nn::VarStore;

    /// Saves the parameters of the network.
    fn save<T: AsRef<Path>>(&self, path: T) -> Result<()>;

    /// Loads the parameters of the network.
    fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()>;
}
