//! Utilities.
use crate::model::ModelBase;
use log::trace;

/// Polyak update of every variable of `dest` towards the same-named
/// variable of `src`:
///
/// `dest = tau * src + (1 - tau) * dest`
///
/// Both models must hold identical variable sets; target networks are
/// clones of their online counterparts, so names always line up.
pub fn track<M: ModelBase>(dest: &mut M, src: &mut M, tau: f64) {
    let src_vars = src.get_var_store().variables();
    let mut dest_vars = dest.get_var_store().variables();
    debug_assert_eq!(src_vars.len(), dest_vars.len());

    tch::no_grad(|| {
        for (name, src) in src_vars.iter() {
            let dest = dest_vars.get_mut(name).unwrap();
            dest.copy_(&(tau * src + (1.0 - tau) * &*dest));
        }
    });
    trace!("soft update");
}

/// Converts a flat `f32` buffer into a 2-dimensional tensor.
pub fn batch_tensor(data: &[f32], rows: i64, cols: i64, device: tch::Device) -> tch::Tensor {
    tch::Tensor::from_slice(data).reshape(&[rows, cols]).to(device)
}
