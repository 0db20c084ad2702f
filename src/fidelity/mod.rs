// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! State fidelity between evolved network outputs and target states.
//!
//! Outputs live on all `n` qubits, targets on the `m` system qubits. With
//! ancillae the fidelity is taken against the reduced density matrix
//! ([`partial_trace::fidelity_with_ptrace`]); without them it is the
//! squared overlap ([`fidelity_no_ptrace`]). Both work on big-real kets.

pub mod partial_trace;

pub use partial_trace::{
    block_partial_trace, fidelity_with_ptrace, ket_to_dm, reduced_density_matrix,
};

use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::bigreal::split_ket;
use crate::error::{Error, Result};

/// Number of ancilla qubits implied by big-real output and target lengths.
///
/// Fails with a configuration error unless both are even and the output
/// dimension is the target dimension times a power of two.
pub fn ancillae_for(output_len: usize, target_len: usize) -> Result<usize> {
    if output_len % 2 != 0 || target_len % 2 != 0 || target_len == 0 {
        return Err(Error::Config(format!(
            "big-real lengths must be even and non-zero, got output {} and target {}",
            output_len, target_len
        )));
    }
    let (full, system) = (output_len / 2, target_len / 2);
    if full % system != 0 || !(full / system).is_power_of_two() {
        return Err(Error::Config(format!(
            "target dimension {} does not divide output dimension {} into a qubit register",
            system, full
        )));
    }
    Ok((full / system).trailing_zeros() as usize)
}

/// `|⟨target|ψ⟩|²` for equal-sized big-real kets.
pub fn fidelity_no_ptrace(output: ArrayView1<'_, f64>, target: ArrayView1<'_, f64>) -> Result<f64> {
    if output.len() != target.len() {
        return Err(Error::Config(format!(
            "output length {} differs from target length {}",
            output.len(),
            target.len()
        )));
    }
    let (o_re, o_im) = split_ket(output)?;
    let (t_re, t_im) = split_ket(target)?;
    let re = o_re.dot(&t_re) + o_im.dot(&t_im);
    let im = o_re.dot(&t_im) - o_im.dot(&t_re);
    Ok(re * re + im * im)
}

/// Fidelity of one output against one target, choosing the fast path when
/// there are no ancillae.
pub fn fidelity(
    output: ArrayView1<'_, f64>,
    target: ArrayView1<'_, f64>,
    num_ancillae: usize,
) -> Result<f64> {
    if num_ancillae == 0 {
        fidelity_no_ptrace(output, target)
    } else {
        fidelity_with_ptrace(output, target, num_ancillae)
    }
}

/// Per-sample fidelities of a batch (rows are samples).
pub fn fidelities(outputs: ArrayView2<'_, f64>, targets: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
    if outputs.nrows() != targets.nrows() {
        return Err(Error::Config(format!(
            "{} outputs but {} targets",
            outputs.nrows(),
            targets.nrows()
        )));
    }
    let num_ancillae = ancillae_for(outputs.ncols(), targets.ncols())?;

    let values = outputs
        .outer_iter()
        .zip(targets.outer_iter())
        .map(|(o, t)| fidelity(o, t, num_ancillae))
        .collect::<Result<Array1<f64>>>()?;

    if let Some(i) = values.iter().position(|f| !f.is_finite()) {
        return Err(Error::Numerical(format!(
            "non-finite fidelity for sample {}",
            i
        )));
    }
    Ok(values)
}

/// Mean fidelity of a batch, the training cost.
pub fn mean_fidelity(outputs: ArrayView2<'_, f64>, targets: ArrayView2<'_, f64>) -> Result<f64> {
    let values = fidelities(outputs, targets)?;
    values
        .mean()
        .ok_or_else(|| Error::Config("cannot average an empty batch".into()))
}

/// Fidelity and its gradient with respect to the big-real output ket.
///
/// With ancilla index `a` least significant, the fidelity is
/// `Σ_a |c_a|²` where `c_a = Σ_s conj(t_s) ψ_{s,a}`. This equals the
/// partial-trace form, and differentiates in closed form.
pub fn fidelity_gradient(
    output: ArrayView1<'_, f64>,
    target: ArrayView1<'_, f64>,
    num_ancillae: usize,
) -> Result<(f64, Array1<f64>)> {
    let (o_re, o_im) = split_ket(output)?;
    let (t_re, t_im) = split_ket(target)?;
    let block = 1usize << num_ancillae;
    if o_re.len() != t_re.len() * block {
        return Err(Error::Config(format!(
            "output dimension {} is not target dimension {} times {}",
            o_re.len(),
            t_re.len(),
            block
        )));
    }

    let full = o_re.len();
    let mut grad = Array1::zeros(2 * full);
    let mut value = 0.0;
    for a in 0..block {
        let (mut c_re, mut c_im) = (0.0, 0.0);
        for s in 0..t_re.len() {
            let k = s * block + a;
            c_re += t_re[s] * o_re[k] + t_im[s] * o_im[k];
            c_im += t_re[s] * o_im[k] - t_im[s] * o_re[k];
        }
        value += c_re * c_re + c_im * c_im;
        for s in 0..t_re.len() {
            let k = s * block + a;
            grad[k] = 2.0 * (c_re * t_re[s] - c_im * t_im[s]);
            grad[full + k] = 2.0 * (c_re * t_im[s] + c_im * t_re[s]);
        }
    }
    Ok((value, grad))
}
