// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Density matrices and block partial traces in big-real arithmetic.
//!
//! Ancilla qubits are the least significant tensor factors, so tracing
//! them out sums the diagonals of `2^a × 2^a` blocks.

use ndarray::{concatenate, s, Array1, Array2, ArrayView1, Axis};
use num_complex::Complex64;

use crate::bigreal::split_ket;
use crate::error::{Error, Result};

/// Real and imaginary parts of `|ψ⟩⟨ψ|` from a big-real ket:
///
/// `ρ_re = ψ_r ψ_rᵀ + ψ_i ψ_iᵀ`, `ρ_im = ψ_i ψ_rᵀ − ψ_r ψ_iᵀ`.
pub fn ket_to_dm(ket: ArrayView1<'_, f64>) -> Result<(Array2<f64>, Array2<f64>)> {
    let (re, im) = split_ket(ket)?;
    let (r_col, r_row) = (re.insert_axis(Axis(1)), re.insert_axis(Axis(0)));
    let (i_col, i_row) = (im.insert_axis(Axis(1)), im.insert_axis(Axis(0)));

    let dm_re = r_col.dot(&r_row) + i_col.dot(&i_row);
    let dm_im = i_col.dot(&r_row) - r_col.dot(&i_row);
    Ok((dm_re, dm_im))
}

fn shape_err(e: ndarray::ShapeError) -> Error {
    Error::Numerical(format!("reshape failed: {}", e))
}

/// Partial trace over the trailing `block`-dimensional factor: entry
/// `(r, c)` of the result is the trace of block `(r, c)`.
pub fn block_partial_trace(m: &Array2<f64>, block: usize) -> Array2<f64> {
    let reduced = m.nrows() / block;
    Array2::from_shape_fn((reduced, reduced), |(r, c)| {
        m.slice(s![r * block..(r + 1) * block, c * block..(c + 1) * block])
            .diag()
            .sum()
    })
}

/// Fidelity `Re⟨t|Tr_anc(|ψ⟩⟨ψ|)|t⟩` of an evolved full-system ket against
/// a pure system target, both big-real.
///
/// With `ρ = R + iI` the reduced matrix, this is `tᵀ · M · t̃` where
/// `M = [[I, R], [−R, I]]` and `t̃ = [−t_i; t_r]`.
pub fn fidelity_with_ptrace(
    output: ArrayView1<'_, f64>,
    target: ArrayView1<'_, f64>,
    num_ancillae: usize,
) -> Result<f64> {
    let (t_re, t_im) = split_ket(target)?;
    let block = 1usize << num_ancillae;
    let output_dim = split_ket(output)?.0.len();
    if output_dim != t_re.len() * block {
        return Err(Error::Config(format!(
            "output dimension {} is not target dimension {} times {}",
            output_dim,
            t_re.len(),
            block
        )));
    }

    let (dm_re, dm_im) = ket_to_dm(output)?;
    let reduced_re = block_partial_trace(&dm_re, block);
    let reduced_im = block_partial_trace(&dm_im, block);

    let top = concatenate(Axis(1), &[reduced_im.view(), reduced_re.view()]).map_err(shape_err)?;
    let neg_re = -&reduced_re;
    let bottom = concatenate(Axis(1), &[neg_re.view(), reduced_im.view()]).map_err(shape_err)?;
    let big_dm = concatenate(Axis(0), &[top.view(), bottom.view()]).map_err(shape_err)?;

    let neg_im = -&t_im;
    let rotated: Array1<f64> =
        concatenate(Axis(0), &[neg_im.view(), t_re.view()]).map_err(shape_err)?;
    Ok(target.dot(&big_dm.dot(&rotated)))
}

/// Reduced density matrix of a complex ket, tracing out the trailing
/// `num_ancillae` qubits.
pub fn reduced_density_matrix(ket: &Array1<Complex64>, num_ancillae: usize) -> Array2<Complex64> {
    let block = 1usize << num_ancillae;
    let reduced = ket.len() / block;
    Array2::from_shape_fn((reduced, reduced), |(r, c)| {
        (0..block)
            .map(|a| ket[r * block + a] * ket[c * block + a].conj())
            .sum()
    })
}
