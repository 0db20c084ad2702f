// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Big-real encoding of complex kets and operators.
//!
//! A complex ket ψ of length N is stored as the real vector `[Re ψ; Im ψ]`
//! of length 2N. A complex operator M = A + iB becomes the real block matrix
//!
//! ```text
//! ┌       ┐
//! │ A  -B │
//! │ B   A │
//! └       ┘
//! ```
//!
//! which acts on big-real kets exactly as M acts on complex ones, and is
//! closed under products and matrix exponentials. All training arithmetic
//! happens in this encoding.

use ndarray::{s, Array1, Array2, ArrayView1};
use num_complex::Complex64;

use crate::error::{Error, Result};

/// Encode a complex ket as `[Re ψ; Im ψ]`.
pub fn ket_to_bigreal(ket: &Array1<Complex64>) -> Array1<f64> {
    let n = ket.len();
    let mut out = Array1::zeros(2 * n);
    for (i, z) in ket.iter().enumerate() {
        out[i] = z.re;
        out[n + i] = z.im;
    }
    out
}

/// Decode a big-real ket back into complex form.
pub fn bigreal_to_ket(ket: ArrayView1<'_, f64>) -> Result<Array1<Complex64>> {
    let (re, im) = split_ket(ket)?;
    Ok(re
        .iter()
        .zip(im.iter())
        .map(|(&r, &i)| Complex64::new(r, i))
        .collect())
}

/// Split a big-real ket into its real and imaginary halves.
pub fn split_ket(ket: ArrayView1<'_, f64>) -> Result<(ArrayView1<'_, f64>, ArrayView1<'_, f64>)> {
    let len = ket.len();
    if len % 2 != 0 {
        return Err(Error::Config(format!(
            "big-real ket must have even length, got {}",
            len
        )));
    }
    let half = len / 2;
    Ok((ket.slice_move(s![..half]), ket.slice_move(s![half..])))
}

/// Encode a complex operator as `[[A, -B], [B, A]]`.
pub fn operator_to_bigreal(op: &Array2<Complex64>) -> Array2<f64> {
    let (rows, cols) = op.dim();
    let mut out = Array2::zeros((2 * rows, 2 * cols));
    for ((i, j), z) in op.indexed_iter() {
        out[[i, j]] = z.re;
        out[[i, cols + j]] = -z.im;
        out[[rows + i, j]] = z.im;
        out[[rows + i, cols + j]] = z.re;
    }
    out
}

/// Decode a big-real operator, reading A from the top-left block and B
/// from the bottom-left block.
pub fn bigreal_to_operator(op: &Array2<f64>) -> Result<Array2<Complex64>> {
    let (rows, cols) = op.dim();
    if rows % 2 != 0 || cols % 2 != 0 {
        return Err(Error::Config(format!(
            "big-real operator must have even dimensions, got {} × {}",
            rows, cols
        )));
    }
    let (r, c) = (rows / 2, cols / 2);
    Ok(Array2::from_shape_fn((r, c), |(i, j)| {
        Complex64::new(op[[i, j]], op[[r + i, j]])
    }))
}
