// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Gradient-ascent update rules and their per-parameter state.

use ndarray::{Array1, Zip};

use super::types::UpdateRule;

/// Accumulators carried between steps of one rule.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateState {
    Momentum {
        momentum: f64,
        velocity: Array1<f64>,
    },
    Adadelta {
        rho: f64,
        epsilon: f64,
        /// Running average of squared gradients.
        grad_sq: Array1<f64>,
        /// Running average of squared steps.
        step_sq: Array1<f64>,
    },
    Plain,
}

impl UpdateState {
    /// Zeroed state for `num_parameters` parameters.
    pub fn new(rule: UpdateRule, num_parameters: usize) -> Self {
        match rule {
            UpdateRule::Momentum { momentum } => UpdateState::Momentum {
                momentum,
                velocity: Array1::zeros(num_parameters),
            },
            UpdateRule::Adadelta { rho, epsilon } => UpdateState::Adadelta {
                rho,
                epsilon,
                grad_sq: Array1::zeros(num_parameters),
                step_sq: Array1::zeros(num_parameters),
            },
            UpdateRule::Plain => UpdateState::Plain,
        }
    }

    /// Move `parameters` uphill along `grad`.
    pub fn apply(&mut self, parameters: &mut Array1<f64>, grad: &Array1<f64>, learning_rate: f64) {
        match self {
            UpdateState::Momentum { momentum, velocity } => {
                let mu = *momentum;
                Zip::from(velocity)
                    .and(parameters)
                    .and(grad)
                    .for_each(|v, p, &g| {
                        *v = mu * *v + learning_rate * g;
                        *p += *v;
                    });
            }
            UpdateState::Adadelta {
                rho,
                epsilon,
                grad_sq,
                step_sq,
            } => {
                let (rho, eps) = (*rho, *epsilon);
                Zip::from(grad_sq)
                    .and(step_sq)
                    .and(parameters)
                    .and(grad)
                    .for_each(|eg, ex, p, &g| {
                        *eg = rho * *eg + (1.0 - rho) * g * g;
                        let step = (*ex + eps).sqrt() / (*eg + eps).sqrt() * g;
                        *ex = rho * *ex + (1.0 - rho) * step * step;
                        *p += step;
                    });
            }
            UpdateState::Plain => {
                parameters.scaled_add(learning_rate, grad);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plain_ascent() {
        let mut state = UpdateState::new(UpdateRule::Plain, 2);
        let mut p = Array1::from(vec![1.0, -1.0]);
        state.apply(&mut p, &Array1::from(vec![0.5, 2.0]), 0.1);
        assert_relative_eq!(p[0], 1.05, epsilon = 1e-12);
        assert_relative_eq!(p[1], -0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_momentum_accumulates_velocity() {
        let mut state = UpdateState::new(UpdateRule::Momentum { momentum: 0.5 }, 1);
        let mut p = Array1::from(vec![0.0]);
        let g = Array1::from(vec![1.0]);

        state.apply(&mut p, &g, 0.1);
        assert_relative_eq!(p[0], 0.1, epsilon = 1e-12);
        // v = 0.5·0.1 + 0.1 = 0.15
        state.apply(&mut p, &g, 0.1);
        assert_relative_eq!(p[0], 0.25, epsilon = 1e-12);
        // v = 0.5·0.15 + 0.1 = 0.175
        state.apply(&mut p, &g, 0.1);
        assert_relative_eq!(p[0], 0.425, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_momentum_is_plain() {
        let mut momentum = UpdateState::new(UpdateRule::Momentum { momentum: 0.0 }, 3);
        let mut plain = UpdateState::new(UpdateRule::Plain, 3);
        let mut a = Array1::from(vec![0.1, 0.2, 0.3]);
        let mut b = a.clone();
        for g in [vec![1.0, -1.0, 0.5], vec![0.2, 0.0, -0.3]] {
            let g = Array1::from(g);
            momentum.apply(&mut a, &g, 0.05);
            plain.apply(&mut b, &g, 0.05);
        }
        for (x, y) in a.iter().zip(b.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_adadelta_first_step() {
        let (rho, eps): (f64, f64) = (0.95, 1e-6);
        let mut state = UpdateState::new(UpdateRule::adadelta(), 1);
        let mut p = Array1::from(vec![0.0]);
        let g: f64 = 2.0;
        state.apply(&mut p, &Array1::from(vec![g]), 123.0);

        let eg = (1.0 - rho) * g * g;
        let expected = eps.sqrt() / (eg + eps).sqrt() * g;
        assert_relative_eq!(p[0], expected, epsilon = 1e-15);
        assert!(p[0] > 0.0);

        if let UpdateState::Adadelta { step_sq, .. } = &state {
            assert_relative_eq!(step_sq[0], (1.0 - rho) * expected * expected, epsilon = 1e-15);
        } else {
            panic!("wrong state variant");
        }
    }

    #[test]
    fn test_adadelta_ignores_learning_rate() {
        let mut a = UpdateState::new(UpdateRule::adadelta(), 2);
        let mut b = UpdateState::new(UpdateRule::adadelta(), 2);
        let mut pa = Array1::zeros(2);
        let mut pb = Array1::zeros(2);
        let g = Array1::from(vec![0.3, -0.7]);
        a.apply(&mut pa, &g, 0.01);
        b.apply(&mut pb, &g, 10.0);
        assert_eq!(pa, pb);
    }
}
