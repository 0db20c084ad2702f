// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Interaction terms and the trainable symbol table.
//!
//! An interaction is either a self term `σ_a` on one qubit or a pairwise
//! term `σ_a ⊗ σ_b` on two qubits. Every interaction has a canonical label
//! (`J_0_x`, `J_0_1_xz`) that doubles as its serialized form and as the key
//! for initial values.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Pauli axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn from_char(c: char) -> Result<Self> {
        match c {
            'x' | 'X' => Ok(Axis::X),
            'y' | 'Y' => Ok(Axis::Y),
            'z' | 'Z' => Ok(Axis::Z),
            other => Err(Error::Config(format!(
                "invalid Pauli axis '{}', expected one of x, y, z",
                other
            ))),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Axis::X => 'x',
            Axis::Y => 'y',
            Axis::Z => 'z',
        }
    }
}

/// A single Hamiltonian term. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Interaction {
    /// `σ_axis` acting on `qubit`
    Single { qubit: usize, axis: Axis },
    /// `σ_axes.0 ⊗ σ_axes.1` acting on `qubits.0`, `qubits.1`
    Pair {
        qubits: (usize, usize),
        axes: (Axis, Axis),
    },
}

impl Interaction {
    pub fn single(qubit: usize, axis: Axis) -> Self {
        Interaction::Single { qubit, axis }
    }

    pub fn pair(q1: usize, q2: usize, a1: Axis, a2: Axis) -> Self {
        Interaction::Pair {
            qubits: (q1, q2),
            axes: (a1, a2),
        }
    }

    /// Number of qubits the term acts on (1 or 2).
    pub fn arity(&self) -> usize {
        match self {
            Interaction::Single { .. } => 1,
            Interaction::Pair { .. } => 2,
        }
    }

    /// Canonical label, e.g. `J_2_x` or `J_0_1_xz`.
    pub fn label(&self) -> String {
        match self {
            Interaction::Single { qubit, axis } => format!("J_{}_{}", qubit, axis.as_char()),
            Interaction::Pair {
                qubits: (q1, q2),
                axes: (a1, a2),
            } => format!("J_{}_{}_{}{}", q1, q2, a1.as_char(), a2.as_char()),
        }
    }

    /// `(qubit, axis)` factors of the term.
    pub fn factors(&self) -> Vec<(usize, Axis)> {
        match *self {
            Interaction::Single { qubit, axis } => vec![(qubit, axis)],
            Interaction::Pair {
                qubits: (q1, q2),
                axes: (a1, a2),
            } => vec![(q1, a1), (q2, a2)],
        }
    }

    /// Check the term fits a network of `num_qubits` qubits.
    pub fn validate(&self, num_qubits: usize) -> Result<()> {
        for (q, _) in self.factors() {
            if q >= num_qubits {
                return Err(Error::Config(format!(
                    "interaction {} references qubit {} but the network has {} qubits",
                    self, q, num_qubits
                )));
            }
        }
        if let Interaction::Pair { qubits: (a, b), .. } = self {
            if a == b {
                return Err(Error::Config(format!(
                    "pairwise interaction {} must act on two distinct qubits",
                    self
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for Interaction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::Config(format!("invalid interaction label '{}'", s));
        let body = s.strip_prefix("J_").ok_or_else(invalid)?;
        let parts: Vec<&str> = body.split('_').collect();
        let (axes, qubits) = parts.split_last().ok_or_else(invalid)?;
        let qubits = qubits
            .iter()
            .map(|q| q.parse::<usize>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;
        let axes = axes
            .chars()
            .map(Axis::from_char)
            .collect::<Result<Vec<_>>>()?;

        match (qubits.as_slice(), axes.as_slice()) {
            ([q], [a]) => Ok(Interaction::single(*q, *a)),
            ([q1, q2], [a1, a2]) => Ok(Interaction::pair(*q1, *q2, *a1, *a2)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Interaction {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Interaction> for String {
    fn from(i: Interaction) -> Self {
        i.label()
    }
}

/// One entry of a symbolic topology: the term and the symbol whose
/// coefficient drives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyEntry {
    pub interaction: Interaction,
    pub symbol: String,
}

/// Which interactions are active, and how they map onto trainable symbols.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionSpec {
    /// Every self term and every pairwise term on every unordered pair.
    #[default]
    All,
    /// Every term whose axis string is listed: `x` adds `σ_x` on every
    /// qubit, `xz` adds `σ_x ⊗ σ_z` on every pair.
    Axes(Vec<String>),
    /// Explicit terms, one parameter each.
    List(Vec<Interaction>),
    /// Terms mapped to named symbols; terms sharing a symbol share a
    /// parameter.
    Topology(Vec<TopologyEntry>),
}

impl InteractionSpec {
    /// Topology from `(interaction, symbol)` pairs.
    pub fn topology<S: Into<String>>(entries: impl IntoIterator<Item = (Interaction, S)>) -> Self {
        InteractionSpec::Topology(
            entries
                .into_iter()
                .map(|(interaction, symbol)| TopologyEntry {
                    interaction,
                    symbol: symbol.into(),
                })
                .collect(),
        )
    }
}

/// Ordered trainable symbols with the physical terms aggregated under each.
///
/// Symbols are sorted lexicographically by name so that saved parameter
/// vectors stay valid across reloads.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolTable {
    symbols: Vec<String>,
    terms: Vec<Vec<Interaction>>,
}

impl SymbolTable {
    /// Resolve an interaction specification for a network of `num_qubits`.
    pub fn build(spec: &InteractionSpec, num_qubits: usize) -> Result<Self> {
        let mut grouped: BTreeMap<String, Vec<Interaction>> = BTreeMap::new();

        match spec {
            InteractionSpec::All => {
                let mut axes: Vec<String> = Axis::ALL.iter().map(|a| a.as_char().to_string()).collect();
                for a1 in Axis::ALL {
                    for a2 in Axis::ALL {
                        axes.push(format!("{}{}", a1.as_char(), a2.as_char()));
                    }
                }
                for term in expand_axes(&axes, num_qubits)? {
                    grouped.insert(term.label(), vec![term]);
                }
            }
            InteractionSpec::Axes(axes) => {
                if axes.is_empty() {
                    return Err(Error::Config("axis filter must list at least one axis string".into()));
                }
                for term in expand_axes(axes, num_qubits)? {
                    grouped.insert(term.label(), vec![term]);
                }
            }
            InteractionSpec::List(list) => {
                for term in list {
                    term.validate(num_qubits)?;
                    if grouped.insert(term.label(), vec![*term]).is_some() {
                        return Err(Error::Config(format!("interaction {} listed twice", term)));
                    }
                }
            }
            InteractionSpec::Topology(entries) => {
                let mut seen = std::collections::HashSet::new();
                for entry in entries {
                    entry.interaction.validate(num_qubits)?;
                    if entry.symbol.trim().is_empty() {
                        return Err(Error::Config(format!(
                            "interaction {} has an empty symbol name",
                            entry.interaction
                        )));
                    }
                    if !seen.insert(entry.interaction) {
                        return Err(Error::Config(format!(
                            "interaction {} appears twice in the topology",
                            entry.interaction
                        )));
                    }
                    grouped
                        .entry(entry.symbol.clone())
                        .or_default()
                        .push(entry.interaction);
                }
            }
        }

        if grouped.is_empty() {
            return Err(Error::Config("no active interactions in the network".into()));
        }

        let (symbols, terms) = grouped.into_iter().unzip();
        Ok(Self { symbols, terms })
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Terms driven by parameter `index`.
    pub fn terms(&self, index: usize) -> &[Interaction] {
        &self.terms[index]
    }

    /// Parameter index of a symbol label.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.symbols.binary_search_by(|s| s.as_str().cmp(label)).ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Interaction])> {
        self.symbols
            .iter()
            .map(String::as_str)
            .zip(self.terms.iter().map(Vec::as_slice))
    }
}

/// All unordered qubit pairs `(i, j)` with `i < j`.
fn qubit_pairs(num_qubits: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..num_qubits).flat_map(move |i| ((i + 1)..num_qubits).map(move |j| (i, j)))
}

fn expand_axes(axes: &[String], num_qubits: usize) -> Result<Vec<Interaction>> {
    let mut out = Vec::new();
    for d in axes {
        let chars = d
            .chars()
            .map(Axis::from_char)
            .collect::<Result<Vec<_>>>()?;
        match chars.as_slice() {
            [a] => out.extend((0..num_qubits).map(|q| Interaction::single(q, *a))),
            [a1, a2] => out.extend(
                qubit_pairs(num_qubits).map(|(i, j)| Interaction::pair(i, j, *a1, *a2)),
            ),
            _ => {
                return Err(Error::Config(format!(
                    "axis string '{}' must have length 1 or 2",
                    d
                )))
            }
        }
    }
    Ok(out)
}
