use std::fmt::{Display, Formatter};

use crate::error::{Error, Result};

/// Index of a circuit line. Bit `i` of a pattern word is the value of line `i`.
pub type Line = usize;

/// A control line with its polarity (`true` is active-high).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Control {
    pub line: Line,
    pub polarity: bool,
}

impl Control {
    pub const fn positive(line: Line) -> Self {
        Self {
            line,
            polarity: true,
        }
    }

    pub const fn negative(line: Line) -> Self {
        Self {
            line,
            polarity: false,
        }
    }

    pub fn is_satisfied(&self, word: u64) -> bool {
        ((word >> self.line) & 1 == 1) == self.polarity
    }
}

impl Display for Control {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", if self.polarity { "+" } else { "-" }, self.line)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Gate {
    /// Flips `target` iff all controls are satisfied.
    Toffoli { controls: Vec<Control>, target: Line },
    /// Swaps both targets iff all controls are satisfied.
    Fredkin {
        controls: Vec<Control>,
        targets: [Line; 2],
    },
}

// Constructors
impl Gate {
    pub fn toffoli(controls: impl IntoIterator<Item = Control>, target: Line) -> Result<Gate> {
        let controls = normalize_controls(controls, &[target])?;
        Ok(Gate::Toffoli { controls, target })
    }

    pub fn fredkin(controls: impl IntoIterator<Item = Control>, a: Line, b: Line) -> Result<Gate> {
        if a == b {
            return Err(Error::InvalidGate(format!(
                "Fredkin targets must differ, got {} twice",
                a
            )));
        }
        let controls = normalize_controls(controls, &[a, b])?;
        Ok(Gate::Fredkin {
            controls,
            targets: [a.min(b), a.max(b)],
        })
    }

    /// Toffoli gate with positive controls on every line set in `mask`.
    pub fn toffoli_from_mask(mask: u64, target: Line) -> Result<Gate> {
        Gate::toffoli(crate::utils::ones(mask).map(Control::positive), target)
    }

    pub fn not(target: Line) -> Gate {
        Gate::Toffoli {
            controls: Vec::new(),
            target,
        }
    }

    pub fn cnot(control: Line, target: Line) -> Result<Gate> {
        Gate::toffoli([Control::positive(control)], target)
    }
}

fn normalize_controls(
    controls: impl IntoIterator<Item = Control>,
    targets: &[Line],
) -> Result<Vec<Control>> {
    let mut controls: Vec<Control> = controls.into_iter().collect();
    controls.sort();
    for pair in controls.windows(2) {
        if pair[0].line == pair[1].line {
            return Err(Error::InvalidGate(format!(
                "line {} is controlled twice",
                pair[0].line
            )));
        }
    }
    if let Some(c) = controls.iter().find(|c| targets.contains(&c.line)) {
        return Err(Error::InvalidGate(format!(
            "line {} is both a control and a target",
            c.line
        )));
    }
    Ok(controls)
}

// Getters
impl Gate {
    pub fn controls(&self) -> &[Control] {
        match self {
            Gate::Toffoli { controls, .. } => controls,
            Gate::Fredkin { controls, .. } => controls,
        }
    }

    pub fn targets(&self) -> &[Line] {
        match self {
            Gate::Toffoli { target, .. } => std::slice::from_ref(target),
            Gate::Fredkin { targets, .. } => targets,
        }
    }

    pub fn is_toffoli(&self) -> bool {
        matches!(self, Gate::Toffoli { .. })
    }

    pub fn is_fredkin(&self) -> bool {
        matches!(self, Gate::Fredkin { .. })
    }

    /// Largest line index the gate touches.
    pub fn max_line(&self) -> Line {
        self.controls()
            .iter()
            .map(|c| c.line)
            .chain(self.targets().iter().copied())
            .max()
            .unwrap_or(0)
    }

    /// Lines of the positive controls as a bit mask.
    pub fn positive_mask(&self) -> u64 {
        self.controls()
            .iter()
            .filter(|c| c.polarity)
            .fold(0, |mask, c| mask | (1 << c.line))
    }

    pub fn is_active(&self, word: u64) -> bool {
        self.controls().iter().all(|c| c.is_satisfied(word))
    }

    /// Apply the gate to a pattern word.
    pub fn apply(&self, word: u64) -> u64 {
        if !self.is_active(word) {
            return word;
        }
        match self {
            Gate::Toffoli { target, .. } => word ^ (1 << target),
            Gate::Fredkin { targets: [a, b], .. } => {
                let bit_a = (word >> a) & 1;
                let bit_b = (word >> b) & 1;
                if bit_a == bit_b {
                    word
                } else {
                    word ^ (1 << a) ^ (1 << b)
                }
            }
        }
    }
}

impl Display for Gate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Gate::Toffoli { .. } => "toffoli",
            Gate::Fredkin { .. } => "fredkin",
        };
        write!(f, "{}(", name)?;
        for c in self.controls() {
            write!(f, "{} ", c)?;
        }
        write!(f, "->")?;
        for t in self.targets() {
            write!(f, " {}", t)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_toffoli_apply() {
        let gate = Gate::toffoli([Control::positive(0), Control::negative(2)], 1).unwrap();
        assert_eq!(gate.apply(0b001), 0b011);
        assert_eq!(gate.apply(0b011), 0b001);
        assert_eq!(gate.apply(0b101), 0b101);
        assert_eq!(gate.apply(0b000), 0b000);
    }

    #[test]
    fn test_fredkin_apply() {
        let gate = Gate::fredkin([Control::positive(2)], 1, 0).unwrap();
        assert_eq!(gate.targets(), &[0, 1]);
        assert_eq!(gate.apply(0b101), 0b110);
        assert_eq!(gate.apply(0b110), 0b101);
        assert_eq!(gate.apply(0b111), 0b111);
        assert_eq!(gate.apply(0b001), 0b001);
    }

    #[test]
    fn test_gates_are_involutions() {
        let gates = [
            Gate::not(1),
            Gate::cnot(0, 2).unwrap(),
            Gate::toffoli([Control::negative(0), Control::positive(1)], 3).unwrap(),
            Gate::fredkin([Control::negative(3)], 0, 2).unwrap(),
        ];
        for gate in &gates {
            for word in 0..16 {
                assert_eq!(gate.apply(gate.apply(word)), word, "{}", gate);
            }
        }
    }

    #[test]
    fn test_invalid_gates() {
        assert!(matches!(
            Gate::toffoli([Control::positive(1)], 1),
            Err(Error::InvalidGate(_))
        ));
        assert!(matches!(
            Gate::toffoli([Control::positive(0), Control::negative(0)], 1),
            Err(Error::InvalidGate(_))
        ));
        assert!(matches!(Gate::fredkin([], 2, 2), Err(Error::InvalidGate(_))));
        assert!(matches!(
            Gate::fredkin([Control::positive(2)], 2, 0),
            Err(Error::InvalidGate(_))
        ));
    }

    #[test]
    fn test_controls_are_sorted() {
        let a = Gate::toffoli([Control::positive(2), Control::positive(0)], 1).unwrap();
        let b = Gate::toffoli_from_mask(0b101, 1).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.positive_mask(), 0b101);
        assert_eq!(a.max_line(), 2);
        assert_eq!(a.to_string(), "toffoli(+0 +2 -> 1)");
    }
}
