// SPDX-License-Identifier: GPL-3.0-only

//! Equality filter for repeated notifications
//!
//! Cameras deliver frames at 15-60 Hz and most of them have the same
//! geometry as the one before. A [`ChangeGate`] lets a value through only
//! when it differs from the last one admitted.

/// Stateful filter suppressing consecutive equal values
///
/// Not synchronized; the owner serializes access.
#[derive(Debug, Clone)]
pub struct ChangeGate<T> {
    last: Option<T>,
}

impl<T> Default for ChangeGate<T> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<T: PartialEq> ChangeGate<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `value` if it differs from the last admitted value
    ///
    /// Returns `true` and remembers the value when admitted; otherwise
    /// returns `false` and leaves the gate unchanged.
    pub fn admit(&mut self, value: T) -> bool {
        if self.last.as_ref() == Some(&value) {
            return false;
        }
        self.last = Some(value);
        true
    }

    /// Last admitted value
    pub fn last(&self) -> Option<&T> {
        self.last.as_ref()
    }

    /// Forget the last admitted value, returning it
    pub fn reset(&mut self) -> Option<T> {
        self.last.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_first_value() {
        let mut gate = ChangeGate::new();
        assert!(gate.admit(7));
        assert_eq!(gate.last(), Some(&7));
    }

    #[test]
    fn test_suppresses_runs_of_equal_values() {
        let mut gate = ChangeGate::new();
        let sequence = [1, 1, 1, 2, 2, 1, 3, 3, 3, 3];
        let admitted: Vec<bool> = sequence.iter().map(|&v| gate.admit(v)).collect();
        assert_eq!(
            admitted,
            vec![true, false, false, true, false, true, true, false, false, false]
        );
    }

    #[test]
    fn test_reset_readmits_same_value() {
        let mut gate = ChangeGate::new();
        assert!(gate.admit("a"));
        assert_eq!(gate.reset(), Some("a"));
        assert_eq!(gate.last(), None);
        assert!(gate.admit("a"));
    }
}
