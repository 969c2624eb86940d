//! Named UI controls whose enabled state follows history transitions.

use std::collections::HashSet;

/// A toolbar control driven by the action history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Affordance {
    Undo,
    Redo,
    Clear,
    Apply,
}

impl Affordance {
    pub fn all() -> &'static [Affordance] {
        &[
            Affordance::Undo,
            Affordance::Redo,
            Affordance::Clear,
            Affordance::Apply,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Affordance::Undo => "Undo",
            Affordance::Redo => "Redo",
            Affordance::Clear => "Clear",
            Affordance::Apply => "Apply",
        }
    }
}

/// Receiver of enable/disable notifications.
///
/// The history never reads affordance state back; it only writes to the sink.
pub trait AffordanceSink {
    fn enable(&mut self, names: &[Affordance]);
    fn disable(&mut self, names: &[Affordance]);
}

/// The set of currently clickable controls. Everything starts disabled.
#[derive(Debug, Clone, Default)]
pub struct Affordances {
    enabled: HashSet<Affordance>,
}

impl Affordances {
    pub fn is_enabled(&self, affordance: Affordance) -> bool {
        self.enabled.contains(&affordance)
    }
}

impl AffordanceSink for Affordances {
    fn enable(&mut self, names: &[Affordance]) {
        self.enabled.extend(names.iter().copied());
    }

    fn disable(&mut self, names: &[Affordance]) {
        for name in names {
            self.enabled.remove(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affordances_start_disabled() {
        let affordances = Affordances::default();
        for affordance in Affordance::all() {
            assert!(!affordances.is_enabled(*affordance));
        }
    }

    #[test]
    fn test_enable_then_disable() {
        let mut affordances = Affordances::default();
        affordances.enable(&[Affordance::Undo, Affordance::Apply]);
        assert!(affordances.is_enabled(Affordance::Undo));
        assert!(affordances.is_enabled(Affordance::Apply));
        assert!(!affordances.is_enabled(Affordance::Redo));

        affordances.disable(&[Affordance::Undo, Affordance::Redo]);
        assert!(!affordances.is_enabled(Affordance::Undo));
        assert!(affordances.is_enabled(Affordance::Apply));
    }
}
