//! Target/Reference scenario namespacing.
//!
//! The two parallel evaluations of the building share one store. They are
//! kept apart by a key convention: the Target value for field `d_20` lives
//! under `d_20`, the Reference value under `ref_d_20`. All cross-scenario
//! isolation in the system ultimately rests on this mapping being applied
//! consistently, so it lives in exactly one place.

/// Store-key prefix for the Reference scenario.
pub const REF_PREFIX: &str = "ref_";

/// The two building scenarios kept permanently in parallel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// The user's as-designed building.
    Target,
    /// The code-mandated baseline the design is compared against.
    Reference,
}

impl Scenario {
    pub const BOTH: [Scenario; 2] = [Scenario::Target, Scenario::Reference];

    /// Store key for a field id in this scenario's namespace.
    pub fn key(&self, id: &str) -> String {
        match self {
            Scenario::Target => id.to_string(),
            Scenario::Reference => format!("{REF_PREFIX}{id}"),
        }
    }

    /// Split a store key into its scenario and base field id.
    pub fn split_key(key: &str) -> (Scenario, &str) {
        match key.strip_prefix(REF_PREFIX) {
            Some(base) => (Scenario::Reference, base),
            None => (Scenario::Target, key),
        }
    }

    /// Lowercase label used in cache file names and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Target => "target",
            Scenario::Reference => "reference",
        }
    }

    pub fn parse(s: &str) -> Option<Scenario> {
        match s {
            "target" => Some(Scenario::Target),
            "reference" => Some(Scenario::Reference),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_round_trip() {
        assert_eq!(Scenario::Target.key("d_20"), "d_20");
        assert_eq!(Scenario::Reference.key("d_20"), "ref_d_20");
        assert_eq!(Scenario::split_key("ref_d_20"), (Scenario::Reference, "d_20"));
        assert_eq!(Scenario::split_key("d_20"), (Scenario::Target, "d_20"));
    }
}
