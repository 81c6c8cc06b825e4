//! Alignment classification taxonomy

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome class of one representative-vs-representative alignment.
///
/// Variants are declared in priority order, so the derived `Ord` is the
/// tie-break order used everywhere: `1a` is the most authoritative class and
/// `5` the least. Compare classes with `<` to ask "has higher priority than".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Class {
    #[serde(rename = "1a")]
    C1a,
    #[serde(rename = "1b")]
    C1b,
    #[serde(rename = "2a")]
    C2a,
    #[serde(rename = "3a")]
    C3a,
    #[serde(rename = "2b")]
    C2b,
    #[serde(rename = "1c")]
    C1c,
    #[serde(rename = "3b")]
    C3b,
    #[serde(rename = "4a")]
    C4a,
    #[serde(rename = "4b")]
    C4b,
    #[serde(rename = "4c")]
    C4c,
    #[serde(rename = "5")]
    C5,
}

impl Class {
    /// All classes, highest priority first
    pub const ALL: [Class; 11] = [
        Class::C1a,
        Class::C1b,
        Class::C2a,
        Class::C3a,
        Class::C2b,
        Class::C1c,
        Class::C3b,
        Class::C4a,
        Class::C4b,
        Class::C4c,
        Class::C5,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Class::C1a => "1a",
            Class::C1b => "1b",
            Class::C2a => "2a",
            Class::C3a => "3a",
            Class::C2b => "2b",
            Class::C1c => "1c",
            Class::C3b => "3b",
            Class::C4a => "4a",
            Class::C4b => "4b",
            Class::C4c => "4c",
            Class::C5 => "5",
        }
    }

    /// Position in the priority order (0 = highest)
    pub fn rank(&self) -> usize {
        *self as usize
    }

    /// Whether the pair counts as a relationship at all (`4c` and `5` do not)
    pub fn is_related(&self) -> bool {
        !matches!(self, Class::C4c | Class::C5)
    }

    /// Classes where one side is negligibly rare and gets drop-marked
    pub fn is_drop_candidate(&self) -> bool {
        matches!(self, Class::C1b | Class::C2a | Class::C3a | Class::C4a)
    }

    /// Classes where neither side can be preferred automatically
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Class::C1c | Class::C2b | Class::C3b | Class::C4b)
    }

    /// Whether the pair takes part in choice grouping
    pub fn is_choice_candidate(&self) -> bool {
        self.is_related() && *self != Class::C1a
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Class {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Class::ALL
            .iter()
            .copied()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| format!("Unknown class: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        let mut shuffled = vec![
            Class::C5,
            Class::C1c,
            Class::C2a,
            Class::C1a,
            Class::C4b,
            Class::C3a,
            Class::C2b,
        ];
        shuffled.sort();
        let labels: Vec<_> = shuffled.iter().map(|c| c.as_str()).collect();
        assert_eq!(labels, vec!["1a", "2a", "3a", "2b", "1c", "4b", "5"]);

        assert!(Class::C3a < Class::C2b);
        assert!(Class::C1c < Class::C3b);
        assert_eq!(Class::C1a.rank(), 0);
        assert_eq!(Class::C5.rank(), 10);
    }

    #[test]
    fn test_parse_round_trip() {
        for class in Class::ALL {
            assert_eq!(class.as_str().parse::<Class>().unwrap(), class);
        }
        assert!("6".parse::<Class>().is_err());
    }

    #[test]
    fn test_groupings() {
        let drop: Vec<_> = Class::ALL.iter().filter(|c| c.is_drop_candidate()).collect();
        assert_eq!(drop, vec![&Class::C1b, &Class::C2a, &Class::C3a, &Class::C4a]);

        let ambiguous: Vec<_> = Class::ALL.iter().filter(|c| c.is_ambiguous()).collect();
        assert_eq!(ambiguous, vec![&Class::C2b, &Class::C1c, &Class::C3b, &Class::C4b]);

        assert!(!Class::C4c.is_related());
        assert!(!Class::C5.is_related());
        assert!(!Class::C1a.is_choice_candidate());
        assert!(Class::C1b.is_choice_candidate());
    }

    #[test]
    fn test_serde_labels() {
        let json = serde_json::to_string(&Class::C2a).unwrap();
        assert_eq!(json, "\"2a\"");
        let back: Class = serde_json::from_str("\"4c\"").unwrap();
        assert_eq!(back, Class::C4c);
    }
}
