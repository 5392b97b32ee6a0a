use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, UnknownStage};

/// The coarse phases a finding or action moves through.
///
/// The variant order here is only a default; legality is decided by a
/// [`StageOrder`], never by comparing variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Detection,
    Treatment,
    Verification,
    Closure,
}

impl StageId {
    pub const ALL: [StageId; 4] = [
        StageId::Detection,
        StageId::Treatment,
        StageId::Verification,
        StageId::Closure,
    ];

    /// Column title shown on the board.
    pub fn label(&self) -> &'static str {
        match self {
            StageId::Detection => "Detección",
            StageId::Treatment => "Tratamiento",
            StageId::Verification => "Verificación",
            StageId::Closure => "Cierre",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageId::Detection => write!(f, "DETECTION"),
            StageId::Treatment => write!(f, "TREATMENT"),
            StageId::Verification => write!(f, "VERIFICATION"),
            StageId::Closure => write!(f, "CLOSURE"),
        }
    }
}

impl FromStr for StageId {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "detection" | "deteccion" | "detección" => Ok(StageId::Detection),
            "treatment" | "tratamiento" => Ok(StageId::Treatment),
            "verification" | "verificacion" | "verificación" => Ok(StageId::Verification),
            "closure" | "closed" | "cierre" | "cerrado" => Ok(StageId::Closure),
            other => Err(UnknownStage(other.to_string())),
        }
    }
}

/// Canonical forward path of a workflow plus its allowed backward edges,
/// compiled into one table of legal `(from, to)` pairs.
#[derive(Debug, Clone)]
pub struct StageOrder {
    stages: Vec<StageId>,
    transitions: Vec<(StageId, StageId)>,
}

impl StageOrder {
    /// Builds the transition table: every consecutive forward pair of
    /// `stages`, then each entry of `backward`.
    ///
    /// Backward edges must connect two ordered stages and point strictly
    /// backwards; anything else would reopen stage skipping.
    pub fn new(
        stages: Vec<StageId>,
        backward: &[(StageId, StageId)],
    ) -> Result<Self, RegistryError> {
        for (i, stage) in stages.iter().enumerate() {
            if stages[..i].contains(stage) {
                return Err(RegistryError::DuplicateStage(*stage));
            }
        }

        let mut transitions: Vec<(StageId, StageId)> =
            stages.windows(2).map(|w| (w[0], w[1])).collect();

        for &(from, to) in backward {
            let from_idx = stages.iter().position(|s| *s == from);
            let to_idx = stages.iter().position(|s| *s == to);
            match (from_idx, to_idx) {
                (Some(f), Some(t)) if t < f => {
                    if !transitions.contains(&(from, to)) {
                        transitions.push((from, to));
                    }
                }
                _ => return Err(RegistryError::InvalidBackwardEdge { from, to }),
            }
        }

        Ok(Self {
            stages,
            transitions,
        })
    }

    pub fn stages(&self) -> &[StageId] {
        &self.stages
    }

    pub fn contains(&self, stage: StageId) -> bool {
        self.stages.contains(&stage)
    }

    pub fn position(&self, stage: StageId) -> Option<usize> {
        self.stages.iter().position(|s| *s == stage)
    }

    /// The stage directly after `stage`, if any.
    pub fn next(&self, stage: StageId) -> Option<StageId> {
        self.position(stage)
            .and_then(|i| self.stages.get(i + 1))
            .copied()
    }

    /// Whether `(from, to)` is a row of the transition table.
    pub fn allows(&self, from: StageId, to: StageId) -> bool {
        self.transitions.contains(&(from, to))
    }

    pub fn transitions(&self) -> &[(StageId, StageId)] {
        &self.transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_order() -> StageOrder {
        StageOrder::new(
            StageId::ALL.to_vec(),
            &[(StageId::Verification, StageId::Treatment)],
        )
        .unwrap()
    }

    #[test]
    fn forward_pairs_are_consecutive_only() {
        let order = full_order();
        assert!(order.allows(StageId::Detection, StageId::Treatment));
        assert!(order.allows(StageId::Treatment, StageId::Verification));
        assert!(order.allows(StageId::Verification, StageId::Closure));
        assert!(!order.allows(StageId::Detection, StageId::Verification));
        assert!(!order.allows(StageId::Detection, StageId::Closure));
    }

    #[test]
    fn backward_exception_is_the_only_backward_edge() {
        let order = full_order();
        assert!(order.allows(StageId::Verification, StageId::Treatment));
        assert!(!order.allows(StageId::Treatment, StageId::Detection));
        assert!(!order.allows(StageId::Closure, StageId::Verification));
        assert!(!order.allows(StageId::Verification, StageId::Detection));
        assert_eq!(order.transitions().len(), 4);
    }

    #[test]
    fn forward_exception_is_rejected() {
        let err = StageOrder::new(
            StageId::ALL.to_vec(),
            &[(StageId::Detection, StageId::Closure)],
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidBackwardEdge { .. }));
    }

    #[test]
    fn exception_outside_order_is_rejected() {
        let err = StageOrder::new(
            vec![StageId::Treatment, StageId::Verification],
            &[(StageId::Verification, StageId::Detection)],
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidBackwardEdge { .. }));
    }

    #[test]
    fn duplicate_stage_is_rejected() {
        let err = StageOrder::new(
            vec![StageId::Detection, StageId::Treatment, StageId::Detection],
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateStage(StageId::Detection)));
    }

    #[test]
    fn next_stage_walks_the_order() {
        let order = full_order();
        assert_eq!(order.next(StageId::Detection), Some(StageId::Treatment));
        assert_eq!(order.next(StageId::Verification), Some(StageId::Closure));
        assert_eq!(order.next(StageId::Closure), None);
    }

    #[test]
    fn stage_parses_english_and_spanish() {
        assert_eq!("treatment".parse::<StageId>().unwrap(), StageId::Treatment);
        assert_eq!("Verificación".parse::<StageId>().unwrap(), StageId::Verification);
        assert_eq!("CIERRE".parse::<StageId>().unwrap(), StageId::Closure);
        assert_eq!(
            " Backlog ".parse::<StageId>(),
            Err(UnknownStage("backlog".to_string()))
        );
    }

    #[test]
    fn stage_display_and_serde() {
        assert_eq!(StageId::Detection.to_string(), "DETECTION");
        assert_eq!(StageId::Closure.label(), "Cierre");
        let json = serde_json::to_string(&StageId::Verification).unwrap();
        assert_eq!(json, r#""verification""#);
    }
}
