use std::collections::HashMap;

use serde::Serialize;

use super::stage::StageId;
use crate::error::RegistryError;

/// One fine-grained status value and the stage it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusDescriptor {
    pub id: String,
    pub label: String,
    pub stage: StageId,
}

impl StatusDescriptor {
    pub fn new(id: &str, label: &str, stage: StageId) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            stage,
        }
    }
}

/// Static lookup table from status id to stage, plus the status each stage
/// hands to items that enter it from the board.
#[derive(Debug, Clone)]
pub struct StatusRegistry {
    statuses: Vec<StatusDescriptor>,
    index: HashMap<String, usize>,
    entry: HashMap<StageId, String>,
}

impl StatusRegistry {
    /// Builds the registry, rejecting duplicate ids and entry statuses that
    /// are unknown or belong to a different stage.
    pub fn new(
        statuses: Vec<StatusDescriptor>,
        entry_statuses: &[(StageId, &str)],
    ) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(statuses.len());
        for (i, descriptor) in statuses.iter().enumerate() {
            if index.insert(descriptor.id.clone(), i).is_some() {
                return Err(RegistryError::DuplicateStatus(descriptor.id.clone()));
            }
        }

        let mut entry = HashMap::new();
        for &(stage, status) in entry_statuses {
            let owner = index.get(status).map(|&i| statuses[i].stage);
            if owner != Some(stage) {
                return Err(RegistryError::EntryStatusMismatch {
                    stage,
                    status: status.to_string(),
                });
            }
            if entry.insert(stage, status.to_string()).is_some() {
                return Err(RegistryError::DuplicateEntryStatus(stage));
            }
        }

        Ok(Self {
            statuses,
            index,
            entry,
        })
    }

    pub fn descriptor(&self, status: &str) -> Option<&StatusDescriptor> {
        self.index.get(status).map(|&i| &self.statuses[i])
    }

    /// Stage of `status`, or `None` for legacy values missing from the table.
    pub fn stage_of(&self, status: &str) -> Option<StageId> {
        self.descriptor(status).map(|d| d.stage)
    }

    /// Entry status of `stage`; `None` marks a display-only stage.
    pub fn entry_status(&self, stage: StageId) -> Option<&str> {
        self.entry.get(&stage).map(String::as_str)
    }

    pub fn statuses(&self) -> &[StatusDescriptor] {
        &self.statuses
    }

    pub fn statuses_in(&self, stage: StageId) -> impl Iterator<Item = &StatusDescriptor> {
        self.statuses.iter().filter(move |d| d.stage == stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<StatusDescriptor> {
        vec![
            StatusDescriptor::new("d1_iniciado", "Iniciado", StageId::Detection),
            StatusDescriptor::new("t1_en_analisis", "En análisis", StageId::Treatment),
            StatusDescriptor::new("t2_plan_definido", "Plan definido", StageId::Treatment),
        ]
    }

    #[test]
    fn lookup_by_status() {
        let registry = StatusRegistry::new(sample(), &[(StageId::Treatment, "t1_en_analisis")]).unwrap();
        assert_eq!(registry.stage_of("t2_plan_definido"), Some(StageId::Treatment));
        assert_eq!(registry.stage_of("estado_legado"), None);
        assert_eq!(registry.descriptor("d1_iniciado").unwrap().label, "Iniciado");
        assert_eq!(registry.statuses_in(StageId::Treatment).count(), 2);
    }

    #[test]
    fn entry_status_lookup() {
        let registry = StatusRegistry::new(sample(), &[(StageId::Treatment, "t1_en_analisis")]).unwrap();
        assert_eq!(registry.entry_status(StageId::Treatment), Some("t1_en_analisis"));
        assert_eq!(registry.entry_status(StageId::Detection), None);
    }

    #[test]
    fn duplicate_status_is_rejected() {
        let mut statuses = sample();
        statuses.push(StatusDescriptor::new("d1_iniciado", "Otra vez", StageId::Closure));
        let err = StatusRegistry::new(statuses, &[]).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateStatus(id) if id == "d1_iniciado"));
    }

    #[test]
    fn entry_status_from_another_stage_is_rejected() {
        let err = StatusRegistry::new(sample(), &[(StageId::Detection, "t1_en_analisis")]).unwrap_err();
        assert!(matches!(err, RegistryError::EntryStatusMismatch { stage: StageId::Detection, .. }));
    }

    #[test]
    fn unknown_entry_status_is_rejected() {
        let err = StatusRegistry::new(sample(), &[(StageId::Closure, "z1_cerrado")]).unwrap_err();
        assert!(matches!(err, RegistryError::EntryStatusMismatch { .. }));
    }

    #[test]
    fn two_entry_statuses_for_one_stage_are_rejected() {
        let err = StatusRegistry::new(
            sample(),
            &[
                (StageId::Treatment, "t1_en_analisis"),
                (StageId::Treatment, "t2_plan_definido"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateEntryStatus(StageId::Treatment)));
    }
}
