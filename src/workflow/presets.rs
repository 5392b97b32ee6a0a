//! Built-in workflow tables for findings and corrective actions.

use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::engine::Workflow;
use super::registry::{StatusDescriptor, StatusRegistry};
use super::stage::{StageId, StageOrder};
use crate::error::RegistryError;

/// Verification found the treatment ineffective and sends it back.
const REOPEN_TREATMENT: (StageId, StageId) = (StageId::Verification, StageId::Treatment);

static FINDINGS: LazyLock<Workflow> =
    LazyLock::new(|| build_findings().expect("built-in findings table is valid"));

static ACTIONS: LazyLock<Workflow> =
    LazyLock::new(|| build_actions().expect("built-in actions table is valid"));

/// Workflow for audit findings (hallazgos).
pub fn findings() -> &'static Workflow {
    &FINDINGS
}

/// Workflow for corrective actions (acciones).
pub fn actions() -> &'static Workflow {
    &ACTIONS
}

fn build_findings() -> Result<Workflow, RegistryError> {
    use StageId::*;

    let statuses = vec![
        StatusDescriptor::new("d1_iniciado", "Iniciado", Detection),
        StatusDescriptor::new("d2_en_revision", "En revisión", Detection),
        StatusDescriptor::new("d3_registrado", "Registrado", Detection),
        StatusDescriptor::new("t1_en_analisis", "En análisis", Treatment),
        StatusDescriptor::new("t2_causa_raiz_identificada", "Causa raíz identificada", Treatment),
        StatusDescriptor::new("t3_plan_de_accion_definido", "Plan de acción definido", Treatment),
        StatusDescriptor::new("t4_acciones_en_curso", "Acciones en curso", Treatment),
        StatusDescriptor::new("c1_pendiente_de_verificacion", "Pendiente de verificación", Verification),
        StatusDescriptor::new("c2_verificacion_programada", "Verificación programada", Verification),
        StatusDescriptor::new("c3_en_verificacion", "En verificación", Verification),
        StatusDescriptor::new("c4_ejecutada_la_verificacion", "Ejecutada la verificación", Verification),
        StatusDescriptor::new("z1_cerrado_eficaz", "Cerrado eficaz", Closure),
        StatusDescriptor::new("z2_cerrado_no_eficaz", "Cerrado no eficaz", Closure),
        StatusDescriptor::new("z3_anulado", "Anulado", Closure),
    ];

    // Closure has no entry status: it is reached through the verification
    // form, never by dragging.
    let registry = StatusRegistry::new(
        statuses,
        &[
            (Detection, "d1_iniciado"),
            (Treatment, "t1_en_analisis"),
            (Verification, "c1_pendiente_de_verificacion"),
        ],
    )?;
    let order = StageOrder::new(
        vec![Detection, Treatment, Verification, Closure],
        &[REOPEN_TREATMENT],
    )?;

    Workflow::new("findings", registry, order)
}

fn build_actions() -> Result<Workflow, RegistryError> {
    use StageId::*;

    let statuses = vec![
        StatusDescriptor::new("a1_planificada", "Planificada", Treatment),
        StatusDescriptor::new("a2_en_ejecucion", "En ejecución", Treatment),
        StatusDescriptor::new("a3_ejecutada", "Ejecutada", Treatment),
        StatusDescriptor::new("v1_pendiente_de_verificacion", "Pendiente de verificación", Verification),
        StatusDescriptor::new("v2_en_verificacion", "En verificación", Verification),
        StatusDescriptor::new("v3_ejecutada_la_verificacion", "Ejecutada la verificación", Verification),
        StatusDescriptor::new("x1_cerrada_eficaz", "Cerrada eficaz", Closure),
        StatusDescriptor::new("x2_cerrada_no_eficaz", "Cerrada no eficaz", Closure),
        StatusDescriptor::new("x3_cancelada", "Cancelada", Closure),
    ];

    let registry = StatusRegistry::new(
        statuses,
        &[
            (Treatment, "a1_planificada"),
            (Verification, "v1_pendiente_de_verificacion"),
        ],
    )?;
    let order = StageOrder::new(vec![Treatment, Verification, Closure], &[REOPEN_TREATMENT])?;

    Workflow::new("actions", registry, order)
}

/// The two kinds of record tracked on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Findings,
    Actions,
}

impl EntityKind {
    pub fn workflow(&self) -> &'static Workflow {
        match self {
            EntityKind::Findings => findings(),
            EntityKind::Actions => actions(),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Findings => write!(f, "findings"),
            EntityKind::Actions => write!(f, "actions"),
        }
    }
}
