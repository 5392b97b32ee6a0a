//! Corpos de requisição enviados ao backend REST.

use serde::Serialize;

/// Corpo do `PUT /{recurso}/{id}`: atualiza apenas o campo `estado`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateStatusRequest<'a> {
    pub estado: &'a str,
}
