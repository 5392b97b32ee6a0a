//! Tipos de erro da fronteira de sincronização com o backend.
//!
//! Define [`SyncError`] com variantes para respostas de erro da API,
//! falhas de rede, registros inexistentes e tempo de espera esgotado.
//! Usa `thiserror` para derivar `Display` e `Error`.

use std::time::Duration;

use thiserror::Error;

use crate::workflow::ItemId;

/// Erros que podem ocorrer ao persistir uma mudança de estado.
///
/// - [`Api`](SyncError::Api): o backend respondeu com HTTP 4xx/5xx
/// - [`Network`](SyncError::Network): falha na camada de rede
/// - [`NotFound`](SyncError::NotFound): o registro não existe no armazenamento
/// - [`Timeout`](SyncError::Timeout): a espera limitada do controlador expirou
#[derive(Debug, Error)]
pub enum SyncError {
    /// Erro retornado pelo backend (ex.: 409 conflito, 422 validação).
    /// A mensagem vem do corpo da resposta quando disponível.
    #[error("server rejected the change (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Falha de rede subjacente (DNS, conexão recusada, corpo inválido).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("item {0} does not exist")]
    NotFound(ItemId),

    /// Nenhuma resposta dentro do prazo configurado.
    #[error("no response after {}ms", Duration::as_millis(.0))]
    Timeout(Duration),
}
