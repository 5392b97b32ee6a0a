//! Configuração do qualboard carregada a partir de `qualboard.toml`.
//!
//! A struct [`QualboardConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! As variáveis de ambiente `QUALBOARD_API_URL` e `QUALBOARD_API_TOKEN`
//! têm precedência sobre o arquivo.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::QualboardError;
use crate::workflow::EntityKind;

/// Configuração de nível superior carregada de `qualboard.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct QualboardConfig {
    /// URL base da API REST do sistema de gestão da qualidade.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Token enviado como `Authorization: Bearer`. Vazio desativa o cabeçalho.
    #[serde(default)]
    pub api_token: String,

    /// Recurso REST dos achados de auditoria.
    #[serde(default = "default_findings_resource")]
    pub findings_resource: String,

    /// Recurso REST das ações corretivas.
    #[serde(default = "default_actions_resource")]
    pub actions_resource: String,

    /// Espera máxima, em milissegundos, por uma resposta do backend.
    #[serde(default = "default_sync_timeout_ms")]
    pub sync_timeout_ms: u64,

    /// Emite logs em JSON em vez de texto.
    #[serde(default)]
    pub log_json: bool,
}

// Valor padrão da URL da API: servidor local de desenvolvimento.
fn default_api_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_findings_resource() -> String {
    "hallazgos".to_string()
}

fn default_actions_resource() -> String {
    "acciones".to_string()
}

// Valor padrão da espera: 10s.
fn default_sync_timeout_ms() -> u64 {
    10_000
}

impl Default for QualboardConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_token: String::new(),
            findings_resource: default_findings_resource(),
            actions_resource: default_actions_resource(),
            sync_timeout_ms: default_sync_timeout_ms(),
            log_json: false,
        }
    }
}

impl QualboardConfig {
    /// Carrega a configuração de `qualboard.toml` no diretório atual.
    pub fn load() -> Result<Self, QualboardError> {
        Self::load_from(Path::new("qualboard.toml"))
    }

    /// Carrega a configuração do caminho indicado.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load_from(path: &Path) -> Result<Self, QualboardError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<QualboardConfig>(&contents)?
        } else {
            Self::default()
        };

        // Variáveis de ambiente têm precedência sobre o arquivo.
        if let Ok(url) = std::env::var("QUALBOARD_API_URL")
            && !url.is_empty()
        {
            config.api_url = url;
        }
        if let Ok(token) = std::env::var("QUALBOARD_API_TOKEN")
            && !token.is_empty()
        {
            config.api_token = token;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), QualboardError> {
        if self.sync_timeout_ms == 0 {
            return Err(QualboardError::Config(
                "sync_timeout_ms must be greater than zero".into(),
            ));
        }
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(QualboardError::Config(format!(
                "api_url must be an http(s) URL, got `{}`",
                self.api_url
            )));
        }
        Ok(())
    }

    pub fn sync_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_timeout_ms)
    }

    /// Recurso REST correspondente ao tipo de entidade.
    pub fn resource_for(&self, entity: EntityKind) -> &str {
        match entity {
            EntityKind::Findings => &self.findings_resource,
            EntityKind::Actions => &self.actions_resource,
        }
    }
}
