//! Interface de linha de comando do qualboard baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (stages, board, move, demo)
//! e flags globais (--entity, --config, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use qualboard::workflow::{EntityKind, StageId};

/// qualboard: quadro de ciclo de vida para achados e ações corretivas.
#[derive(Debug, Parser)]
#[command(name = "qualboard", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Tipo de registro exibido no quadro.
    #[arg(long, short, global = true, value_enum, default_value_t = EntityArg::Findings)]
    pub entity: EntityArg,

    /// Caminho para o arquivo de configuração (padrão: ./qualboard.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Tipo de entidade aceito pela CLI, mapeado para [`EntityKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityArg {
    /// Achados de auditoria (hallazgos).
    Findings,
    /// Ações corretivas (acciones).
    Actions,
}

impl From<EntityArg> for EntityKind {
    fn from(arg: EntityArg) -> Self {
        match arg {
            EntityArg::Findings => EntityKind::Findings,
            EntityArg::Actions => EntityKind::Actions,
        }
    }
}

/// Etapa de destino aceita pela CLI, mapeada para [`StageId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StageArg {
    Detection,
    Treatment,
    Verification,
    Closure,
}

impl From<StageArg> for StageId {
    fn from(arg: StageArg) -> Self {
        match arg {
            StageArg::Detection => StageId::Detection,
            StageArg::Treatment => StageId::Treatment,
            StageArg::Verification => StageId::Verification,
            StageArg::Closure => StageId::Closure,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lista as etapas, os estados e as transições permitidas.
    Stages,

    /// Busca os registros no backend e mostra o quadro por etapa.
    Board,

    /// Move um registro para outra etapa, como um arrastar-e-soltar.
    Move {
        /// Identificador do registro.
        id: String,

        /// Etapa de destino.
        #[arg(value_enum)]
        stage: StageArg,
    },

    /// Executa uma demonstração com armazenamento em memória.
    Demo,
}
