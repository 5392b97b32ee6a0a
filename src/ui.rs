//! Interface de terminal do qualboard: spinners e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner exibido enquanto uma mudança
//! é sincronizada e `console` para estilização com cores. O quadro é
//! impresso como uma coluna por etapa, seguida dos registros sem etapa.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use qualboard::board::{Board, MoveOutcome, Notice, NoticeLevel};
use qualboard::workflow::Workflow;

/// Spinner exibido enquanto o backend confirma uma mudança de estado.
pub struct SyncProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl SyncProgress {
    /// Inicia o spinner com a descrição da mudança.
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Finaliza o spinner e exibe o resultado do movimento.
    pub fn finish(&self, outcome: &MoveOutcome) {
        self.pb.finish_and_clear();
        match outcome {
            MoveOutcome::Applied(item) => {
                println!("  {} {} → {}", self.green.apply_to("✓"), item.id, item.status);
            }
            MoveOutcome::Unchanged => {
                println!("  {} unchanged", self.yellow.apply_to("·"));
            }
            MoveOutcome::Rejected(reason) => {
                println!("  {} {reason}", self.yellow.apply_to("⊘"));
            }
            MoveOutcome::Failed(reason) => {
                println!("  {} {reason}", self.red.apply_to("✗"));
            }
        }
    }
}

/// Imprime um aviso emitido pelo controlador do quadro.
pub fn print_notice(notice: &Notice) {
    let style = match notice.level {
        NoticeLevel::Info => Style::new().cyan(),
        NoticeLevel::Warning => Style::new().yellow(),
        NoticeLevel::Error => Style::new().red().bold(),
    };
    println!("  {} {}", style.apply_to(format!("[{}]", notice.level)), notice.message);
}

/// Imprime o quadro: uma seção por etapa com seus registros.
pub fn print_board(workflow: &Workflow, board: &Board) {
    let header = Style::new().bold().underlined();
    let dim = Style::new().dim();

    for column in &board.columns {
        println!(
            "{} {}",
            header.apply_to(column.stage.label()),
            dim.apply_to(format!("({})", column.items.len()))
        );
        for item in &column.items {
            let label = workflow
                .registry()
                .descriptor(&item.status)
                .map(|d| d.label.as_str())
                .unwrap_or(item.status.as_str());
            match &item.title {
                Some(title) => println!("  #{} {title} {}", item.id, dim.apply_to(label)),
                None => println!("  #{} {}", item.id, dim.apply_to(label)),
            }
        }
        println!();
    }

    if !board.unclassified.is_empty() {
        let warn = Style::new().yellow().bold();
        println!("{}", warn.apply_to(format!("Unclassified ({})", board.unclassified.len())));
        for item in &board.unclassified {
            println!("  #{} {}", item.id, warn.apply_to(&item.status));
        }
    }
}

/// Imprime as etapas, seus estados e as transições permitidas.
pub fn print_stages(workflow: &Workflow) {
    let header = Style::new().bold();
    let dim = Style::new().dim();

    for &stage in workflow.stages() {
        let entry = workflow.entry_status_for(stage);
        println!("{} {}", header.apply_to(stage.label()), dim.apply_to(format!("[{stage}]")));
        for descriptor in workflow.registry().statuses_in(stage) {
            let marker = if Some(descriptor.id.as_str()) == entry { "→" } else { " " };
            println!("  {marker} {:<34} {}", descriptor.id, dim.apply_to(&descriptor.label));
        }
    }

    println!();
    println!("{}", header.apply_to("Transitions"));
    for &(from, to) in workflow.order().transitions() {
        let backward = workflow.order().position(to) < workflow.order().position(from);
        let note = if backward { " (reopen)" } else { "" };
        println!("  {} → {}{}", from.label(), to.label(), dim.apply_to(note));
    }
    if workflow.stages().iter().any(|&s| workflow.entry_status_for(s).is_none()) {
        println!();
        println!(
            "{}",
            dim.apply_to("Stages without an entry status do not accept dropped records.")
        );
    }
}
