use crate::ui::icons::{CHECK, CROSS, FILE_DEL, FILE_MOD, FILE_NEW, FOLDER, STOP};
use crate::workflow::CycleSummary;
use architect_common::{ChangeType, FileChange, GeneratedFile, PipelineEvent};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;

/// Terminal rendering of pipeline events via `indicatif`.
///
/// One bar per streamed file, stacked under a summary line. The UI only
/// reads events; it never drives the workflow.
pub struct GenerationUI {
    multi: MultiProgress,
    summary_bar: ProgressBar,
    file_bars: HashMap<String, ProgressBar>,
    files_done: usize,
    verbose: bool,
}

fn file_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{prefix:.bold.dim} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░")
}

fn summary_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{prefix:.bold.dim} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

impl GenerationUI {
    pub fn new(verbose: bool) -> Self {
        let multi = MultiProgress::new();
        let summary_bar = multi.add(ProgressBar::new(0));
        summary_bar.set_style(summary_style());
        summary_bar.set_prefix("Generating");
        summary_bar.set_message("planning files...");

        Self {
            multi,
            summary_bar,
            file_bars: HashMap::new(),
            files_done: 0,
            verbose,
        }
    }

    /// Print a line above the bars, falling back to stderr.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.multi.println(msg.as_ref()).is_err() {
            eprintln!("{}", msg.as_ref());
        }
    }

    pub fn handle(&mut self, event: &PipelineEvent) {
        match event {
            PipelineEvent::FileStreamStart { file } => self.start_file(file),
            PipelineEvent::FileStreamUpdate { progress } => {
                if let Some(bar) = self.file_bars.get(&progress.file_path) {
                    bar.set_position(progress.current_line as u64);
                }
            }
            PipelineEvent::FileStreamComplete { file } => {
                self.files_done += 1;
                if let Some(bar) = self.file_bars.get(&file.path) {
                    bar.finish_with_message(format!("{}", CHECK));
                }
                self.summary_bar
                    .set_message(format!("{} files streamed", style(self.files_done).cyan()));
            }
            PipelineEvent::GenerationComplete { files, cancelled } => {
                self.finish(files, *cancelled)
            }
            PipelineEvent::ChangeApplied { change } => {
                self.print_line(format!(
                    "  {} {}",
                    change_icon(change.change_type),
                    style(&change.file_path).green()
                ));
            }
            PipelineEvent::ChangeFailed { change, reason } => {
                self.print_line(format!(
                    "  {} {} {}",
                    CROSS,
                    style(&change.file_path).red(),
                    style(reason).dim()
                ));
            }
            PipelineEvent::PhaseChanged { from, to } if self.verbose => {
                self.print_line(format!(
                    "  {} {} → {}",
                    style("phase").dim(),
                    from,
                    style(to).bold()
                ));
            }
            _ => {}
        }
    }

    fn start_file(&mut self, file: &GeneratedFile) {
        let bar = self
            .multi
            .add(ProgressBar::new(file.total_lines() as u64));
        bar.set_style(file_style());
        bar.set_prefix(format!("{:<28}", file.path));
        self.file_bars.insert(file.path.clone(), bar);
    }

    fn finish(&mut self, files: &[GeneratedFile], cancelled: bool) {
        for file in files.iter().filter(|f| !f.is_complete()) {
            if let Some(bar) = self.file_bars.get(&file.path) {
                bar.abandon_with_message(format!("{}cancelled", STOP));
            }
        }
        let msg = if cancelled {
            format!(
                "{}cancelled after {} of {} files",
                STOP,
                self.files_done,
                files.len()
            )
        } else {
            format!("{}{} files generated", CHECK, files.len())
        };
        self.summary_bar.finish_with_message(msg);
    }

    /// Call after a user-requested cancel so the request is visible at once.
    pub fn cancel_requested(&self) {
        self.summary_bar
            .set_message(format!("{}cancelling after the current line...", STOP));
    }
}

fn change_icon(change_type: ChangeType) -> console::Emoji<'static, 'static> {
    match change_type {
        ChangeType::New => FILE_NEW,
        ChangeType::Modified => FILE_MOD,
        ChangeType::Deleted => FILE_DEL,
    }
}

/// One review line: id, type, path and line counts.
pub fn format_change(change: &FileChange) -> String {
    format!(
        "{} {} {} {} {}",
        style(change.id).dim(),
        change_icon(change.change_type),
        style(&change.file_path).bold(),
        style(format!("+{}", change.added_lines)).green(),
        style(format!("-{}", change.removed_lines)).red(),
    )
}

/// The end-of-cycle "game" view.
pub fn print_summary(summary: &CycleSummary) {
    println!();
    println!(
        "{} {}",
        crate::ui::icons::GAME,
        style("Cycle complete").green().bold()
    );
    println!("  {} {}", FOLDER, summary.description);
    println!(
        "  {} files written, {} lines",
        style(summary.files_written).cyan(),
        style(summary.lines_written).cyan()
    );
    if summary.rejected > 0 {
        println!("  {} rejected", style(summary.rejected).yellow());
    }
    if summary.failed > 0 {
        println!("  {} failed", style(summary.failed).red());
    }
    println!("  {}", style(format!("cycle {}", summary.cycle_id)).dim());
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_common::{ChangeId, NewChange, StreamingProgress};

    fn hidden_ui() -> GenerationUI {
        let mut ui = GenerationUI::new(false);
        ui.multi
            .set_draw_target(indicatif::ProgressDrawTarget::hidden());
        ui
    }

    #[test]
    fn test_ui_tracks_streamed_files() {
        let mut ui = hidden_ui();
        let mut file = GeneratedFile::planned("src/index.ts", "a\nb\nc");
        ui.handle(&PipelineEvent::FileStreamStart { file: file.clone() });
        ui.handle(&PipelineEvent::FileStreamUpdate {
            progress: StreamingProgress {
                file_path: file.path.clone(),
                current_line: 2,
                total_lines: 3,
                line_text: "b".to_string(),
            },
        });
        assert_eq!(ui.file_bars["src/index.ts"].position(), 2);

        file.status = architect_common::FileStatus::Complete;
        ui.handle(&PipelineEvent::FileStreamComplete { file: file.clone() });
        assert_eq!(ui.files_done, 1);
        assert!(ui.file_bars["src/index.ts"].is_finished());
    }

    #[test]
    fn test_update_for_unknown_file_is_ignored() {
        let mut ui = hidden_ui();
        ui.handle(&PipelineEvent::FileStreamUpdate {
            progress: StreamingProgress {
                file_path: "nope.ts".to_string(),
                current_line: 1,
                total_lines: 1,
                line_text: String::new(),
            },
        });
        assert!(ui.file_bars.is_empty());
    }

    #[test]
    fn test_format_change_mentions_path_and_counts() {
        let change = NewChange::from(&GeneratedFile::planned("src/a.ts", "x\ny"))
            .into_change(ChangeId(3));
        let line = console::strip_ansi_codes(&format_change(&change)).to_string();
        assert!(line.contains("change-3"));
        assert!(line.contains("src/a.ts"));
        assert!(line.contains("+2"));
        assert!(line.contains("-0"));
    }
}
