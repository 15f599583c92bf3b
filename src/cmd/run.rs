//! Full generation cycle (`architect new`) and resumption (`architect resume`).

use anyhow::{Context, Result};
use architect::architect_config::ArchitectConfig;
use architect::gates::{GateDecision, ReviewGate};
use architect::init::init_project;
use architect::ledger::FsWriter;
use architect::store::FileStore;
use architect::ui::GenerationUI;
use architect::ui::icons::{CHECK, CROSS, QUESTION, REVIEW, SPARKLE};
use architect::ui::progress::print_summary;
use architect::workflow::{GenerationReport, ResumeOutcome, WorkflowOrchestrator};
use architect_common::spec::FEATURES_QUESTION;
use architect_common::{
    CancellationToken, ClarificationAnswer, ClarificationQuestion, Phase, PipelineEvent,
    ProjectSpecification,
};
use console::style;
use dialoguer::{Confirm, Input, MultiSelect, Select, theme::ColorfulTheme};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};

fn build_workflow(config: &ArchitectConfig) -> WorkflowOrchestrator {
    WorkflowOrchestrator::new(
        config.workflow_settings(),
        Arc::new(FsWriter),
        Box::new(FileStore::new(config.state_dir())),
    )
}

pub async fn cmd_new(config: &ArchitectConfig, description: &str, dest: Option<&Path>) -> Result<()> {
    init_project(&config.project_dir)?;
    let mut wf = build_workflow(config);
    let mut rx = wf.subscribe();
    let yes = config.auto_approve();

    if wf.pending_spec()?.is_some() {
        println!(
            "{}",
            style("Note: an unfinished specification from an earlier run will be replaced.").yellow()
        );
    }

    println!();
    println!("{} {}", QUESTION, style(description).bold());
    let questions = wf.start_clarification(description)?;
    for question in &questions {
        let answer = ask(question, yes)?;
        wf.submit_answer(answer)?;
    }

    if let Some(spec) = wf.resolver().current_spec() {
        print_spec(spec);
    }
    if !yes
        && !Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Generate with this specification?")
            .default(true)
            .interact()?
    {
        println!("Nothing generated.");
        return Ok(());
    }
    wf.confirm_spec()?;

    let root = resolve_destination(config, dest, yes)?;
    let mut ui = GenerationUI::new(config.verbose);
    let cancel = wf.cancel_handle();
    let report = pump(wf.begin_generation(Some(root)), &mut rx, &mut ui, cancel).await?;

    review(&mut wf, &report, &mut rx, &mut ui, yes).await
}

pub async fn cmd_resume(config: &ArchitectConfig, dest: Option<&Path>) -> Result<()> {
    init_project(&config.project_dir)?;
    let mut wf = build_workflow(config);
    let mut rx = wf.subscribe();
    let yes = config.auto_approve();

    let Some(spec) = wf.pending_spec()? else {
        println!("No pending specification to resume.");
        return Ok(());
    };
    println!();
    println!("{} Resuming a confirmed specification", SPARKLE);
    print_spec(&spec);

    let root = resolve_destination(config, dest, yes)?;
    let mut ui = GenerationUI::new(config.verbose);
    let cancel = wf.cancel_handle();
    let outcome = pump(wf.resume(Some(root)), &mut rx, &mut ui, cancel).await?;

    match outcome {
        ResumeOutcome::Resumed(report) => review(&mut wf, &report, &mut rx, &mut ui, yes).await,
        ResumeOutcome::NothingPending | ResumeOutcome::Discarded => {
            println!("The pending specification was unusable and has been discarded.");
            Ok(())
        }
    }
}

fn print_spec(spec: &ProjectSpecification) {
    println!();
    println!("  {} {}", style("tech stack:").dim(), spec.tech_stack);
    println!("  {} {}", style("ui type:   ").dim(), spec.ui_type);
    let features = if spec.features.is_empty() {
        "(none)".to_string()
    } else {
        spec.features.join(", ")
    };
    println!("  {} {}", style("features:  ").dim(), features);
    println!();
}

/// Ask one clarification question. With `yes` the recommended option (or
/// options, for features) is taken without prompting.
fn ask(question: &ClarificationQuestion, yes: bool) -> Result<ClarificationAnswer> {
    if question.id == FEATURES_QUESTION {
        return ask_features(question, yes);
    }

    let recommended = question
        .options
        .iter()
        .position(|o| o.is_recommended)
        .unwrap_or(0);
    if yes {
        let Some(option) = question.options.get(recommended) else {
            return Ok(ClarificationAnswer {
                question_id: question.id.clone(),
                selected_option_id: None,
                freeform_value: None,
            });
        };
        println!("  {} {}", style(&question.prompt_text).dim(), option.label);
        return Ok(ClarificationAnswer::selected(&question.id, &option.id));
    }

    let mut items: Vec<String> = question
        .options
        .iter()
        .map(|o| format!("{} - {}", o.label, style(&o.description).dim()))
        .collect();
    if question.allows_freeform_answer {
        items.push("Something else...".to_string());
    }

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(&question.prompt_text)
        .items(&items)
        .default(recommended)
        .interact()?;

    match question.options.get(selection) {
        Some(option) => Ok(ClarificationAnswer::selected(&question.id, &option.id)),
        None => {
            let value: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Your answer")
                .interact_text()?;
            Ok(ClarificationAnswer::freeform(&question.id, &value))
        }
    }
}

fn ask_features(question: &ClarificationQuestion, yes: bool) -> Result<ClarificationAnswer> {
    let defaults: Vec<bool> = question.options.iter().map(|o| o.is_recommended).collect();

    let mut chosen: Vec<String> = if yes {
        question
            .options
            .iter()
            .filter(|o| o.is_recommended)
            .map(|o| o.id.clone())
            .collect()
    } else {
        let labels: Vec<&str> = question.options.iter().map(|o| o.label.as_str()).collect();
        MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(&question.prompt_text)
            .items(&labels)
            .defaults(&defaults)
            .interact()?
            .into_iter()
            .filter_map(|i| question.options.get(i).map(|o| o.id.clone()))
            .collect()
    };

    if !yes && question.allows_freeform_answer {
        let extra: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Other features (comma-separated, optional)")
            .allow_empty(true)
            .interact_text()?;
        chosen.extend(
            extra
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string),
        );
    }

    Ok(ClarificationAnswer::selected(&question.id, &chosen.join(",")))
}

fn resolve_destination(config: &ArchitectConfig, dest: Option<&Path>, yes: bool) -> Result<PathBuf> {
    let chosen = match dest {
        Some(dest) => dest.to_path_buf(),
        None if yes => config.project_dir.clone(),
        None => {
            let raw: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Write generated files to")
                .default(config.project_dir.display().to_string())
                .interact_text()?;
            PathBuf::from(raw.trim())
        }
    };

    let root = if chosen.is_absolute() {
        chosen
    } else {
        config.project_dir.join(chosen)
    };
    std::fs::create_dir_all(&root)
        .with_context(|| format!("Failed to create destination: {}", root.display()))?;
    Ok(root)
}

/// Drive `work` to completion while rendering events. The first Ctrl-C
/// requests cooperative cancellation.
async fn pump<F, T>(
    work: F,
    rx: &mut broadcast::Receiver<PipelineEvent>,
    ui: &mut GenerationUI,
    cancel: CancellationToken,
) -> T
where
    F: Future<Output = T>,
{
    tokio::pin!(work);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut cancel_requested = false;

    let result = loop {
        tokio::select! {
            result = &mut work => break result,
            _ = &mut ctrl_c, if !cancel_requested => {
                cancel_requested = true;
                cancel.cancel();
                ui.cancel_requested();
            }
            Ok(event) = rx.recv() => ui.handle(&event),
        }
    };

    drain(rx, ui);
    result
}

fn drain(rx: &mut broadcast::Receiver<PipelineEvent>, ui: &mut GenerationUI) {
    loop {
        match rx.try_recv() {
            Ok(event) => ui.handle(&event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}

async fn review(
    wf: &mut WorkflowOrchestrator,
    report: &GenerationReport,
    rx: &mut broadcast::Receiver<PipelineEvent>,
    ui: &mut GenerationUI,
    yes: bool,
) -> Result<()> {
    if report.cancelled {
        println!(
            "{}",
            style("Generation was cancelled; only fully streamed files are proposed.").yellow()
        );
    }

    if wf.phase() == Phase::Review && report.auto_applied.is_none() {
        decide_changes(wf, yes)?;
        let applied = wf.apply_all_approved().await?;
        drain(rx, ui);
        println!(
            "{} {} applied, {} failed",
            CHECK,
            style(applied.applied()).green(),
            style(applied.failed()).red()
        );
    }

    while wf.phase() == Phase::Review && !wf.ledger().failed_changes().is_empty() {
        let failed = wf.ledger().failed_changes();
        let retry = !yes
            && Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(format!("Retry {} failed change(s)?", failed.len()))
                .default(true)
                .interact()?;
        if !retry {
            println!("{} {} change(s) left unwritten", CROSS, failed.len());
            break;
        }
        for change in failed {
            wf.apply_change(change.id).await?;
        }
        drain(rx, ui);
    }

    if wf.phase() == Phase::Review {
        wf.enter_game()?;
    }
    if let Some(summary) = wf.summary() {
        print_summary(summary);
    }
    wf.acknowledge()?;
    Ok(())
}

fn decide_changes(wf: &mut WorkflowOrchestrator, yes: bool) -> Result<()> {
    let pending = wf.ledger().pending_changes();
    if pending.is_empty() {
        return Ok(());
    }

    println!();
    println!("{} Review {} proposed change(s)", REVIEW, pending.len());
    let mut gate = ReviewGate::new(yes);
    for change in pending {
        match gate.check_change(&change)? {
            GateDecision::Approve | GateDecision::ApproveAll => {
                wf.approve_change(change.id)?;
            }
            GateDecision::Reject => {
                wf.reject_change(change.id)?;
            }
            GateDecision::RejectAll => {
                wf.reject_all()?;
                break;
            }
        }
    }
    Ok(())
}
