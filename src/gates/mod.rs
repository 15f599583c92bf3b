//! Interactive approval gate for ledger changes.

use crate::ui::progress::format_change;
use anyhow::Result;
use architect_common::FileChange;
use dialoguer::{Select, theme::ColorfulTheme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Approve,
    ApproveAll,
    Reject,
    RejectAll,
}

pub struct ReviewGate {
    /// Set by `--yes`, or once the user picks "approve all".
    pub approve_all: bool,
}

impl ReviewGate {
    pub fn new(approve_all: bool) -> Self {
        Self { approve_all }
    }

    pub fn check_change(&mut self, change: &FileChange) -> Result<GateDecision> {
        println!("  {}", format_change(change));

        if self.approve_all {
            println!("  {}", console::style("Auto-approved").dim());
            return Ok(GateDecision::Approve);
        }

        self.prompt_user()
    }

    fn prompt_user(&mut self) -> Result<GateDecision> {
        let options = &[
            "Approve this change",
            "Approve this and all remaining changes",
            "Reject this change",
            "Reject all remaining changes",
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Write this file?")
            .items(options)
            .default(0)
            .interact()?;

        Ok(match selection {
            0 => GateDecision::Approve,
            1 => {
                self.approve_all = true;
                GateDecision::ApproveAll
            }
            2 => GateDecision::Reject,
            _ => GateDecision::RejectAll,
        })
    }
}
