use std::io::Write;

use anyhow::Result;

use crate::parser::RewardRecord;

pub const NO_REWARDS_MESSAGE: &str =
    "No reward data extracted. Check your regex patterns or raw text content.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// One human-readable block per record
    #[default]
    Text,
    /// Pretty-printed JSON array
    Json,
}

pub fn render(out: &mut impl Write, rewards: &[RewardRecord], format: Format) -> Result<()> {
    match format {
        Format::Text => render_text(out, rewards),
        Format::Json => render_json(out, rewards),
    }
}

fn render_text(out: &mut impl Write, rewards: &[RewardRecord]) -> Result<()> {
    if rewards.is_empty() {
        writeln!(out, "{}", NO_REWARDS_MESSAGE)?;
        return Ok(());
    }

    writeln!(out, "Extracted Rewards:")?;
    for r in rewards {
        writeln!(out, "Category/Company: {}", r.category)?;
        writeln!(out, "Reward Percent: {}%", r.reward_percent)?;
        match &r.limit {
            Some(limit) => writeln!(out, "Spending Limit: ${}", limit)?,
            None => writeln!(out, "Spending Limit: Not specified")?,
        }
        writeln!(out, "Full text: {}", r.full_text)?;
        writeln!(out, "-----")?;
    }
    Ok(())
}

fn render_json(out: &mut impl Write, rewards: &[RewardRecord]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, rewards)?;
    writeln!(out)?;
    Ok(())
}

// ── Tests ──
