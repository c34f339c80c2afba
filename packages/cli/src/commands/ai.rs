use super::render::{print_metadata, print_review};
use super::{resolve_block, Context};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use lectern_editor::{Block, EditSession, MetadataField};
use lectern_metadata::{ApplyOutcome, Decision, MetadataReviewWorkflow, SanityOutcome};

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Block id or position
    pub block: String,
}

#[derive(Debug, Args)]
pub struct ReviewArgs {
    /// Block id or position
    pub block: String,

    /// Fields to ignore (comma separated, e.g. difficulty,cognitiveSkill)
    #[arg(long, value_delimiter = ',')]
    pub ignore: Vec<MetadataField>,

    /// Show the suggestions without applying them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Block id or position
    pub block: String,
}

fn block_mut<'a>(session: &'a mut EditSession, block_id: &str) -> Result<&'a mut Block> {
    session
        .document
        .block_mut(block_id)
        .ok_or_else(|| anyhow!("Block {} disappeared from the page", block_id))
}

pub async fn generate(args: GenerateArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session().await?;
    let block_id = resolve_block(&session.document, &args.block)?;

    println!("🤖 {} metadata for {}", "Generating".green().bold(), block_id);
    let mut workflow = MetadataReviewWorkflow::new();
    let report = workflow
        .generate(block_mut(&mut session, &block_id)?, &ctx.service)
        .await?;
    ctx.save(&mut session).await?;

    if report.updated.is_empty() {
        println!("{} The service proposed nothing usable", "•".yellow());
    }
    for field in &report.unresolved {
        println!("{} Ignored unrecognised value for {}", "⚠️".yellow(), field);
    }
    if let Some(block) = session.document.block(&block_id) {
        print_metadata(block);
    }
    Ok(())
}

pub async fn review(args: ReviewArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session().await?;
    let block_id = resolve_block(&session.document, &args.block)?;
    let block = session
        .document
        .block(&block_id)
        .ok_or_else(|| anyhow!("No block {}", block_id))?;

    println!("🔍 {} {}", "Sanity checking".green().bold(), block_id);
    let mut workflow = MetadataReviewWorkflow::new();
    if workflow.sanity_check(block, &ctx.service).await? == SanityOutcome::NoSuggestions {
        println!("{} No suggestions for this block", "✓".green());
        return Ok(());
    }

    for field in &args.ignore {
        workflow.set_decision(*field, Decision::Ignore)?;
    }
    if let Some(review) = workflow.review() {
        print_review(review);
    }
    if args.dry_run {
        println!();
        println!("Dry run: nothing applied");
        return Ok(());
    }

    let outcome = workflow
        .apply_corrections(block_mut(&mut session, &block_id)?, &ctx.service)
        .await?;
    match outcome {
        ApplyOutcome::NothingToApply => {
            println!("{} Nothing to apply", "•".yellow());
        }
        ApplyOutcome::Applied { applied, ignored } => {
            ctx.save(&mut session).await?;
            println!(
                "{} Applied {} correction(s), ignored {}",
                "✓".green(),
                applied.len(),
                ignored.len()
            );
            if let Some(block) = session.document.block(&block_id) {
                print_metadata(block);
            }
        }
    }
    Ok(())
}

pub async fn clear(args: ClearArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session().await?;
    let block_id = resolve_block(&session.document, &args.block)?;

    MetadataReviewWorkflow::new()
        .clear(block_mut(&mut session, &block_id)?, &ctx.service)
        .await?;
    ctx.save(&mut session).await?;

    println!("{} Cleared metadata for {}", "✓".green(), block_id);
    Ok(())
}
