use super::render::{print_block, print_document};
use super::{resolve_block, Context};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use lectern_editor::{Block, BlockContent, BlockType, Direction, Mutation, MutationOutcome};

#[derive(Debug, Args)]
pub struct BlocksArgs {
    /// Print the page as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct InsertArgs {
    /// Block type (heading, paragraph, numbered-list, ...)
    pub block_type: BlockType,

    /// Position to insert at; appends when omitted or out of range
    #[arg(long)]
    pub at: Option<usize>,

    /// Initial text
    #[arg(short, long)]
    pub text: Option<String>,
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    /// Block id or position
    pub block: String,

    /// up or down
    #[arg(value_parser = parse_direction)]
    pub direction: Direction,
}

#[derive(Debug, Args)]
pub struct DuplicateArgs {
    /// Block id or position
    pub block: String,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Block id or position
    pub block: String,
}

fn parse_direction(s: &str) -> Result<Direction, String> {
    match s.to_ascii_lowercase().as_str() {
        "up" => Ok(Direction::Up),
        "down" => Ok(Direction::Down),
        other => Err(format!("expected up or down, got {}", other)),
    }
}

pub async fn list_blocks(args: BlocksArgs, ctx: &Context) -> Result<()> {
    let session = ctx.open_session().await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(session.document.blocks())?);
    } else {
        print_document(&session.document);
    }
    Ok(())
}

pub async fn insert(args: InsertArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session().await?;

    let mut content = BlockContent::default_for(args.block_type);
    if let Some(text) = &args.text {
        set_text(&mut content, text);
    }
    let block = Block::with_content(content);
    let local_id = block.id.clone();

    session.apply(Mutation::InsertBlock {
        index: args.at,
        block,
    })?;
    let report = ctx.save(&mut session).await?;

    let id = report
        .reassigned
        .iter()
        .find(|(old, _)| *old == local_id)
        .map(|(_, new)| new.clone())
        .unwrap_or(local_id);
    println!("{} Inserted {} block", "✓".green(), args.block_type);
    if let Some(block) = session.document.block(&id) {
        print_block(block);
    }
    Ok(())
}

pub async fn move_block(args: MoveArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session().await?;
    let block_id = resolve_block(&session.document, &args.block)?;

    let result = session.apply(Mutation::MoveBlock {
        block_id: block_id.clone(),
        direction: args.direction,
    })?;
    if let MutationOutcome::Noop { reason } = result.outcome {
        println!("{} {}", "•".yellow(), reason);
        return Ok(());
    }

    let report = ctx.save(&mut session).await?;
    println!(
        "{} Moved {} ({} blocks updated)",
        "✓".green(),
        block_id,
        report.updated
    );
    print_document(&session.document);
    Ok(())
}

pub async fn duplicate(args: DuplicateArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session().await?;
    let block_id = resolve_block(&session.document, &args.block)?;

    let result = session.apply(Mutation::DuplicateBlock {
        block_id: block_id.clone(),
    })?;
    let MutationOutcome::Created(copy_id) = result.outcome else {
        return Err(anyhow!("Duplicating {} produced no block", block_id));
    };

    let report = ctx.save(&mut session).await?;
    let copy_id = report
        .reassigned
        .iter()
        .find(|(old, _)| *old == copy_id)
        .map(|(_, new)| new.clone())
        .unwrap_or(copy_id);
    println!("{} Duplicated {} as {}", "✓".green(), block_id, copy_id);
    print_document(&session.document);
    Ok(())
}

pub async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session().await?;
    let block_id = resolve_block(&session.document, &args.block)?;

    session.delete_block(&block_id, &ctx.persistence).await?;
    // Remaining blocks were renumbered
    ctx.save(&mut session).await?;

    println!("{} Deleted {}", "✓".green(), block_id);
    print_document(&session.document);
    Ok(())
}

/// Put author text into the main text slot of a block
pub(crate) fn set_text(content: &mut BlockContent, text: &str) {
    let text = text.to_string();
    match content {
        BlockContent::Heading { heading } => *heading = text,
        BlockContent::Subheading { subheading } => *subheading = text,
        BlockContent::Paragraph { body }
        | BlockContent::ParagraphWithHeading { body, .. }
        | BlockContent::ParagraphWithSubheading { body, .. } => *body = text,
        BlockContent::Columns {
            column_one_content, ..
        } => *column_one_content = text,
        BlockContent::Table(table) => {
            if let Some(cell) = table.rows.first_mut().and_then(|row| row.first_mut()) {
                *cell = text;
            }
        }
        BlockContent::NumberedList(list) | BlockContent::BulletList(list) => {
            if let Some(item) = list.items.first_mut() {
                item.body = text;
            }
        }
        BlockContent::ImageText(image_text) => image_text.body = text,
        BlockContent::Image(image) => image.caption = text,
        BlockContent::Tabs { tabs } => {
            if let Some(tab) = tabs.first_mut() {
                tab.body = text;
            }
        }
    }
}
