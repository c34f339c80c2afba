use super::render::print_block;
use super::{resolve_block, Context};
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use lectern_editor::{EditSession, Mutation, MutationOutcome};

#[derive(Debug, Args)]
pub struct IndentArgs {
    /// List block id or position
    pub block: String,

    /// Top-level item index (0-based)
    pub index: usize,
}

#[derive(Debug, Args)]
pub struct OutdentArgs {
    /// List block id or position
    pub block: String,

    /// Index of the parent item
    pub parent: usize,

    /// Index of the child within its parent
    pub child: usize,
}

#[derive(Debug, Subcommand)]
pub enum ItemCommand {
    /// Add an item, or a sub-item with --child-of
    Add {
        block: String,
        text: String,

        /// Top-level position; appends when omitted
        #[arg(long, conflicts_with = "child_of")]
        at: Option<usize>,

        /// Parent item index
        #[arg(long)]
        child_of: Option<usize>,
    },

    /// Remove an item, or a sub-item with --child
    Remove {
        block: String,
        index: usize,

        /// Child index within the item
        #[arg(long)]
        child: Option<usize>,
    },
}

pub async fn indent(args: IndentArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session().await?;
    let block_id = resolve_block(&session.document, &args.block)?;
    let mutation = Mutation::IndentListItem {
        block_id: block_id.clone(),
        index: args.index,
    };
    apply_list_edit(ctx, &mut session, &block_id, mutation).await
}

pub async fn outdent(args: OutdentArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session().await?;
    let block_id = resolve_block(&session.document, &args.block)?;
    let mutation = Mutation::OutdentListItem {
        block_id: block_id.clone(),
        parent_index: args.parent,
        child_index: args.child,
    };
    apply_list_edit(ctx, &mut session, &block_id, mutation).await
}

pub async fn item(command: ItemCommand, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session().await?;
    let (block_id, mutation) = match command {
        ItemCommand::Add {
            block,
            text,
            at,
            child_of,
        } => {
            let block_id = resolve_block(&session.document, &block)?;
            let mutation = match child_of {
                Some(parent_index) => Mutation::AddListChild {
                    block_id: block_id.clone(),
                    parent_index,
                    body: text,
                },
                None => Mutation::InsertListItem {
                    block_id: block_id.clone(),
                    index: at.unwrap_or(usize::MAX),
                    body: text,
                },
            };
            (block_id, mutation)
        }
        ItemCommand::Remove {
            block,
            index,
            child,
        } => {
            let block_id = resolve_block(&session.document, &block)?;
            let mutation = match child {
                Some(child_index) => Mutation::RemoveListChild {
                    block_id: block_id.clone(),
                    parent_index: index,
                    child_index,
                },
                None => Mutation::RemoveListItem {
                    block_id: block_id.clone(),
                    index,
                },
            };
            (block_id, mutation)
        }
    };
    apply_list_edit(ctx, &mut session, &block_id, mutation).await
}

async fn apply_list_edit(
    ctx: &Context,
    session: &mut EditSession,
    block_id: &str,
    mutation: Mutation,
) -> Result<()> {
    let name = mutation.name();
    let result = session.apply(mutation)?;
    if let MutationOutcome::Noop { reason } = result.outcome {
        println!("{} {}", "•".yellow(), reason);
        return Ok(());
    }

    ctx.save(session).await?;
    println!("{} {}", "✓".green(), name.replace('_', " "));
    if let Some(block) = session.document.block(block_id) {
        print_block(block);
    }
    Ok(())
}
