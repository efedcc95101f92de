//! Page-level commands: new, list, show, restore, delete

use super::{report, Context};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{Component, PageStatus};

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Page title
    pub title: String,

    /// Copy the sections of an existing page
    #[arg(long)]
    pub from: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Page id
    pub page: String,

    /// Print section content as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct RestoreArgs {
    /// Page id
    pub page: String,

    /// Drop the local backup instead of restoring it
    #[arg(long)]
    pub discard: bool,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Page id
    pub page: String,
}

fn status_label(status: PageStatus) -> colored::ColoredString {
    match status {
        PageStatus::Draft => "draft".yellow(),
        PageStatus::Published => "published".green(),
    }
}

pub async fn new(args: NewArgs, ctx: &Context) -> Result<()> {
    let template: Option<Vec<Component>> = match &args.from {
        Some(source) => Some(ctx.open(source).await?.components().to_vec()),
        None => None,
    };

    let mut session = ctx.session();
    let page = session.create(&args.title, template.as_deref()).await?;

    println!("{} Created page {}", "✓".green(), page.bright_white().bold());
    if let Some(source) = &args.from {
        println!(
            "  {} sections copied from {}",
            session.components().len(),
            source
        );
    }
    Ok(())
}

pub async fn list(ctx: &Context) -> Result<()> {
    let mut session = ctx.session();
    let pages = session.list_documents().await?;

    if pages.is_empty() {
        println!("{}", "No pages yet. Create one with `pagecraft new`.".yellow());
        return Ok(());
    }

    for page in pages {
        println!(
            "{}  {:<10} {:>2} sections  {}  {}",
            page.id.bright_white(),
            status_label(page.status),
            page.component_count,
            page.updated_at.format("%Y-%m-%d %H:%M"),
            page.title
        );
    }
    Ok(())
}

pub async fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let session = ctx.open(&args.page).await?;
    let doc = session
        .document()
        .ok_or_else(|| anyhow!("Page {} is not loaded", args.page))?;

    println!("{} {}", doc.title.bright_white().bold(), status_label(doc.status));
    if let Some(config) = &doc.publish_config {
        if doc.status == PageStatus::Published {
            println!(
                "  {}",
                config.public_url(&ctx.config.editor.public_base_url, doc.id())
            );
        }
    }
    println!();

    if doc.components.is_empty() {
        println!("  (no sections)");
    }

    for (index, component) in doc.components.iter().enumerate() {
        println!(
            "  {}. {} {}",
            index,
            component.kind().tag().bright_blue(),
            component.id.dimmed()
        );
        if args.json {
            println!("{}", serde_json::to_string_pretty(&component.content)?);
        }
        for (key, value) in &component.style {
            println!("     {}: {}", key, value);
        }
    }
    Ok(())
}

pub async fn restore(args: RestoreArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.session();
    let offer = session.load(&args.page).await?;

    let Some(offer) = offer else {
        println!("{}", "No newer local backup for this page.".yellow());
        return Ok(());
    };

    if args.discard {
        session.discard_backup()?;
        println!("{} Discarded local backup", "✓".green());
        return Ok(());
    }

    let sections = offer.components.len();
    session.restore_backup(offer)?;
    session.save_now().await?;
    report(&mut session);

    println!("{} Restored {} sections from local backup", "✓".green(), sections);
    Ok(())
}

pub async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.session();
    session.remove_document(&args.page).await?;
    report(&mut session);
    Ok(())
}
