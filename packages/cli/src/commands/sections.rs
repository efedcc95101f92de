//! Section commands: add, set, move, remove

use super::{report, Context};
use anyhow::{anyhow, Context as _, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{ComponentContent, ComponentKind, EditorError};
use std::collections::BTreeMap;

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Page id
    pub page: String,

    /// Section type (hero, features, testimonials, pricing, cta, faq, footer)
    #[arg(value_name = "TYPE")]
    pub kind: String,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Page id
    pub page: String,

    /// Section id
    pub section: String,

    /// Replacement content as JSON
    #[arg(short, long)]
    pub content: Option<String>,

    /// Style override as key=value (repeatable)
    #[arg(short, long = "style", value_parser = parse_style_pair)]
    pub styles: Vec<(String, String)>,

    /// Remove all style overrides before applying --style
    #[arg(long)]
    pub reset_style: bool,
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    /// Page id
    pub page: String,

    /// Section id
    pub section: String,

    /// Zero-based target position
    pub index: usize,
}

#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Page id
    pub page: String,

    /// Section id
    pub section: String,
}

fn parse_style_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

pub async fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open(&args.page).await?;

    let id = match session.add_component(&args.kind).await {
        Ok(id) => id,
        Err(EditorError::UnknownComponentType(kind)) => {
            let known: Vec<&str> = session
                .available_component_types()
                .iter()
                .map(ComponentKind::tag)
                .collect();
            return Err(anyhow!(
                "Unknown section type '{}'. Available: {}",
                kind,
                known.join(", ")
            ));
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "{} Added {} section {}",
        "✓".green(),
        args.kind.bright_blue(),
        id.bright_white().bold()
    );
    Ok(())
}

pub async fn set(args: SetArgs, ctx: &Context) -> Result<()> {
    if args.content.is_none() && args.styles.is_empty() && !args.reset_style {
        return Err(anyhow!("Nothing to change. Pass --content and/or --style"));
    }

    let mut session = ctx.open(&args.page).await?;
    let component = session
        .document()
        .and_then(|doc| doc.find_component(&args.section))
        .ok_or_else(|| anyhow!("Section {} not found on page {}", args.section, args.page))?
        .clone();

    if let Some(raw) = &args.content {
        let payload: serde_json::Value =
            serde_json::from_str(raw).context("--content is not valid JSON")?;
        let content = ComponentContent::from_parts(component.kind().tag(), payload)?;
        session.update_component(&args.section, content)?;
    }

    if args.reset_style || !args.styles.is_empty() {
        let mut style: BTreeMap<String, String> = if args.reset_style {
            BTreeMap::new()
        } else {
            component.style.clone()
        };
        style.extend(args.styles.iter().cloned());
        session.update_style(&args.section, style)?;
    }

    session.save_now().await?;
    report(&mut session);
    Ok(())
}

pub async fn move_section(args: MoveArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open(&args.page).await?;
    session.move_component(&args.section, args.index).await?;

    println!(
        "{} Moved {} to position {}",
        "✓".green(),
        args.section.bright_white(),
        args.index
    );
    Ok(())
}

pub async fn remove(args: RemoveArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open(&args.page).await?;
    session.delete_component(&args.section).await?;

    println!("{} Removed {}", "✓".green(), args.section.bright_white());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_style_pair() {
        assert_eq!(
            parse_style_pair("background = #fff"),
            Ok(("background".to_string(), "#fff".to_string()))
        );
        assert_eq!(
            parse_style_pair("padding="),
            Ok(("padding".to_string(), String::new()))
        );
        assert!(parse_style_pair("novalue").is_err());
        assert!(parse_style_pair("=red").is_err());
    }
}
