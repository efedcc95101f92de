use super::{report, Context};
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{PublishOptions, SeoFields};

#[derive(Debug, Args)]
pub struct PublishArgs {
    /// Page id
    pub page: String,

    /// Require a password to view the page
    #[arg(long)]
    pub private: bool,

    /// Password for private pages
    #[arg(long, env = "PAGECRAFT_PAGE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Serve the page from a custom domain
    #[arg(long)]
    pub domain: Option<String>,

    /// Take the page offline at this time (RFC 3339)
    #[arg(long)]
    pub expires: Option<DateTime<Utc>>,

    /// SEO title (max 60 characters)
    #[arg(long)]
    pub seo_title: Option<String>,

    /// SEO description (max 160 characters)
    #[arg(long)]
    pub seo_description: Option<String>,

    /// SEO keywords, comma separated
    #[arg(long, value_delimiter = ',')]
    pub keywords: Vec<String>,
}

impl PublishArgs {
    fn options(&self) -> PublishOptions {
        PublishOptions {
            is_private: self.private,
            password: self.password.clone(),
            use_custom_domain: self.domain.is_some(),
            custom_domain: self.domain.clone(),
            expiration_date: self.expires,
            seo: SeoFields {
                title: self.seo_title.clone(),
                description: self.seo_description.clone(),
                keywords: self.keywords.clone(),
                og_image: None,
            },
        }
    }
}

#[derive(Debug, Args)]
pub struct UnpublishArgs {
    /// Page id
    pub page: String,
}

pub async fn publish(args: PublishArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open(&args.page).await?;

    println!("{}", "🚀 Publishing...".bright_blue().bold());
    let url = session.publish(args.options()).await?;
    session.drain_notifications();

    println!();
    println!("{} Live at {}", "✅".green(), url.bright_white().bold());
    if args.private {
        println!("   Visitors will be asked for the page password.");
    }
    if let Some(expires) = args.expires {
        println!("   Goes offline {}", expires.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}

pub async fn unpublish(args: UnpublishArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open(&args.page).await?;
    session.unpublish().await?;
    report(&mut session);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> PublishArgs {
        PublishArgs {
            page: "page-1".to_string(),
            private: false,
            password: None,
            domain: None,
            expires: None,
            seo_title: None,
            seo_description: None,
            keywords: vec![],
        }
    }

    #[test]
    fn test_options_from_args() {
        let options = PublishArgs {
            domain: Some("launch.acme.io".to_string()),
            keywords: vec!["saas".to_string(), "launch".to_string()],
            ..args()
        }
        .options();

        assert!(options.use_custom_domain);
        assert_eq!(options.custom_domain.as_deref(), Some("launch.acme.io"));
        assert_eq!(options.seo.keywords, vec!["saas", "launch"]);
        assert!(options.validate(Utc::now()).is_ok());
    }

    #[test]
    fn test_private_without_password_is_invalid() {
        let options = PublishArgs {
            private: true,
            ..args()
        }
        .options();

        assert!(options.validate(Utc::now()).is_err());
    }
}
