//! # Component Registry
//!
//! The fixed palette of page sections. Each type tag maps to exactly one
//! payload shape; payloads are validated whenever they enter a session, and
//! unknown tags are rejected instead of degrading to a placeholder.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    #[error("Unknown component type: {0}")]
    UnknownType(String),

    #[error("{kind}: missing required field `{field}`")]
    MissingField {
        kind: ComponentKind,
        field: &'static str,
    },

    #[error("{kind}: invalid `{field}`: {reason}")]
    InvalidField {
        kind: ComponentKind,
        field: &'static str,
        reason: String,
    },

    #[error("{kind}: malformed content: {message}")]
    Malformed { kind: ComponentKind, message: String },
}

/// Registered component type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Hero,
    Features,
    Testimonials,
    Pricing,
    Cta,
    Faq,
    Footer,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 7] = [
        ComponentKind::Hero,
        ComponentKind::Features,
        ComponentKind::Testimonials,
        ComponentKind::Pricing,
        ComponentKind::Cta,
        ComponentKind::Faq,
        ComponentKind::Footer,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            ComponentKind::Hero => "hero",
            ComponentKind::Features => "features",
            ComponentKind::Testimonials => "testimonials",
            ComponentKind::Pricing => "pricing",
            ComponentKind::Cta => "cta",
            ComponentKind::Faq => "faq",
            ComponentKind::Footer => "footer",
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self, ContentError> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| ContentError::UnknownType(tag.to_string()))
    }

    /// Registry default payload used when a section is first added
    pub fn default_content(&self) -> ComponentContent {
        match self {
            ComponentKind::Hero => ComponentContent::Hero(HeroContent {
                headline: "Build something people love".to_string(),
                subheadline: "Launch your product page in minutes.".to_string(),
                cta_text: "Get started".to_string(),
                cta_url: "#signup".to_string(),
                background_image: None,
            }),
            ComponentKind::Features => ComponentContent::Features(FeaturesContent {
                title: "Features".to_string(),
                subtitle: "Everything you need to get going".to_string(),
                items: vec![
                    FeatureItem {
                        title: "Fast".to_string(),
                        description: "Pages load in the blink of an eye.".to_string(),
                        icon: Some("bolt".to_string()),
                    },
                    FeatureItem {
                        title: "Flexible".to_string(),
                        description: "Rearrange sections however you like.".to_string(),
                        icon: Some("layers".to_string()),
                    },
                    FeatureItem {
                        title: "Secure".to_string(),
                        description: "Private pages stay private.".to_string(),
                        icon: Some("lock".to_string()),
                    },
                ],
            }),
            ComponentKind::Testimonials => ComponentContent::Testimonials(TestimonialsContent {
                title: "What our customers say".to_string(),
                items: vec![Testimonial {
                    quote: "It changed how we launch products.".to_string(),
                    author: "Alex Doe".to_string(),
                    role: "Founder".to_string(),
                    avatar: None,
                }],
            }),
            ComponentKind::Pricing => ComponentContent::Pricing(PricingContent {
                title: "Pricing".to_string(),
                plans: vec![
                    PricingPlan {
                        name: "Starter".to_string(),
                        price: 0.0,
                        currency: "USD".to_string(),
                        period: "month".to_string(),
                        features: vec!["1 page".to_string()],
                        highlighted: false,
                        cta_text: "Start free".to_string(),
                    },
                    PricingPlan {
                        name: "Pro".to_string(),
                        price: 19.0,
                        currency: "USD".to_string(),
                        period: "month".to_string(),
                        features: vec!["Unlimited pages".to_string(), "Custom domain".to_string()],
                        highlighted: true,
                        cta_text: "Go Pro".to_string(),
                    },
                ],
            }),
            ComponentKind::Cta => ComponentContent::Cta(CtaContent {
                headline: "Ready to get started?".to_string(),
                description: "Join thousands of teams shipping faster.".to_string(),
                button_text: "Sign up".to_string(),
                button_url: "#signup".to_string(),
            }),
            ComponentKind::Faq => ComponentContent::Faq(FaqContent {
                title: "Frequently asked questions".to_string(),
                items: vec![FaqItem {
                    question: "Can I cancel anytime?".to_string(),
                    answer: "Yes, there are no long-term contracts.".to_string(),
                }],
            }),
            ComponentKind::Footer => ComponentContent::Footer(FooterContent {
                company_name: "Your Company".to_string(),
                links: vec![FooterLink {
                    label: "Privacy".to_string(),
                    url: "/privacy".to_string(),
                }],
                copyright: "All rights reserved.".to_string(),
            }),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ComponentKind {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

// ============================================================================
// Payloads
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroContent {
    pub headline: String,
    pub subheadline: String,
    pub cta_text: String,
    pub cta_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureItem {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeaturesContent {
    pub title: String,
    pub subtitle: String,
    pub items: Vec<FeatureItem>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Testimonial {
    pub quote: String,
    pub author: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestimonialsContent {
    pub title: String,
    pub items: Vec<Testimonial>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingPlan {
    pub name: String,
    pub price: f64,
    pub currency: String,
    pub period: String,
    pub features: Vec<String>,
    pub highlighted: bool,
    pub cta_text: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingContent {
    pub title: String,
    pub plans: Vec<PricingPlan>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CtaContent {
    pub headline: String,
    pub description: String,
    pub button_text: String,
    pub button_url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FaqContent {
    pub title: String,
    pub items: Vec<FaqItem>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FooterLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FooterContent {
    pub company_name: String,
    pub links: Vec<FooterLink>,
    pub copyright: String,
}

/// Content payload, one shape per component type
///
/// Serializes as the bare payload; the type tag is written next to it by
/// [`crate::Component`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ComponentContent {
    Hero(HeroContent),
    Features(FeaturesContent),
    Testimonials(TestimonialsContent),
    Pricing(PricingContent),
    Cta(CtaContent),
    Faq(FaqContent),
    Footer(FooterContent),
}

fn require(kind: ComponentKind, field: &'static str, value: &str) -> Result<(), ContentError> {
    if value.trim().is_empty() {
        Err(ContentError::MissingField { kind, field })
    } else {
        Ok(())
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    kind: ComponentKind,
    payload: serde_json::Value,
) -> Result<T, ContentError> {
    serde_json::from_value(payload).map_err(|e| ContentError::Malformed {
        kind,
        message: e.to_string(),
    })
}

impl ComponentContent {
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentContent::Hero(_) => ComponentKind::Hero,
            ComponentContent::Features(_) => ComponentKind::Features,
            ComponentContent::Testimonials(_) => ComponentKind::Testimonials,
            ComponentContent::Pricing(_) => ComponentKind::Pricing,
            ComponentContent::Cta(_) => ComponentKind::Cta,
            ComponentContent::Faq(_) => ComponentKind::Faq,
            ComponentContent::Footer(_) => ComponentKind::Footer,
        }
    }

    /// Build validated content from a type tag and a JSON payload
    ///
    /// A `null` payload yields the registry default for the tag.
    pub fn from_parts(tag: &str, payload: serde_json::Value) -> Result<Self, ContentError> {
        let kind = ComponentKind::from_tag(tag)?;
        if payload.is_null() {
            return Ok(kind.default_content());
        }

        let content = match kind {
            ComponentKind::Hero => ComponentContent::Hero(decode(kind, payload)?),
            ComponentKind::Features => ComponentContent::Features(decode(kind, payload)?),
            ComponentKind::Testimonials => ComponentContent::Testimonials(decode(kind, payload)?),
            ComponentKind::Pricing => ComponentContent::Pricing(decode(kind, payload)?),
            ComponentKind::Cta => ComponentContent::Cta(decode(kind, payload)?),
            ComponentKind::Faq => ComponentContent::Faq(decode(kind, payload)?),
            ComponentKind::Footer => ComponentContent::Footer(decode(kind, payload)?),
        };

        content.validate()?;
        Ok(content)
    }

    pub fn validate(&self) -> Result<(), ContentError> {
        let kind = self.kind();
        match self {
            ComponentContent::Hero(hero) => {
                require(kind, "headline", &hero.headline)?;
                if !hero.cta_text.trim().is_empty() {
                    require(kind, "ctaUrl", &hero.cta_url)?;
                }
            }
            ComponentContent::Features(features) => {
                require(kind, "title", &features.title)?;
                for item in &features.items {
                    require(kind, "items.title", &item.title)?;
                }
            }
            ComponentContent::Testimonials(testimonials) => {
                for item in &testimonials.items {
                    require(kind, "items.quote", &item.quote)?;
                    require(kind, "items.author", &item.author)?;
                }
            }
            ComponentContent::Pricing(pricing) => {
                for plan in &pricing.plans {
                    require(kind, "plans.name", &plan.name)?;
                    if !plan.price.is_finite() || plan.price < 0.0 {
                        return Err(ContentError::InvalidField {
                            kind,
                            field: "plans.price",
                            reason: format!("{} is not a non-negative amount", plan.price),
                        });
                    }
                }
            }
            ComponentContent::Cta(cta) => {
                require(kind, "headline", &cta.headline)?;
                if !cta.button_text.trim().is_empty() {
                    require(kind, "buttonUrl", &cta.button_url)?;
                }
            }
            ComponentContent::Faq(faq) => {
                for item in &faq.items {
                    require(kind, "items.question", &item.question)?;
                }
            }
            ComponentContent::Footer(footer) => {
                require(kind, "companyName", &footer.company_name)?;
                for link in &footer.links {
                    require(kind, "links.label", &link.label)?;
                    require(kind, "links.url", &link.url)?;
                }
            }
        }
        Ok(())
    }
}
