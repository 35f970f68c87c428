// turns a planning result into renderable sections

use std::fmt::Write;

use tracing::{debug, warn};

use crate::markdown::{self, Block, Inline};
use crate::models::{SubmissionResult, VenueDetails, VenueListing};

#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Error { message: String },
    SuccessBanner { message: String },
    Venue(VenueListing),
    // shown preformatted, never reinterpreted
    Logistics { text: String },
    Marketing { blocks: Vec<Block> },
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self {
            Section::Error { .. } => "Error",
            Section::SuccessBanner { .. } => "Success",
            Section::Venue(_) => "Venue Details",
            Section::Logistics { .. } => "Logistics Confirmation",
            Section::Marketing { .. } => "Marketing Report",
        }
    }
}

pub fn interpret(result: &SubmissionResult) -> Vec<Section> {
    if !result.success {
        return vec![Section::Error {
            message: result.message.clone(),
        }];
    }

    let mut sections = vec![Section::SuccessBanner {
        message: result.message.clone(),
    }];

    match &result.venue_details {
        Some(VenueDetails::Listing(listing)) => sections.push(Section::Venue(listing.clone())),
        Some(VenueDetails::Unavailable { error }) => {
            debug!("Venue details not available: {}", error);
        }
        Some(VenueDetails::Malformed(value)) => {
            warn!("Dropping malformed venue details: {}", value);
        }
        None => {}
    }

    if let Some(text) = &result.logistics_confirmation {
        sections.push(Section::Logistics { text: text.clone() });
    }

    if let Some(report) = &result.marketing_report {
        let blocks = markdown::parse(report);
        if blocks.is_empty() {
            debug!("Marketing report had no renderable content");
        } else {
            sections.push(Section::Marketing { blocks });
        }
    }

    sections
}

// plain terminal rendering
pub fn render_text(sections: &[Section]) -> String {
    let mut out = String::new();

    for (index, section) in sections.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        match section {
            Section::Error { message } => {
                let _ = writeln!(out, "❌ {}: {}", section.title(), message);
            }
            Section::SuccessBanner { message } => {
                let _ = writeln!(out, "✅ {}", message);
            }
            Section::Venue(listing) => {
                heading(&mut out, section.title(), '=');
                field(&mut out, "Venue Name", listing.name.as_deref());
                field(&mut out, "Address", listing.address.as_deref());
                let capacity = listing.capacity.map(|c| format!("{} people", c));
                field(&mut out, "Capacity", capacity.as_deref());
                field(&mut out, "Booking Status", listing.booking_status.as_deref());
            }
            Section::Logistics { text } => {
                heading(&mut out, section.title(), '=');
                out.push_str(text);
                if !text.ends_with('\n') {
                    out.push('\n');
                }
            }
            Section::Marketing { blocks } => {
                heading(&mut out, section.title(), '=');
                render_blocks(&mut out, blocks);
            }
        }
    }

    out
}

fn heading(out: &mut String, title: &str, underline: char) {
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", underline.to_string().repeat(title.chars().count()));
}

fn field(out: &mut String, label: &str, value: Option<&str>) {
    let _ = writeln!(out, "{:<16}{}", format!("{}:", label), value.unwrap_or("-"));
}

fn render_blocks(out: &mut String, blocks: &[Block]) {
    for (index, block) in blocks.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        match block {
            Block::Heading { level, content } => {
                let title = inline_text(content);
                match level {
                    1 => heading(out, &title, '='),
                    2 => heading(out, &title, '-'),
                    _ => {
                        let _ = writeln!(out, "{}", title);
                    }
                }
            }
            Block::Paragraph(content) => {
                let _ = writeln!(out, "{}", inline_text(content));
            }
            Block::List { ordered, items } => {
                for (n, item) in items.iter().enumerate() {
                    if *ordered {
                        let _ = writeln!(out, "  {}. {}", n + 1, inline_text(item));
                    } else {
                        let _ = writeln!(out, "  • {}", inline_text(item));
                    }
                }
            }
        }
    }
}

fn inline_text(content: &[Inline]) -> String {
    content.iter().map(Inline::text).collect()
}
