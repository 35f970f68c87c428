// whitelisted markdown for the marketing report
// only headings, paragraphs, lists, bold and plain text come out,
// anything else degrades to its literal text

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    Paragraph(Vec<Inline>),
    List { ordered: bool, items: Vec<Vec<Inline>> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Bold(String),
}

impl Inline {
    pub fn text(&self) -> &str {
        match self {
            Inline::Text(text) | Inline::Bold(text) => text,
        }
    }

    fn text_mut(&mut self) -> &mut String {
        match self {
            Inline::Text(text) | Inline::Bold(text) => text,
        }
    }
}

pub fn parse(source: &str) -> Vec<Block> {
    let mut folder = Folder::default();
    for event in Parser::new_ext(source, Options::empty()) {
        folder.fold(event);
    }
    folder.flush_paragraph();
    folder.blocks
}

// collects parser events into the block whitelist
#[derive(Default)]
struct Folder {
    blocks: Vec<Block>,
    inlines: Vec<Inline>,
    heading: Option<u8>,
    list: Option<(bool, Vec<Vec<Inline>>)>,
    depth: usize,
    strong: usize,
}

impl Folder {
    fn fold(&mut self, event: Event<'_>) {
        match event {
            // headings inside list items stay item text
            Event::Start(Tag::Heading { level, .. }) if self.depth == 0 => {
                self.flush_paragraph();
                self.heading = Some(level as u8);
            }
            Event::End(TagEnd::Heading(_)) if self.depth == 0 => {
                let content = self.take_inlines();
                let level = self.heading.take().unwrap_or(1);
                self.blocks.push(Block::Heading { level, content });
            }
            Event::End(TagEnd::Heading(_)) => self.push_text(" "),

            // nested lists are flattened into the outermost one
            Event::Start(Tag::List(first)) => {
                if self.depth == 0 {
                    self.flush_paragraph();
                    self.list = Some((first.is_some(), Vec::new()));
                } else {
                    self.flush_item();
                }
                self.depth += 1;
            }
            Event::End(TagEnd::List(_)) => {
                self.flush_item();
                self.depth = self.depth.saturating_sub(1);
                if self.depth == 0 {
                    if let Some((ordered, items)) = self.list.take() {
                        self.blocks.push(Block::List { ordered, items });
                    }
                }
            }
            Event::Start(Tag::Item) | Event::End(TagEnd::Item) => self.flush_item(),

            Event::End(TagEnd::Paragraph | TagEnd::CodeBlock | TagEnd::HtmlBlock) => {
                self.flush_paragraph()
            }

            Event::Start(Tag::Strong) => self.strong += 1,
            Event::End(TagEnd::Strong) => self.strong = self.strong.saturating_sub(1),

            Event::Text(text) | Event::Code(text) | Event::Html(text) | Event::InlineHtml(text) => {
                self.push_text(&text)
            }
            Event::SoftBreak | Event::HardBreak => self.push_text(" "),

            // rules, emphasis, links and the rest carry no node of their own
            _ => {}
        }
    }

    fn push_text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let text = raw.replace(['\r', '\n'], " ");
        let bold = self.strong > 0;
        match self.inlines.last_mut() {
            Some(Inline::Bold(last)) if bold => last.push_str(&text),
            Some(Inline::Text(last)) if !bold => last.push_str(&text),
            _ if bold => self.inlines.push(Inline::Bold(text)),
            _ => self.inlines.push(Inline::Text(text)),
        }
    }

    fn take_inlines(&mut self) -> Vec<Inline> {
        tidy(std::mem::take(&mut self.inlines))
    }

    fn flush_item(&mut self) {
        let item = self.take_inlines();
        if item.is_empty() {
            return;
        }
        if let Some((_, items)) = &mut self.list {
            items.push(item);
        }
    }

    fn flush_paragraph(&mut self) {
        // inside a list item the blocks just run together
        if self.depth > 0 {
            self.push_text(" ");
            return;
        }
        let content = self.take_inlines();
        if !content.is_empty() {
            self.blocks.push(Block::Paragraph(content));
        }
    }
}

fn tidy(mut inlines: Vec<Inline>) -> Vec<Inline> {
    if let Some(first) = inlines.first_mut() {
        let text = first.text_mut();
        *text = text.trim_start().to_string();
    }
    if let Some(last) = inlines.last_mut() {
        let text = last.text_mut();
        text.truncate(text.trim_end().len());
    }
    inlines.retain(|inline| !inline.text().is_empty());
    inlines
}
