//! Builders for pull-request page snapshots used in tests.

use reviewfilter_protocols::{DomNode, NodeId};

use crate::selectors::{KNOWN_BOT_HREF, THREAD_CLASS, TIMELINE_ENTRY_CLASS};

pub enum Author<'a> {
    KnownBot,
    Named(&'a str),
}

pub struct EntryIds {
    pub entry: NodeId,
    pub threads: Vec<NodeId>,
}

pub struct PageBuilder {
    next_id: NodeId,
    entries: Vec<DomNode>,
}

impl PageBuilder {
    pub fn new() -> Self {
        Self {
            next_id: 10,
            entries: Vec::new(),
        }
    }

    pub fn id(&mut self) -> NodeId {
        self.next_id += 1;
        self.next_id
    }

    fn author_link(&mut self, author: &Author<'_>) -> DomNode {
        let (href, name) = match author {
            Author::KnownBot => (KNOWN_BOT_HREF.to_string(), "coderabbitai".to_string()),
            Author::Named(name) => (format!("/{}", name), name.to_string()),
        };
        let text = DomNode::text(self.id(), name);
        DomNode::element(self.id(), "a")
            .with_attribute("class", "author Link--primary")
            .with_attribute("href", href)
            .with_child(text)
    }

    /// One thread whose body holds an `<em>` per fragment.
    fn thread(&mut self, author: &Author<'_>, fragments: &[&str]) -> DomNode {
        let mut paragraph = DomNode::element(self.id(), "p");
        for fragment in fragments {
            let text = DomNode::text(self.id(), *fragment);
            paragraph = paragraph.with_child(DomNode::element(self.id(), "em").with_child(text));
        }
        self.thread_with_body(author, vec![paragraph])
    }

    fn thread_with_body(&mut self, author: &Author<'_>, body: Vec<DomNode>) -> DomNode {
        let author = self.author_link(author);
        let body = DomNode::element(self.id(), "div")
            .with_attribute("class", "comment-body markdown-body")
            .with_children(body);
        DomNode::element(self.id(), "div")
            .with_attribute("class", THREAD_CLASS)
            .with_children([author, body])
    }

    /// Add an entry with one thread per fragment list.
    pub fn entry(&mut self, author: Author<'_>, threads: &[&[&str]]) -> EntryIds {
        let threads: Vec<DomNode> = threads
            .iter()
            .map(|fragments| self.thread(&author, fragments))
            .collect();
        self.push_entry(threads)
    }

    /// Add an entry with one thread per list of raw body nodes.
    pub fn entry_with_bodies(&mut self, author: Author<'_>, bodies: Vec<Vec<DomNode>>) -> EntryIds {
        let threads: Vec<DomNode> = bodies
            .into_iter()
            .map(|body| self.thread_with_body(&author, body))
            .collect();
        self.push_entry(threads)
    }

    /// Wrap a timeline entry around the given threads.
    fn push_entry(&mut self, threads: Vec<DomNode>) -> EntryIds {
        let thread_ids = threads.iter().map(|t| t.node_id).collect();
        let entry = DomNode::element(self.id(), "div")
            .with_attribute("class", format!("TimelineItem {}", TIMELINE_ENTRY_CLASS))
            .with_children(threads);
        let ids = EntryIds {
            entry: entry.node_id,
            threads: thread_ids,
        };
        self.entries.push(entry);
        ids
    }

    /// Add a known-bot entry with one thread per severity label.
    pub fn bot_entry(&mut self, severities: &[&str]) -> EntryIds {
        let fragments: Vec<String> = severities
            .iter()
            .map(|label| format!("🔴 {}", label))
            .collect();
        let threads: Vec<[&str; 2]> = fragments
            .iter()
            .map(|f| ["⚠️ Potential issue", f.as_str()])
            .collect();
        let thread_refs: Vec<&[&str]> = threads.iter().map(|t| &t[..]).collect();
        self.entry(Author::KnownBot, &thread_refs)
    }

    pub fn build(self) -> DomNode {
        let discussion = DomNode::element(3, "div")
            .with_attribute("class", "js-discussion")
            .with_children(self.entries);
        DomNode::document(1).with_child(
            DomNode::element(2, "html").with_child(DomNode::element(4, "body").with_child(discussion)),
        )
    }
}
