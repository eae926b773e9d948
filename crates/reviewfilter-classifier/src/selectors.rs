//! Fixed structural selectors for the host page markup.

use reviewfilter_protocols::DomNode;

/// Outer container of one review-activity item.
pub const TIMELINE_ENTRY_CLASS: &str = "js-timeline-item";

/// Container of one comment and its author.
pub const THREAD_CLASS: &str = "js-comment-container";

/// Rendered comment text.
pub const COMMENT_BODY_CLASS: &str = "comment-body";

/// Generic author link class.
pub const AUTHOR_CLASS: &str = "author";

/// Tag whose text is scanned for severity keywords.
pub const EMPHASIS_TAG: &str = "em";

/// Identity link of the known review bot.
pub const KNOWN_BOT_HREF: &str = "/apps/coderabbitai";

pub fn is_timeline_entry(node: &DomNode) -> bool {
    node.is_element() && node.has_class(TIMELINE_ENTRY_CLASS)
}

pub fn is_thread(node: &DomNode) -> bool {
    node.is_element() && node.has_class(THREAD_CLASS)
}

pub fn is_comment_body(node: &DomNode) -> bool {
    node.is_element() && node.has_class(COMMENT_BODY_CLASS)
}

pub fn is_emphasis(node: &DomNode) -> bool {
    node.is_tag(EMPHASIS_TAG)
}

pub fn is_author(node: &DomNode) -> bool {
    node.is_tag("a") && node.has_class(AUTHOR_CLASS)
}

/// Author link of the known review bot, relative or absolute.
///
/// Only author links count; a body link to the bot's page does not.
pub fn is_known_bot_author(node: &DomNode) -> bool {
    is_author(node)
        && node
            .attribute("href")
            .map(|href| href.trim_end_matches('/').ends_with(KNOWN_BOT_HREF))
            .unwrap_or(false)
}
