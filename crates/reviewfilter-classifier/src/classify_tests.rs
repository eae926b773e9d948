use super::*;
use crate::apply::apply_verdicts;
use crate::fixture::{Author, PageBuilder};
use reviewfilter_core::FilterAction;
use reviewfilter_protocols::verdict::{CUSTOM_BOT_MARKER, SEVERITY_MARKER};

fn hidden(classification: &Classification, node_id: NodeId) -> bool {
    classification
        .verdict_for(node_id)
        .map(|v| v.is_hidden())
        .unwrap_or(false)
}

#[test]
fn test_defaults_show_everything() {
    let mut page = PageBuilder::new();
    let bot = page.bot_entry(&["Critical", "Major", "Minor"]);
    let human = page.entry(Author::Named("octocat"), &[&["LGTM"]]);
    let document = page.build();

    let result = classify(&FilterConfiguration::default(), &document);

    assert!(!hidden(&result, bot.entry));
    assert!(bot.threads.iter().all(|t| !hidden(&result, *t)));
    assert_eq!(
        result.verdict_for(human.entry).map(|v| v.reason),
        Some(VerdictReason::NotReviewBot)
    );
    assert_eq!(result.summary().hidden_threads, 0);
}

#[test]
fn test_show_all_hides_only_disabled_severity() {
    let mut page = PageBuilder::new();
    let bot = page.bot_entry(&["Critical", "Major"]);
    let document = page.build();

    let config = FilterConfiguration::new(
        [
            (Severity::Critical, true),
            (Severity::Major, false),
            (Severity::Minor, true),
        ],
        true,
    );
    let result = classify(&config, &document);

    assert!(!hidden(&result, bot.entry));
    assert!(!hidden(&result, bot.threads[0]));
    assert!(hidden(&result, bot.threads[1]));
}

#[test]
fn test_entry_hidden_when_only_disabled_severities() {
    let mut page = PageBuilder::new();
    let bot = page.bot_entry(&["Major", "Minor"]);
    let document = page.build();

    let config = FilterConfiguration::new(
        [
            (Severity::Critical, true),
            (Severity::Major, false),
            (Severity::Minor, false),
        ],
        false,
    );
    let result = classify(&config, &document);

    assert!(hidden(&result, bot.threads[0]));
    assert!(hidden(&result, bot.threads[1]));
    let entry = result.verdict_for(bot.entry).unwrap();
    assert!(entry.is_hidden());
    assert_eq!(entry.reason, VerdictReason::NoVisibleThreads);
}

#[test]
fn test_human_comment_linking_bot_stays_visible() {
    let mut page = PageBuilder::new();
    let link_text = DomNode::text(page.id(), "CodeRabbit");
    let link = DomNode::element(page.id(), "a")
        .with_attribute("href", "https://github.com/apps/coderabbitai")
        .with_child(link_text);
    let paragraph = DomNode::element(page.id(), "p").with_child(link);
    let human = page.entry_with_bodies(Author::Named("octocat"), vec![vec![paragraph]]);
    let document = page.build();

    let config = FilterConfiguration::default().reduce(FilterAction::set_show_all(false));
    let result = classify(&config, &document);

    assert_eq!(
        result.verdict_for(human.entry).map(|v| v.reason),
        Some(VerdictReason::NotReviewBot)
    );
    assert!(!hidden(&result, human.entry));
    assert!(result.verdict_for(human.threads[0]).is_none());
}

#[test]
fn test_host_hidden_human_entry_stays_hidden() {
    let mut page = PageBuilder::new();
    let human = page.entry(Author::Named("octocat"), &[&["LGTM"]]);
    let mut document = page.build();
    document
        .find_mut(human.entry)
        .unwrap()
        .set_attribute("style", "display: none;");
    let before = document.clone();

    let verdicts = classify(&FilterConfiguration::default(), &document).into_verdicts();
    apply_verdicts(&mut document, &verdicts);

    assert_eq!(document, before);
    assert!(document.find(human.entry).unwrap().is_display_hidden());
}

#[test]
fn test_strong_text_is_not_a_severity_fragment() {
    let mut page = PageBuilder::new();
    let bold_text = DomNode::text(page.id(), "Major refactor");
    let bold = DomNode::element(page.id(), "strong").with_child(bold_text);
    let badge_text = DomNode::text(page.id(), "🟡 Minor");
    let badge = DomNode::element(page.id(), "em").with_child(badge_text);
    let paragraph = DomNode::element(page.id(), "p").with_children([bold, badge]);
    let bot = page.entry_with_bodies(Author::KnownBot, vec![vec![paragraph]]);
    let document = page.build();

    let thread = document.find(bot.threads[0]).unwrap();
    assert_eq!(thread_severity(thread), Some(Severity::Minor));
}

#[test]
fn test_hidden_severity_keeps_entry_with_other_threads() {
    let mut page = PageBuilder::new();
    let bot = page.bot_entry(&["Critical", "Minor"]);
    let document = page.build();

    let config = FilterConfiguration::default()
        .reduce(FilterAction::set_severity(Severity::Critical, false));
    let result = classify(&config, &document);

    assert!(hidden(&result, bot.threads[0]));
    assert!(!hidden(&result, bot.threads[1]));
    assert!(!hidden(&result, bot.entry));
    assert_eq!(
        result.verdict_for(bot.threads[0]).and_then(|v| v.severity),
        Some(Severity::Critical)
    );
}

#[test]
fn test_entry_collapses_when_no_thread_visible() {
    let mut page = PageBuilder::new();
    let bot = page.bot_entry(&["Major", "Major"]);
    let document = page.build();

    let config = FilterConfiguration::default()
        .reduce(FilterAction::set_show_all(false))
        .reduce(FilterAction::set_severity(Severity::Critical, true));
    let result = classify(&config, &document);

    assert!(bot.threads.iter().all(|t| hidden(&result, *t)));
    let entry = result.verdict_for(bot.entry).unwrap();
    assert!(entry.is_hidden());
    assert_eq!(entry.reason, VerdictReason::NoVisibleThreads);
    assert_eq!(
        entry.markers(),
        [(CUSTOM_BOT_MARKER, false), (SEVERITY_MARKER, true)]
    );
}

#[test]
fn test_show_all_keeps_entry_even_if_threads_hidden() {
    let mut page = PageBuilder::new();
    let bot = page.bot_entry(&["Minor"]);
    let document = page.build();

    let config = FilterConfiguration::default()
        .reduce(FilterAction::set_severity(Severity::Minor, false));
    assert!(config.show_all());
    let result = classify(&config, &document);

    assert!(hidden(&result, bot.threads[0]));
    assert!(!hidden(&result, bot.entry));
}

#[test]
fn test_unlabelled_thread_follows_show_all() {
    let mut page = PageBuilder::new();
    let bot = page.entry(Author::KnownBot, &[&["Walkthrough"]]);
    let document = page.build();

    let shown = classify(&FilterConfiguration::default(), &document);
    assert!(!hidden(&shown, bot.threads[0]));
    assert_eq!(shown.verdict_for(bot.threads[0]).unwrap().severity, None);

    // Severities all on, but the global flag is off.
    let config = FilterConfiguration::new(Severity::ALL.map(|s| (s, true)), false);
    let filtered = classify(&config, &document);
    assert!(hidden(&filtered, bot.threads[0]));
    assert!(hidden(&filtered, bot.entry));
}

#[test]
fn test_custom_bot_hides_whole_entry() {
    let mut page = PageBuilder::new();
    let dep = page.entry(Author::Named("depbot[bot]"), &[&["🔴 Critical"], &["bump"]]);
    let human = page.entry(Author::Named("octocat"), &[&["LGTM"]]);
    let document = page.build();

    let config = FilterConfiguration::default()
        .reduce(FilterAction::set_custom_bot("DepBot", false));
    let result = classify(&config, &document);

    let entry = result.verdict_for(dep.entry).unwrap();
    assert!(entry.is_hidden());
    assert_eq!(entry.reason, VerdictReason::CustomBotHidden);
    assert_eq!(
        entry.markers(),
        [(CUSTOM_BOT_MARKER, true), (SEVERITY_MARKER, false)]
    );
    // No thread verdicts for a vetoed entry.
    assert!(dep.threads.iter().all(|t| result.verdict_for(*t).is_none()));
    assert!(!hidden(&result, human.entry));
}

#[test]
fn test_shown_custom_bot_falls_through() {
    let mut page = PageBuilder::new();
    let dep = page.entry(Author::Named("depbot"), &[&["bump"]]);
    let document = page.build();

    let config = FilterConfiguration::default()
        .reduce(FilterAction::set_show_all(false))
        .reduce(FilterAction::set_custom_bot("depbot", true));
    let result = classify(&config, &document);

    let entry = result.verdict_for(dep.entry).unwrap();
    assert!(!entry.is_hidden());
    assert_eq!(entry.reason, VerdictReason::NotReviewBot);
}

#[test]
fn test_custom_bot_veto_applies_to_known_bot() {
    let mut page = PageBuilder::new();
    let bot = page.bot_entry(&["Critical"]);
    let document = page.build();

    let config = FilterConfiguration::default()
        .reduce(FilterAction::set_custom_bot("coderabbit", false));
    let result = classify(&config, &document);

    assert_eq!(
        result.verdict_for(bot.entry).map(|v| v.reason),
        Some(VerdictReason::CustomBotHidden)
    );
}

#[test]
fn test_first_severity_fragment_wins() {
    let mut page = PageBuilder::new();
    let bot = page.entry(
        Author::KnownBot,
        &[&["⚠️ Potential issue", "🟠 Major", "🔴 Critical"]],
    );
    let document = page.build();

    let thread = document.find(bot.threads[0]).unwrap();
    assert_eq!(thread_severity(thread), Some(Severity::Major));
}

#[test]
fn test_severity_match_is_case_sensitive() {
    let mut page = PageBuilder::new();
    let bot = page.entry(Author::KnownBot, &[&["critical issue"]]);
    let document = page.build();

    let thread = document.find(bot.threads[0]).unwrap();
    assert_eq!(thread_severity(thread), None);
}

#[test]
fn test_thread_without_body_has_no_severity() {
    let thread = DomNode::element(1, "div")
        .with_attribute("class", selectors::THREAD_CLASS)
        .with_child(DomNode::element(2, "em").with_child(DomNode::text(3, "Critical")));
    assert_eq!(thread_severity(&thread), None);
}

#[test]
fn test_document_without_entries() {
    let document = PageBuilder::new().build();
    let result = classify(&FilterConfiguration::default(), &document);
    assert!(result.verdicts.is_empty());
    assert_eq!(result.summary(), ClassificationSummary::default());
}

#[test]
fn test_reclassify_is_idempotent() {
    let mut page = PageBuilder::new();
    page.bot_entry(&["Critical", "Minor"]);
    page.bot_entry(&["Major"]);
    page.entry(Author::Named("depbot"), &[&["bump"]]);
    let mut document = page.build();

    let config = FilterConfiguration::default()
        .reduce(FilterAction::set_show_all(false))
        .reduce(FilterAction::set_severity(Severity::Critical, true))
        .reduce(FilterAction::set_custom_bot("depbot", false));

    let first = classify(&config, &document);
    apply_verdicts(&mut document, &first.verdicts);
    let after_first = document.clone();

    let second = classify(&config, &document);
    assert_eq!(first, second);
    apply_verdicts(&mut document, &second.verdicts);
    assert_eq!(document, after_first);
}

#[test]
fn test_reclassify_restores_hidden_elements() {
    let mut page = PageBuilder::new();
    let bot = page.bot_entry(&["Minor"]);
    let mut document = page.build();

    let hide_all = FilterConfiguration::default().reduce(FilterAction::set_show_all(false));
    let verdicts = classify(&hide_all, &document).into_verdicts();
    apply_verdicts(&mut document, &verdicts);
    assert!(document.find(bot.entry).unwrap().is_display_hidden());
    assert!(document.find(bot.threads[0]).unwrap().is_display_hidden());

    let show_all = hide_all.reduce(FilterAction::set_show_all(true));
    let verdicts = classify(&show_all, &document).into_verdicts();
    apply_verdicts(&mut document, &verdicts);

    for id in [bot.entry, bot.threads[0]] {
        let node = document.find(id).unwrap();
        assert!(!node.is_display_hidden());
        assert_eq!(node.attribute(SEVERITY_MARKER), None);
    }
}

#[test]
fn test_summary_counts() {
    let mut page = PageBuilder::new();
    page.bot_entry(&["Critical", "Minor"]);
    page.entry(Author::Named("octocat"), &[&["LGTM"]]);
    let document = page.build();

    let config = FilterConfiguration::default()
        .reduce(FilterAction::set_severity(Severity::Minor, false));
    let summary = classify(&config, &document).summary();

    assert_eq!(
        summary,
        ClassificationSummary {
            entries: 2,
            hidden_entries: 0,
            threads: 2,
            hidden_threads: 1,
        }
    );
}
