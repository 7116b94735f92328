//! Entry transformer: raw feed entry to [`PaperInfo`].

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::lang::SOURCE_LANG;
use crate::source::RawEntry;
use crate::translate::Translator;

/// Title suffix arXiv uses for repost notices of already-announced papers.
const UPDATED_MARKER: &str = "] UPDATED)";

/// Length of the `<p>` the feed puts in front of every abstract.
const SUMMARY_PREFIX_LEN: usize = 3;
/// Length of the `</p>` the feed puts after every abstract.
const SUMMARY_SUFFIX_LEN: usize = 4;

/// Trailing ` (arXiv:2101.00001v1 [cs.LG])` annotation on titles.
static TITLE_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r" \(arXiv:.*? \[.*?\]\)$").expect("title annotation regex is valid")
});

/// A paper ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperInfo {
    pub url: String,
    pub title: String,
    pub title_dest: String,
    pub r#abstract: String,
    pub abstract_dest: String,
    /// Present iff a mirror base URL was configured.
    pub arxiv_vanity_url: Option<String>,
}

/// The parts of the configuration the transformer needs.
#[derive(Debug, Clone)]
pub struct TransformSettings {
    pub dest_lang: String,
    pub vanity_base_url: Option<String>,
}

/// Build a [`PaperInfo`] from one feed entry.
///
/// Returns `Ok(None)` for repost notices.  A title that merely happens to
/// end in `] UPDATED)` is skipped as well.
pub fn transform(
    entry: &RawEntry,
    translator: &dyn Translator,
    settings: &TransformSettings,
) -> Result<Option<PaperInfo>> {
    if is_repost(&entry.title) {
        return Ok(None);
    }

    let title = clean_title(&entry.title).to_string();
    let r#abstract = clean_abstract(&entry.summary);

    let title_dest = translator
        .translate(&title, SOURCE_LANG, &settings.dest_lang)
        .with_context(|| format!("failed to translate title of {}", entry.link))?;
    let abstract_dest = translator
        .translate(&r#abstract, SOURCE_LANG, &settings.dest_lang)
        .with_context(|| format!("failed to translate abstract of {}", entry.link))?;

    let arxiv_vanity_url = settings
        .vanity_base_url
        .as_ref()
        .map(|base| format!("{base}{}/", uid(&entry.link)));

    Ok(Some(PaperInfo {
        url: entry.link.clone(),
        title,
        title_dest,
        r#abstract,
        abstract_dest,
        arxiv_vanity_url,
    }))
}

pub fn is_repost(title: &str) -> bool {
    title.ends_with(UPDATED_MARKER)
}

/// Everything after the last `/` of the link.
pub fn uid(link: &str) -> &str {
    link.rsplit('/').next().unwrap_or(link)
}

/// Drop a trailing ` (arXiv:<id> [<category>])`; other titles pass through.
pub fn clean_title(title: &str) -> std::borrow::Cow<'_, str> {
    TITLE_ANNOTATION.replace(title, "")
}

/// Strip the feed's paragraph decoration, join lines and trim.
pub fn clean_abstract(summary: &str) -> String {
    strip_decoration(summary, SUMMARY_PREFIX_LEN, SUMMARY_SUFFIX_LEN)
        .replace('\n', " ")
        .trim()
        .to_string()
}

/// Remove exactly `prefix` leading and `suffix` trailing characters.
///
/// Counts `char`s, not bytes.  Input too short to hold both yields "".
pub fn strip_decoration(s: &str, prefix: usize, suffix: usize) -> &str {
    let len = s.chars().count();
    if len <= prefix + suffix {
        return "";
    }

    let byte_at = |n: usize| s.char_indices().nth(n).map_or(s.len(), |(i, _)| i);
    &s[byte_at(prefix)..byte_at(len - suffix)]
}
