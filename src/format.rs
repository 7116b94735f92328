//! Slack message rendering.
//!
//! Pure: reads a [`PaperInfo`] and produces mrkdwn text.  Layout:
//!
//! ```text
//! *{title_dest} | {title}*
//! {abstract_dest}
//! [<{url}|arXiv>] [<{arxiv_vanity_url}|arXiv Vanity>]
//! ```
//!
//! The mirror link is only appended when the paper carries one.

use crate::paper::PaperInfo;

pub fn format_message(paper: &PaperInfo) -> String {
    let mut text = format!(
        "*{} | {}*\n{}\n[<{}|arXiv>]",
        paper.title_dest, paper.title, paper.abstract_dest, paper.url
    );
    if let Some(vanity) = &paper.arxiv_vanity_url {
        text.push_str(&format!(" [<{vanity}|arXiv Vanity>]"));
    }
    text
}
