// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Markup sanitizer for fetched bodies.
//!
//! Strips the constructs that execute code when markup is rendered:
//!
//! 1. `<script>` blocks, including their content
//! 2. `<style>` blocks, including their content
//! 3. inline event-handler attributes (`onclick="..."`, `onerror=x`, ...)
//!
//! Matching is regex based and best effort. Unbalanced markup (an opening
//! `<script>` with no close) is left in place rather than guessed at.
//! Everything outside a removed span is returned byte for byte.
//!
//! Removal can splice the text on either side into a new match, so the
//! policy runs until nothing changes, at most [`MAX_PASSES`] times. Markup
//! still changing after that is nested on purpose; its remaining
//! `<script`/`<style` tags are escaped to `&lt;` instead of removed.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

static RE_SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap());

static RE_STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").unwrap());

// Browsers start a new attribute after whitespace, `/` or a closing quote.
// The separator is captured so it can be put back when it is not whitespace.
static RE_EVENT_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(\s|/|["'])\s*on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+)"#).unwrap()
});

static RE_BLOCK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(/?(?:script|style))").unwrap());

/// Policy passes before the remaining block tags are escaped.
pub const MAX_PASSES: usize = 8;

/// One step of the sanitization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SanitizeRule {
    ScriptBlock,
    StyleBlock,
    EventHandler,
    /// `<script`/`<style` tag escaped after [`MAX_PASSES`]; not part of [`POLICY`]
    EscapedTag,
}

/// The sanitization policy, in application order.
pub const POLICY: [SanitizeRule; 3] = [
    SanitizeRule::ScriptBlock,
    SanitizeRule::StyleBlock,
    SanitizeRule::EventHandler,
];

impl SanitizeRule {
    fn regex(self) -> &'static Regex {
        match self {
            Self::ScriptBlock => &RE_SCRIPT_BLOCK,
            Self::StyleBlock => &RE_STYLE_BLOCK,
            Self::EventHandler => &RE_EVENT_HANDLER,
            Self::EscapedTag => &RE_BLOCK_TAG,
        }
    }

    /// Stable label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScriptBlock => "script_block",
            Self::StyleBlock => "style_block",
            Self::EventHandler => "event_handler",
            Self::EscapedTag => "escaped_tag",
        }
    }
}

impl std::fmt::Display for SanitizeRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sanitized markup together with what was removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sanitized {
    pub content: String,
    /// Number of spans removed per rule
    pub removals: BTreeMap<SanitizeRule, usize>,
}

impl Sanitized {
    pub fn total_removals(&self) -> usize {
        self.removals.values().sum()
    }

    pub fn is_clean(&self) -> bool {
        self.removals.is_empty()
    }

    fn count(&mut self, rule: SanitizeRule, n: usize) {
        if n > 0 {
            *self.removals.entry(rule).or_insert(0) += n;
        }
    }
}

/// Remove script blocks, style blocks and inline event handlers from `markup`.
pub fn sanitize(markup: &str) -> String {
    sanitize_with_report(markup).content
}

/// [`sanitize`] for optional input; `None` yields an empty string.
pub fn sanitize_opt(markup: Option<&str>) -> String {
    markup.map(sanitize).unwrap_or_default()
}

/// Sanitize `markup` and count the removals made by each rule.
///
/// The policy is re-applied until a pass changes nothing: a removal can join
/// the text on either side into a fresh match (`<scr<script></script>ipt>`).
/// If the markup is still changing after [`MAX_PASSES`], every remaining
/// block tag is escaped and event handlers are stripped to a fixed point.
/// Escaping never joins text, so the output is a fixed point of the policy.
pub fn sanitize_with_report(markup: &str) -> Sanitized {
    let mut report = Sanitized::default();
    if markup.is_empty() {
        return report;
    }

    let mut current = markup.to_string();
    let mut settled = false;
    for _ in 0..MAX_PASSES {
        let mut changed = false;
        for rule in POLICY {
            let (next, count) = apply(rule, &current);
            if count > 0 {
                current = next;
                report.count(rule, count);
                changed = true;
            }
        }
        if !changed {
            settled = true;
            break;
        }
    }

    if !settled {
        let (escaped, count) = apply(SanitizeRule::EscapedTag, &current);
        current = escaped;
        report.count(SanitizeRule::EscapedTag, count);
        debug!(escaped = count, "Sanitizer pass limit reached, escaping block tags");

        // Each pass removes at least every other handler of a glued run
        loop {
            let (next, count) = apply(SanitizeRule::EventHandler, &current);
            if count == 0 {
                break;
            }
            current = next;
            report.count(SanitizeRule::EventHandler, count);
        }
    }

    if !report.is_clean() {
        debug!(
            removed = report.total_removals(),
            before = markup.len(),
            after = current.len(),
            "Sanitized markup"
        );
    }

    report.content = current;
    report
}

/// Apply one rule to `text`, returning the new text and the match count.
fn apply(rule: SanitizeRule, text: &str) -> (String, usize) {
    let re = rule.regex();
    let mut count = 0;
    let out = match rule {
        SanitizeRule::ScriptBlock | SanitizeRule::StyleBlock => {
            re.replace_all(text, |_: &Captures| {
                count += 1;
                ""
            })
        }
        SanitizeRule::EscapedTag => re.replace_all(text, |caps: &Captures| {
            count += 1;
            format!("&lt;{}", &caps[1])
        }),
        SanitizeRule::EventHandler => re.replace_all(text, |caps: &Captures| {
            count += 1;
            let sep = &caps[1];
            let mut kept = if sep == "/" || sep == "\"" || sep == "'" {
                sep.to_string()
            } else {
                String::new()
            };
            // Keep the tag name or previous value apart from whatever follows
            let end = caps.get(0).map_or(text.len(), |m| m.end());
            let glued = text[end..]
                .chars()
                .next()
                .is_some_and(|c| !c.is_whitespace() && c != '>' && c != '/');
            if glued && kept.is_empty() {
                kept.push(' ');
            }
            kept
        }),
    };
    (out.into_owned(), count)
}
