//! Plain-text renderings of fetched data.
//!
//! Every function returns a `String` so callers decide where it goes.

use civic_types::{AiAnalysis, ContentKind, FactCheck, Office, Region, ScoreBreakdown, VoteTally};
use std::collections::BTreeMap;
use std::fmt::Write;

pub const DEFAULT_WIDTH: usize = 80;

const ABOUT_TEXT: &str = "Civic helps voters follow the people and offices that represent them. \
Browse offices from the federal level down to your school board, read published fact-checks \
of public claims, see how politicians score across policy areas, and vote on what you find \
useful. Fact-checks and scores are produced by an independent analysis service; Civic shows \
them as published and does not edit their verdicts.";

const PRIVACY_TEXT: &str = "Civic stores your email address, display name and a salted hash \
of your password. Votes are stored with your account so you can change or withdraw them. \
Your session token is kept on this device in ~/.civic/session, readable only by you, and is \
removed when you log out. Claims you submit for analysis are sent to the analysis service. \
Civic does not sell or share personal data.";

/// Line shown in place of content that could not be fetched
pub fn unavailable(what: &str) -> String {
    format!("{} is currently unavailable.", what)
}

fn wrap_into(out: &mut String, text: &str, width: usize, indent: &str) {
    let options = textwrap::Options::new(width.max(20))
        .initial_indent(indent)
        .subsequent_indent(indent);
    for line in textwrap::wrap(text, options) {
        let _ = writeln!(out, "{}", line);
    }
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));
}

pub fn render_fact_checks(items: &[&FactCheck], width: usize) -> String {
    if items.is_empty() {
        return "No fact-checks match.\n".to_string();
    }

    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(
            out,
            "[{}] {} ({})",
            item.verdict.label(),
            item.id,
            item.published_at.format("%Y-%m-%d")
        );
        wrap_into(&mut out, &format!("\"{}\"", item.claim), width, "  ");
        if let Some(claimant) = &item.claimant {
            let _ = writeln!(out, "  - {}", claimant);
        }
        wrap_into(&mut out, &item.summary, width, "  ");
        for source in &item.sources {
            let _ = writeln!(out, "  * {}", source);
        }
    }
    out
}

pub fn render_score_breakdown(breakdown: &ScoreBreakdown, width: usize) -> String {
    let mut out = String::new();
    heading(
        &mut out,
        &format!(
            "{}: {:.0}/100",
            breakdown.politician_name, breakdown.overall_score
        ),
    );

    for category in &breakdown.categories {
        let weight = category
            .weight
            .map(|w| format!(" (weight {:.0}%)", w * 100.0))
            .unwrap_or_default();
        let _ = writeln!(out, "{:<28} {:>5.1}{}", category.name, category.score, weight);
        if let Some(rationale) = &category.rationale {
            wrap_into(&mut out, rationale, width, "    ");
        }
    }

    if let Some(summary) = &breakdown.summary {
        out.push('\n');
        wrap_into(&mut out, summary, width, "");
    }
    out
}

pub fn render_analysis(analysis: &AiAnalysis, width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Verdict: {} ({}% confidence)",
        analysis.verdict.label(),
        analysis.confidence.min(100)
    );
    out.push('\n');
    wrap_into(&mut out, &analysis.summary, width, "");

    if !analysis.key_points.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "Key points:");
        for (i, point) in analysis.key_points.iter().enumerate() {
            wrap_into(&mut out, &format!("{}. {}", i + 1, point), width, "  ");
        }
    }

    if !analysis.sources.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "Sources:");
        for source in &analysis.sources {
            let _ = writeln!(out, "  * {}", source);
        }
    }
    out
}

pub fn render_tally(kind: ContentKind, item_id: &str, tally: &VoteTally) -> String {
    let own = match tally.own {
        Some(direction) => format!(", you voted {}", direction.as_str()),
        None => String::new(),
    };
    format!(
        "{} {}: +{} / -{} (score {}){}\n",
        kind.as_str(),
        item_id,
        tally.upvotes,
        tally.downvotes,
        tally.score(),
        own
    )
}

/// One heading per group, regions listed by code beneath it
pub fn render_regions(regions: &[Region]) -> String {
    let mut groups: BTreeMap<&str, Vec<&Region>> = BTreeMap::new();
    for region in regions {
        groups.entry(region.group.as_str()).or_default().push(region);
    }

    let mut out = String::new();
    for (i, (group, mut members)) in groups.into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        members.sort_by(|a, b| a.code.cmp(&b.code));
        let _ = writeln!(out, "{}", group);
        for region in members {
            let _ = writeln!(out, "  {}  {}", region.code, region.name);
        }
    }
    out
}

pub fn render_offices(offices: &[Office], width: usize) -> String {
    let mut out = String::new();
    for office in offices {
        let _ = writeln!(
            out,
            "{} [{} / {}]",
            office.name,
            office.level.as_str(),
            office.category.as_str()
        );
        wrap_into(&mut out, &office.description, width, "    ");
    }
    out
}

pub fn about_page(width: usize) -> String {
    let mut out = String::new();
    heading(&mut out, "About Civic");
    wrap_into(&mut out, ABOUT_TEXT, width, "");
    out
}

pub fn privacy_page(width: usize) -> String {
    let mut out = String::new();
    heading(&mut out, "Privacy");
    wrap_into(&mut out, PRIVACY_TEXT, width, "");
    out
}
