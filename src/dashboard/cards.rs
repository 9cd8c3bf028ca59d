use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

use crate::scoring::ScoreResult;

pub const DISPLAY_URL_MAX: usize = 50;

static STATUS_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{3})\b").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipColor {
    Green,
    Orange,
    Red,
    Gray,
}

impl ChipColor {
    pub fn for_score(score: Option<u8>) -> Self {
        match score {
            None => ChipColor::Gray,
            Some(v) if v >= 90 => ChipColor::Green,
            Some(v) if v >= 50 => ChipColor::Orange,
            Some(_) => ChipColor::Red,
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            ChipColor::Green => "chip-green",
            ChipColor::Orange => "chip-orange",
            ChipColor::Red => "chip-red",
            ChipColor::Gray => "chip-gray",
        }
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// `scheme://netloc path[?query]` as written, without the fragment. Hosts
/// are not punycoded and no path is added.
fn display_form(scheme: &str, url: &str) -> Option<String> {
    let (_, rest) = url.trim().split_once("://")?;
    let rest = rest.split('#').next().unwrap_or_default();
    let (before_query, query) = match rest.split_once('?') {
        Some((head, query)) => (head, Some(query)),
        None => (rest, None),
    };
    let (netloc, path) = before_query.split_at(before_query.find('/').unwrap_or(before_query.len()));
    let mut display = format!("{scheme}://{netloc}{path}");
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        display.push('?');
        display.push_str(query);
    }
    Some(display)
}

/// Display form of `url`, cut to `max_len` characters with a trailing
/// ellipsis. Unparseable input is shown as given.
pub fn shorten_url(url: &str, max_len: usize) -> String {
    let display = match Url::parse(url) {
        Ok(parsed) if parsed.has_host() => {
            display_form(parsed.scheme(), url).unwrap_or_else(|| url.to_string())
        }
        _ => url.to_string(),
    };
    if display.chars().count() <= max_len {
        return display;
    }
    let mut cut: String = display.chars().take(max_len.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Badge text for an error message: the first standalone 3-digit number, or `ERR`.
pub fn error_code(error: &str) -> Option<String> {
    if error.trim().is_empty() {
        return None;
    }
    Some(
        STATUS_CODE
            .captures(error)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| "ERR".to_string()),
    )
}

pub fn chip_html(score: Option<u8>, label: &str) -> String {
    let color = ChipColor::for_score(score);
    let num = score.map(|v| v.to_string()).unwrap_or_else(|| "–".to_string());
    format!(
        "<div class='chip {}'><div class='num'>{}</div><div class='lbl'>{}</div></div>",
        color.class(),
        num,
        escape_html(label)
    )
}

pub fn card_html(result: &ScoreResult) -> String {
    let url = escape_html(&result.url);
    let strategy = result.strategy.as_str();
    let display = escape_html(&shorten_url(&result.url, DISPLAY_URL_MAX));
    let badge = result
        .error
        .as_deref()
        .and_then(error_code)
        .map(|code| format!("<div class='err-chip'>Error: {}</div>", escape_html(&code)))
        .unwrap_or_default();
    let chips = [
        chip_html(Some(result.performance), "Performance"),
        chip_html(Some(result.accessibility), "Accessibility"),
        chip_html(Some(result.best_practices), "Best Practices"),
        chip_html(Some(result.seo), "SEO"),
    ]
    .concat();

    format!(
        "<div class='card' data-url='{url}' data-strategy='{strategy}'>\
<div class='row'><div class='left'>\
<a class='url urlText' href='{url}' target='_blank' rel='noopener'>{display}</a>\
<div class='strategy'>[{strategy}]</div>{badge}</div>\
<div class='right'>{chips}</div></div></div>"
    )
}
