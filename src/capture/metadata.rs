//! Output-filename metadata: publication, title, and date pulled from the
//! loaded page.

use chromiumoxide::Page;
use chrono::Local;
use url::Url;

use crate::browser::page::eval_string;

/// Metadata backing the `{publication}_{title}_{date}` output filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub publication: String,
    pub title: String,
    pub date: String,
}

impl PageMetadata {
    /// Sanitized filename stem.
    pub fn file_stem(&self) -> String {
        sanitize_filename(&format!(
            "{}_{}_{}",
            self.publication, self.title, self.date
        ))
    }
}

/// Extract publication, title, and date from the loaded page.
///
/// Title falls back to "Untitled" when the page carries none; the date
/// falls back to today when no `<time>` element is present. Missing
/// pieces never fail a capture — the filename just gets the default.
pub async fn extract_page_metadata(page: &Page, navigated_url: &str) -> PageMetadata {
    let title = eval_string(page, "document.title")
        .await
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Untitled".to_string());

    let date = eval_string(
        page,
        "(() => { const t = document.querySelector('time'); \
           return t ? t.innerText.trim() : null; })()",
    )
    .await
    .filter(|d| !d.is_empty())
    .unwrap_or_else(default_date);

    PageMetadata {
        publication: publication_from_url(navigated_url),
        title,
        date,
    }
}

/// Derive the publication label from a URL: hostname, leading `www.`
/// stripped, first DNS label capitalized. "Unknown" when the URL has no
/// hostname.
pub fn publication_from_url(url: &str) -> String {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string));
    let Some(host) = host else {
        return "Unknown".to_string();
    };
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let label = host.split('.').next().unwrap_or(host);
    capitalize(label)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Today's date in the `DD Mon YYYY` shape used when a page carries no
/// `<time>` element.
pub fn default_date() -> String {
    Local::now().format("%d %b %Y").to_string()
}

/// Strip characters that are illegal in filenames on common filesystems.
/// `:` becomes `_` so Windows-illegal titles stay readable; the rest are
/// dropped outright.
pub fn sanitize_filename(s: &str) -> String {
    s.chars()
        .filter_map(|c| match c {
            '\\' | '/' | '*' | '?' | '"' | '<' | '>' | '|' => None,
            ':' => Some('_'),
            _ => Some(c),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_title_with_quotes_and_colon() {
        assert_eq!(
            sanitize_filename(r#"Example_Title: "Big News"?"#),
            "Example_Title_ Big News"
        );
    }

    #[test]
    fn strips_every_illegal_character() {
        assert_eq!(sanitize_filename(r#"a\b/c*d?e"f<g>h|i"#), "abcdefghi");
    }

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(sanitize_filename("Guardian_Story_01 Jan 2026"), "Guardian_Story_01 Jan 2026");
    }

    #[test]
    fn publication_strips_www_and_capitalizes() {
        assert_eq!(
            publication_from_url("https://www.theguardian.com/world/article"),
            "Theguardian"
        );
        assert_eq!(publication_from_url("https://bbc.co.uk/news"), "Bbc");
    }

    #[test]
    fn publication_without_hostname_is_unknown() {
        assert_eq!(publication_from_url("not a url"), "Unknown");
    }

    #[test]
    fn default_date_shape() {
        let date = default_date();
        let parts: Vec<&str> = date.split(' ').collect();
        assert_eq!(parts.len(), 3, "expected 'DD Mon YYYY', got {date}");
        assert_eq!(parts[0].len(), 2);
        assert_eq!(parts[1].len(), 3);
        assert_eq!(parts[2].len(), 4);
    }

    #[test]
    fn file_stem_joins_and_sanitizes() {
        let meta = PageMetadata {
            publication: "Example".into(),
            title: r#"Big "News"?"#.into(),
            date: "01 Jan 2026".into(),
        };
        assert_eq!(meta.file_stem(), "Example_Big News_01 Jan 2026");
    }
}
