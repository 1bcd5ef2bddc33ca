use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use regex::Regex;
use std::sync::OnceLock;

use crate::settings::RenderMode;

pub const IMAGE_CLASS: &str = "post-image";

/// Stands in for a link or image target with a scheme that could run script.
const BLOCKED_URL: &str = "#";

fn image_tag() -> &'static Regex {
    static RE_IMAGE: OnceLock<Regex> = OnceLock::new();
    RE_IMAGE.get_or_init(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap())
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
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

/// Relative URLs pass, absolute ones only with http, https, mailto or an
/// image `data:` URI. Browsers ignore whitespace and control characters
/// inside a scheme, so those are dropped before checking.
fn is_safe_url(url: &str) -> bool {
    let cleaned = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    match cleaned.find([':', '/', '?', '#']) {
        Some(i) if cleaned[i..].starts_with(':') => {
            matches!(&cleaned[..i], "http" | "https" | "mailto") || cleaned.starts_with("data:image/")
        }
        _ => true,
    }
}

/// Markup for a post body, safe to inject with `inner_html`.
pub fn render_body(body: &str, mode: RenderMode) -> String {
    match mode {
        RenderMode::Lines => render_lines(body),
        RenderMode::Markdown => render_markdown(body),
    }
}

/// Each line holding an image tag becomes that image; any other line is
/// shown as text. Only the first tag of a line is honored, and a tag whose
/// source fails the URL check stays text.
pub fn render_lines(body: &str) -> String {
    let re = image_tag();
    body.split('\n')
        .map(|line| match re.captures(line).filter(|cap| is_safe_url(&cap[2])) {
            Some(cap) => format!(
                "<img src=\"{}\" alt=\"{}\" class=\"{IMAGE_CLASS}\" />",
                escape_html(&cap[2]),
                escape_html(&cap[1]),
            ),
            None => escape_html(line),
        })
        .collect::<Vec<_>>()
        .join("<br />")
}

pub fn render_markdown(body: &str) -> String {
    let parser = Parser::new_ext(body, Options::ENABLE_STRIKETHROUGH).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::SoftBreak => Event::HardBreak,
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_url(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed(BLOCKED_URL),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_url(&dest_url) => Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::Borrowed(BLOCKED_URL),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out.replace("<img ", &format!("<img class=\"{IMAGE_CLASS}\" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_lines_become_img_tags() {
        let out = render_lines("intro\n![Habit Loop](https://example.com/a.png)\noutro");
        assert_eq!(
            out,
            "intro<br /><img src=\"https://example.com/a.png\" alt=\"Habit Loop\" class=\"post-image\" /><br />outro"
        );
    }

    #[test]
    fn only_first_image_per_line_counts() {
        let out = render_lines("![a](one.png) and ![b](two.png)");
        assert_eq!(out.matches("<img").count(), 1);
        assert!(out.contains("src=\"one.png\""));
        assert!(!out.contains("two.png"));
    }

    #[test]
    fn text_lines_are_escaped() {
        let out = render_lines("<script>alert('x')</script>");
        assert_eq!(out, "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;");
    }

    #[test]
    fn image_attributes_are_escaped() {
        let out = render_lines("![\"><b>](x.png\"onerror=\"y)");
        assert!(!out.contains("<b>"));
        assert!(out.contains("alt=\"&quot;&gt;&lt;b&gt;\""));
        assert!(out.contains("src=\"x.png&quot;onerror=&quot;y\""));
    }

    #[test]
    fn data_uri_images_render() {
        let out = render_lines("\n![Image](data:image/png;base64,iVBORw0KGgo=)\n");
        assert_eq!(
            out,
            "<br /><img src=\"data:image/png;base64,iVBORw0KGgo=\" alt=\"Image\" class=\"post-image\" /><br />"
        );
    }

    #[test]
    fn markdown_mode_escapes_raw_html() {
        let out = render_markdown("**bold** <em>raw</em>");
        assert!(out.contains("<strong>bold</strong>"));
        assert!(out.contains("&lt;em&gt;raw&lt;/em&gt;"));
    }

    #[test]
    fn markdown_mode_keeps_line_breaks_and_images() {
        let out = render_markdown("one\ntwo\n\n![pic](p.png)");
        assert!(out.contains("one<br />"));
        assert!(out.contains("<img class=\"post-image\" src=\"p.png\" alt=\"pic\""));
    }

    #[test]
    fn markdown_links_with_script_schemes_are_blocked() {
        let out = render_markdown("[click](javascript:alert(document.cookie))");
        assert_eq!(out, "<p><a href=\"#\">click</a></p>\n");

        let out = render_markdown("[x](<JavaScript\t:alert(1)>) ![y](vbscript:run)");
        assert!(!out.to_ascii_lowercase().contains("script:"));
        assert!(out.contains("src=\"#\""));
    }

    #[test]
    fn markdown_keeps_ordinary_destinations() {
        let out = render_markdown(
            "[a](https://example.com) [b](/about) [c](mailto:me@example.com) ![d](data:image/png;base64,AQID)",
        );
        assert!(out.contains("href=\"https://example.com\""));
        assert!(out.contains("href=\"/about\""));
        assert!(out.contains("href=\"mailto:me@example.com\""));
        assert!(out.contains("src=\"data:image/png;base64,AQID\""));
    }

    #[test]
    fn line_images_with_script_sources_stay_text() {
        let out = render_lines("![x](javascript:alert(1))\n![y](data:text/html,hi)");
        assert!(!out.contains("<img"));
        assert!(out.starts_with("![x](javascript:alert(1))"));
    }

    #[test]
    fn url_check_reads_only_the_scheme() {
        assert!(is_safe_url("images/a:b.png"));
        assert!(is_safe_url("?q=javascript:x"));
        assert!(is_safe_url("#top"));
        assert!(!is_safe_url(" java\nscript:alert(1)"));
        assert!(!is_safe_url("data:text/html;base64,PHNjcmlwdD4="));
    }

    #[test]
    fn render_body_dispatches_on_mode() {
        assert_eq!(render_body("a\nb", RenderMode::Lines), "a<br />b");
        assert!(render_body("a\nb", RenderMode::Markdown).starts_with("<p>"));
    }
}
