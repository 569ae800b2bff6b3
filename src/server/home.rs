//! Homepage - lists example card links.

use url::Url;

/// Example card linked from the homepage, as `(height, width)`.
pub const EXAMPLE_CARD: (u32, u32) = (320, 200);

/// Showcase cards, as `(width, height)`.
pub const SHOWCASE_CARDS: [(u32, u32); 6] = [
    (50, 50),
    (100, 100),
    (200, 100),
    (320, 200),
    (640, 480),
    (1024, 768),
];

/// Escape HTML special characters to prevent XSS attacks.
fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Absolute URL of the card route for the given dimensions.
///
/// Falls back to a root-relative path when the host is missing or is not a
/// valid URL authority.
pub fn card_url(host: Option<&str>, height: u32, width: u32) -> String {
    let path = format!("card/{}x{}/", height, width);

    host.and_then(|host| Url::parse(&format!("http://{}/", host)).ok())
        .and_then(|base| base.join(&path).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| format!("/{}", path))
}

/// Generate the homepage HTML.
///
/// # Arguments
///
/// * `host` - Value of the request's `Host` header, used for absolute links
/// * `showcase` - Whether to list the showcase cards
pub fn render_homepage(host: Option<&str>, showcase: bool) -> String {
    let (example_height, example_width) = EXAMPLE_CARD;
    let example_url = html_escape(&card_url(host, example_height, example_width));

    let showcase_html = if showcase {
        let items: Vec<String> = SHOWCASE_CARDS
            .iter()
            .map(|&(width, height)| {
                let url = html_escape(&card_url(host, height, width));
                format!(
                    r#"        <li><a href="{url}">{width} &times; {height}</a></li>"#,
                    url = url,
                    width = width,
                    height = height
                )
            })
            .collect();
        format!(
            "    <h2>Showcase</h2>\n    <ul>\n{}\n    </ul>\n",
            items.join("\n")
        )
    } else {
        String::new()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Card Generator</title>
</head>
<body>
    <h1>Card Generator</h1>
    <p>Request a card as <code>/card/{{height}}x{{width}}/</code>, each side between 1 and 1024 pixels.</p>
    <p>Example: <a href="{example_url}">{example_url}</a></p>
{showcase_html}</body>
</html>
"#,
        example_url = example_url,
        showcase_html = showcase_html
    )
}
