//! Response Synthesizer
//!
//! Locally generated responses (redirect, throttle page) and the header sets
//! that decorate forwarded origin responses. Decoration consumes a response
//! and returns a new one; nothing is patched in place behind the caller.

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Response, StatusCode};

/// Cache suppression applied to every synthesized block
const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// Ordered set of headers to apply to a response
#[derive(Debug, Clone, Default)]
pub struct HeaderSet(Vec<(HeaderName, HeaderValue)>);

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header; values that are not valid header text are skipped
    pub fn with(mut self, name: &'static str, value: impl ToString) -> Self {
        match HeaderValue::from_str(&value.to_string()) {
            Ok(value) => self.0.push((HeaderName::from_static(name), value)),
            Err(_) => tracing::debug!(header = name, "Skipping invalid header value"),
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.0.iter().map(|(n, v)| (n, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// New response equal to `response` with `headers` set (replacing same-name
/// headers)
pub fn with_headers(response: Response<Body>, headers: &HeaderSet) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    for (name, value) in headers.iter() {
        parts.headers.insert(name.clone(), value.clone());
    }
    Response::from_parts(parts, body)
}

// ============================================================================
// Admin portal
// ============================================================================

pub fn admin_warning_headers(attempts: u32, remaining: u32) -> HeaderSet {
    HeaderSet::new()
        .with("x-security-warning", "Admin-Access-Monitored")
        .with("x-attempt-count", attempts)
        .with("x-remaining-attempts", remaining)
}

pub fn admin_fallback_headers() -> HeaderSet {
    HeaderSet::new().with("x-security-error", "Protection-Fallback")
}

/// 302 away from the admin portal
pub fn admin_block_redirect(location: &str, attempts: u32, client_ip: &str) -> Response<Body> {
    let headers = HeaderSet::new()
        .with("location", location)
        .with("x-security-action", "Admin-Access-Blocked")
        .with("x-attempt-count", attempts)
        .with("x-client-ip", client_ip)
        .with("cache-control", NO_CACHE)
        .with("pragma", "no-cache")
        .with("expires", "0");

    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::FOUND;
    with_headers(response, &headers)
}

// ============================================================================
// Flash sale
// ============================================================================

pub fn flash_sale_pass_headers(
    request_count: u32,
    limit: u32,
    remaining: u32,
    client_ip: &str,
) -> HeaderSet {
    HeaderSet::new()
        .with("x-flash-sale-protected", "true")
        .with("x-request-count", request_count)
        .with("x-rate-limit-limit", limit)
        .with("x-rate-limit-remaining", remaining)
        .with("x-client-ip", client_ip)
}

pub fn flash_sale_fallback_headers() -> HeaderSet {
    HeaderSet::new().with("x-protection-error", "Fallback-Mode")
}

/// Parameters of the throttle page
#[derive(Debug, Clone, Copy)]
pub struct ThrottlePage<'a> {
    pub request_count: u32,
    pub limit: u32,
    pub window_secs: u64,
    pub client_ip: &'a str,
    pub protected_by: &'a str,
}

impl ThrottlePage<'_> {
    /// 429 with an HTML body counting down to the end of the window
    pub fn into_response(self) -> Response<Body> {
        let headers = HeaderSet::new()
            .with("content-type", "text/html; charset=utf-8")
            .with("retry-after", self.window_secs)
            .with("x-rate-limited", "true")
            .with("x-rate-limit-reset", self.window_secs)
            .with("x-rate-limit-limit", self.limit)
            .with("x-request-count", self.request_count)
            .with("x-protected-by", self.protected_by)
            .with("cache-control", NO_CACHE);

        let mut response = Response::new(Body::from(self.render()));
        *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
        with_headers(response, &headers)
    }

    pub fn render(&self) -> String {
        let client_ip = escape_html(self.client_ip);
        let protected_by = escape_html(self.protected_by);
        let secs = self.window_secs;

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <title>High Demand - Please Wait</title>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
        body {{ font-family: Arial, sans-serif; text-align: center; padding: 50px; background: #f8f9fa; }}
        .container {{ max-width: 600px; margin: 0 auto; background: white; padding: 40px; border-radius: 10px; box-shadow: 0 4px 6px rgba(0,0,0,0.1); }}
        h1 {{ color: #dc3545; margin-bottom: 20px; }}
        p {{ color: #6c757d; font-size: 18px; line-height: 1.6; }}
        .timer {{ background: #ffc107; color: #212529; padding: 10px 20px; border-radius: 5px; font-weight: bold; margin: 20px 0; }}
        .btn {{ background: #007bff; color: white; padding: 12px 24px; border-radius: 5px; text-decoration: none; display: inline-block; margin-top: 20px; }}
        .footer {{ margin-top: 30px; font-size: 14px; color: #999; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>Flash Sale - High Demand!</h1>
        <p>Our flash sale is experiencing extremely high traffic. To keep access fair, requests are limited to {limit} every {secs} seconds.</p>
        <div class="timer">Please wait <span id="countdown">{secs}</span> seconds before trying again</div>
        <a href="/" class="btn" id="retry">Back to Home</a>
        <p class="footer">Protected by {protected_by} &middot; Your IP: {client_ip}</p>
    </div>
    <script>
        (function () {{
            var remaining = {secs};
            var timer = document.querySelector('.timer');
            var countdown = document.getElementById('countdown');
            var retry = document.getElementById('retry');
            var tick = setInterval(function () {{
                remaining -= 1;
                if (remaining > 0) {{
                    countdown.textContent = remaining;
                    return;
                }}
                clearInterval(tick);
                timer.textContent = 'You can try again now!';
                retry.textContent = 'Try Flash Sale Again';
                retry.href = window.location.pathname;
            }}, 1000);
        }})();
    </script>
</body>
</html>"#,
            limit = self.limit,
        )
    }
}

/// Escape text for HTML body content
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    fn location(response: &Response<Body>) -> Option<&str> {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_with_headers_replaces_and_preserves() {
        let mut response = Response::new(Body::from("origin"));
        *response.status_mut() = StatusCode::IM_A_TEAPOT;
        response
            .headers_mut()
            .insert("x-attempt-count", HeaderValue::from_static("99"));
        response
            .headers_mut()
            .insert("x-origin", HeaderValue::from_static("kept"));

        let decorated = with_headers(response, &admin_warning_headers(1, 2));

        assert_eq!(decorated.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(decorated.headers()["x-origin"], "kept");
        assert_eq!(decorated.headers()["x-attempt-count"], "1");
        assert_eq!(decorated.headers().get_all("x-attempt-count").iter().count(), 1);
        assert_eq!(decorated.headers()["x-remaining-attempts"], "2");
        assert_eq!(
            decorated.headers()["x-security-warning"],
            "Admin-Access-Monitored"
        );
    }

    #[test]
    fn test_invalid_header_values_are_skipped() {
        let headers = HeaderSet::new().with("x-client-ip", "bad\nvalue").with("x-ok", 1);
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_admin_block_redirect() {
        let response = admin_block_redirect("https://example.com/", 4, "203.0.113.9");

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), Some("https://example.com/"));
        assert_eq!(response.headers()["x-security-action"], "Admin-Access-Blocked");
        assert_eq!(response.headers()["x-attempt-count"], "4");
        assert_eq!(response.headers()["x-client-ip"], "203.0.113.9");
        assert_eq!(response.headers()["cache-control"], NO_CACHE);
        assert_eq!(response.headers()["pragma"], "no-cache");
        assert_eq!(response.headers()["expires"], "0");
    }

    #[test]
    fn test_throttle_page_headers_and_countdown() {
        let page = ThrottlePage {
            request_count: 2,
            limit: 1,
            window_secs: 10,
            client_ip: "<script>",
            protected_by: "Edge",
        };
        let html = page.render();
        assert!(html.contains(r#"<span id="countdown">10</span>"#));
        assert!(html.contains("var remaining = 10;"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("Your IP: <script>"));

        let response = page.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["content-type"], "text/html; charset=utf-8");
        assert_eq!(response.headers()["retry-after"], "10");
        assert_eq!(response.headers()["x-rate-limited"], "true");
        assert_eq!(response.headers()["x-rate-limit-reset"], "10");
        assert_eq!(response.headers()["x-rate-limit-limit"], "1");
        assert_eq!(response.headers()["x-request-count"], "2");
        assert_eq!(response.headers()["x-protected-by"], "Edge");
        assert_eq!(response.headers()["cache-control"], NO_CACHE);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a&b<"c">'"#), "a&amp;b&lt;&quot;c&quot;&gt;&#x27;");
        assert_eq!(escape_html("10.0.0.1"), "10.0.0.1");
    }
}
