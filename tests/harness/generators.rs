// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for abuse simulation.

use serde_json::{json, Value};
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of IP addresses for testing.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// A well-formed, human-looking submission.
pub fn clean_submission(i: usize) -> Value {
    json!({
        "postSlug": format!("post-{}", i % 3),
        "name": format!("Reader {i}"),
        "email": format!("reader{i}@example.com"),
        "comment": format!("Thanks for post number {i}, it helped me a lot."),
    })
}

/// Bodies every one of which some heuristic must reject.
pub fn spam_comments() -> Vec<&'static str> {
    vec![
        "Cheap VIAGRA and cialis here",
        "Best online casino bonus",
        "Play poker now",
        "visit http://spam.example and http://more-spam.example",
        "<script>document.location='http://evil.example'</script>",
        "<IFRAME src=x></iframe>",
        "click javascript:alert(document.cookie)",
        "<a href=\"http://spam.example\">nice</a>",
        "[url=http://spam.example]nice[/url]",
        "[link]http://spam.example[/link]",
        "FREE MONEY FOR EVERYONE RIGHT NOW CLICK",
        "wowwwwwwwwwwwwwwwwwwwwwww",
        "!!!!!!!!!!!!!!!!!!!!",
    ]
}

/// A submission carrying one of the spam bodies.
pub fn spam_submission(i: usize) -> Value {
    let bodies = spam_comments();
    json!({
        "postSlug": "hello-world",
        "name": "Promo",
        "comment": bodies[i % bodies.len()],
    })
}

/// Honeypot values a form-filling bot might send. All count as filled.
pub fn honeypot_values() -> Vec<Value> {
    vec![
        json!("http://bot.example"),
        json!("x"),
        json!("  filled  "),
        json!(1),
        json!(true),
        json!(["a"]),
        json!({"k": "v"}),
    ]
}

/// A clean-looking submission with the honeypot filled in.
pub fn honeypot_submission(i: usize) -> Value {
    let values = honeypot_values();
    let mut body = clean_submission(i);
    body["honeypot"] = values[i % values.len()].clone();
    body
}

/// Bodies that must fail validation.
pub fn malformed_submissions() -> Vec<Value> {
    vec![
        json!({}),
        json!(null),
        json!([]),
        json!("just a string"),
        json!({"postSlug": "", "name": "A", "comment": "Hi"}),
        json!({"postSlug": "p", "name": 42, "comment": "Hi"}),
        json!({"postSlug": "p", "name": "A", "comment": ""}),
        json!({"postSlug": "p", "name": "A", "email": "a@", "comment": "Hi"}),
        json!({"postSlug": "p", "name": "A", "email": "a@@b.com", "comment": "Hi"}),
        json!({"postSlug": "p", "name": "A", "email": 7, "comment": "Hi"}),
        json!({"postSlug": "p", "name": "A".repeat(101), "comment": "Hi"}),
        json!({"postSlug": "p", "name": "A", "comment": "b".repeat(1001)}),
    ]
}

/// `X-Forwarded-For` value with the client first and a rotating proxy chain after it.
pub fn forwarded_chain(client: IpAddr, i: usize) -> String {
    format!("{client}, 172.16.{}.{}, 192.168.0.1", (i >> 8) & 0xFF, i & 0xFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ips() {
        let ips = generate_ips(256);
        assert_eq!(ips.len(), 256);
        // All should be unique
        let unique: std::collections::HashSet<_> = ips.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_forwarded_chain_starts_with_client() {
        let ip: IpAddr = "10.0.0.9".parse().unwrap();
        assert!(forwarded_chain(ip, 300).starts_with("10.0.0.9, "));
    }
}
