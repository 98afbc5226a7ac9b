//! CRM HTTP transport
//!
//! Posts action envelopes as form data to the CRM entry point.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use url::Url;

use super::Transport;
use super::api::{ActionRequest, ActionResponse};

/// Blocking transport posting to `<crm>/index.php`
pub struct HttpTransport {
    endpoint: Url,
    headers: Vec<(String, String)>,
}

impl HttpTransport {
    /// Create a transport posting to the given endpoint
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            headers: vec![
                ("X-Requested-With".to_string(), "XMLHttpRequest".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ],
        }
    }

    /// Add a header sent with every request (e.g. a CSRF token)
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl Transport for HttpTransport {
    fn post(&self, request: &ActionRequest) -> Result<ActionResponse> {
        let pairs = form_pairs(&request.to_params());

        let mut builder = ureq::post(self.endpoint.as_str());
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder
            .send_form(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .with_context(|| format!("Failed to send {} request", request.action()))?;

        let body: ActionResponse = response
            .body_mut()
            .read_json()
            .with_context(|| format!("Failed to parse {} response", request.action()))?;

        Ok(body)
    }
}

/// Flatten a parameter map into bracket-notation form fields
///
/// Follows the encoding the CRM's PHP entry point decodes: nested objects
/// become `key[sub]`, arrays of scalars become `key[]`, arrays of objects
/// become `key[0][sub]`, `null` becomes an empty value and empty arrays are
/// omitted.
pub fn form_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        encode_value(key, value, &mut pairs);
    }
    pairs
}

fn encode_value(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if prefix.ends_with("[]") {
                    out.push((prefix.to_string(), scalar(item)));
                } else if item.is_object() || item.is_array() {
                    encode_value(&format!("{}[{}]", prefix, i), item, out);
                } else {
                    encode_value(&format!("{}[]", prefix), item, out);
                }
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                encode_value(&format!("{}[{}]", prefix, key), item, out);
            }
        }
        _ => out.push((prefix.to_string(), scalar(value))),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::JoinHandle;

    fn pairs_of(value: Value) -> Vec<(String, String)> {
        let Value::Object(map) = value else {
            panic!("expected object");
        };
        form_pairs(&map)
    }

    fn has(pairs: &[(String, String)], key: &str, value: &str) -> bool {
        pairs.iter().any(|(k, v)| k == key && v == value)
    }

    #[test]
    fn test_scalars() {
        let pairs = pairs_of(json!({
            "module": "MailIntegration",
            "record": 9,
            "flag": true,
            "empty": null
        }));
        assert_eq!(pairs.len(), 4);
        assert!(has(&pairs, "module", "MailIntegration"));
        assert!(has(&pairs, "record", "9"));
        assert!(has(&pairs, "flag", "true"));
        assert!(has(&pairs, "empty", ""));
    }

    #[test]
    fn test_scalar_array_uses_empty_brackets() {
        let pairs = pairs_of(json!({ "mailTo": ["a@example.com", "b@example.com"] }));
        assert_eq!(
            pairs,
            vec![
                ("mailTo[]".to_string(), "a@example.com".to_string()),
                ("mailTo[]".to_string(), "b@example.com".to_string()),
            ]
        );
    }

    #[test]
    fn test_object_array_uses_indices() {
        let pairs = pairs_of(json!({
            "mailAttachments": [
                { "name": "a.pdf", "isInline": false },
                { "name": "b.png", "isInline": true }
            ]
        }));
        assert!(has(&pairs, "mailAttachments[0][name]", "a.pdf"));
        assert!(has(&pairs, "mailAttachments[0][isInline]", "false"));
        assert!(has(&pairs, "mailAttachments[1][name]", "b.png"));
        assert!(has(&pairs, "mailAttachments[1][isInline]", "true"));
    }

    #[test]
    fn test_empty_array_is_omitted() {
        let pairs = pairs_of(json!({ "mailCc": [], "mailSubject": "Hi" }));
        assert_eq!(pairs, vec![("mailSubject".to_string(), "Hi".to_string())]);
    }

    #[test]
    fn test_nested_object() {
        let pairs = pairs_of(json!({ "relatedRecords": [{ "module": "Leads", "id": 9 }] }));
        assert!(has(&pairs, "relatedRecords[0][module]", "Leads"));
        assert!(has(&pairs, "relatedRecords[0][id]", "9"));
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        let transport = HttpTransport::new(Url::parse("http://127.0.0.1:9/index.php").unwrap());
        let request = ActionRequest::new("MailIntegration", "Mail");
        assert!(transport.post(&request).is_err());
    }

    /// Answer a single request with a canned reply; yields the raw request
    fn serve_once(status: &'static str, body: &'static str) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = Url::parse(&format!("http://{}/index.php", listener.local_addr().unwrap())).unwrap();

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(reply.as_bytes()).unwrap();
            request
        });
        (url, handle)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut data = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&data);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    #[test]
    fn test_posts_form_and_parses_reply() {
        let (url, server) = serve_once("200 OK", r#"{"success":true,"result":{"id":5}}"#);
        let transport = HttpTransport::new(url).with_header("X-Csrf-Token", "token-1");
        let request = ActionRequest::new("MailIntegration", "Mail")
            .param("mode", "addRelation")
            .param("record", 9);

        let response = transport.post(&request).unwrap();
        assert!(response.success);
        assert_eq!(response.result, Some(json!({ "id": 5 })));

        let raw = server.join().unwrap();
        let lower = raw.to_lowercase();
        assert!(raw.starts_with("POST /index.php"));
        assert!(lower.contains("x-csrf-token: token-1"));
        assert!(lower.contains("x-requested-with: xmlhttprequest"));
        assert!(lower.contains("application/x-www-form-urlencoded"));
        assert!(raw.contains("module=MailIntegration"));
        assert!(raw.contains("mode=addRelation"));
        assert!(raw.contains("record=9"));
    }

    #[test]
    fn test_rejection_is_passed_through() {
        let (url, server) = serve_once("200 OK", r#"{"success":false,"message":"Record is locked"}"#);
        let transport = HttpTransport::new(url);

        let response = transport.post(&ActionRequest::new("MailIntegration", "Mail")).unwrap();
        server.join().unwrap();

        assert!(!response.success);
        assert!(!response.is_transport_failure());
        assert_eq!(response.failure_message(), Some("Record is locked"));
    }

    #[test]
    fn test_error_status_is_an_error() {
        let (url, server) = serve_once("500 Internal Server Error", r#"{"success":false}"#);
        let transport = HttpTransport::new(url);

        assert!(transport.post(&ActionRequest::new("MailIntegration", "Mail")).is_err());
        server.join().unwrap();
    }

    #[test]
    fn test_non_json_reply_is_an_error() {
        let (url, server) = serve_once("200 OK", "<html>Login required</html>");
        let transport = HttpTransport::new(url);

        let err = transport
            .post(&ActionRequest::new("MailIntegration", "Import"))
            .unwrap_err();
        server.join().unwrap();
        assert!(err.to_string().contains("Failed to parse Import response"));
    }
}
