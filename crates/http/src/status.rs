use memochat_model::ErrorKind;
use reqwest::Response;
use serde_json::Value;

use crate::Error;

/// Passes a successful response through, or turns a rejected one into an
/// [`ErrorKind::HttpStatus`] error without streaming its body.
pub(crate) async fn check_status(resp: Response) -> Result<Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = match resp.text().await {
        Ok(body) => body,
        Err(err) => {
            debug!("failed to read the error body: {err}");
            String::new()
        }
    };
    let message = failure_message(status.as_u16(), &body);
    warn!("request rejected with status {status}: {message}");
    Err(Error::new(message, ErrorKind::HttpStatus).with_status(status.as_u16()))
}

/// Picks the message to surface for a rejected request: the `error` or
/// `detail` field of a JSON body, or a generic message keyed by status.
pub(crate) fn failure_message(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|body| detail_of(&body))
        .unwrap_or_else(|| format!("Request failed with status {status}"))
}

fn detail_of(body: &Value) -> Option<String> {
    let error = body.get("error").filter(|v| !v.is_null());
    let detail = body.get("detail").filter(|v| !v.is_null());
    if let Some(Value::String(error)) = error {
        return Some(error.clone());
    }
    // FastAPI validation errors carry a list in `detail`.
    match detail.or(error)? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message() {
        assert_eq!(failure_message(500, r#"{"detail":"bad"}"#), "bad");
        assert_eq!(
            failure_message(400, r#"{"error":"X-User-ID header is required"}"#),
            "X-User-ID header is required"
        );
        assert_eq!(
            failure_message(400, r#"{"error":"first","detail":"second"}"#),
            "first"
        );
        assert_eq!(
            failure_message(422, r#"{"detail":[{"msg":"field required"}]}"#),
            r#"[{"msg":"field required"}]"#
        );
    }

    #[test]
    fn test_generic_failure_message() {
        assert_eq!(
            failure_message(502, "<html>Bad Gateway</html>"),
            "Request failed with status 502"
        );
        assert_eq!(failure_message(404, ""), "Request failed with status 404");
        assert_eq!(
            failure_message(500, r#"{"detail":null}"#),
            "Request failed with status 500"
        );
        assert_eq!(failure_message(503, "[1,2]"), "Request failed with status 503");
    }
}
