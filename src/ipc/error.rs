use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// One response line. Exactly one of `result`/`error` is present.
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
}

impl Envelope<'_> {
    fn into_value(self) -> Value {
        serde_json::to_value(&self).unwrap_or_else(|_| Value::Null)
    }
}

pub fn ok(id: &str, result: Value) -> Value {
    Envelope {
        id: Some(id),
        ok: true,
        result: Some(result),
        error: None,
    }
    .into_value()
}

fn failure(id: Option<&str>, code: &str, message: String, details: Option<Value>) -> Value {
    Envelope {
        id,
        ok: false,
        result: None,
        error: Some(ErrorBody {
            code: code.to_string(),
            message,
            details,
        }),
    }
    .into_value()
}

pub fn err(id: &str, code: &str, message: impl Into<String>, details: Option<Value>) -> Value {
    failure(Some(id), code, message.into(), details)
}

/// Reply to a line that did not decode; there is no id to echo.
pub fn bad_json(message: impl Into<String>) -> Value {
    failure(None, "bad_json", message.into(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelopes_carry_only_one_payload() {
        let good = ok("7", json!({ "x": 1 }));
        assert_eq!(good, json!({ "id": "7", "ok": true, "result": { "x": 1 } }));

        let bad = err("8", "bad_params", "missing students", None);
        assert_eq!(
            bad,
            json!({
                "id": "8",
                "ok": false,
                "error": { "code": "bad_params", "message": "missing students" }
            })
        );
    }

    #[test]
    fn bad_json_reply_has_no_id() {
        let resp = bad_json("expected value");
        assert!(resp.get("id").is_none());
        assert_eq!(
            resp,
            json!({
                "ok": false,
                "error": { "code": "bad_json", "message": "expected value" }
            })
        );
    }
}
