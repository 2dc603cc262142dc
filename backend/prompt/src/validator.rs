//! Request validation for `POST /api/chat` bodies.
//!
//! Shape and bounds only. Whether `personaKey` names a real persona is decided
//! by the composer, so callers can tell a malformed body from an unknown key.

use serde_json::{Map, Value};
use tracing::debug;

use promptproxy_core::{ChatRequest, Temperature, ValidationErrors, MAX_USER_INPUT_CHARS};

pub const USER_INPUT: &str = "userInput";
pub const PERSONA_KEY: &str = "personaKey";
pub const TEMPERATURE: &str = "temperature";

/// Parse and check a raw request body.
pub fn validate(raw: &[u8]) -> Result<ChatRequest, ValidationErrors> {
    match serde_json::from_slice::<Value>(raw) {
        Ok(value) => validate_value(&value),
        Err(e) => {
            debug!(error = %e, "Request body is not valid JSON");
            let mut errors = ValidationErrors::default();
            errors.form(format!("Malformed JSON body: {e}"));
            Err(errors)
        }
    }
}

/// Check an already-parsed body. Every field is checked so all violations are
/// reported together.
pub fn validate_value(value: &Value) -> Result<ChatRequest, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let Some(body) = value.as_object() else {
        errors.form(format!("Expected object, received {}", type_name(value)));
        return Err(errors);
    };

    let user_input = check_user_input(body, &mut errors);
    let persona_key = check_string(body, PERSONA_KEY, &mut errors);
    let temperature = check_temperature(body, &mut errors);

    match (user_input, persona_key, temperature) {
        (Some(user_input), Some(persona_key), Some(temperature)) if errors.is_empty() => {
            Ok(ChatRequest {
                user_input,
                persona_key,
                temperature,
            })
        }
        _ => Err(errors),
    }
}

fn check_string(body: &Map<String, Value>, field: &str, errors: &mut ValidationErrors) -> Option<String> {
    match body.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        None => {
            errors.field(field, "Required");
            None
        }
        Some(other) => {
            errors.field(field, format!("Expected string, received {}", type_name(other)));
            None
        }
    }
}

fn check_user_input(body: &Map<String, Value>, errors: &mut ValidationErrors) -> Option<String> {
    let input = check_string(body, USER_INPUT, errors)?;
    // UTF-16 code units, as browsers measure string length.
    let len = input.encode_utf16().count();
    if len < 1 {
        errors.field(USER_INPUT, "String must contain at least 1 character(s)");
        return None;
    }
    if len > MAX_USER_INPUT_CHARS {
        errors.field(
            USER_INPUT,
            format!("String must contain at most {MAX_USER_INPUT_CHARS} character(s)"),
        );
        return None;
    }
    Some(input)
}

fn check_temperature(body: &Map<String, Value>, errors: &mut ValidationErrors) -> Option<Temperature> {
    let number = match body.get(TEMPERATURE) {
        Some(Value::Number(n)) => n.clone(),
        None => {
            errors.field(TEMPERATURE, "Required");
            return None;
        }
        Some(other) => {
            errors.field(
                TEMPERATURE,
                format!("Expected number, received {}", type_name(other)),
            );
            return None;
        }
    };

    let value = number.as_f64().unwrap_or(f64::NAN);
    if value < Temperature::MIN {
        errors.field(TEMPERATURE, "Number must be greater than or equal to 0");
        return None;
    }
    if value > Temperature::MAX {
        errors.field(TEMPERATURE, "Number must be less than or equal to 1");
        return None;
    }
    Temperature::new(number)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
