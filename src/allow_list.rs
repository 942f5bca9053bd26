use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// Project `input` onto `allowed_keys`, silently dropping every other field.
///
/// Keys whose value is JSON `null` are dropped as well, so an explicit null
/// never clears a column.
pub fn pick_allowed_fields(input: Value, allowed_keys: &[&str]) -> AppResult<Map<String, Value>> {
    let Value::Object(map) = input else {
        return Err(AppError::bad_request("Request body must be a JSON object"));
    };

    Ok(map
        .into_iter()
        .filter(|(key, value)| allowed_keys.contains(&key.as_str()) && !value.is_null())
        .collect())
}

/// Apply the allow-list and deserialize what is left into a typed patch.
pub fn parse_patch<T: DeserializeOwned>(input: Value, allowed_keys: &[&str]) -> AppResult<T> {
    let picked = pick_allowed_fields(input, allowed_keys)?;
    serde_json::from_value(Value::Object(picked))
        .map_err(|e| AppError::bad_request(format!("Invalid update: {e}")))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Patch {
        order_status: Option<String>,
        shipping_address: Option<String>,
    }

    #[test]
    fn drops_fields_outside_the_allow_list() {
        let picked = pick_allowed_fields(
            json!({ "orderStatus": "shipped", "isAdmin": true, "totalPrice": 1 }),
            &["orderStatus", "shippingAddress"],
        )
        .unwrap();

        assert_eq!(picked.len(), 1);
        assert_eq!(picked["orderStatus"], "shipped");
        assert!(!picked.contains_key("isAdmin"));
    }

    #[test]
    fn drops_null_values() {
        let picked =
            pick_allowed_fields(json!({ "shippingAddress": null }), &["shippingAddress"]).unwrap();
        assert!(picked.is_empty());
    }

    #[test]
    fn rejects_non_object_bodies() {
        let err = pick_allowed_fields(json!([1, 2, 3]), &["orderStatus"]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn parses_into_typed_patch() {
        let patch: Patch = parse_patch(
            json!({ "shippingAddress": "Main street 1", "isAdmin": true }),
            &["orderStatus", "shippingAddress"],
        )
        .unwrap();

        assert_eq!(patch.order_status, None);
        assert_eq!(patch.shipping_address.as_deref(), Some("Main street 1"));
    }
}
