//! Typed views over [`crate::types::Response`] payloads.
//!
//! With the `tracing` feature, fields a target type does not capture are logged so that
//! additions to the TikTok payloads show up without breaking deserialization.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize JSON, logging unknown fields and the failing path when the `tracing` feature
/// is enabled.
#[cfg(feature = "tracing")]
pub fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> crate::Result<T> {
    use std::any::type_name;

    let type_name = type_name::<T>();
    let original = value.clone();
    let mut unknown_paths: Vec<String> = Vec::new();

    let result: T = serde_ignored::deserialize(value, |path| {
        unknown_paths.push(path.to_string());
    })
    .inspect_err(|_| {
        if let Err(path_err) = serde_path_to_error::deserialize::<_, T>(original.clone()) {
            let path = path_err.path().to_string();
            tracing::error!(
                type_name = %type_name,
                path = %path,
                value = %describe(&original, &path),
                error = %path_err.inner(),
                "deserialization failed"
            );
        }
    })?;

    for path in unknown_paths {
        tracing::warn!(
            type_name = %type_name,
            field = %path,
            value = %describe(&original, &path),
            "unknown field in API response"
        );
    }

    Ok(result)
}

/// Pass-through deserialization when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> crate::Result<T> {
    Ok(serde_json::from_value(value)?)
}

/// Turns a `serde_ignored` / `serde_path_to_error` path such as `list[2].meta_data.lead_id`
/// or `scope.?` into a JSON pointer.
#[cfg(feature = "tracing")]
fn to_pointer(path: &str) -> String {
    path.split(['.', '[', ']'])
        .filter(|segment| !segment.is_empty() && *segment != "?")
        .fold(String::new(), |mut pointer, segment| {
            pointer.push('/');
            pointer.push_str(&segment.replace('~', "~0").replace('/', "~1"));
            pointer
        })
}

#[cfg(feature = "tracing")]
fn describe(value: &Value, path: &str) -> String {
    value
        .pointer(&to_pointer(path))
        .map_or_else(|| "<unable to retrieve>".to_owned(), Value::to_string)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::deserialize_with_warnings;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Page {
        page_id: String,
        #[serde(default)]
        title: Option<String>,
    }

    #[test]
    fn known_fields_should_deserialize() {
        let json = serde_json::json!({"page_id": "77", "title": "Spring promo"});

        let page: Page = deserialize_with_warnings(json).expect("deserialization failed");

        assert_eq!(page.page_id, "77");
        assert_eq!(page.title.as_deref(), Some("Spring promo"));
    }

    #[test]
    fn unknown_fields_should_not_fail() {
        let json = serde_json::json!({"page_id": "77", "status": "ACTIVE", "create_time": 1});

        let page: Page = deserialize_with_warnings(json).expect("deserialization failed");

        assert_eq!(page.title, None);
    }

    #[test]
    fn missing_required_field_should_fail() {
        let json = serde_json::json!({"title": "Spring promo"});

        let result: crate::Result<Page> = deserialize_with_warnings(json);

        let Err(err) = result else {
            panic!("page_id is required");
        };
        assert_eq!(err.kind(), crate::error::Kind::Internal);
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn paths_should_become_pointers() {
        assert_eq!(
            super::to_pointer("list[2].meta_data.lead_id"),
            "/list/2/meta_data/lead_id"
        );
        assert_eq!(super::to_pointer("scope.?"), "/scope");
        assert_eq!(super::to_pointer(""), "");
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn describe_should_render_value_or_placeholder() {
        let json = serde_json::json!({"list": [{"page_id": "1"}]});

        assert_eq!(super::describe(&json, "list[0].page_id"), "\"1\"");
        assert_eq!(super::describe(&json, "list[3]"), "<unable to retrieve>");
    }
}
