use serde::{Deserialize, Serialize};

/// Uniform response envelope: `{data, meta: {total, page, limit}, message}`.
/// `meta` is present only for paginated collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PaginationMeta>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            meta: None,
            message: message.into(),
        }
    }

    pub fn paginated(data: T, total: i64, page: i64, limit: i64, message: impl Into<String>) -> Self {
        Self {
            data,
            meta: Some(PaginationMeta { total, page, limit }),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paginated_envelope_shape() {
        let resp = ApiResponse::paginated(vec![1, 2, 3], 12, 2, 3, "retrieved");
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            value,
            json!({
                "data": [1, 2, 3],
                "meta": {"total": 12, "page": 2, "limit": 3},
                "message": "retrieved"
            })
        );
    }

    #[test]
    fn plain_envelope_omits_meta() {
        let resp = ApiResponse::ok(json!({"id": 1}), "done");
        let value = serde_json::to_value(&resp).unwrap();
        assert!(value.get("meta").is_none());
        assert_eq!(value["message"], "done");
    }
}
