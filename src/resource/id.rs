//! Typed resource identifiers
//!
//! Each resource kind gets its own newtype over the gateway's opaque id
//! string, so a `GrantId` can never be passed where a `ConsentId` is expected.
//! On the wire they are bare strings.

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

resource_id!(
    /// Identifier of an [`crate::models::Identity`]
    IdentityId
);
resource_id!(
    /// Identifier of an [`crate::models::App`]
    AppId
);
resource_id!(
    /// Identifier of an app [`crate::models::Client`]
    ClientId
);
resource_id!(
    /// Identifier of a [`crate::models::Consent`]
    ConsentId
);
resource_id!(
    /// Identifier of a [`crate::models::Grant`]
    GrantId
);
resource_id!(
    /// Identifier of a [`crate::models::Dataset`]
    DatasetId
);
resource_id!(
    /// Identifier of a compute [`crate::models::Job`]
    JobId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_bare_strings() {
        let id = AppId::new("app_123");
        assert_eq!(serde_json::to_value(&id).unwrap(), serde_json::json!("app_123"));

        let parsed: DatasetId = serde_json::from_value(serde_json::json!("ds_9")).unwrap();
        assert_eq!(parsed.as_str(), "ds_9");
        assert_eq!(parsed.to_string(), "ds_9");
    }
}
