//! Records returned by the API.
//!
//! Field names are PascalCase on the wire. Every field falls back to its
//! default when absent or `null`, so truncated breach lists (name only) and
//! sparse records still decode.

use serde::{Deserialize, Deserializer, Serialize};

/// A breach as described by the `breaches`, `breach/{name}` and
/// `breachedaccount/{email}` endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Breach {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub domain: String,
    /// Date the breach happened, `YYYY-MM-DD`.
    #[serde(deserialize_with = "null_as_default")]
    pub breach_date: String,
    /// RFC 3339 timestamp of when the breach was loaded.
    #[serde(deserialize_with = "null_as_default")]
    pub added_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub modified_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub pwn_count: u64,
    /// HTML fragment.
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub logo_path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub data_classes: DataClasses,
    #[serde(deserialize_with = "null_as_default")]
    pub is_verified: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_fabricated: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_sensitive: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_retired: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_spam_list: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_malware: bool,
}

/// A paste containing the queried account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Paste {
    /// Paste service, e.g. `Pastebin`.
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    pub title: Option<String>,
    pub date: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub email_count: u64,
}

/// Data class labels, e.g. `"Email addresses"`.
pub type DataClasses = Vec<String>;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breach_decodes_full_record() {
        let json = r#"{
            "Name": "Adobe",
            "Title": "Adobe",
            "Domain": "adobe.com",
            "BreachDate": "2013-10-04",
            "AddedDate": "2013-12-04T00:00:00Z",
            "ModifiedDate": "2022-05-15T23:52:49Z",
            "PwnCount": 152445165,
            "Description": "In October 2013...",
            "LogoPath": "https://haveibeenpwned.com/Content/Images/PwnedLogos/Adobe.png",
            "DataClasses": ["Email addresses", "Password hints"],
            "IsVerified": true,
            "IsFabricated": false,
            "IsSensitive": false,
            "IsRetired": false,
            "IsSpamList": false,
            "IsMalware": false
        }"#;
        let breach: Breach = serde_json::from_str(json).unwrap();
        assert_eq!(breach.domain, "adobe.com");
        assert_eq!(breach.pwn_count, 152_445_165);
        assert_eq!(breach.data_classes, vec!["Email addresses", "Password hints"]);
        assert!(breach.is_verified);
    }

    #[test]
    fn breach_tolerates_null_fields() {
        let json = r#"{
            "Name": "Sparse",
            "Domain": null,
            "Description": null,
            "LogoPath": null,
            "PwnCount": null,
            "DataClasses": null,
            "IsVerified": null
        }"#;
        let breach: Breach = serde_json::from_str(json).unwrap();
        assert_eq!(breach.name, "Sparse");
        assert_eq!(breach.domain, "");
        assert_eq!(breach.description, "");
        assert_eq!(breach.pwn_count, 0);
        assert!(breach.data_classes.is_empty());
        assert!(!breach.is_verified);
    }

    #[test]
    fn paste_accepts_null_title_and_date() {
        let json = r#"{"Source":"Pastebin","Id":"8Q0BvKD8","Title":null,"Date":null,"EmailCount":139}"#;
        let paste: Paste = serde_json::from_str(json).unwrap();
        assert_eq!(paste.source, "Pastebin");
        assert_eq!(paste.title, None);
        assert_eq!(paste.email_count, 139);

        let paste: Paste = serde_json::from_str(r#"{"Source":null,"Id":"x","EmailCount":null}"#).unwrap();
        assert_eq!(paste.source, "");
        assert_eq!(paste.email_count, 0);
    }
}
