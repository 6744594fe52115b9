use serde::{Deserialize, Deserializer, Serialize};

/// Upload `action`: how the remote service treats rows for unknown sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionMode {
    /// Create missing candidates and sessions while uploading.
    CreateSessions,
}

impl SessionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateSessions => "CREATE_SESSIONS",
        }
    }
}

/// Upload response as returned by the remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUploadResponse {
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: UploadMessage,
    #[serde(default, rename = "idMapping", alias = "id_mapping")]
    pub id_mapping: Option<Vec<IdMapping>>,
}

/// The `message` field is either free text or a list of error objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadMessage {
    Text(String),
    Errors(Vec<RemoteErrorObject>),
}

impl Default for UploadMessage {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// One structured error reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteErrorObject {
    pub message: String,
}

/// A subject created on upload: external study id mapped to the internal id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdMapping {
    #[serde(
        rename = "ExtStudyID",
        alias = "external_id",
        deserialize_with = "string_or_number"
    )]
    pub external_id: String,
    #[serde(
        rename = "CandID",
        alias = "internal_id",
        deserialize_with = "string_or_number"
    )]
    pub internal_id: String,
}

/// Identifiers arrive quoted or bare depending on the server version.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Unsigned(u64),
    Signed(i64),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(value) => value,
        StringOrNumber::Unsigned(value) => value.to_string(),
        StringOrNumber::Signed(value) => value.to_string(),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Interpreted upload outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadResult {
    pub success: bool,
    pub rows_saved: u64,
    pub rows_skipped: u64,
    /// Whether `rows_saved`/`rows_skipped` came from a recognised message.
    pub counts_reported: bool,
    pub created: Vec<IdMapping>,
    pub errors: Vec<String>,
    /// Raw message text, surfaced verbatim when counts are not reported.
    pub message: String,
}
