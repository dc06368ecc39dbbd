// JSON body for requests rejected before a session starts.

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
