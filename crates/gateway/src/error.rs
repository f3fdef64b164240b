#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never produced a response (network, CORS, DNS).
    Transport(String),
    /// The gateway answered with a non-success status.
    Status { status: u16, body: String },
    /// The response body did not match the expected records.
    Decode(String),
    /// An insert succeeded but returned no row.
    EmptyInsert,
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::Transport(msg) => write!(f, "gateway unreachable: {msg}"),
            GatewayError::Status { status, body } => {
                write!(f, "gateway returned status {status}: {body}")
            }
            GatewayError::Decode(msg) => write!(f, "unexpected gateway response: {msg}"),
            GatewayError::EmptyInsert => write!(f, "insert returned no record"),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}
