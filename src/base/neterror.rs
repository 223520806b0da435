use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum NetError {
    // Connection Errors
    #[error("Connection closed (TCP FIN)")]
    ConnectionClosed,
    #[error("Connection reset (TCP RST)")]
    ConnectionReset,
    #[error("Connection refused")]
    ConnectionRefused,
    #[error("Connection aborted")]
    ConnectionAborted,
    #[error("Connection failed")]
    ConnectionFailed,
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("Internet disconnected")]
    InternetDisconnected,
    #[error("SSL protocol error")]
    SslProtocolError,
    #[error("Connection timed out")]
    ConnectionTimedOut,

    // HTTP Errors
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Unknown URL scheme")]
    UnknownUrlScheme,
    #[error("Method not supported")]
    MethodNotSupported,
    #[error("Content decoding failed")]
    ContentDecodingFailed,
    #[error("Invalid header")]
    InvalidHeader,

    // Engine errors (custom codes starting at -1000)
    #[error("Failed to read response body")]
    HttpBodyError,
    #[error("Query string serialization failed")]
    QuerySerialization,
    #[error("Transport handle used in the wrong state")]
    InvalidState,
    #[error("No async runtime available")]
    NoRuntime,
    #[error("Cache store error: {0}")]
    CacheStore(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown error: {0}")]
    Unknown(i32),
}

impl NetError {
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::ConnectionClosed => -100,
            NetError::ConnectionReset => -101,
            NetError::ConnectionRefused => -102,
            NetError::ConnectionAborted => -103,
            NetError::ConnectionFailed => -104,
            NetError::NameNotResolved => -105,
            NetError::InternetDisconnected => -106,
            NetError::SslProtocolError => -107,
            NetError::ConnectionTimedOut => -118,

            NetError::InvalidUrl => -300,
            NetError::UnknownUrlScheme => -302,
            NetError::MethodNotSupported => -322,
            NetError::ContentDecodingFailed => -330,
            NetError::InvalidHeader => -1005,

            NetError::HttpBodyError => -1000,
            NetError::QuerySerialization => -1001,
            NetError::InvalidState => -1002,
            NetError::NoRuntime => -1003,
            NetError::CacheStore(_) => -1004,
            NetError::InvalidConfig(_) => -1006,
            NetError::Unknown(code) => *code,
        }
    }
}

impl From<i32> for NetError {
    fn from(code: i32) -> Self {
        match code {
            -100 => NetError::ConnectionClosed,
            -101 => NetError::ConnectionReset,
            -102 => NetError::ConnectionRefused,
            -103 => NetError::ConnectionAborted,
            -104 => NetError::ConnectionFailed,
            -105 => NetError::NameNotResolved,
            -106 => NetError::InternetDisconnected,
            -107 => NetError::SslProtocolError,
            -118 => NetError::ConnectionTimedOut,

            -300 => NetError::InvalidUrl,
            -302 => NetError::UnknownUrlScheme,
            -322 => NetError::MethodNotSupported,
            -330 => NetError::ContentDecodingFailed,

            -1000 => NetError::HttpBodyError,
            -1001 => NetError::QuerySerialization,
            -1002 => NetError::InvalidState,
            -1003 => NetError::NoRuntime,
            -1005 => NetError::InvalidHeader,
            _ => NetError::Unknown(code),
        }
    }
}

// Conversion from rusqlite errors
impl From<rusqlite::Error> for NetError {
    fn from(err: rusqlite::Error) -> Self {
        NetError::CacheStore(err.to_string())
    }
}
