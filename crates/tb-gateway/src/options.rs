//! Gateway construction options

use base64::prelude::*;

/// Basic-auth credential guarding the gateway route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub user: String,
    pub pass: String,
}

impl Credential {
    /// The exact `Authorization` header value a client must present
    pub fn authorization_value(&self) -> String {
        let encoded = BASE64_STANDARD.encode(format!("{}:{}", self.user, self.pass));
        format!("Basic {}", encoded)
    }
}

/// Options for the terminal gateway
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Bind address
    pub address: String,

    /// Bind port
    pub port: u16,

    /// Route path the WebSocket is served on (e.g. `/alice`)
    pub path: String,

    /// Whether clients may write to the terminal
    pub permit_write: bool,

    /// Basic-auth credential; `None` disables authentication
    pub credential: Option<Credential>,

    /// Shell command to spawn per connection
    pub command: String,

    /// Arguments for the shell command
    pub args: Vec<String>,
}

impl GatewayOptions {
    /// `host:port` the gateway binds
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_value_is_standard_basic_auth() {
        let cred = Credential {
            user: "alice".to_string(),
            pass: "secret".to_string(),
        };
        // base64("alice:secret")
        assert_eq!(cred.authorization_value(), "Basic YWxpY2U6c2VjcmV0");
    }

    #[test]
    fn bind_addr_joins_address_and_port() {
        let options = GatewayOptions {
            address: "127.0.0.1".to_string(),
            port: 8080,
            path: "/alice".to_string(),
            permit_write: true,
            credential: None,
            command: "sh".to_string(),
            args: vec![],
        };
        assert_eq!(options.bind_addr(), "127.0.0.1:8080");
    }
}
