use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    // DIVVY_BIND / DIVVY_PORT; unset keeps the default.
    pub fn from_env() -> Result<Self, String> {
        Self::from_values(
            std::env::var("DIVVY_BIND").ok(),
            std::env::var("DIVVY_PORT").ok(),
        )
    }

    fn from_values(bind: Option<String>, port: Option<String>) -> Result<Self, String> {
        let mut config = Self::default();
        if let Some(raw) = bind {
            config.bind = raw
                .trim()
                .parse()
                .map_err(|e| format!("DIVVY_BIND must be an IP address ({e}): {raw}"))?;
        }
        if let Some(raw) = port {
            config.port = raw
                .trim()
                .parse()
                .map_err(|e| format!("DIVVY_PORT must be a port number ({e}): {raw}"))?;
        }
        Ok(config)
    }

    pub fn with_overrides(mut self, bind: Option<IpAddr>, port: Option<u16>) -> Self {
        if let Some(bind) = bind {
            self.bind = bind;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}
