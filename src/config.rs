//! Connection configuration: host, port, buffer sizing, and the
//! LITERAL+/TLS policy a given deployment wants.

/// How a connection's transport should be established for a given port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// TLS handshake immediately after the TCP connect (e.g. port 993).
    Implicit,
    /// Plain TCP, upgraded to TLS via the STARTTLS command once CAPABILITY is known.
    Starttls,
    /// No TLS at all. Only sensible for loopback/test servers.
    Plain,
}

impl TlsMode {
    /// The conventional default for a port: implicit TLS on 993, STARTTLS
    /// everywhere else. Not inferred silently by `Connection` itself --
    /// callers that want this must ask for it explicitly.
    pub fn default_for_port(port: u16) -> Self {
        match port {
            993 => TlsMode::Implicit,
            _ => TlsMode::Starttls,
        }
    }
}

/// Default size of the chunks `Connection` reads from its transport.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4096;

/// Configuration for one connection's transport and wire-level behavior.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub tls_mode: TlsMode,
    pub read_buffer_size: usize,
    /// Whether the caller wants to use RFC 2088 LITERAL+ once advertised.
    /// `Connection` only actually emits `{n+}` once CAPABILITY confirms the
    /// server supports it; see `Connection::set_literal_plus_supported`.
    pub support_literal_plus: bool,
}

impl ConnectionConfig {
    /// A config with the conventional TLS default for `port` and LITERAL+ disabled.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        ConnectionConfig {
            host: host.into(),
            port,
            tls_mode: TlsMode::default_for_port(port),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            support_literal_plus: false,
        }
    }

    pub fn with_tls_mode(mut self, mode: TlsMode) -> Self {
        self.tls_mode = mode;
        self
    }

    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    pub fn with_literal_plus(mut self, enabled: bool) -> Self {
        self.support_literal_plus = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tls_mode_is_implicit_on_993() {
        assert_eq!(TlsMode::default_for_port(993), TlsMode::Implicit);
    }

    #[test]
    fn default_tls_mode_is_starttls_elsewhere() {
        assert_eq!(TlsMode::default_for_port(143), TlsMode::Starttls);
        assert_eq!(TlsMode::default_for_port(1143), TlsMode::Starttls);
    }

    #[test]
    fn builder_overrides_apply() {
        let cfg = ConnectionConfig::new("mail.example.com", 993)
            .with_literal_plus(true)
            .with_read_buffer_size(8192);
        assert!(cfg.support_literal_plus);
        assert_eq!(cfg.read_buffer_size, 8192);
        assert_eq!(cfg.tls_mode, TlsMode::Implicit);
    }
}
