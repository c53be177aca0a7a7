//! Builder for [`FemtoScribeHandler`](crate::scribe_handler::FemtoScribeHandler).
//!
//! Exposes transport selection, TLS configuration, the category prefix, the
//! format template, queue sizing, timeouts and the connection retry budget.
//! Every value is validated before the delivery thread is started.

use std::{path::PathBuf, time::Duration};

use crate::{
    formatter::FormatTemplate,
    scribe_handler::{
        FemtoScribeHandler, ScribeHandlerConfig, SocketTransport, TcpTransport, TlsOptions,
        UnixTransport,
    },
};

use super::{HandlerBuildError, HandlerBuilderTrait};

#[derive(Clone, Debug)]
enum TransportConfig {
    Tcp { host: String, port: u16 },
    Address(String),
    Unix { path: PathBuf },
}

#[derive(Clone, Debug, Default)]
struct TlsConfig {
    domain: Option<String>,
    insecure: bool,
}

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(HandlerBuildError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for constructing [`FemtoScribeHandler`] instances.
#[derive(Clone, Debug, Default)]
pub struct ScribeHandlerBuilder {
    category: Option<String>,
    format: Option<String>,
    capacity: Option<usize>,
    connect_attempts: Option<u32>,
    retry_delay_ms: Option<u64>,
    connect_timeout_ms: Option<u64>,
    io_timeout_ms: Option<u64>,
    max_frame_size: Option<usize>,
    transport: Option<TransportConfig>,
    tls: Option<TlsConfig>,
}

impl ScribeHandlerBuilder {
    /// Create a new builder with no transport configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the builder to use TCP.
    pub fn with_tcp(mut self, host: impl Into<String>, port: u16) -> Self {
        self.transport = Some(TransportConfig::Tcp {
            host: host.into(),
            port,
        });
        self
    }

    /// Configure TCP from a `host:port` address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.transport = Some(TransportConfig::Address(address.into()));
        self
    }

    /// Configure the builder to use a Unix domain socket.
    pub fn with_unix_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.transport = Some(TransportConfig::Unix { path: path.into() });
        self
    }

    /// Configure TLS using the provided domain and validation policy.
    ///
    /// Without a domain the TCP host name is presented.
    pub fn with_tls(mut self, domain: Option<String>, insecure: bool) -> Self {
        self.tls = Some(TlsConfig { domain, insecure });
        self
    }

    option_setter!(
        #[doc = "Set the category prefix; records go to `<category>.<LEVEL>`."]
        with_category,
        category,
        String
    );
    option_setter!(
        #[doc = "Set the format template, e.g. `{level} @ {file}:{line}: {message}`."]
        with_format,
        format,
        String
    );
    option_setter!(
        #[doc = "Set the bounded queue capacity."]
        with_capacity,
        capacity,
        usize
    );
    option_setter!(
        #[doc = "Set the number of dial attempts per connection."]
        with_connect_attempts,
        connect_attempts,
        u32
    );
    option_setter!(with_retry_delay_ms, retry_delay_ms, u64);
    option_setter!(with_connect_timeout_ms, connect_timeout_ms, u64);
    option_setter!(with_io_timeout_ms, io_timeout_ms, u64);
    option_setter!(with_max_frame_size, max_frame_size, usize);

    fn validate(&self) -> Result<(), HandlerBuildError> {
        self.validate_transport()?;
        self.validate_category()?;
        self.validate_sizes()?;
        self.validate_timeouts()?;
        Ok(())
    }

    fn validate_transport(&self) -> Result<(), HandlerBuildError> {
        match &self.transport {
            None => Err(HandlerBuildError::InvalidConfig(
                "scribe handler requires a transport".into(),
            )),
            Some(TransportConfig::Unix { .. }) if self.tls.is_some() => Err(
                HandlerBuildError::InvalidConfig("tls is only supported for tcp transports".into()),
            ),
            _ => Ok(()),
        }
    }

    fn validate_category(&self) -> Result<(), HandlerBuildError> {
        match &self.category {
            Some(category) if category.trim().is_empty() => Err(HandlerBuildError::InvalidConfig(
                "category must not be empty".into(),
            )),
            _ => Ok(()),
        }
    }

    fn validate_sizes(&self) -> Result<(), HandlerBuildError> {
        if let Some(capacity) = self.capacity {
            ensure_positive!(capacity, "capacity")?;
        }
        if let Some(attempts) = self.connect_attempts {
            ensure_positive!(attempts, "connect_attempts")?;
        }
        if let Some(size) = self.max_frame_size {
            ensure_positive!(size, "max_frame_size")?;
        }
        Ok(())
    }

    fn validate_timeouts(&self) -> Result<(), HandlerBuildError> {
        if let Some(timeout) = self.connect_timeout_ms {
            ensure_positive!(timeout, "connect_timeout_ms")?;
        }
        if let Some(timeout) = self.io_timeout_ms {
            ensure_positive!(timeout, "io_timeout_ms")?;
        }
        Ok(())
    }

    fn build_config(&self) -> Result<ScribeHandlerConfig, HandlerBuildError> {
        self.validate()?;
        let mut config = ScribeHandlerConfig::default();
        self.apply_optional_fields(&mut config)?;
        if let Some(ref transport) = self.transport {
            config.transport = self.build_transport_config(transport)?;
        }
        Ok(config)
    }

    fn apply_optional_fields(
        &self,
        config: &mut ScribeHandlerConfig,
    ) -> Result<(), HandlerBuildError> {
        if let Some(category) = &self.category {
            config.category = category.trim().to_owned();
        }
        if let Some(format) = &self.format {
            config.template = FormatTemplate::parse(format)
                .map_err(|err| HandlerBuildError::InvalidConfig(format!("format: {err}")))?;
        }
        if let Some(capacity) = self.capacity {
            config.shipper.capacity = capacity;
        }
        if let Some(attempts) = self.connect_attempts {
            config.retry.attempts = attempts;
        }
        if let Some(delay) = self.retry_delay_ms {
            config.retry.delay = Duration::from_millis(delay);
        }
        if let Some(timeout) = self.connect_timeout_ms {
            config.connect_timeout = Duration::from_millis(timeout);
        }
        if let Some(timeout) = self.io_timeout_ms {
            config.io_timeout = Duration::from_millis(timeout);
            config.shipper.flush_timeout = config.io_timeout;
        }
        if let Some(size) = self.max_frame_size {
            config.max_frame_size = size;
        }
        Ok(())
    }

    fn build_transport_config(
        &self,
        transport: &TransportConfig,
    ) -> Result<SocketTransport, HandlerBuildError> {
        match transport {
            TransportConfig::Tcp { host, port } => {
                if host.trim().is_empty() {
                    return Err(HandlerBuildError::InvalidConfig(
                        "tcp host must not be empty".into(),
                    ));
                }
                Ok(SocketTransport::Tcp(TcpTransport {
                    host: host.clone(),
                    port: *port,
                    tls: self.build_tls_options(host),
                }))
            }
            TransportConfig::Address(address) => match SocketTransport::parse_address(address) {
                Some(SocketTransport::Tcp(mut tcp)) => {
                    tcp.tls = self.build_tls_options(&tcp.host);
                    Ok(SocketTransport::Tcp(tcp))
                }
                _ => Err(HandlerBuildError::InvalidConfig(format!(
                    "address must be host:port, got {address:?}"
                ))),
            },
            TransportConfig::Unix { path } => {
                Ok(SocketTransport::Unix(UnixTransport { path: path.clone() }))
            }
        }
    }

    fn build_tls_options(&self, host: &str) -> Option<TlsOptions> {
        self.tls.as_ref().map(|tls_cfg| {
            let domain = tls_cfg
                .domain
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| host.to_owned());
            TlsOptions {
                domain,
                insecure_skip_verify: tls_cfg.insecure,
            }
        })
    }
}

impl HandlerBuilderTrait for ScribeHandlerBuilder {
    type Handler = FemtoScribeHandler;

    fn build_inner(&self) -> Result<Self::Handler, HandlerBuildError> {
        let config = self.build_config()?;
        FemtoScribeHandler::with_config(config)
    }
}
