use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use clap::Parser;

#[derive(Clone, Debug, Parser)]
#[command(name = "todo-back", version, about = "In-memory TODO HTTP service")]
pub struct Config {
    #[arg(long, env = "TODO_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(long, env = "TODO_PORT", default_value_t = 8000)]
    pub port: u16,

    /// PEM certificate; serve HTTPS when given together with `--tls-key`.
    #[arg(long, env = "SSL_CERT", requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    #[arg(long, env = "SSL_KEY", requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,

    /// Seconds to let in-flight requests finish after a shutdown signal.
    #[arg(long, env = "TODO_SHUTDOWN_TIMEOUT", default_value_t = 10)]
    pub shutdown_timeout: u64,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn tls(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.tls_cert.as_ref().zip(self.tls_key.as_ref())
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["todo-back"]).unwrap();
        assert_eq!(config.port, 8000);
        assert!(config.tls().is_none());
    }

    #[test]
    fn tls_needs_both_files() {
        assert!(Config::try_parse_from(["todo-back", "--tls-cert", "cert.pem"]).is_err());

        let config = Config::try_parse_from([
            "todo-back",
            "--port",
            "7890",
            "--tls-cert",
            "cert.pem",
            "--tls-key",
            "key.pem",
        ])
        .unwrap();
        assert_eq!(config.addr().port(), 7890);
        assert!(config.tls().is_some());
    }
}
