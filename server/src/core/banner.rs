//! Startup banner and URL display

use super::config::{DatabaseBackend, is_all_interfaces};
use super::constants::{API_PREFIX, APP_NAME};

/// Print the startup banner with URLs
pub fn print_banner(host: &str, port: u16, backend: DatabaseBackend, operations: usize) {
    // Use localhost for display when binding to all interfaces
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };
    const W: usize = 12;

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m http://{}:{}{}/operations",
        "Operations:", display_host, port, API_PREFIX
    );
    println!(
        "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m http://{}:{}/api/docs",
        "API docs:", display_host, port
    );

    if host == "127.0.0.1" || host == "localhost" {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    }
    println!(
        "  \x1b[90m➜  {:<W$} {} ({} operations)\x1b[0m",
        "Database:", backend, operations
    );
    println!();
}

/// Hide the password component of a connection URL
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((userinfo, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match userinfo.split_once(':') {
        Some((user, _)) => format!("{}://{}:***@{}", scheme, user, host),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_url_hides_password() {
        assert_eq!(
            redact_url("postgres://app:s3cret@db:5432/main"),
            "postgres://app:***@db:5432/main"
        );
    }

    #[test]
    fn test_redact_url_leaves_other_urls() {
        assert_eq!(redact_url("sqlite://sqlgate.db"), "sqlite://sqlgate.db");
        assert_eq!(redact_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            redact_url("postgres://app@db/main"),
            "postgres://app@db/main"
        );
    }
}
