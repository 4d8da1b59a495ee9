//! Host environment reporting.
//!
//! Fixed-shape, human-readable summaries of the machine, user, and build,
//! for logging and report headers. Everything here is best-effort: fields
//! that cannot be determined come back as empty strings rather than
//! errors.

use std::net::UdpSocket;

use chrono::{DateTime, Local};

/// Pattern for ISO 8601 timestamps without a zone offset.
const ISO8601_PATTERN: &str = "%Y-%m-%dT%H:%M:%S";

/// The machine's host name.
pub fn host_name() -> String {
    hostname::get()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The host's primary IP address.
///
/// Determined by the local route a UDP socket would take; no packets are
/// sent. Empty when no route is available.
pub fn host_address() -> String {
    fn resolve() -> std::io::Result<std::net::IpAddr> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.connect(("203.0.113.1", 9))?;
        Ok(socket.local_addr()?.ip())
    }
    resolve().map(|ip| ip.to_string()).unwrap_or_default()
}

/// Operating system name the crate was built for.
pub fn os_name() -> &'static str {
    std::env::consts::OS
}

/// CPU architecture the crate was built for.
pub fn os_arch() -> &'static str {
    std::env::consts::ARCH
}

/// Operating system family (`unix` or `windows`).
pub fn os_family() -> &'static str {
    std::env::consts::FAMILY
}

/// Name of the current user, from the conventional environment variables.
pub fn user_name() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default()
}

/// Home directory of the current user.
pub fn user_home() -> String {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_default()
}

/// The user's configured locale.
pub fn user_language() -> String {
    std::env::var("LC_ALL")
        .or_else(|_| std::env::var("LANG"))
        .unwrap_or_default()
}

/// One-line host summary.
pub fn host_summary() -> String {
    format!(
        "{{\"name\":\"{}\",\"arch\":\"{}\"}}",
        host_name(),
        os_arch()
    )
}

/// One-line build summary (the crate and target this binary was compiled
/// as).
pub fn build_summary() -> String {
    format!(
        "build [crate:{}, version:{}, target:{}/{}]",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        os_name(),
        os_arch()
    )
}

/// One-line user summary.
pub fn user_summary() -> String {
    format!(
        "user [name:{}, lang:{}, home:{}]",
        user_name(),
        user_language(),
        user_home()
    )
}

/// One-line operating system summary.
pub fn os_summary() -> String {
    format!(
        "os [name:{}, family:{}, arch:{}]",
        os_name(),
        os_family(),
        os_arch()
    )
}

/// Multi-line summary of the detected environment.
pub fn summary() -> String {
    format!(
        "{}\n{}\n{}\n{}",
        host_summary(),
        build_summary(),
        user_summary(),
        os_summary()
    )
}

/// Format a timestamp as ISO 8601 (`yyyy-MM-ddTHH:mm:ss`).
pub fn iso8601(ts: DateTime<Local>) -> String {
    ts.format(ISO8601_PATTERN).to_string()
}

/// The current local time as ISO 8601.
pub fn iso8601_now() -> String {
    iso8601(Local::now())
}

/// Whether the target OS is Windows.
pub fn is_windows() -> bool {
    cfg!(windows)
}

/// Whether the target OS is Unix-like.
pub fn is_unix() -> bool {
    cfg!(unix)
}

/// Whether the target OS is macOS.
pub fn is_macos() -> bool {
    cfg!(target_os = "macos")
}
