//! Startup banner

use super::constants::APP_NAME;

/// Print the startup banner with reachable URLs
pub fn print_banner(host: &str, port: u16) {
    let version = env!("CARGO_PKG_VERSION");

    println!();
    println!("  {} v{}", APP_NAME, version);
    println!();
    println!("  Local:   http://{}:{}", display_host(host), port);

    // Binding a wildcard address also exposes the LAN address
    if (host == "0.0.0.0" || host == "::")
        && let Ok(ip) = local_ip_address::local_ip()
    {
        println!("  Network: http://{}:{}", ip, port);
    }
    println!();
}

fn display_host(host: &str) -> &str {
    match host {
        "0.0.0.0" | "::" => "localhost",
        other => other,
    }
}
