//! Version command

/// Print the version, as `muster <semver>` or a one-field JSON object.
pub fn run(json: bool) {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    if json {
        println!(r#"{{"version":"{VERSION}"}}"#);
    } else {
        println!("muster {VERSION}");
    }
}
