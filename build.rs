use std::env;
use time::OffsetDateTime;

fn main() {
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    println!("cargo:rerun-if-env-changed=PROFILE");

    let build_year = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|raw| raw.parse::<i64>().ok())
        .and_then(|epoch| OffsetDateTime::from_unix_timestamp(epoch).ok())
        .map(|dt| dt.year())
        .unwrap_or_else(|| OffsetDateTime::now_utc().year());

    let package_version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());

    // Debug builds carry a -dev suffix so field logs show which kind of binary produced them
    let display_version = match env::var("PROFILE").as_deref() {
        Ok("release") => package_version,
        _ => format!("{package_version}-dev"),
    };

    println!("cargo:rustc-env=APP_BUILD_YEAR={build_year}");
    println!("cargo:rustc-env=APP_VERSION_DISPLAY={display_version}");
}
