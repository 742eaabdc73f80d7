pub mod geo;
pub mod i18n;
pub mod location;
pub mod route;
pub mod session;

#[cfg(target_os = "android")]
pub mod android_jni;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
