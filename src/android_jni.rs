//! JNI bindings for the Android app.
//!
//! Each public function here corresponds to an `external fun` declaration
//! in RustBridge.kt. The function names follow JNI naming conventions:
//! Java_<package>_<class>_<method> with dots replaced by underscores.
//!
//! Session handles are raw `Box` pointers owned by the Kotlin side;
//! every handle returned by `sessionNew` must be released with
//! `sessionFree`. Directives and snapshots cross the boundary as JSON.

use jni::objects::{JClass, JString};
use jni::sys::{jdouble, jlong, jstring};
use jni::JNIEnv;

use crate::geo::GeoPoint;
use crate::i18n::Language;
use crate::location::{Fix, LocationError};
use crate::route;
use crate::session::NavSession;

/// Returns the rust-core library version.
/// Maps to: RustBridge.version() -> String
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_lonetree_app_RustBridge_version(
    mut env: JNIEnv,
    _class: JClass,
) -> jstring {
    let version = crate::VERSION;
    env.new_string(version)
        .expect("failed to create Java string")
        .into_raw()
}

/// Routes `log` output to logcat under the "lonetree-core" tag.
/// Safe to call more than once.
/// Maps to: RustBridge.initLogging()
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_lonetree_app_RustBridge_initLogging(
    _env: JNIEnv,
    _class: JClass,
) {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Debug)
            .with_tag("lonetree-core"),
    );
}

/// Creates a navigation session for the given language tag.
/// Maps to: RustBridge.sessionNew(lang: String) -> Long
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_lonetree_app_RustBridge_sessionNew(
    mut env: JNIEnv,
    _class: JClass,
    lang: JString,
) -> jlong {
    let tag: String = env.get_string(&lang).map(Into::into).unwrap_or_default();
    let session = NavSession::new(Language::from_tag(&tag));
    Box::into_raw(Box::new(session)) as jlong
}

/// Releases a session created by `sessionNew`.
/// Maps to: RustBridge.sessionFree(handle: Long)
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_lonetree_app_RustBridge_sessionFree(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) {
    if handle != 0 {
        drop(unsafe { Box::from_raw(handle as *mut NavSession) });
    }
}

/// Starts (or refreshes) navigation.
/// Maps to: RustBridge.sessionStart(handle: Long) -> String (directive JSON)
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_lonetree_app_RustBridge_sessionStart(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jstring {
    match session_mut(handle) {
        Some(session) => to_json_jstring(&mut env, &session.start()),
        None => std::ptr::null_mut(),
    }
}

/// Reports that the poll timer fired.
/// Maps to: RustBridge.sessionPollDue(handle: Long) -> String (directive JSON)
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_lonetree_app_RustBridge_sessionPollDue(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jstring {
    match session_mut(handle) {
        Some(session) => to_json_jstring(&mut env, &session.poll_due()),
        None => std::ptr::null_mut(),
    }
}

/// Reports a completed location request. A negative accuracy means the
/// platform did not provide one.
/// Maps to: RustBridge.sessionReportFix(handle, requestId, lat, lng,
///          accuracyM, timestampMs) -> String (directive JSON)
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_lonetree_app_RustBridge_sessionReportFix(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
    request_id: jlong,
    lat: jdouble,
    lng: jdouble,
    accuracy_m: jdouble,
    timestamp_ms: jlong,
) -> jstring {
    let Some(session) = session_mut(handle) else {
        return std::ptr::null_mut();
    };
    let fix = Fix {
        point: GeoPoint::new(lat, lng),
        accuracy_m: (accuracy_m >= 0.0).then_some(accuracy_m),
        timestamp_ms: timestamp_ms.max(0) as u64,
    };
    to_json_jstring(&mut env, &session.report_fix(request_id as u64, fix))
}

/// Reports a failed location request. `kind` is one of the stable
/// error identifiers ("unsupported", "permission_denied", ...).
/// Maps to: RustBridge.sessionReportError(handle, requestId, kind)
///          -> String (directive JSON)
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_lonetree_app_RustBridge_sessionReportError(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
    request_id: jlong,
    kind: JString,
) -> jstring {
    let Some(session) = session_mut(handle) else {
        return std::ptr::null_mut();
    };
    let kind: String = env.get_string(&kind).map(Into::into).unwrap_or_default();
    let error = LocationError::from_kind(&kind);
    to_json_jstring(&mut env, &session.report_error(request_id as u64, error))
}

/// Stops navigation and cancels the pending poll.
/// Maps to: RustBridge.sessionStop(handle: Long) -> String (directive JSON)
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_lonetree_app_RustBridge_sessionStop(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jstring {
    match session_mut(handle) {
        Some(session) => to_json_jstring(&mut env, &session.stop()),
        None => std::ptr::null_mut(),
    }
}

/// Current session view for the renderer.
/// Maps to: RustBridge.sessionSnapshot(handle: Long) -> String (JSON)
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_lonetree_app_RustBridge_sessionSnapshot(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jstring {
    match session_mut(handle) {
        Some(session) => to_json_jstring(&mut env, &session.snapshot()),
        None => std::ptr::null_mut(),
    }
}

/// Builds the walking path from a directions response, falling back to
/// the straight line between the endpoints when the body is unusable.
/// The returned JSON carries a localized warning when the fallback was
/// taken.
/// Maps to: RustBridge.walkingRoute(body, lang, fromLat, fromLng,
///          toLat, toLng) -> String (route JSON)
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_lonetree_app_RustBridge_walkingRoute(
    mut env: JNIEnv,
    _class: JClass,
    body: JString,
    lang: JString,
    from_lat: jdouble,
    from_lng: jdouble,
    to_lat: jdouble,
    to_lng: jdouble,
) -> jstring {
    let body: String = env.get_string(&body).map(Into::into).unwrap_or_default();
    let tag: String = env.get_string(&lang).map(Into::into).unwrap_or_default();
    let from = GeoPoint::new(from_lat, from_lng);
    let to = GeoPoint::new(to_lat, to_lng);
    let outcome = route::walking_route(&body, &from, &to, Language::from_tag(&tag));
    to_json_jstring(&mut env, &outcome)
}

fn session_mut<'a>(handle: jlong) -> Option<&'a mut NavSession> {
    if handle == 0 {
        None
    } else {
        Some(unsafe { &mut *(handle as *mut NavSession) })
    }
}

fn to_json_jstring<T: serde::Serialize>(env: &mut JNIEnv, value: &T) -> jstring {
    let json = serde_json::to_string(value).expect("failed to serialize to JSON");
    env.new_string(json)
        .expect("failed to create Java string")
        .into_raw()
}
