//! Navigation session state machine.
//!
//! Owns the policy of the way-finding loop: one location request on
//! start, a 10 second poll cadence while navigating, the 3 km guidance
//! range and the 0.05 km arrival threshold. The session performs no IO
//! of its own; each call returns a `Directive` the platform executes
//! (request a fix, schedule or cancel the poll timer), and completions
//! come back tagged with the request id they answer, so a late result
//! for a superseded request is discarded instead of overwriting a
//! newer one. At most one request is outstanding at a time.

use log::{debug, info, warn};
use serde::Serialize;

use crate::geo::{self, Compass, GeoPoint};
use crate::i18n::{self, Language};
use crate::location::{Fix, FixOptions, LocationError, LocationSource};

/// Poll interval while navigating, in milliseconds.
pub const POLL_INTERVAL_MS: u64 = 10_000;

/// The fixed landmark the app navigates to, with display metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Destination {
    pub point: GeoPoint,
    pub name: &'static str,
    pub address: &'static str,
}

impl Destination {
    /// The Lonely Tree in Olympic Park, Seoul.
    pub fn lonely_tree(language: Language) -> Self {
        Self {
            point: GeoPoint::new(37.522710, 127.120301),
            name: i18n::destination_name(language),
            address: i18n::destination_address(language),
        }
    }
}

/// Derived view of the latest fix relative to the destination.
///
/// Recomputed from scratch on every fix; never persisted. The renderer
/// is expected to suppress directional output while `within_range` is
/// false, but every field is populated either way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NavigationState {
    pub distance_km: f64,
    pub bearing_deg: f64,
    pub compass: Compass,
    pub within_range: bool,
    pub arrived: bool,
    pub walk_minutes: f64,
}

impl NavigationState {
    pub fn derive(fix: &Fix, destination: &Destination) -> Self {
        let distance_km = geo::distance_km(&fix.point, &destination.point);
        let bearing_deg = geo::bearing_deg(&fix.point, &destination.point);
        Self {
            distance_km,
            bearing_deg,
            compass: Compass::from_bearing(bearing_deg),
            within_range: distance_km <= geo::GUIDANCE_RANGE_KM,
            arrived: distance_km < geo::ARRIVAL_RANGE_KM,
            walk_minutes: geo::walk_minutes(distance_km),
        }
    }
}

/// Session phase. Arrival is a derived flag, not a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Navigating,
}

/// Condition recorded on the session after an unsuccessful round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Condition {
    /// The location request itself failed.
    Location(LocationError),
    /// The fix was fine but the user is beyond the guidance range.
    /// The distance is kept so it can still be reported.
    OutOfRange { distance_km: f64 },
}

impl Condition {
    /// Stable identifier used across the bridge.
    pub fn kind(&self) -> &'static str {
        match self {
            Condition::Location(error) => error.kind(),
            Condition::OutOfRange { .. } => "out_of_range",
        }
    }
}

/// What the platform must do after a session call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Directive {
    /// Ask the positioning collaborator for one fix and report the
    /// completion back under this id.
    RequestFix {
        request_id: u64,
        options: FixOptions,
    },
    /// Arrange a `poll_due` call after the delay.
    SchedulePoll { delay_ms: u64 },
    /// Drop the pending `SchedulePoll`, if any.
    CancelPoll,
    /// Nothing to do.
    None,
}

/// Read-only view published to the renderer.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub destination: Destination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<NavigationState>,
    /// Localized compass label for `state`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<&'static str>,
    /// Localized guidance sentence for `state`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<&'static str>,
    /// Display form of the remaining distance ("850m", "2.4km").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrived_message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// One navigation session: the explicit object that replaces any
/// process-wide singleton. Owned by whatever composes the UI.
#[derive(Debug)]
pub struct NavSession {
    destination: Destination,
    language: Language,
    options: FixOptions,
    phase: Phase,
    next_request: u64,
    pending: Option<u64>,
    last_fix: Option<Fix>,
    state: Option<NavigationState>,
    condition: Option<Condition>,
}

impl NavSession {
    /// Session navigating to the Lonely Tree.
    pub fn new(language: Language) -> Self {
        Self::with_destination(Destination::lonely_tree(language), language)
    }

    pub fn with_destination(destination: Destination, language: Language) -> Self {
        Self {
            destination,
            language,
            options: FixOptions::default(),
            phase: Phase::Idle,
            next_request: 0,
            pending: None,
            last_fix: None,
            state: None,
            condition: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn state(&self) -> Option<&NavigationState> {
        self.state.as_ref()
    }

    pub fn last_fix(&self) -> Option<&Fix> {
        self.last_fix.as_ref()
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// Begin (or refresh) navigation.
    ///
    /// Clears the recorded condition and issues one location request.
    /// If a request is already outstanding it is left to complete
    /// rather than duplicated.
    pub fn start(&mut self) -> Directive {
        self.condition = None;
        self.phase = Phase::Navigating;
        if self.pending.is_some() {
            debug!("start requested while a fix request is outstanding");
            return Directive::None;
        }
        info!("navigation started toward {}", self.destination.name);
        self.issue_request()
    }

    /// The poll timer fired.
    pub fn poll_due(&mut self) -> Directive {
        if self.phase != Phase::Navigating {
            // Stray timer after stop; the platform should have
            // cancelled it.
            return Directive::None;
        }
        if self.pending.is_some() {
            debug!("poll due while a fix request is outstanding, skipping");
            return Directive::None;
        }
        self.issue_request()
    }

    /// A location request completed with a fix.
    pub fn report_fix(&mut self, request_id: u64, fix: Fix) -> Directive {
        if !self.accept(request_id) {
            return Directive::None;
        }

        let state = NavigationState::derive(&fix, &self.destination);
        debug!(
            "fix applied: {:.4},{:.4} -> {:.3} km, head {} ({:.0}°)",
            fix.point.lat,
            fix.point.lng,
            state.distance_km,
            state.compass.abbrev(),
            state.bearing_deg
        );
        self.last_fix = Some(fix);
        self.state = Some(state);

        if !state.within_range {
            info!(
                "user is {:.1} km out, beyond the {} km guidance range",
                state.distance_km,
                geo::GUIDANCE_RANGE_KM
            );
            self.condition = Some(Condition::OutOfRange {
                distance_km: state.distance_km,
            });
            self.phase = Phase::Idle;
            return Directive::CancelPoll;
        }

        if state.arrived {
            info!(
                "arrived: {:.0} m from the destination",
                state.distance_km * 1000.0
            );
        }
        self.condition = None;
        Directive::SchedulePoll {
            delay_ms: POLL_INTERVAL_MS,
        }
    }

    /// A location request failed.
    ///
    /// No automatic retry: the session goes idle and stays there until
    /// the next explicit `start`, so a persistently denied permission
    /// cannot produce an error loop.
    pub fn report_error(&mut self, request_id: u64, error: LocationError) -> Directive {
        if !self.accept(request_id) {
            return Directive::None;
        }
        warn!("location request failed: {error}");
        self.condition = Some(Condition::Location(error));
        self.phase = Phase::Idle;
        Directive::CancelPoll
    }

    /// Tear the session down.
    ///
    /// The pending poll is cancelled and an in-flight request's
    /// eventual completion will be discarded by the request-id guard.
    pub fn stop(&mut self) -> Directive {
        self.phase = Phase::Idle;
        self.pending = None;
        Directive::CancelPoll
    }

    /// Drive the session synchronously against a location source,
    /// treating each scheduled poll as immediately due. Returns the
    /// number of requests made. This is the simulation entry point;
    /// on device the platform executes directives instead.
    pub fn run_with(&mut self, source: &mut dyn LocationSource, max_requests: usize) -> usize {
        let mut made = 0;
        let mut directive = self.start();
        while made < max_requests {
            match directive {
                Directive::RequestFix {
                    request_id,
                    options,
                } => {
                    made += 1;
                    directive = match source.request_fix(&options) {
                        Ok(fix) => self.report_fix(request_id, fix),
                        Err(error) => self.report_error(request_id, error),
                    };
                }
                Directive::SchedulePoll { .. } => directive = self.poll_due(),
                Directive::CancelPoll | Directive::None => break,
            }
        }
        made
    }

    /// Current view for the renderer.
    pub fn snapshot(&self) -> Snapshot {
        let (direction, guidance) = match &self.state {
            Some(state) => (
                Some(i18n::direction_label(self.language, state.compass)),
                Some(i18n::detailed_direction(self.language, state.bearing_deg)),
            ),
            None => (None, None),
        };
        Snapshot {
            phase: self.phase,
            destination: self.destination.clone(),
            fix: self.last_fix,
            state: self.state,
            direction,
            guidance,
            distance_text: self.state.map(|s| geo::format_distance(s.distance_km)),
            arrived_message: self
                .state
                .filter(|s| s.arrived)
                .map(|_| i18n::arrived_message(self.language)),
            error_kind: self.condition.as_ref().map(Condition::kind),
            error_message: self.condition.as_ref().map(|c| self.condition_message(c)),
        }
    }

    fn condition_message(&self, condition: &Condition) -> String {
        match condition {
            Condition::Location(error) => {
                i18n::location_error_message(self.language, *error).to_string()
            }
            Condition::OutOfRange { distance_km } => {
                i18n::too_far_message(self.language, *distance_km)
            }
        }
    }

    fn issue_request(&mut self) -> Directive {
        self.next_request += 1;
        self.pending = Some(self.next_request);
        Directive::RequestFix {
            request_id: self.next_request,
            options: self.options,
        }
    }

    /// True if the completion answers the outstanding request.
    fn accept(&mut self, request_id: u64) -> bool {
        if self.pending == Some(request_id) {
            self.pending = None;
            true
        } else {
            debug!("discarding completion for superseded request {request_id}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::ScriptedSource;

    fn session() -> NavSession {
        NavSession::new(Language::En)
    }

    fn fix_at(lat: f64, lng: f64) -> Fix {
        Fix::new(GeoPoint::new(lat, lng), 1_700_000_000_000)
    }

    /// A fix roughly `km` kilometers due south of the Lonely Tree.
    fn fix_away_km(km: f64) -> Fix {
        let tree = Destination::lonely_tree(Language::En).point;
        fix_at(tree.lat - km / 111.19, tree.lng)
    }

    fn expect_request(directive: Directive) -> u64 {
        match directive {
            Directive::RequestFix { request_id, .. } => request_id,
            other => panic!("expected RequestFix, got {other:?}"),
        }
    }

    #[test]
    fn start_issues_one_request() {
        let mut s = session();
        let directive = s.start();
        assert_eq!(
            directive,
            Directive::RequestFix {
                request_id: 1,
                options: FixOptions::default()
            }
        );
        assert_eq!(s.phase(), Phase::Navigating);
    }

    #[test]
    fn in_range_fix_schedules_next_poll() {
        let mut s = session();
        let id = expect_request(s.start());

        let directive = s.report_fix(id, fix_away_km(1.0));
        assert_eq!(directive, Directive::SchedulePoll { delay_ms: 10_000 });
        assert_eq!(s.phase(), Phase::Navigating);

        let state = s.state().unwrap();
        assert!(state.within_range);
        assert!(!state.arrived);
        assert!((state.distance_km - 1.0).abs() < 0.02);
        // South of the tree, so the tree is due north
        assert_eq!(state.compass, Compass::North);
        assert!(s.last_fix().is_some());
        assert!(s.condition().is_none());
    }

    #[test]
    fn out_of_range_fix_stops_polling() {
        let mut s = session();
        let id = expect_request(s.start());

        let directive = s.report_fix(id, fix_away_km(3.5));
        assert_eq!(directive, Directive::CancelPoll);
        assert_eq!(s.phase(), Phase::Idle);

        // Distance is still reported even though guidance is suppressed
        let snapshot = s.snapshot();
        let state = snapshot.state.unwrap();
        assert!(!state.within_range);
        assert!((state.distance_km - 3.5).abs() < 0.01);
        assert_eq!(snapshot.error_kind, Some("out_of_range"));
        let message = snapshot.error_message.unwrap();
        assert!(message.contains("3.5km"), "unexpected message: {message}");
    }

    #[test]
    fn fix_at_destination_is_arrival() {
        let mut s = session();
        let id = expect_request(s.start());

        s.report_fix(id, fix_at(37.522710, 127.120301));
        let snapshot = s.snapshot();
        let state = snapshot.state.unwrap();
        assert!(state.arrived);
        assert!(state.distance_km < geo::ARRIVAL_RANGE_KM);
        assert!(snapshot.arrived_message.is_some());
        // Arrival is a flag, not a phase: polling continues
        assert_eq!(s.phase(), Phase::Navigating);
    }

    #[test]
    fn location_failure_requires_fresh_start() {
        let mut s = session();
        let id = expect_request(s.start());

        let directive = s.report_error(id, LocationError::PermissionDenied);
        assert_eq!(directive, Directive::CancelPoll);
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.snapshot().error_kind, Some("permission_denied"));

        // No retry happens on its own; the next start issues exactly
        // one new request and clears the error.
        assert_eq!(expect_request(s.start()), 2);
        assert_eq!(s.snapshot().error_kind, None);
    }

    #[test]
    fn poll_due_skips_while_request_outstanding() {
        let mut s = session();
        let id = expect_request(s.start());

        assert_eq!(s.poll_due(), Directive::None);
        assert_eq!(s.poll_due(), Directive::None);

        // Once the outstanding request resolves, polling resumes
        assert_eq!(
            s.report_fix(id, fix_away_km(0.5)),
            Directive::SchedulePoll { delay_ms: 10_000 }
        );
        assert_eq!(expect_request(s.poll_due()), 2);
    }

    #[test]
    fn start_while_outstanding_does_not_duplicate() {
        let mut s = session();
        expect_request(s.start());
        assert_eq!(s.start(), Directive::None);
    }

    #[test]
    fn completion_after_stop_is_discarded() {
        let mut s = session();
        let id = expect_request(s.start());
        assert_eq!(s.stop(), Directive::CancelPoll);

        assert_eq!(s.report_fix(id, fix_away_km(0.5)), Directive::None);
        assert!(s.state().is_none());
        assert!(s.last_fix().is_none());
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn superseded_completion_is_discarded() {
        let mut s = session();
        let first = expect_request(s.start());
        s.report_fix(first, fix_away_km(1.0));
        let second = expect_request(s.poll_due());

        // A late response under the first id no longer counts
        assert_eq!(s.report_fix(first, fix_away_km(2.0)), Directive::None);
        assert!((s.state().unwrap().distance_km - 1.0).abs() < 0.02);

        s.report_fix(second, fix_away_km(2.0));
        assert!((s.state().unwrap().distance_km - 2.0).abs() < 0.02);
    }

    #[test]
    fn stray_poll_after_stop_is_ignored() {
        let mut s = session();
        let id = expect_request(s.start());
        s.report_fix(id, fix_away_km(1.0));
        s.stop();
        assert_eq!(s.poll_due(), Directive::None);
    }

    #[test]
    fn derive_is_pure() {
        let destination = Destination::lonely_tree(Language::En);
        let fix = fix_away_km(1.3);
        assert_eq!(
            NavigationState::derive(&fix, &destination),
            NavigationState::derive(&fix, &destination)
        );
    }

    #[test]
    fn run_with_walks_until_arrival_script_ends() {
        let mut source = ScriptedSource::new([
            Ok(fix_away_km(2.0)),
            Ok(fix_away_km(0.8)),
            Ok(fix_at(37.522710, 127.120301)),
            Err(LocationError::Timeout),
        ]);

        let mut s = session();
        let made = s.run_with(&mut source, 10);
        assert_eq!(made, 4);
        assert_eq!(source.requests(), 4);
        // The walk ended on a timeout, after an arrival fix
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.snapshot().error_kind, Some("timeout"));
        assert!(s.state().unwrap().arrived);
    }

    #[test]
    fn run_with_stops_after_out_of_range() {
        let mut source = ScriptedSource::new([Ok(fix_away_km(5.0)), Ok(fix_away_km(1.0))]);
        let mut s = session();
        let made = s.run_with(&mut source, 10);
        assert_eq!(made, 1, "polling must stop once out of range");
        assert_eq!(s.snapshot().error_kind, Some("out_of_range"));
    }

    #[test]
    fn snapshot_before_any_fix_is_bare() {
        let s = session();
        let snapshot = s.snapshot();
        assert_eq!(snapshot.phase, Phase::Idle);
        assert!(snapshot.state.is_none());
        assert!(snapshot.direction.is_none());
        assert!(snapshot.error_kind.is_none());
        assert_eq!(snapshot.destination.name, "Olympic Park Lonely Tree");
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let mut s = session();
        let id = expect_request(s.start());
        s.report_fix(id, fix_away_km(0.8));

        let json = serde_json::to_string(&s.snapshot()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["phase"], "navigating");
        assert_eq!(value["state"]["compass"], "north");
        assert_eq!(value["direction"], "North");
        assert_eq!(value["guidance"], "Go straight north");
        assert!(value["state"]["within_range"].as_bool().unwrap());
    }
}
