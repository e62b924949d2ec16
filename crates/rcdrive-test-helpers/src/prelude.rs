//! Convenience re-exports for common test utilities.

pub use crate::alerts::{AlertFeed, ScriptedAlertSource, scripted_alerts};
pub use crate::bus::{BusTransaction, MockBus};
pub use crate::capture::ScriptedCaptureFactory;
pub use crate::edges::{EdgeFeed, PulseTrain, ScriptedEdgeSource, scripted_edges};
pub use crate::must::{must, must_some};
pub use crate::pwm::{PwmWrite, RecordingOutput};
pub use crate::wait::{wait_until, wait_until_default};

/// Result type for tests that propagate errors with `?`.
pub type TestResult = Result<(), Box<dyn std::error::Error>>;
