// Global subscriber installation.
// Runs in its own test binary so the installed subscriber does not reach other tests.

use sheetsync::SyncError;
use sheetsync::logging;

#[test]
fn test_init_twice_is_an_error() {
    assert!(logging::init("warn").is_ok());
    assert!(matches!(logging::init("warn"), Err(SyncError::Other(_))));
}
