//! Integration tests for spdrive-graph
//!
//! Uses wiremock to simulate the Microsoft Graph API and verifies
//! end-to-end behavior of the request executor, drive operations,
//! and upload sessions.

mod common;

mod test_drive_ops;
mod test_executor;
mod test_upload_session;
