mod google_calendar_mock;

// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - smoke_tests: End-to-end sync runs against an in-memory calendar
// - google_calendar_mock: The Google Calendar REST client against a mock server
