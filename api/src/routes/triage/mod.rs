pub mod triage_request;
pub mod triage_route;
