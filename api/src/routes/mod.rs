pub mod health_route;
pub mod kb;
pub mod triage;
