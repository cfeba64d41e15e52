/// The only role allowed into the dashboard.
pub const SUPERVISOR: &str = "supervisor";
