pub mod admit_commands;
pub mod rate_limit_commands;
