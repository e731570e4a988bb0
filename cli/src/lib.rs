pub mod pipeline;
pub mod procon_commands;
