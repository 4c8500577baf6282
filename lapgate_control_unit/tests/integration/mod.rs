mod harness;

mod race_flow;
mod setup;
