// Domain layer module exports
// Domain is independent of infrastructure concerns; adapters implement
// the traits declared here.

pub mod conversation;
pub mod relay;
